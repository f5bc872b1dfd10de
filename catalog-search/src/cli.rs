//! Command-line definitions.

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::ConnectionArgs;
use catalog_search_shared::Fuzziness;

#[derive(Debug, Parser)]
#[command(name = "catalog-search")]
#[command(about = "Search, seed and inspect the product catalog index", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recreate the index and load generated products
    Seed {
        /// Number of products to generate
        #[arg(long, default_value_t = 1000)]
        count: usize,
        /// Products per bulk request
        #[arg(long, default_value_t = 100)]
        batch_size: usize,
        /// RNG seed for a reproducible catalog
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Full-text match on one field
    Match {
        query: String,
        #[arg(long, default_value = "name")]
        field: String,
        #[arg(long)]
        from: Option<u64>,
        #[arg(long)]
        size: Option<u64>,
    },
    /// One query across several fields, in boost order
    MultiMatch {
        query: String,
        #[arg(long, value_delimiter = ',', default_value = "name,description")]
        fields: Vec<String>,
    },
    /// Boolean query from JSON clauses
    Bool {
        #[arg(long, value_parser = parse_json)]
        must: Vec<Value>,
        #[arg(long, value_parser = parse_json)]
        should: Vec<Value>,
        #[arg(long, value_parser = parse_json)]
        must_not: Vec<Value>,
        #[arg(long, value_parser = parse_json)]
        filter: Vec<Value>,
        #[arg(long, value_parser = parse_json)]
        minimum_should_match: Option<Value>,
    },
    /// Numeric or date range filter
    Range {
        #[arg(long, default_value = "price")]
        field: String,
        #[arg(long, value_parser = parse_bound)]
        gte: Option<Value>,
        #[arg(long, value_parser = parse_bound)]
        lte: Option<Value>,
        #[arg(long, value_parser = parse_bound)]
        gt: Option<Value>,
        #[arg(long, value_parser = parse_bound)]
        lt: Option<Value>,
        /// Date format for string bounds
        #[arg(long)]
        format: Option<String>,
    },
    /// Typo-tolerant term match
    Fuzzy {
        value: String,
        #[arg(long, default_value = "name")]
        field: String,
        /// Edit distance or an engine token such as AUTO
        #[arg(long, default_value = "AUTO", value_parser = parse_fuzziness)]
        fuzziness: Fuzziness,
    },
    /// Phrase match with optional slop
    Phrase {
        phrase: String,
        #[arg(long, default_value = "description")]
        field: String,
        #[arg(long, default_value_t = 0)]
        slop: u32,
    },
    /// Aggregations only (defaults to average price and category counts)
    Aggregate {
        /// JSON object of aggregation name to spec
        #[arg(value_parser = parse_json)]
        aggregations: Option<Value>,
    },
    /// Fetch one product by id
    Get { id: String },
    /// Delete one product by id
    Delete { id: String },
    /// Run the example search sequence
    Demo,
}

/// Parse a JSON argument.
pub fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))
}

/// Parse a range bound: JSON scalars as-is, anything else as a string.
pub fn parse_bound(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

/// `AUTO` → `Auto`, an integer → `Edits`, anything else passed through.
pub fn parse_fuzziness(raw: &str) -> Result<Fuzziness, String> {
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(Fuzziness::Auto);
    }
    if raw.is_empty() {
        return Err("fuzziness must not be empty".to_string());
    }
    Ok(raw
        .parse::<u32>()
        .map(Fuzziness::Edits)
        .unwrap_or_else(|_| Fuzziness::Custom(raw.to_string())))
}
