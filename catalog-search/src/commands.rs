//! Command implementations.
//!
//! Each command returns a JSON value for the caller to print.

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::cli::Command;
use crate::config::Dependencies;
use crate::AppError;
use catalog_search_loader::{
    seed_products, GeneratorConfig, LoadSummary, LoaderConfig, ProductGenerator,
};
use catalog_search_repository::{RequestContext, SearchError};
use catalog_search_shared::{
    BoolClauses, PageWindow, Product, RangeBounds, SearchIntent, SearchResult,
};

/// Aggregations used when none are given: average price and category counts.
pub fn default_aggregations() -> Map<String, Value> {
    let mut aggs = Map::new();
    aggs.insert("avg_price".to_string(), json!({"avg": {"field": "price"}}));
    aggs.insert(
        "categories".to_string(),
        json!({"terms": {"field": "categories"}}),
    );
    aggs
}

/// The example searches run by `demo`, in order.
pub fn demo_intents() -> Vec<(&'static str, SearchIntent)> {
    vec![
        (
            "match",
            SearchIntent::matching_page("name", "laptop", PageWindow::new(0, 5)),
        ),
        (
            "multi_match",
            SearchIntent::multi_match("gaming laptop", ["name", "description"]),
        ),
        (
            "bool",
            SearchIntent::Bool(
                BoolClauses::new()
                    .must(json!({"match": {"brand": "Apple"}}))
                    .filter(json!({"range": {"price": {"gte": 1000}}})),
            ),
        ),
        (
            "range",
            SearchIntent::range("price", RangeBounds::new().gte(1000).lte(2000)),
        ),
        ("fuzzy", SearchIntent::fuzzy("name", "lapto", 1u32)),
        (
            "aggregation",
            SearchIntent::aggregation(default_aggregations()),
        ),
        (
            "phrase",
            SearchIntent::phrase("description", "gaming laptop", 1),
        ),
    ]
}

/// Translate a search command into its intent. `None` for other commands.
pub fn intent_for(command: &Command) -> Result<Option<SearchIntent>, AppError> {
    let intent = match command {
        Command::Match {
            query,
            field,
            from,
            size,
        } => SearchIntent::matching_page(
            field.as_str(),
            query.as_str(),
            PageWindow {
                from: *from,
                size: *size,
            },
        ),
        Command::MultiMatch { query, fields } => {
            SearchIntent::multi_match(query.as_str(), fields.iter().map(String::as_str))
        }
        Command::Bool {
            must,
            should,
            must_not,
            filter,
            minimum_should_match,
        } => SearchIntent::Bool(BoolClauses {
            must: must.clone(),
            should: should.clone(),
            must_not: must_not.clone(),
            filter: filter.clone(),
            minimum_should_match: minimum_should_match.clone(),
        }),
        Command::Range {
            field,
            gte,
            lte,
            gt,
            lt,
            format,
        } => SearchIntent::range(
            field.as_str(),
            RangeBounds {
                gte: gte.clone(),
                lte: lte.clone(),
                gt: gt.clone(),
                lt: lt.clone(),
                format: format.clone(),
            },
        ),
        Command::Fuzzy {
            value,
            field,
            fuzziness,
        } => SearchIntent::fuzzy(field.as_str(), value.as_str(), fuzziness.clone()),
        Command::Phrase {
            phrase,
            field,
            slop,
        } => SearchIntent::phrase(field.as_str(), phrase.as_str(), *slop),
        Command::Aggregate { aggregations } => {
            let aggregations = match aggregations {
                None => default_aggregations(),
                Some(Value::Object(map)) => map.clone(),
                Some(_) => {
                    return Err(AppError::invalid_argument(
                        "aggregations must be a JSON object",
                    ))
                }
            };
            SearchIntent::aggregation(aggregations)
        }
        Command::Seed { .. } | Command::Get { .. } | Command::Delete { .. } | Command::Demo => {
            return Ok(None)
        }
    };
    Ok(Some(intent))
}

/// Run one command.
pub async fn run(
    command: Command,
    deps: &Dependencies,
    ctx: &RequestContext,
) -> Result<Value, AppError> {
    if let Some(intent) = intent_for(&command)? {
        let result: SearchResult<Product> = deps.executor.search(ctx, &intent).await?;
        return Ok(serde_json::to_value(&result)?);
    }

    match command {
        Command::Seed {
            count,
            batch_size,
            seed,
        } => {
            let loader = deps.loader(LoaderConfig::default().with_batch_size(batch_size))?;
            let mut generator = ProductGenerator::new(GeneratorConfig {
                seed,
                ..Default::default()
            });
            let summary =
                seed_products(ctx, &deps.index_manager, &loader, &mut generator, count).await?;
            if let Err(SearchError::Cancelled) = summary.refresh {
                return Err(SearchError::Cancelled.into());
            }
            Ok(summary_json(&summary))
        }
        Command::Get { id } => match deps.store.get::<Product>(ctx, &id).await {
            Ok(product) => Ok(serde_json::to_value(&product)?),
            Err(e) if e.is_not_found() => Ok(json!({"id": id, "found": false})),
            Err(e) => Err(e.into()),
        },
        Command::Delete { id } => match deps.store.delete(ctx, &id).await {
            Ok(()) => Ok(json!({"id": id, "deleted": true})),
            Err(e) if e.is_not_found() => Ok(json!({"id": id, "deleted": false})),
            Err(e) => Err(e.into()),
        },
        Command::Demo => run_demo(deps, ctx).await,
        _ => Err(AppError::invalid_argument("unsupported command")),
    }
}

/// Run every demo search; individual failures are reported inline.
///
/// The index is created first when missing, so a fresh cluster returns
/// empty results instead of seven index errors.
async fn run_demo(deps: &Dependencies, ctx: &RequestContext) -> Result<Value, AppError> {
    if deps.index_manager.ensure_index(ctx).await? {
        info!(index = %deps.index, "Created empty index for the demo");
    }

    let mut results = Vec::new();

    for (name, intent) in demo_intents() {
        info!(example = name, "Running example search");
        match deps.executor.search::<Product>(ctx, &intent).await {
            Ok(result) => results.push(json!({"example": name, "result": result})),
            Err(SearchError::Cancelled) => return Err(SearchError::Cancelled.into()),
            Err(e) => {
                warn!(example = name, error = %e, "Example search failed");
                results.push(json!({"example": name, "error": e.to_string()}));
            }
        }
    }

    Ok(Value::Array(results))
}

fn summary_json(summary: &LoadSummary) -> Value {
    let batches: Vec<Value> = summary
        .batches
        .iter()
        .map(|b| {
            json!({
                "batch": b.sequence,
                "submitted": b.submitted,
                "indexed": b.indexed_count,
                "failed": b.failed_count,
                "first_error": b.first_error.as_ref().map(|e| e.to_string()),
            })
        })
        .collect();

    json!({
        "submitted": summary.total_submitted(),
        "indexed": summary.total_indexed(),
        "failed": summary.total_failed(),
        "aborted": summary.aborted,
        "refreshed": summary.refresh.is_ok(),
        "refresh_error": summary.refresh.as_ref().err().map(|e| e.to_string()),
        "batches": batches,
    })
}
