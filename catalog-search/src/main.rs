use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use catalog_search::cli::Cli;
use catalog_search::{commands, Dependencies};
use catalog_search_repository::RequestContext;

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = cli
        .connection
        .to_connection_config()
        .context("Invalid connection settings")?;

    // Ctrl-C abandons the in-flight request
    let (ctx, cancel) = RequestContext::with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            cancel.cancel();
        }
    });

    let result = match Dependencies::new(&config, &ctx).await {
        Ok(deps) => commands::run(cli.command, &deps, &ctx).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_cancelled() => {
            warn!("Command cancelled");
            Ok(ExitCode::from(e.exit_code()))
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e.into())
        }
    }
}
