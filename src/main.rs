use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bloxpulse::cli::Cli;
use bloxpulse::client::G2Client;
use bloxpulse::config::Config;
use bloxpulse::error::{Error, Result};
use bloxpulse::orchestrator::{Orchestrator, RunReport};
use bloxpulse::store;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn run_pipeline(config: Config) -> Result<RunReport> {
    let client = G2Client::new(
        config.run.api_key.clone().unwrap_or_default(),
        config.api.clone(),
        config.backoff,
    );
    let orchestrator = Orchestrator::new(client, config.catalog.clone())
        .max_retries(config.max_retries)
        .courtesy_delay(config.courtesy_delay);
    orchestrator.run(&config.run)
}

fn verify_existing(config: &Config) -> Result<()> {
    let path = &config.run.output_file;
    if !path.exists() {
        return Err(Error::ConfigValidation(format!(
            "reviews file {} not found, but fetching was skipped",
            path.display()
        )));
    }
    let reviews = store::load_reviews(path)?;
    info!(count = reviews.len(), path = %path.display(), "using existing reviews file");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    info!("bloxpulse starting");
    let started = Instant::now();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    info!(
        products = ?config.catalog.iter().collect::<Vec<_>>(),
        product = ?config.run.product,
        max_reviews = config.run.max_reviews,
        mock = config.run.use_mock,
        "config loaded"
    );

    if config.skip_fetch {
        if let Err(e) = verify_existing(&config) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let pipeline = tokio::task::spawn_blocking(move || run_pipeline(config));
    let result = tokio::select! {
        joined = pipeline => joined.unwrap_or_else(|e| Err(Error::Io(std::io::Error::other(e)))),
        _ = tokio::signal::ctrl_c() => Err(Error::Interrupted),
    };

    match result {
        Ok(report) => {
            for outcome in &report.outcomes {
                info!(product = %outcome.product, source = ?outcome.source, count = outcome.count, "product summary");
            }
            let fallbacks = report.fallback_products();
            if !fallbacks.is_empty() {
                warn!(products = ?fallbacks, "some products used fallback data");
            }
            info!(
                total = report.total,
                path = %report.output_file.display(),
                elapsed = ?started.elapsed(),
                "pipeline completed"
            );
        }
        Err(Error::Interrupted) => {
            eprintln!("error: interrupted");
            std::process::exit(130);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
