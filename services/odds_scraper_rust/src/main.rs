//! Odds Scraper Service
//!
//! Resolves sportsbook fixtures from a replayed capture session and keeps a
//! JSON catalog of the latest odds per fixture.
//!
//! Usage: `odds_scraper [--once]`. Without `--once` the scraper cycles every
//! REFRESH_INTERVAL_SECS until Ctrl-C or RUN_BUDGET_SECS elapses.

mod capture;

use anyhow::{Context, Result};
use capture::CaptureReplay;
use dotenv::dotenv;
use odds_rust_core::ai::{BudgetedAi, GeminiClient};
use odds_rust_core::sink::JsonFileSink;
use odds_rust_core::{Engine, FixtureCatalog, ScraperConfig};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn build_ai(config: &ScraperConfig) -> Result<BudgetedAi> {
    let Some(api_key) = config.ai.api_key.as_deref() else {
        info!("AI_API_KEY not set, AI fallback disabled");
        return Ok(BudgetedAi::disabled());
    };
    let client = GeminiClient::new(
        &config.ai.endpoint,
        &config.ai.model,
        api_key,
        config.page_timeout,
    )
    .context("Failed to build AI client")?;
    info!(
        "AI fallback enabled ({}, {} calls max)",
        config.ai.model, config.max_ai_calls
    );
    Ok(BudgetedAi::new(Some(Box::new(client)), config.max_ai_calls))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting odds scraper...");

    let once = std::env::args().skip(1).any(|arg| arg == "--once");
    let config = ScraperConfig::from_env();

    let page = CaptureReplay::load(&config.capture_file).await?;
    info!(
        "Loaded {} captured pages from {}",
        page.page_count(),
        config.capture_file.display()
    );

    let ai = build_ai(&config)?;
    let sink = JsonFileSink::new(&config.output_file);
    let catalog = if config.resume {
        let catalog = FixtureCatalog::from_fixtures(sink.load().await);
        info!("Resuming with {} fixtures from {}", catalog.len(), sink.path().display());
        catalog
    } else {
        FixtureCatalog::new()
    };

    let mut engine =
        Engine::new(config, Box::new(page), Box::new(sink), ai).with_catalog(catalog);

    if once {
        let report = engine.run_once().await;
        match serde_json::to_string(&report) {
            Ok(json) => info!("Cycle summary: {}", json),
            Err(e) => error!("Could not serialize cycle summary: {}", e),
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal, finishing current page");
                let _ = shutdown_tx.send(true);
            }
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
                // Keep the sender alive so the engine keeps its refresh cadence.
                std::future::pending::<()>().await;
            }
        }
    });

    let cycles = engine.run_continuous(shutdown_rx).await;
    info!(
        "Scraper stopped after {} cycle(s), {} fixtures saved",
        cycles,
        engine.catalog().len()
    );
    Ok(())
}
