//! Odds Core - fixture resolution and odds aggregation for scraped sportsbook pages.
//!
//! This crate provides:
//! - Incremental parsing of the pipe-delimited delta protocol into a league/fixture/market tree
//! - Odds and team extraction from free-text accessibility labels
//! - Sport and league classification with per-run learned associations
//! - A deduplicating fixture catalog with non-destructive odds merges
//! - An orchestrator that drives passes over a browser collaborator, with an
//!   LLM fallback and a persistence sink

pub mod ai;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod delta;
pub mod engine;
pub mod error;
pub mod feed;
pub mod labels;
pub mod league_config;
pub mod models;
pub mod sink;
pub mod utils;

pub use catalog::{FixtureCatalog, PassDeduper};
pub use classify::{Classification, ClassifierState};
pub use config::ScraperConfig;
pub use delta::ParseContext;
pub use engine::{Engine, PassReport};
pub use error::{Result, ScrapeError};
pub use models::{Fixture, OddsMap, OddsValue, Sport};
