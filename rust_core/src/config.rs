//! Configuration constants and environment loading for the scraper
//!
//! This module manages all runtime configuration:
//! - Which sport codes and views to visit
//! - Refresh cadence, request pacing and the optional run budget
//! - AI fallback budget and client settings
//! - Collaborator timeouts and navigation retry policy
//! - Output and capture file locations

use crate::ai::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::utils::retry::RetryConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Root of every navigated path
pub const DEFAULT_BASE_URL: &str = "https://www.bet365.com/#/";

/// Sport codes visited when SPORT_CODES is unset
pub const DEFAULT_SPORT_CODES: &[&str] = &["B1", "B2", "B3", "B4", "B8", "B9", "B13"];

/// Continuous-mode period, also the periodic flush interval
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

pub const DEFAULT_OUTPUT_FILE: &str = "bet365_data.json";

pub const DEFAULT_CAPTURE_FILE: &str = "capture.json";

/// AI calls allowed over the whole process lifetime
pub const DEFAULT_MAX_AI_CALLS: u32 = 10;

/// Fewer resolved fixtures than this on a page triggers the AI fallback
pub const DEFAULT_AI_MIN_FIXTURES: usize = 3;

/// Timeout on each collaborator operation (page load, selector wait)
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_NAV_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_NAV_BASE_BACKOFF_MS: u64 = 1000;
pub const DEFAULT_NAV_MAX_BACKOFF_MS: u64 = 30_000;

/// Randomized delay between navigations
pub const DEFAULT_PACE_MIN_MS: u64 = 1000;
pub const DEFAULT_PACE_MAX_MS: u64 = 3000;

/// Settings for the hosted LLM used by the fallback extractor
#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl AiSettings {
    /// No key means the fallback is disabled.
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub sport_codes: Vec<String>,
    pub include_inplay: bool,
    pub refresh_interval: Duration,
    pub run_budget: Option<Duration>,
    pub output_file: PathBuf,
    pub capture_file: PathBuf,
    pub max_ai_calls: u32,
    pub ai_min_fixtures: usize,
    pub ai: AiSettings,
    pub page_timeout: Duration,
    pub navigation_retry: RetryConfig,
    pub pace_min: Duration,
    pub pace_max: Duration,
    pub resume: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ScraperConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key → value source. Unparseable values fall back to the
    /// default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let number = |key: &str, default: u64| {
            text(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };
        let flag = |key: &str, default: bool| text(key).and_then(|v| parse_bool(&v)).unwrap_or(default);

        let sport_codes: Vec<String> = text("SPORT_CODES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .filter(|codes: &Vec<String>| !codes.is_empty())
            .unwrap_or_else(|| DEFAULT_SPORT_CODES.iter().map(|s| s.to_string()).collect());

        let mut base_url = text("BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let pace_min = number("PACE_MIN_MS", DEFAULT_PACE_MIN_MS);
        let pace_max = number("PACE_MAX_MS", DEFAULT_PACE_MAX_MS).max(pace_min);

        Self {
            base_url,
            sport_codes,
            include_inplay: flag("INCLUDE_INPLAY", true),
            refresh_interval: Duration::from_secs(
                number("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS).max(1),
            ),
            run_budget: text("RUN_BUDGET_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
            output_file: text("OUTPUT_FILE")
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string())
                .into(),
            capture_file: text("CAPTURE_FILE")
                .unwrap_or_else(|| DEFAULT_CAPTURE_FILE.to_string())
                .into(),
            max_ai_calls: text("MAX_AI_CALLS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(DEFAULT_MAX_AI_CALLS),
            ai_min_fixtures: text("AI_MIN_FIXTURES")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_AI_MIN_FIXTURES),
            ai: AiSettings {
                api_key: text("AI_API_KEY"),
                model: text("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                endpoint: text("AI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            },
            page_timeout: Duration::from_secs(number("PAGE_TIMEOUT_SECS", DEFAULT_PAGE_TIMEOUT_SECS)),
            navigation_retry: RetryConfig {
                max_attempts: text("NAV_MAX_ATTEMPTS")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(DEFAULT_NAV_MAX_ATTEMPTS)
                    .max(1),
                base_backoff: Duration::from_millis(number(
                    "NAV_BASE_BACKOFF_MS",
                    DEFAULT_NAV_BASE_BACKOFF_MS,
                )),
                max_backoff: Duration::from_millis(number(
                    "NAV_MAX_BACKOFF_MS",
                    DEFAULT_NAV_MAX_BACKOFF_MS,
                )),
            },
            pace_min: Duration::from_millis(pace_min),
            pace_max: Duration::from_millis(pace_max),
            resume: flag("RESUME", false),
        }
    }

    /// Pages visited per cycle: `AS/<code>` for each code, then `IP/<code>`
    /// when in-play is enabled.
    pub fn target_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        for code in &self.sport_codes {
            urls.push(format!("{}AS/{}", self.base_url, code));
            if self.include_inplay {
                urls.push(format!("{}IP/{}", self.base_url, code));
            }
        }
        urls
    }
}
