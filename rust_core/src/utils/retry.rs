//! Retry logic for transient collaborator failures
//!
//! Navigation and config acquisition are retried with exponential backoff.
//! Parsing is never retried.

use crate::error::{Result, ScrapeError};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(30_000),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based): base × 2^(attempt-1),
    /// capped at `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Run `f` until it succeeds, fails with a non-transient error, or
/// `max_attempts` is reached.
///
/// # Example
/// ```ignore
/// use odds_rust_core::utils::retry::{retry_with_backoff, RetryConfig};
///
/// retry_with_backoff("navigate", &RetryConfig::default(), || async {
///     page.navigate(&url).await
/// })
/// .await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T>(operation: &str, config: &RetryConfig, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < config.max_attempts && is_retriable_error(&e) => {
                let backoff = config.backoff_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                    operation,
                    attempt,
                    config.max_attempts,
                    e,
                    backoff.as_millis()
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}

fn is_retriable_error(e: &ScrapeError) -> bool {
    e.is_transient()
}
