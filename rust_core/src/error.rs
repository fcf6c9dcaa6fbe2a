use thiserror::Error;

/// Errors surfaced by collaborators and the persistence sink.
///
/// Parsing never produces one of these: malformed payloads degrade to partial
/// or empty results instead.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Collaborator timed out after {secs}s: {operation}")]
    Timeout { operation: String, secs: u64 },

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Page source unavailable: {0}")]
    PageUnavailable(String),

    #[error("AI API error: {0}")]
    AiApi(String),

    #[error("AI call budget exhausted ({0} calls)")]
    AiBudgetExhausted(u32),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

impl ScrapeError {
    /// Whether retrying the same operation can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Timeout { .. } | ScrapeError::Navigation(_) => true,
            ScrapeError::Http(e) => e.is_timeout() || e.is_connect(),
            ScrapeError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionRefused
            ),
            _ => false,
        }
    }
}
