use crate::models::Fixture;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one extraction pass over a page or payload.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    pub source_url: String,
    /// Distinct fixtures resolved in the pass, after pair dedup.
    pub resolved: usize,
    pub labels_seen: usize,
    pub labels_rejected: usize,
    pub payloads: usize,
    pub ai_used: bool,
    pub inserted: usize,
    pub changed: usize,
    pub persisted: bool,
    /// Catalog state of every fixture the pass resolved.
    pub touched: Vec<Fixture>,
    pub error: Option<String>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl PassReport {
    pub fn new(source_url: &str) -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            source_url: source_url.to_string(),
            resolved: 0,
            labels_seen: 0,
            labels_rejected: 0,
            payloads: 0,
            ai_used: false,
            inserted: 0,
            changed: 0,
            persisted: false,
            touched: Vec::new(),
            error: None,
            elapsed: Duration::ZERO,
        }
    }

    /// True if the source yielded nothing because a collaborator failed.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Totals for one continuous-mode cycle across every target URL.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub pages: usize,
    pub failed_pages: usize,
    pub resolved: usize,
    pub changed: usize,
    pub catalog_size: usize,
    pub ai_calls_used: u32,
    pub ai_calls_remaining: u32,
}

impl CycleReport {
    pub fn absorb(&mut self, pass: &PassReport) {
        self.pages += 1;
        if pass.failed() {
            self.failed_pages += 1;
        }
        self.resolved += pass.resolved;
        self.changed += pass.changed;
    }
}
