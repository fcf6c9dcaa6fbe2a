//! Catalog persistence.
//!
//! The whole catalog is rewritten on every flush. File format:
//! `{ "<match_id>": { ...fixture fields..., "odds": { ... } }, ... }`

use crate::error::Result;
use crate::models::Fixture;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[async_trait]
pub trait FixtureSink: Send + Sync {
    async fn persist(&self, fixtures: &[Fixture]) -> Result<()>;
}

/// Pretty-printed JSON object keyed by fixture identity.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Fixtures from a previous run. A missing or unreadable file yields an
    /// empty list.
    pub async fn load(&self) -> Vec<Fixture> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Could not read {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<BTreeMap<String, Fixture>>(&content) {
            Ok(fixtures) => fixtures.into_values().collect(),
            Err(e) => {
                warn!("Ignoring unreadable catalog {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl FixtureSink for JsonFileSink {
    async fn persist(&self, fixtures: &[Fixture]) -> Result<()> {
        let keyed: BTreeMap<&str, &Fixture> =
            fixtures.iter().map(|f| (f.match_id.as_str(), f)).collect();
        let content = serde_json::to_string_pretty(&keyed)?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Saved {} fixtures to {}", fixtures.len(), self.path.display());
        Ok(())
    }
}
