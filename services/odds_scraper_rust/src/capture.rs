//! Replays a recorded browsing session as a `PageSource`.
//!
//! Capture file layout:
//! ```json
//! {
//!   "pages": [
//!     {
//!       "url": "https://www.bet365.com/#/AS/B1",
//!       "elements": { ".cpm-ParticipantOdds": ["Arsenal v Chelsea ..."] },
//!       "html": "<html>...</html>",
//!       "payloads": [
//!         { "source_url": "wss://...", "kind": "frame", "body": "I|CL;..." }
//!       ]
//!     }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use odds_rust_core::engine::{ElementHandle, PageSource, RawPayload};
use odds_rust_core::ScrapeError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CaptureFile {
    #[serde(default)]
    pages: Vec<CapturedPage>,
}

#[derive(Debug, Clone, Deserialize)]
struct CapturedPage {
    url: String,
    #[serde(default)]
    elements: HashMap<String, Vec<String>>,
    #[serde(default)]
    html: String,
    #[serde(default)]
    payloads: Vec<CapturedPayload>,
}

#[derive(Debug, Clone, Deserialize)]
struct CapturedPayload {
    source_url: String,
    #[serde(default)]
    kind: Option<String>,
    body: String,
}

impl CapturedPayload {
    fn to_raw(&self) -> RawPayload {
        match self.kind.as_deref() {
            Some("frame") | Some("websocket") => RawPayload::frame(&self.source_url, &self.body),
            _ => RawPayload::response(&self.source_url, &self.body),
        }
    }
}

pub struct CaptureReplay {
    pages: HashMap<String, CapturedPage>,
    current: Mutex<Option<String>>,
}

impl CaptureReplay {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read capture file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse capture file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let capture: CaptureFile = serde_json::from_str(content)?;
        let pages = capture
            .pages
            .into_iter()
            .map(|page| (page.url.clone(), page))
            .collect();
        Ok(Self {
            pages,
            current: Mutex::new(None),
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn with_current<T>(&self, f: impl FnOnce(&CapturedPage) -> T) -> odds_rust_core::Result<T> {
        let current = self
            .current
            .lock()
            .map_err(|_| ScrapeError::PageUnavailable("capture state poisoned".into()))?;
        let url = current
            .as_deref()
            .ok_or_else(|| ScrapeError::PageUnavailable("no page loaded".into()))?;
        self.pages
            .get(url)
            .map(f)
            .ok_or_else(|| ScrapeError::PageUnavailable(url.to_string()))
    }
}

#[async_trait]
impl PageSource for CaptureReplay {
    async fn navigate(&self, url: &str) -> odds_rust_core::Result<()> {
        if !self.pages.contains_key(url) {
            return Err(ScrapeError::PageUnavailable(format!("{} not in capture", url)));
        }
        let mut current = self
            .current
            .lock()
            .map_err(|_| ScrapeError::PageUnavailable("capture state poisoned".into()))?;
        *current = Some(url.to_string());
        debug!("Replaying captured page {}", url);
        Ok(())
    }

    async fn get_page_elements(&self, selector: &str) -> odds_rust_core::Result<Vec<ElementHandle>> {
        self.with_current(|page| {
            page.elements
                .get(selector)
                .map(|labels| labels.iter().map(ElementHandle::with_label).collect())
                .unwrap_or_default()
        })
    }

    async fn page_html(&self) -> odds_rust_core::Result<String> {
        self.with_current(|page| page.html.clone())
    }

    async fn drain_payloads(&self) -> odds_rust_core::Result<Vec<RawPayload>> {
        self.with_current(|page| page.payloads.iter().map(CapturedPayload::to_raw).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odds_rust_core::engine::PayloadKind;

    const CAPTURE: &str = r#"{
        "pages": [{
            "url": "https://www.bet365.com/#/AS/B1",
            "elements": {".cpm-ParticipantOdds": ["Arsenal v Chelsea"]},
            "html": "<html></html>",
            "payloads": [
                {"source_url": "wss://premws.example/zap", "kind": "frame", "body": "I|CL;ID=1"},
                {"source_url": "https://www.bet365.com/api", "body": "{}"}
            ]
        }]
    }"#;

    #[tokio::test]
    async fn test_replays_loaded_page() {
        let replay = CaptureReplay::from_json(CAPTURE).unwrap();
        assert_eq!(replay.page_count(), 1);
        assert!(replay.get_page_elements(".x").await.is_err());

        replay.navigate("https://www.bet365.com/#/AS/B1").await.unwrap();
        let elements = replay.get_page_elements(".cpm-ParticipantOdds").await.unwrap();
        assert_eq!(elements[0].label(), Some("Arsenal v Chelsea"));
        assert!(replay.get_page_elements(".gl-MarketGroup").await.unwrap().is_empty());

        let payloads = replay.drain_payloads().await.unwrap();
        assert_eq!(payloads[0].kind, PayloadKind::WebSocketFrame);
        assert_eq!(payloads[1].kind, PayloadKind::ResponseBody);
    }

    #[tokio::test]
    async fn test_unknown_page_is_unavailable() {
        let replay = CaptureReplay::from_json(CAPTURE).unwrap();
        let err = replay.navigate("https://www.bet365.com/#/AS/B2").await.unwrap_err();
        assert!(matches!(err, ScrapeError::PageUnavailable(_)));
    }
}
