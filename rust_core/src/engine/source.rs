//! Collaborator interfaces for the rendering/capture side.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// One rendered element returned by a selector query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementHandle {
    pub aria_label: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl ElementHandle {
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            aria_label: Some(label.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// The accessibility label, falling back to a raw `aria-label` attribute.
    pub fn label(&self) -> Option<&str> {
        self.aria_label
            .as_deref()
            .or_else(|| self.attributes.get("aria-label").map(String::as_str))
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    ResponseBody,
    WebSocketFrame,
}

/// A raw text payload captured from the network, tagged with where it came
/// from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub source_url: String,
    pub kind: PayloadKind,
    pub body: String,
}

impl RawPayload {
    pub fn response(source_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            kind: PayloadKind::ResponseBody,
            body: body.into(),
        }
    }

    pub fn frame(source_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            kind: PayloadKind::WebSocketFrame,
            body: body.into(),
        }
    }
}

/// The browser session as seen by the engine.
///
/// Implementations own any mutable session state; every method takes `&self`
/// so calls can be wrapped in timeouts and retries.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn get_page_elements(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    async fn page_html(&self) -> Result<String>;

    /// Response bodies and frames captured since the previous call.
    async fn drain_payloads(&self) -> Result<Vec<RawPayload>>;
}
