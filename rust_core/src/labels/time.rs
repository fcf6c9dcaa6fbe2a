use crate::models::fixture::UNKNOWN_TIME;
use regex::Regex;
use std::sync::OnceLock;

/// Tried in order; the first capture wins and is upper-cased.
fn clock_patterns() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(?i)\b(?:Today|Tomorrow|Yesterday)\s+(\d{1,2}:\d{2})\b",
            r"(?i)\b(\d{1,2}:\d{2}\s?(?:AM|PM|ET|GMT|UTC)?)\b",
            r"\b(\d{4}-\d{2}-\d{2}\s+\d{1,2}:\d{2})\b",
            r"(?i)\b(\d{1,2}(?::\d{2})?\s?(?:AM|PM|ET|GMT|UTC))\b",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Best-effort start time from label text, or `"unknown"`.
pub fn extract_match_time(text: &str) -> String {
    clock_patterns()
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_uppercase())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}
