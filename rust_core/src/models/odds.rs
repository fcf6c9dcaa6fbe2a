//! Sparse odds records and odds-format conversions.
//!
//! Odds are a key → value map (`moneyline_home`, `spread_away_odds`,
//! `total_over`, `<market>:<participant>` ...). Values arrive as raw strings
//! from labels, numbers from the delta tree and JSON feeds, and occasionally
//! flags from the AI fallback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered so serialized catalogs are stable between writes.
pub type OddsMap = BTreeMap<String, OddsValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OddsValue {
    Null,
    Flag(bool),
    Number(f64),
    Text(String),
}

impl OddsValue {
    pub fn text(s: impl Into<String>) -> Self {
        OddsValue::Text(s.into())
    }

    /// Null and whitespace-only strings never overwrite stored odds.
    pub fn is_blank(&self) -> bool {
        match self {
            OddsValue::Null => true,
            OddsValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OddsValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OddsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddsValue::Null => f.write_str("null"),
            OddsValue::Flag(b) => write!(f, "{}", b),
            OddsValue::Number(n) => write!(f, "{}", n),
            OddsValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OddsValue {
    fn from(s: &str) -> Self {
        OddsValue::Text(s.to_string())
    }
}

impl From<String> for OddsValue {
    fn from(s: String) -> Self {
        OddsValue::Text(s)
    }
}

impl From<f64> for OddsValue {
    fn from(n: f64) -> Self {
        OddsValue::Number(n)
    }
}

/// Merge `incoming` into `existing` without ever removing a key.
///
/// Blank incoming values are skipped, so stale-but-present beats absent.
/// Returns true if any stored value was added or changed.
pub fn merge_odds(existing: &mut OddsMap, incoming: &OddsMap) -> bool {
    let mut changed = false;
    for (key, value) in incoming {
        if value.is_blank() {
            continue;
        }
        if existing.get(key) != Some(value) {
            existing.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Drop blank values from a freshly parsed map.
pub fn without_blanks(odds: &OddsMap) -> OddsMap {
    odds.iter()
        .filter(|(_, v)| !v.is_blank())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

// ============================================================================
// Format conversions
// ============================================================================

/// Parse a participant price as decimal odds.
///
/// Accepts fractional ("5/2" → 3.5) or decimal ("1.91") notation.
pub fn parse_decimal_price(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let value = match raw.split_once('/') {
        Some((n, d)) => {
            let n: f64 = n.trim().parse().ok()?;
            let d: f64 = d.trim().parse().ok()?;
            if d == 0.0 {
                return None;
            }
            n / d + 1.0
        }
        None => raw.parse().ok()?,
    };
    value.is_finite().then_some(value)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
