//! LLM fallback extraction.
//!
//! Used only when structured parsing resolves too few fixtures on a page.
//! Calls are capped per process by [`BudgetedAi`]; once the cap is reached
//! the fallback quietly returns nothing.

mod gemini;

pub use gemini::{GeminiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};

use crate::error::{Result, ScrapeError};
use crate::models::{OddsMap, OddsValue};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const MAX_PROMPT_HTML_CHARS: usize = 8000;

/// Best-effort HTML → sparse odds record.
#[async_trait]
pub trait AiExtractor: Send + Sync {
    async fn ai_extract(&self, html: &str) -> Result<OddsMap>;
}

/// Wraps an optional extractor with a process-lifetime call budget.
pub struct BudgetedAi {
    extractor: Option<Box<dyn AiExtractor>>,
    max_calls: u32,
    calls: u32,
}

impl BudgetedAi {
    pub fn new(extractor: Option<Box<dyn AiExtractor>>, max_calls: u32) -> Self {
        Self {
            extractor,
            max_calls,
            calls: 0,
        }
    }

    /// No extractor configured: every call returns an empty record.
    pub fn disabled() -> Self {
        Self::new(None, 0)
    }

    pub fn is_available(&self) -> bool {
        self.extractor.is_some() && self.calls < self.max_calls
    }

    pub fn calls_made(&self) -> u32 {
        self.calls
    }

    pub fn remaining_calls(&self) -> u32 {
        self.max_calls.saturating_sub(self.calls)
    }

    /// Extract odds from raw HTML. Never fails: an exhausted budget, a
    /// missing extractor or an API error all yield an empty record.
    pub async fn extract(&mut self, html: &str) -> OddsMap {
        if html.trim().is_empty() {
            warn!("Empty HTML provided to AI extractor");
            return OddsMap::new();
        }
        let Some(extractor) = self.extractor.as_ref() else {
            return OddsMap::new();
        };
        if self.calls >= self.max_calls {
            debug!("{}", ScrapeError::AiBudgetExhausted(self.max_calls));
            return OddsMap::new();
        }

        self.calls += 1;
        match extractor.ai_extract(html).await {
            Ok(odds) => {
                info!(
                    "AI call {}/{} returned {} fields",
                    self.calls,
                    self.max_calls,
                    odds.len()
                );
                odds
            }
            Err(e) => {
                warn!("AI extraction failed: {}", e);
                OddsMap::new()
            }
        }
    }
}

/// A fixture recovered by the AI fallback, split into identity fields and
/// remaining odds.
#[derive(Debug, Clone, PartialEq)]
pub struct AiFixture {
    pub home_team: String,
    pub away_team: String,
    pub league: Option<String>,
    pub is_live: bool,
    pub current_score: Option<String>,
    pub time_remaining: Option<String>,
    pub odds: OddsMap,
}

impl AiFixture {
    /// `None` unless both team names are present.
    pub fn from_record(mut record: OddsMap) -> Option<Self> {
        let mut take = |key: &str| {
            record
                .remove(key)
                .map(|v| v.to_string().trim().to_string())
                .filter(|s| !s.is_empty() && s != "null")
        };
        let home_team = take("home_team")?;
        let away_team = take("away_team")?;
        let league = take("league");
        let is_live = take("is_live")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let current_score = take("current_score");
        let time_remaining = take("time_remaining");

        Some(Self {
            home_team,
            away_team,
            league,
            is_live,
            current_score,
            time_remaining,
            odds: record,
        })
    }
}

pub fn build_prompt(html: &str) -> String {
    let html = match html.char_indices().nth(MAX_PROMPT_HTML_CHARS) {
        Some((cut, _)) => format!("{}...", &html[..cut]),
        None => html.to_string(),
    };
    format!(
        r#"Extract betting odds from the following sports fixture HTML. Look for odds in aria-label attributes, span elements, and any text containing numbers like -110, +150, 1.5, etc.

Return ONLY a JSON object with these keys (include only if found):
- home_team, away_team: team names
- league: specific league name (e.g. "Premier League", "NFL", "NBA"), not the sport
- moneyline_home, moneyline_away, moneyline_draw
- spread_home, spread_home_odds, spread_away, spread_away_odds
- asian_handicap_home, asian_handicap_home_odds, asian_handicap_away, asian_handicap_away_odds
- total_over, total_over_odds, total_under, total_under_odds
- btts_yes, btts_no
- double_chance_1x, double_chance_x2, double_chance_12
- draw_no_bet_home, draw_no_bet_away
- is_live: boolean
- current_score: current score if live (format "1-0")
- time_remaining: time remaining if live

If no betting data is found, return an empty object {{}}.

HTML: {}
"#,
        html
    )
}

/// Strip markdown fences and anything outside the outermost braces.
pub fn clean_response(response: &str) -> String {
    let mut text = response.replace("```json", "").replace("```", "");
    if let Some(start) = text.find('{') {
        text.drain(..start);
    }
    if let Some(end) = text.rfind('}') {
        text.truncate(end + 1);
    }
    text.trim().to_string()
}

/// Parse a cleaned response into an odds record. Falls back to regex
/// scraping when the model returned broken JSON.
pub fn parse_response(cleaned: &str) -> OddsMap {
    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(fields)) => fields
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::Null => return None,
                    Value::Bool(b) => OddsValue::Flag(b),
                    Value::String(s) => OddsValue::Text(s.trim().to_string()),
                    other => OddsValue::Text(other.to_string()),
                };
                (!value.is_blank()).then_some((key, value))
            })
            .collect(),
        Ok(_) => {
            warn!("AI response is not a JSON object");
            OddsMap::new()
        }
        Err(e) => {
            warn!("Failed to parse AI response as JSON: {}", e);
            regex_fallback(cleaned)
        }
    }
}

fn team_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""(?:home_team|away_team)":\s*"([^"]+)""#).expect("valid team regex"))
}

fn odds_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)"([^"]*odds?[^"]*|spread[^"]*)":\s*"?([+-]?\d+(?:\.\d+)?)"?"#)
            .expect("valid odds field regex")
    })
}

fn regex_fallback(response: &str) -> OddsMap {
    let mut odds = OddsMap::new();
    let teams: Vec<&str> = team_re()
        .captures_iter(response)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if teams.len() >= 2 {
        odds.insert("home_team".into(), OddsValue::text(teams[0]));
        odds.insert("away_team".into(), OddsValue::text(teams[1]));
    }
    for caps in odds_field_re().captures_iter(response) {
        odds.insert(caps[1].to_string(), OddsValue::text(&caps[2]));
    }
    info!("Extracted {} fields using regex fallback", odds.len());
    odds
}
