//! Odds and team extraction from accessibility labels.
//!
//! Labels are free text such as
//! `"Arizona Cardinals v Seattle Seahawks Spread Seattle Seahawks +7.5 @ -115"`.
//! Matchers run in a fixed priority order and the first hit wins:
//! spread, total, moneyline, generic `@`, bare `v`.

mod names;
mod time;

pub use names::clean_team_name;
pub use time::extract_match_time;

use crate::models::{OddsMap, OddsValue};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPattern {
    Spread,
    Total,
    Moneyline,
    AtSeparated,
    BareVersus,
}

/// Teams plus a partial odds record read from one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelOdds {
    pub pattern: LabelPattern,
    pub home_team: String,
    pub away_team: String,
    /// Raw American odds strings, passed through unconverted.
    pub odds: OddsMap,
}

impl LabelOdds {
    fn new(pattern: LabelPattern, home: &str, away: &str) -> Self {
        Self {
            pattern,
            home_team: home.trim().to_string(),
            away_team: away.trim().to_string(),
            odds: OddsMap::new(),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        self.odds.insert(key.to_string(), OddsValue::text(value));
    }
}

type Matcher = fn(&str) -> Option<LabelOdds>;

/// Matchers in priority order.
static MATCHERS: &[Matcher] = &[
    match_spread,
    match_total,
    match_moneyline,
    match_at_separated,
    match_bare_versus,
];

/// Only labels carrying a side separator are worth parsing.
pub fn is_candidate_label(label: &str) -> bool {
    label.contains('@') || label.contains(" v ")
}

/// Parse one label. `None` when no pattern recognises it.
pub fn parse_label(label: &str) -> Option<LabelOdds> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    MATCHERS.iter().find_map(|matcher| matcher(label))
}

// ============================================================================
// Regexes
// ============================================================================

fn spread_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(.+?)\s+v\s+(.+?)\s+Spread\s+(.+?)\s+([+-]?\d+\.?\d*)\s+@\s+([+-]?\d+)")
            .expect("valid spread regex")
    })
}

fn total_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(.+?)\s+@\s+(.+?)\s+Total.*?\s+(Over|Under)\s+([+-]?\d+\.?\d*)\s+@\s+([+-]?\d+)")
            .expect("valid total regex")
    })
}

fn moneyline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(.+?)\s+v\s+(.+?)\s+Money(?:line)?\s+(.+?)\s+@\s+([+-]?\d+)")
            .expect("valid moneyline regex")
    })
}

fn odds_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[+-]?\d+").expect("valid odds regex"))
}

fn at_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+@\s+").expect("valid separator regex"))
}

fn trailing_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+[+-]?\d+(?:\.\d+)?$").expect("valid trailing number regex"))
}

// ============================================================================
// Helpers
// ============================================================================

/// Bidirectional, case-insensitive containment.
fn names_overlap(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    a.contains(&b) || b.contains(&a)
}

/// Negate a handicap, keeping an explicit sign (`"+7.5"` → `"-7.5"`).
fn opposite_handicap(handicap: &str) -> Option<String> {
    let value: f64 = handicap.parse().ok()?;
    // + 0.0 folds -0.0 into 0.0
    Some(format!("{:+}", -value + 0.0))
}

/// A token that is a bare number or odds value (`+200`, `-1.5`, `12`).
fn is_numeric_token(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}

const MARKET_WORDS: &[&str] = &[
    "spread", "total", "over", "under", "money", "moneyline", "handicap", "odds", "today",
    "tomorrow",
];

/// Token ends a side name: an odds/number, a clock time, a market word or
/// the `@` price separator.
fn ends_side(token: &str) -> bool {
    if token.contains('@') {
        return true;
    }
    let starts_numeric = token
        .trim_start_matches(['+', '-'])
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit());
    starts_numeric || MARKET_WORDS.contains(&token.to_lowercase().as_str())
}

/// Leading tokens of `text` up to the first token that ends a side name.
fn leading_side(text: &str) -> String {
    text.split_whitespace()
        .take_while(|t| !ends_side(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_trailing_number(name: &str) -> String {
    trailing_number_re().replace(name.trim(), "").into_owned()
}

// ============================================================================
// Matchers
// ============================================================================

/// `<home> v <away> Spread <team> <handicap> @ <odds>`. The away side is
/// checked first; the other side gets the negated handicap without odds.
fn match_spread(label: &str) -> Option<LabelOdds> {
    let caps = spread_re().captures(label)?;
    let mut out = LabelOdds::new(LabelPattern::Spread, &caps[1], &caps[2]);
    let bet_team = caps[3].trim();
    let handicap = &caps[4];
    let odds = &caps[5];

    if names_overlap(bet_team, &out.away_team) {
        out.set("spread_away", handicap);
        out.set("spread_away_odds", odds);
        if let Some(opposite) = opposite_handicap(handicap) {
            out.set("spread_home", &opposite);
        }
    } else if names_overlap(bet_team, &out.home_team) {
        out.set("spread_home", handicap);
        out.set("spread_home_odds", odds);
        if let Some(opposite) = opposite_handicap(handicap) {
            out.set("spread_away", &opposite);
        }
    }
    Some(out)
}

/// `<home> @ <away> Total ... (Over|Under) <value> @ <odds>`
fn match_total(label: &str) -> Option<LabelOdds> {
    let caps = total_re().captures(label)?;
    let mut out = LabelOdds::new(LabelPattern::Total, &caps[1], &caps[2]);
    let (line_key, odds_key) = if &caps[3] == "Over" {
        ("total_over", "total_over_odds")
    } else {
        ("total_under", "total_under_odds")
    };
    out.set(line_key, &caps[4]);
    out.set(odds_key, &caps[5]);
    Some(out)
}

/// `<home> v <away> Money(line) <team> @ <odds>`. The home side is checked
/// first.
fn match_moneyline(label: &str) -> Option<LabelOdds> {
    let caps = moneyline_re().captures(label)?;
    let mut out = LabelOdds::new(LabelPattern::Moneyline, &caps[1], &caps[2]);
    let bet_team = caps[3].trim();
    let odds = &caps[4];

    if names_overlap(bet_team, &out.home_team) {
        out.set("moneyline_home", odds);
    } else if names_overlap(bet_team, &out.away_team) {
        out.set("moneyline_away", odds);
    }
    Some(out)
}

/// `<home> @ <away> ...` with the first number in the label as odds, typed by
/// keyword. Claims every label with a spaced `@`; sides that are not team
/// names (e.g. a price right after the `@`) are left for the name cleaner to
/// reject.
fn match_at_separated(label: &str) -> Option<LabelOdds> {
    let sep = at_separator_re().find(label)?;
    let home = strip_trailing_number(&label[..sep.start()]);
    let away = leading_side(&label[sep.end()..]);

    let mut out = LabelOdds::new(LabelPattern::AtSeparated, &home, &away);
    if let Some(first) = odds_number_re().find(label) {
        let lower = label.to_lowercase();
        let key = if lower.contains("spread") {
            "spread_home_odds"
        } else if lower.contains("total") || lower.contains("over") {
            "total_over_odds"
        } else {
            "home_odds"
        };
        out.set(key, first.as_str());
    }
    Some(out)
}

/// `<home> v <away>` with no odds. Rejected when the away side is itself an
/// odds value.
fn match_bare_versus(label: &str) -> Option<LabelOdds> {
    let (home, rest) = label.split_once(" v ")?;
    let first_away = rest.split_whitespace().next()?;
    if is_numeric_token(first_away) {
        return None;
    }
    let home = strip_trailing_number(home);
    let away = leading_side(rest);
    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some(LabelOdds::new(LabelPattern::BareVersus, &home, &away))
}
