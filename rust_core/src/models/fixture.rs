//! Canonical fixture record.

use super::odds::{without_blanks, OddsMap};
use super::{MatchKind, Sport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_TIME: &str = "unknown";

/// One real-world event between two named sides, with its merged odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    #[serde(default)]
    pub sport: Sport,
    pub match_time: String,
    #[serde(default)]
    pub odds: OddsMap,
    #[serde(rename = "type", default)]
    pub match_kind: MatchKind,
    #[serde(rename = "timestamp")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub source_url: Option<String>,

    // Live-only fields
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Fixture {
    /// Build a fixture with a derived identity and empty odds.
    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        league: impl Into<String>,
        sport: Sport,
        match_time: impl Into<String>,
    ) -> Self {
        let home_team = home_team.into();
        let away_team = away_team.into();
        let league = league.into();
        let mut match_time = match_time.into();
        if match_time.trim().is_empty() {
            match_time = UNKNOWN_TIME.to_string();
        }

        let base = if sport.is_known() { sport.as_str() } else { league.as_str() };
        let match_id = derive_identity(base, &home_team, &away_team, &match_time);

        Self {
            match_id,
            home_team,
            away_team,
            league,
            sport,
            match_time,
            odds: OddsMap::new(),
            match_kind: MatchKind::Prematch,
            last_updated: Utc::now(),
            source_url: None,
            is_live: false,
            current_score: None,
            time_remaining: None,
        }
    }

    pub fn with_source(mut self, source_url: impl Into<String>) -> Self {
        let url = source_url.into();
        self.match_kind = MatchKind::from_source_url(&url);
        self.is_live = self.match_kind == MatchKind::Live;
        self.source_url = Some(url);
        self
    }

    pub fn with_odds(mut self, odds: &OddsMap) -> Self {
        self.odds = without_blanks(odds);
        self
    }

    pub fn mark_live(&mut self, current_score: Option<String>, time_remaining: Option<String>) {
        self.is_live = true;
        self.match_kind = MatchKind::Live;
        if current_score.is_some() {
            self.current_score = current_score;
        }
        if time_remaining.is_some() {
            self.time_remaining = time_remaining;
        }
    }

    /// Order-insensitive key used to merge fragments within one pass.
    pub fn pair_key(&self) -> (String, String) {
        pair_key(&self.home_team, &self.away_team)
    }

    pub fn teams_display(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Both sides non-empty, not numeric and distinct under identity
    /// normalisation.
    pub fn has_valid_sides(&self) -> bool {
        valid_side(&self.home_team)
            && valid_side(&self.away_team)
            && !same_side(&self.home_team, &self.away_team)
    }
}

/// A fixture read from a structured source (delta tree or JSON feed), before
/// classification.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredFixture {
    /// Id assigned by the source, if any.
    pub source_id: Option<String>,
    /// Enclosing league or competition name, used as classification context.
    pub league_name: Option<String>,
    pub home: String,
    pub away: String,
    pub match_time: Option<String>,
    pub odds: OddsMap,
}

fn valid_side(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && !name.chars().all(|c| c.is_ascii_digit() || "+-. ".contains(c))
}

/// True when two side names collapse to the same identity component.
pub fn same_side(a: &str, b: &str) -> bool {
    sanitize(a) == sanitize(b)
}

pub fn pair_key(a: &str, b: &str) -> (String, String) {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn sanitize(part: &str) -> String {
    part.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace('/', "_")
        .to_lowercase()
}

/// Derive the stable fixture identity.
///
/// `base` is the sport name when known, otherwise the league. Home/away order
/// is significant.
pub fn derive_identity(base: &str, home: &str, away: &str, match_time: &str) -> String {
    let time = if match_time.trim().is_empty() {
        UNKNOWN_TIME
    } else {
        match_time
    };
    format!(
        "{}_{}_{}_{}",
        sanitize(base),
        sanitize(home),
        sanitize(away),
        sanitize(time)
    )
}
