//! Sport and league classification.
//!
//! Sport comes from gazetteers, name shape, keywords and the URL sport code.
//! League comes from per-sport rules, seed gazetteers, associations learned
//! earlier in the run, context keywords and sport defaults. A league that
//! implies a different sport overrides the detected sport.

pub mod gazetteer;
pub mod league;
pub mod sport;

pub use sport::{detect_sport, SportSignal, SportSource};

use crate::league_config::{default_league_for_sport, sport_for_league, UNKNOWN_LEAGUE};
use crate::models::Sport;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Final classification for one fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub sport: Sport,
    pub league: String,
    /// Sport as detected before the league cross-check.
    pub detected_sport: Sport,
    pub source: SportSource,
}

impl Classification {
    pub fn sport_overridden(&self) -> bool {
        self.sport != self.detected_sport
    }
}

/// Snapshot of what the classifier has learned so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassifierStats {
    pub discovered_sports: Vec<Sport>,
    pub discovered_leagues: Vec<String>,
    pub team_counts_by_sport: BTreeMap<Sport, usize>,
    pub team_counts_by_league: BTreeMap<String, usize>,
    pub confidence_scores: BTreeMap<Sport, f64>,
}

/// Associations learned during one run. Not persisted.
#[derive(Debug, Default)]
pub struct ClassifierState {
    team_leagues: FxHashMap<String, String>,
    discovered_leagues: FxHashSet<String>,
    discovered_teams: FxHashMap<Sport, FxHashSet<String>>,
    confidence: FxHashMap<Sport, f64>,
}

fn team_key(team: &str) -> Option<String> {
    let key = team.trim().to_lowercase();
    (key.chars().count() > 2).then_some(key)
}

impl ClassifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sport for a fixture. Keyword matches record their confidence.
    pub fn classify_sport(&mut self, text: &str, url: &str, teams: &[&str]) -> SportSignal {
        let signal = detect_sport(text, url, teams);
        if let Some(confidence) = signal.confidence {
            self.confidence.insert(signal.sport, confidence);
        }
        signal
    }

    /// League for a fixture whose sport is already known (or Unknown).
    pub fn classify_league(&self, home: &str, away: &str, sport: Sport, context: &str) -> String {
        if let Some(league) = league::league_by_sport_rule(home, away, sport) {
            return league.to_string();
        }
        if let Some(league) = league::seed_league(home, away) {
            return league.to_string();
        }
        if let Some(league) = self.learned_league(home).or_else(|| self.learned_league(away)) {
            return league.to_string();
        }
        if let Some(league) = league::context_league(context, sport) {
            return league.to_string();
        }
        default_league_for_sport(sport)
            .unwrap_or(UNKNOWN_LEAGUE)
            .to_string()
    }

    /// Sport, then league, then the league→sport cross-check.
    pub fn classify_fixture(
        &mut self,
        home: &str,
        away: &str,
        text: &str,
        url: &str,
    ) -> Classification {
        let signal = self.classify_sport(text, url, &[home, away]);
        let league = self.classify_league(home, away, signal.sport, text);

        let sport = match sport_for_league(&league) {
            Some(implied) if implied != signal.sport => {
                debug!(
                    "League {} overrides sport {} -> {} for {} vs {}",
                    league, signal.sport, implied, home, away
                );
                implied
            }
            _ => signal.sport,
        };

        debug!("{} vs {} -> Sport: {}, League: {}", home, away, sport, league);
        Classification {
            sport,
            league,
            detected_sport: signal.sport,
            source: signal.source,
        }
    }

    /// Remember the sport and league of both sides for the rest of the run.
    pub fn learn(&mut self, sport: Sport, home: &str, away: &str, league: &str) {
        for team in [home, away] {
            let Some(key) = team_key(team) else {
                continue;
            };
            if sport.is_known() {
                self.discovered_teams
                    .entry(sport)
                    .or_default()
                    .insert(key.clone());
            }
            if league != UNKNOWN_LEAGUE {
                self.team_leagues.insert(key, league.to_string());
            }
        }
        if league != UNKNOWN_LEAGUE {
            self.discovered_leagues.insert(league.to_string());
        }
    }

    pub fn learned_league(&self, team: &str) -> Option<&str> {
        let key = team_key(team)?;
        self.team_leagues.get(&key).map(String::as_str)
    }

    pub fn discovered_teams(&self, sport: Sport) -> Vec<String> {
        let mut teams: Vec<String> = self
            .discovered_teams
            .get(&sport)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        teams.sort();
        teams
    }

    pub fn sport_confidence(&self, sport: Sport) -> f64 {
        self.confidence.get(&sport).copied().unwrap_or(0.0)
    }

    pub fn stats(&self) -> ClassifierStats {
        let mut discovered_sports: Vec<Sport> = self.discovered_teams.keys().copied().collect();
        discovered_sports.sort();
        let mut discovered_leagues: Vec<String> =
            self.discovered_leagues.iter().cloned().collect();
        discovered_leagues.sort();

        let mut team_counts_by_league = BTreeMap::new();
        for league in self.team_leagues.values() {
            *team_counts_by_league.entry(league.clone()).or_insert(0) += 1;
        }

        ClassifierStats {
            discovered_sports,
            discovered_leagues,
            team_counts_by_sport: self
                .discovered_teams
                .iter()
                .map(|(sport, teams)| (*sport, teams.len()))
                .collect(),
            team_counts_by_league,
            confidence_scores: self.confidence.iter().map(|(s, c)| (*s, *c)).collect(),
        }
    }
}
