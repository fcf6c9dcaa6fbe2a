//! Authoritative in-memory store of resolved fixtures.
//!
//! The catalog is append/merge-only for a run: fixtures are created on first
//! sighting and updated in place afterwards. Odds merges never remove keys.

use crate::models::{merge_odds, Fixture, OddsMap};
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct FixtureCatalog {
    fixtures: FxHashMap<String, Fixture>,
    /// Identities in first-insertion order, for stable output.
    order: Vec<String>,
    dirty: bool,
}

impl FixtureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from previously persisted fixtures. Does not mark the catalog dirty.
    pub fn from_fixtures(fixtures: impl IntoIterator<Item = Fixture>) -> Self {
        let mut catalog = Self::new();
        for fixture in fixtures {
            if !catalog.fixtures.contains_key(&fixture.match_id) {
                catalog.order.push(fixture.match_id.clone());
            }
            catalog.fixtures.insert(fixture.match_id.clone(), fixture);
        }
        catalog
    }

    /// Insert a new fixture or merge odds into the existing one.
    ///
    /// Returns true if stored state changed. A re-observation whose odds are
    /// already present reports false.
    pub fn upsert(&mut self, candidate: Fixture, odds: &OddsMap) -> bool {
        let changed = match self.fixtures.get_mut(&candidate.match_id) {
            Some(existing) => {
                let odds_changed = merge_odds(&mut existing.odds, odds);
                let live_changed = merge_live_fields(existing, &candidate);
                if odds_changed || live_changed {
                    existing.last_updated = candidate.last_updated;
                    if candidate.source_url.is_some() {
                        existing.source_url = candidate.source_url;
                    }
                }
                odds_changed || live_changed
            }
            None => {
                let id = candidate.match_id.clone();
                let mut fixture = candidate;
                merge_odds(&mut fixture.odds, odds);
                debug!("New fixture {} ({})", id, fixture.teams_display());
                self.order.push(id.clone());
                self.fixtures.insert(id, fixture);
                true
            }
        };
        self.dirty |= changed;
        changed
    }

    pub fn get(&self, match_id: &str) -> Option<&Fixture> {
        self.fixtures.get(match_id)
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// True if any upsert changed state since the last `mark_clean`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// All fixtures in first-insertion order.
    pub fn snapshot(&self) -> Vec<Fixture> {
        self.order
            .iter()
            .filter_map(|id| self.fixtures.get(id))
            .cloned()
            .collect()
    }
}

/// Live flags only ever switch on; scores and clocks update when supplied.
fn merge_live_fields(existing: &mut Fixture, candidate: &Fixture) -> bool {
    let before = (
        existing.is_live,
        existing.current_score.clone(),
        existing.time_remaining.clone(),
    );
    if candidate.is_live {
        existing.mark_live(
            candidate.current_score.clone(),
            candidate.time_remaining.clone(),
        );
    }
    before
        != (
            existing.is_live,
            existing.current_score.clone(),
            existing.time_remaining.clone(),
        )
}

// ============================================================================
// In-pass deduplication
// ============================================================================

/// Collects fragments of one extraction pass, merging any that name the same
/// unordered team pair before they reach the catalog.
#[derive(Debug, Default)]
pub struct PassDeduper {
    by_pair: FxHashMap<(String, String), usize>,
    fixtures: Vec<Fixture>,
}

impl PassDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment. Returns true if it started a new fixture, false if it
    /// was merged into an earlier one.
    pub fn add(&mut self, fixture: Fixture, odds: &OddsMap) -> bool {
        let key = fixture.pair_key();
        match self.by_pair.get(&key) {
            Some(&i) => {
                let existing = &mut self.fixtures[i];
                merge_odds(&mut existing.odds, odds);
                merge_live_fields(existing, &fixture);
                false
            }
            None => {
                let mut fixture = fixture;
                merge_odds(&mut fixture.odds, odds);
                self.by_pair.insert(key, self.fixtures.len());
                self.fixtures.push(fixture);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn into_fixtures(self) -> Vec<Fixture> {
        self.fixtures
    }
}
