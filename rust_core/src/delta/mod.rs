//! Parser for the pipe-delimited push protocol.
//!
//! A payload is a `|`-joined list of records, each a `;`-joined list of
//! `KEY=VALUE` attributes led by a type tag. Full snapshots rebuild a
//! four-level tree (league → fixture → market → participant); incremental
//! payloads patch existing nodes located by type and id.

mod extract;

pub use extract::split_fixture_name;

use crate::models::StructuredFixture;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Attributes not modelled as struct fields.
pub type ExtraAttrs = BTreeMap<String, String>;

// ============================================================================
// Record types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    League,
    Fixture,
    Market,
    Participant,
}

impl RecordKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "CL" => Some(RecordKind::League),
            "FI" => Some(RecordKind::Fixture),
            "MA" => Some(RecordKind::Market),
            "PA" => Some(RecordKind::Participant),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            RecordKind::League => "CL",
            RecordKind::Fixture => "FI",
            RecordKind::Market => "MA",
            RecordKind::Participant => "PA",
        }
    }
}

/// Split `KEY=VALUE` tokens. Tokens without `=` are skipped individually.
fn parse_attrs<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
    tokens
        .filter_map(|token| token.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn find_attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

/// Split an update token such as `FI482913` into its type letters and id.
fn split_typed_id(token: &str) -> Option<(&str, &str)> {
    let letters = token.chars().take_while(|c| c.is_ascii_uppercase()).count();
    if letters == 0 {
        return None;
    }
    let (tag, rest) = token.split_at(letters);
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    Some((tag, &rest[..digits]))
}

// ============================================================================
// Tree nodes
// ============================================================================

trait Node {
    fn set_attr(&mut self, key: String, value: String);

    /// Dict-style merge: later values overwrite earlier ones.
    fn merge_attrs(&mut self, attrs: Vec<(String, String)>) {
        for (key, value) in attrs {
            self.set_attr(key, value);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantNode {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Price as sent: fractional (`5/2`) or decimal.
    pub odds: Option<String>,
    pub extra: ExtraAttrs,
}

impl Node for ParticipantNode {
    fn set_attr(&mut self, key: String, value: String) {
        match key.as_str() {
            "ID" => self.id = Some(value),
            "NA" => self.name = Some(value),
            "OD" => self.odds = Some(value),
            _ => {
                self.extra.insert(key, value);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketNode {
    pub name: Option<String>,
    pub extra: ExtraAttrs,
    pub participants: Vec<ParticipantNode>,
}

impl Node for MarketNode {
    fn set_attr(&mut self, key: String, value: String) {
        match key.as_str() {
            "NA" => self.name = Some(value),
            "ID" => {}
            _ => {
                self.extra.insert(key, value);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureNode {
    pub name: Option<String>,
    /// Start as epoch seconds.
    pub start_ts: Option<String>,
    pub start_text: Option<String>,
    pub start_marker: Option<String>,
    pub extra: ExtraAttrs,
    pub markets: Keyed<MarketNode>,
}

impl Node for FixtureNode {
    fn set_attr(&mut self, key: String, value: String) {
        match key.as_str() {
            "NA" => self.name = Some(value),
            "TS" => self.start_ts = Some(value),
            "TT" => self.start_text = Some(value),
            "SM" => self.start_marker = Some(value),
            "ID" | "FI" => {}
            _ => {
                self.extra.insert(key, value);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueNode {
    pub name: Option<String>,
    pub extra: ExtraAttrs,
    pub fixtures: Keyed<FixtureNode>,
}

impl Node for LeagueNode {
    fn set_attr(&mut self, key: String, value: String) {
        match key.as_str() {
            "NA" => self.name = Some(value),
            "ID" => {}
            _ => {
                self.extra.insert(key, value);
            }
        }
    }
}

fn node_from<N: Node + Default>(attrs: Vec<(String, String)>) -> N {
    let mut node = N::default();
    node.merge_attrs(attrs);
    node
}

// ============================================================================
// Insertion-ordered keyed storage
// ============================================================================

/// Nodes keyed by protocol id, iterated in first-insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T> {
    items: Vec<(String, T)>,
    index: FxHashMap<String, usize>,
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T> Keyed<T> {
    /// Insert or replace; a replaced node keeps its original position.
    pub fn insert(&mut self, id: impl Into<String>, node: T) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&i) => self.items[i].1 = node,
            None => {
                self.index.insert(id.clone(), self.items.len());
                self.items.push((id, node));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i].1)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.items[i].1),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.items.first_mut().map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items.iter().map(|(id, node)| (id.as_str(), node))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().map(|(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Tree
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaTree {
    pub leagues: Keyed<LeagueNode>,
}

/// Result of applying one incremental record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Target found and patched in place.
    Patched,
    /// Fixture id unknown; attached to the first league as a best guess.
    GuessedParent,
    /// Target id not found anywhere; nothing changed.
    NotFound,
}

impl DeltaTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.leagues = Keyed::default();
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }

    pub fn fixture_count(&self) -> usize {
        self.leagues.iter().map(|(_, l)| l.fixtures.len()).sum()
    }

    /// Patch the node of `kind` whose id is `id`.
    ///
    /// Search order is league, then each league's fixtures, then each
    /// fixture's markets, then each market's participants by their `ID`.
    pub fn apply_update(
        &mut self,
        kind: RecordKind,
        id: &str,
        attrs: Vec<(String, String)>,
    ) -> UpdateOutcome {
        match kind {
            RecordKind::League => match self.leagues.get_mut(id) {
                Some(league) => {
                    league.merge_attrs(attrs);
                    UpdateOutcome::Patched
                }
                None => UpdateOutcome::NotFound,
            },
            RecordKind::Fixture => {
                for league in self.leagues.values_mut() {
                    if let Some(fixture) = league.fixtures.get_mut(id) {
                        fixture.merge_attrs(attrs);
                        return UpdateOutcome::Patched;
                    }
                }
                match self.leagues.first_mut() {
                    Some(league) => {
                        league.fixtures.insert(id, node_from::<FixtureNode>(attrs));
                        UpdateOutcome::GuessedParent
                    }
                    None => UpdateOutcome::NotFound,
                }
            }
            RecordKind::Market => {
                for league in self.leagues.values_mut() {
                    for fixture in league.fixtures.values_mut() {
                        if let Some(market) = fixture.markets.get_mut(id) {
                            market.merge_attrs(attrs);
                            return UpdateOutcome::Patched;
                        }
                    }
                }
                UpdateOutcome::NotFound
            }
            RecordKind::Participant => {
                for league in self.leagues.values_mut() {
                    for fixture in league.fixtures.values_mut() {
                        for market in fixture.markets.values_mut() {
                            if let Some(p) = market
                                .participants
                                .iter_mut()
                                .find(|p| p.id.as_deref() == Some(id))
                            {
                                p.merge_attrs(attrs);
                                return UpdateOutcome::Patched;
                            }
                        }
                    }
                }
                UpdateOutcome::NotFound
            }
        }
    }
}

// ============================================================================
// Parse context
// ============================================================================

/// Counters for one parsed payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub records: usize,
    pub applied: usize,
    pub guessed: usize,
    pub dropped: usize,
}

/// Strip a leading op code. Returns the remaining body and whether it is an
/// incremental update (`C|` create or `U|` update; `I|` is a snapshot).
pub fn route_payload(raw: &str) -> (&str, bool) {
    if let Some(rest) = raw.strip_prefix("C|").or_else(|| raw.strip_prefix("U|")) {
        (rest, true)
    } else if let Some(rest) = raw.strip_prefix("I|") {
        (rest, false)
    } else {
        (raw, false)
    }
}

/// True if the body looks like the pipe protocol at all.
pub fn looks_like_delta(raw: &str) -> bool {
    raw.contains('|') || raw.contains(';')
}

/// Owns the delta tree for one feed.
#[derive(Debug, Default)]
pub struct ParseContext {
    tree: DeltaTree,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &DeltaTree {
        &self.tree
    }

    /// Route by op code, then parse.
    pub fn ingest(&mut self, raw: &str) -> ParseSummary {
        let (body, is_update) = route_payload(raw);
        self.parse(body, is_update)
    }

    /// Parse a payload body. A snapshot replaces the whole tree.
    pub fn parse(&mut self, raw: &str, is_update: bool) -> ParseSummary {
        if is_update {
            self.parse_update(raw)
        } else {
            self.parse_snapshot(raw)
        }
    }

    fn parse_snapshot(&mut self, raw: &str) -> ParseSummary {
        self.tree.clear();
        let mut summary = ParseSummary::default();

        let mut league: Option<String> = None;
        let mut fixture: Option<String> = None;
        let mut market: Option<String> = None;

        for record in raw.split('|').filter(|r| !r.is_empty()) {
            summary.records += 1;
            let mut tokens = record.split(';');
            let kind = tokens.next().and_then(RecordKind::from_tag);
            let attrs = parse_attrs(tokens);

            let placed = match kind {
                Some(RecordKind::League) => {
                    fixture = None;
                    market = None;
                    // Without an ID the previous league stays current.
                    match find_attr(&attrs, "ID").map(str::to_string) {
                        Some(id) => {
                            self.tree.leagues.insert(id.clone(), node_from(attrs));
                            league = Some(id);
                            true
                        }
                        None => false,
                    }
                }
                Some(RecordKind::Fixture) => {
                    market = None;
                    let id = find_attr(&attrs, "FI")
                        .or_else(|| find_attr(&attrs, "ID"))
                        .map(str::to_string);
                    fixture = None;
                    match (id, league.as_deref().and_then(|l| self.tree.leagues.get_mut(l))) {
                        (Some(id), Some(parent)) => {
                            parent.fixtures.insert(id.clone(), node_from(attrs));
                            fixture = Some(id);
                            true
                        }
                        _ => false,
                    }
                }
                Some(RecordKind::Market) => {
                    let id = find_attr(&attrs, "ID").map(str::to_string);
                    let parent = self.current_fixture(league.as_deref(), fixture.as_deref());
                    match (id, parent) {
                        (Some(id), Some(parent)) => {
                            parent.markets.insert(id.clone(), node_from(attrs));
                            market = Some(id);
                            true
                        }
                        _ => false,
                    }
                }
                Some(RecordKind::Participant) => {
                    let parent = self
                        .current_fixture(league.as_deref(), fixture.as_deref())
                        .and_then(|f| market.as_deref().and_then(|m| f.markets.get_mut(m)));
                    match parent {
                        Some(parent) => {
                            parent.participants.push(node_from(attrs));
                            true
                        }
                        None => false,
                    }
                }
                None => false,
            };

            if placed {
                summary.applied += 1;
            } else {
                summary.dropped += 1;
                trace!("Dropped snapshot record: {}", record);
            }
        }

        debug!(
            "Delta snapshot: {} leagues, {} fixtures ({} records, {} dropped)",
            self.tree.leagues.len(),
            self.tree.fixture_count(),
            summary.records,
            summary.dropped
        );
        summary
    }

    fn current_fixture(
        &mut self,
        league: Option<&str>,
        fixture: Option<&str>,
    ) -> Option<&mut FixtureNode> {
        let league = self.tree.leagues.get_mut(league?)?;
        league.fixtures.get_mut(fixture?)
    }

    fn parse_update(&mut self, raw: &str) -> ParseSummary {
        let mut summary = ParseSummary::default();

        for record in raw.split('|').filter(|r| !r.is_empty()) {
            summary.records += 1;
            let mut tokens = record.split(';');
            let target = tokens
                .next()
                .and_then(split_typed_id)
                .and_then(|(tag, id)| RecordKind::from_tag(tag).map(|kind| (kind, id)));

            let Some((kind, id)) = target else {
                summary.dropped += 1;
                continue;
            };

            match self.tree.apply_update(kind, id, parse_attrs(tokens)) {
                UpdateOutcome::Patched => summary.applied += 1,
                UpdateOutcome::GuessedParent => {
                    summary.guessed += 1;
                    debug!("Fixture {} attached to first league without a known parent", id);
                }
                UpdateOutcome::NotFound => {
                    summary.dropped += 1;
                    trace!("Update target {}{} not in tree", kind.tag(), id);
                }
            }
        }
        summary
    }

    /// Fixture candidates for every fixture currently in the tree.
    pub fn fixtures(&self) -> Vec<StructuredFixture> {
        extract::fixtures_from_tree(&self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = "CL;ID=1;NA=NFL|\
        FI;FI=101;NA=DET Lions v BAL Ravens;TS=1700000000|\
        MA;ID=11;NA=Money Line|\
        PA;ID=1001;NA=DET Lions;OD=10/11|\
        PA;ID=1002;NA=BAL Ravens;OD=1.95|\
        CL;ID=2;NA=NBA|\
        FI;ID=201;NA=PHX Suns v CLE Cavaliers|\
        MA;ID=21;NA=Winner|\
        PA;ID=2001;NA=PHX Suns;OD=2/1";

    #[test]
    fn test_snapshot_builds_four_levels() {
        let mut ctx = ParseContext::new();
        let summary = ctx.parse(SNAPSHOT, false);

        assert_eq!(summary.records, 9);
        assert_eq!(summary.dropped, 0);
        let tree = ctx.tree();
        assert_eq!(tree.leagues.len(), 2);
        assert_eq!(tree.fixture_count(), 2);

        let nfl = tree.leagues.get("1").unwrap();
        assert_eq!(nfl.name.as_deref(), Some("NFL"));
        let fixture = nfl.fixtures.get("101").unwrap();
        assert_eq!(fixture.start_ts.as_deref(), Some("1700000000"));
        let market = fixture.markets.get("11").unwrap();
        assert_eq!(market.participants.len(), 2);
        assert_eq!(market.participants[0].odds.as_deref(), Some("10/11"));
    }

    #[test]
    fn test_snapshot_replaces_tree() {
        let mut ctx = ParseContext::new();
        ctx.parse(SNAPSHOT, false);
        ctx.parse("CL;ID=9;NA=NHL", false);
        assert_eq!(ctx.tree().leagues.len(), 1);
        assert_eq!(ctx.tree().fixture_count(), 0);
    }

    #[test]
    fn test_orphan_records_are_dropped() {
        let mut ctx = ParseContext::new();
        let summary = ctx.parse("MA;ID=5;NA=Winner|PA;NA=Home;OD=2.0|FI;FI=7;NA=A v B", false);
        assert_eq!(summary.dropped, 3);
        assert!(ctx.tree().is_empty());
    }

    #[test]
    fn test_league_without_id_keeps_previous_league() {
        let mut ctx = ParseContext::new();
        let summary = ctx.parse("CL;ID=1;NA=NFL|FI;FI=1;NA=A v B|CL;NA=X|FI;FI=2;NA=C v D", false);
        assert_eq!(summary.records, 4);
        assert_eq!(summary.applied, 3);
        assert_eq!(summary.dropped, 1);

        let nfl = ctx.tree().leagues.get("1").unwrap();
        assert_eq!(nfl.fixtures.len(), 2);
        assert!(nfl.fixtures.contains("2"));
        assert_eq!(ctx.tree().leagues.len(), 1);
    }

    #[test]
    fn test_league_without_id_resets_market_cursor() {
        let mut ctx = ParseContext::new();
        let summary = ctx.parse("CL;ID=1;NA=NFL|FI;FI=1;NA=A v B|CL;NA=X|MA;ID=5;NA=Winner", false);
        assert_eq!(summary.dropped, 2);
        let fixture = ctx.tree().leagues.get("1").unwrap().fixtures.get("1").unwrap();
        assert!(fixture.markets.is_empty());
    }

    #[test]
    fn test_malformed_attribute_skipped_not_record() {
        let mut ctx = ParseContext::new();
        ctx.parse("CL;ID=1;garbage;NA=NFL|FI;FI=5;=;NA=A v B;broken", false);
        let league = ctx.tree().leagues.get("1").unwrap();
        assert_eq!(league.name.as_deref(), Some("NFL"));
        let fixture = league.fixtures.get("5").unwrap();
        assert_eq!(fixture.name.as_deref(), Some("A v B"));
    }

    #[test]
    fn test_unknown_attributes_land_in_extra() {
        let mut ctx = ParseContext::new();
        ctx.parse("CL;ID=1;NA=NFL;SY=cl;OR=0", false);
        let league = ctx.tree().leagues.get("1").unwrap();
        assert_eq!(league.extra.get("SY").map(String::as_str), Some("cl"));
        assert_eq!(league.extra.len(), 2);
    }

    #[test]
    fn test_update_patches_participant_odds() {
        let mut ctx = ParseContext::new();
        ctx.parse(SNAPSHOT, false);
        let summary = ctx.ingest("U|PA1002;OD=2/1|MA21;NA=Match Winner");
        assert_eq!(summary.applied, 2);

        let market = |league: &str, fixture: &str, id: &str| {
            ctx.tree().leagues.get(league).unwrap().fixtures.get(fixture).unwrap().markets
                .get(id)
                .unwrap()
                .clone()
        };
        let p = &market("1", "101", "11").participants[1];
        assert_eq!(p.odds.as_deref(), Some("2/1"));
        assert_eq!(p.name.as_deref(), Some("BAL Ravens"));
        assert_eq!(market("2", "201", "21").name.as_deref(), Some("Match Winner"));
    }

    #[test]
    fn test_update_without_match_is_noop() {
        let mut ctx = ParseContext::new();
        ctx.parse(SNAPSHOT, false);
        let before = ctx.tree().clone();

        let summary = ctx.parse("PA9999;OD=5/1|MA8888;NA=X|CL7777;NA=Y", true);
        assert_eq!(summary.dropped, 3);
        assert_eq!(ctx.tree(), &before);
    }

    #[test]
    fn test_orphan_fixture_update_guesses_first_league() {
        let mut ctx = ParseContext::new();
        ctx.parse(SNAPSHOT, false);

        let outcome = ctx
            .tree
            .apply_update(RecordKind::Fixture, "555", vec![("NA".into(), "X v Y".into())]);
        assert_eq!(outcome, UpdateOutcome::GuessedParent);
        assert!(ctx.tree().leagues.get("1").unwrap().fixtures.contains("555"));
    }

    #[test]
    fn test_orphan_fixture_update_on_empty_tree_is_noop() {
        let mut ctx = ParseContext::new();
        let summary = ctx.ingest("C|FI555;NA=X v Y");
        assert_eq!(summary.guessed, 0);
        assert_eq!(summary.dropped, 1);
        assert!(ctx.tree().is_empty());
    }

    #[test]
    fn test_route_payload() {
        assert_eq!(route_payload("U|PA1;OD=1/2"), ("PA1;OD=1/2", true));
        assert_eq!(route_payload("C|FI1;NA=x"), ("FI1;NA=x", true));
        assert_eq!(route_payload("I|CL;ID=1"), ("CL;ID=1", false));
        assert_eq!(route_payload("CL;ID=1"), ("CL;ID=1", false));
    }

    #[test]
    fn test_split_typed_id() {
        assert_eq!(split_typed_id("FI482913"), Some(("FI", "482913")));
        assert_eq!(split_typed_id("PA12ab"), Some(("PA", "12")));
        assert_eq!(split_typed_id("FI"), None);
        assert_eq!(split_typed_id("482913"), None);
    }

    #[test]
    fn test_keyed_keeps_insertion_order_on_replace() {
        let mut keyed = Keyed::default();
        keyed.insert("b", 1);
        keyed.insert("a", 2);
        keyed.insert("b", 3);
        let order: Vec<_> = keyed.iter().map(|(id, v)| (id.to_string(), *v)).collect();
        assert_eq!(order, vec![("b".to_string(), 3), ("a".to_string(), 2)]);
    }
}
