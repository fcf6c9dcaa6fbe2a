//! Fixture candidates from the delta tree.

use super::{DeltaTree, FixtureNode};
use crate::models::odds::{parse_decimal_price, round2};
use crate::models::{OddsMap, OddsValue, StructuredFixture};
use chrono::DateTime;
use tracing::{debug, warn};

/// Split an event name on `" v "`, falling back to the first `-`.
pub fn split_fixture_name(name: &str) -> Option<(String, String)> {
    let (home, away) = name.split_once(" v ").or_else(|| name.split_once('-'))?;
    let (home, away) = (home.trim(), away.trim());
    if !usable_side(home) || !usable_side(away) {
        return None;
    }
    Some((home.to_string(), away.to_string()))
}

fn usable_side(side: &str) -> bool {
    !side.is_empty() && !side.chars().all(|c| c.is_ascii_digit())
}

fn snake(s: &str) -> String {
    s.to_lowercase().replace(' ', "_")
}

fn start_time(fixture: &FixtureNode) -> Option<String> {
    if let Some(ts) = fixture.start_ts.as_deref() {
        if !ts.is_empty() && ts.chars().all(|c| c.is_ascii_digit()) {
            if let Some(dt) = ts.parse().ok().and_then(|secs| DateTime::from_timestamp(secs, 0)) {
                return Some(dt.to_rfc3339());
            }
        }
    }
    fixture
        .start_text
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| fixture.start_marker.clone().filter(|s| !s.is_empty()))
}

fn fixture_odds(fixture: &FixtureNode) -> OddsMap {
    let mut odds = OddsMap::new();
    for (_, market) in fixture.markets.iter() {
        let market_name = snake(market.name.as_deref().unwrap_or(""));
        for participant in &market.participants {
            let Some(raw) = participant.odds.as_deref().filter(|o| !o.is_empty()) else {
                continue;
            };
            let participant_name = snake(participant.name.as_deref().unwrap_or(""));
            match parse_decimal_price(raw) {
                Some(price) => {
                    odds.insert(
                        format!("{}:{}", market_name, participant_name),
                        OddsValue::Number(round2(price)),
                    );
                }
                None => warn!(
                    "Invalid odds format for market {}, participant {}: {}",
                    market_name, participant_name, raw
                ),
            }
        }
    }
    odds
}

pub(super) fn fixtures_from_tree(tree: &DeltaTree) -> Vec<StructuredFixture> {
    let mut out = Vec::new();
    for (_, league) in tree.leagues.iter() {
        let league_name = league
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        for (fixture_id, fixture) in league.fixtures.iter() {
            let name = fixture.name.as_deref().unwrap_or("");
            let Some((home, away)) = split_fixture_name(name) else {
                debug!("Skipping invalid match: {:?}", name);
                continue;
            };
            out.push(StructuredFixture {
                source_id: Some(fixture_id.to_string()),
                league_name: league_name.clone(),
                home,
                away,
                match_time: start_time(fixture),
                odds: fixture_odds(fixture),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::ParseContext;
    use super::*;

    #[test]
    fn test_split_fixture_name() {
        assert_eq!(
            split_fixture_name("Arsenal v Chelsea"),
            Some(("Arsenal".into(), "Chelsea".into()))
        );
        assert_eq!(
            split_fixture_name("Sinner - Medvedev"),
            Some(("Sinner".into(), "Medvedev".into()))
        );
        assert_eq!(split_fixture_name("Arsenal"), None);
        assert_eq!(split_fixture_name("12 v Chelsea"), None);
        assert_eq!(split_fixture_name(" v Chelsea"), None);
    }

    #[test]
    fn test_tree_fixture_extraction() {
        let mut ctx = ParseContext::new();
        ctx.parse(
            "CL;ID=1;NA= NFL |\
             FI;FI=101;NA=DET Lions v BAL Ravens;TS=1700000000|\
             MA;ID=11;NA=Money Line|\
             PA;ID=1;NA=DET Lions;OD=10/11|\
             PA;ID=2;NA=BAL Ravens;OD=1.95|\
             PA;ID=3;NA=Draw;OD=SP|\
             FI;FI=102;NA=Bad Name;TT=20:15",
            false,
        );

        let fixtures = ctx.fixtures();
        assert_eq!(fixtures.len(), 1);
        let f = &fixtures[0];
        assert_eq!(f.league_name.as_deref(), Some("NFL"));
        assert_eq!(f.home, "DET Lions");
        assert_eq!(f.away, "BAL Ravens");
        assert_eq!(f.match_time.as_deref(), Some("2023-11-14T22:13:20+00:00"));
        assert_eq!(f.odds["money_line:det_lions"], OddsValue::Number(1.91));
        assert_eq!(f.odds["money_line:bal_ravens"], OddsValue::Number(1.95));
        assert!(!f.odds.contains_key("money_line:draw"));
    }

    #[test]
    fn test_start_time_falls_back_to_text_fields() {
        let mut ctx = ParseContext::new();
        ctx.parse("CL;ID=1|FI;FI=5;NA=A v B;TS=soon;SM=Sat 15:00", false);
        let fixtures = ctx.fixtures();
        assert_eq!(fixtures[0].match_time.as_deref(), Some("Sat 15:00"));
        assert_eq!(fixtures[0].league_name, None);
    }
}
