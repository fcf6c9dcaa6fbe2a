//! JSON fragment parser.
//!
//! Two shapes are understood:
//! - `{"data": [{"name", "events": [{"id", "name", "startTime", "markets": [...]}]}]}`
//! - `{"fixtures": [{"homeTeam": {"name"}, "awayTeam": {"name"}, "competition": {"name"}, "markets": [...]}]}`

use crate::delta::split_fixture_name;
use crate::models::odds::round2;
use crate::models::{OddsMap, OddsValue, StructuredFixture};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    data: Option<Value>,
    fixtures: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeedGroup {
    name: Option<String>,
    events: Option<Vec<FeedEvent>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FeedEvent {
    id: Option<Value>,
    name: String,
    start_time: Option<Value>,
    time: Option<Value>,
    markets: Vec<FeedMarket>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeedMarket {
    name: String,
    outcomes: Vec<FeedOutcome>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeedOutcome {
    name: String,
    odds: Option<Value>,
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    price.is_finite().then_some(price)
}

fn snake(s: &str) -> String {
    s.to_lowercase().replace(' ', "_")
}

fn event_odds(event: &FeedEvent) -> OddsMap {
    let mut odds = OddsMap::new();
    for market in &event.markets {
        let market_name = snake(&market.name);
        for outcome in &market.outcomes {
            let Some(raw) = outcome.odds.as_ref().filter(|v| !v.is_null()) else {
                continue;
            };
            match price(raw) {
                Some(p) => {
                    odds.insert(
                        format!("{}:{}", market_name, snake(&outcome.name)),
                        OddsValue::Number(round2(p)),
                    );
                }
                None => warn!("Invalid odds format in JSON: {}", raw),
            }
        }
    }
    odds
}

/// True when the body is a JSON object (the only shape this parser reads).
pub fn looks_like_json(body: &str) -> bool {
    body.trim_start().starts_with('{')
}

/// Fixture candidates from a JSON body. Anything unexpected yields an empty
/// list.
pub fn parse_feed(body: &str) -> Vec<StructuredFixture> {
    let envelope: FeedEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!("Body is not a JSON feed: {}", e);
            return Vec::new();
        }
    };

    match (envelope.data, envelope.fixtures) {
        (Some(Value::Array(groups)), _) => parse_groups(groups),
        (_, Some(Value::Array(fixtures))) => parse_api_fixtures(fixtures),
        _ => Vec::new(),
    }
}

fn parse_groups(groups: Vec<Value>) -> Vec<StructuredFixture> {
    let mut out = Vec::new();
    for item in groups {
        let Ok(group) = serde_json::from_value::<FeedGroup>(item) else {
            continue;
        };
        let (Some(league_name), Some(events)) = (group.name, group.events) else {
            continue;
        };

        for event in events {
            let Some((home, away)) = split_fixture_name(&event.name) else {
                continue;
            };
            let match_time = event
                .start_time
                .as_ref()
                .and_then(value_text)
                .or_else(|| event.time.as_ref().and_then(value_text));
            out.push(StructuredFixture {
                source_id: event.id.as_ref().and_then(value_text),
                league_name: Some(league_name.clone()),
                home,
                away,
                match_time,
                odds: event_odds(&event),
            });
        }
    }
    out
}

// ============================================================================
// API fixture shape
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApiFixture {
    id: Option<Value>,
    home_team: Named,
    away_team: Named,
    competition: Named,
    start_time: Option<Value>,
    markets: Vec<ApiMarket>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiMarket {
    #[serde(rename = "type")]
    market_type: String,
    selections: Vec<ApiSelection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiSelection {
    price: Option<Value>,
    handicap: Option<Value>,
    index: Option<u64>,
    #[serde(rename = "type")]
    selection_type: String,
}

fn odds_value(value: &Option<Value>) -> OddsValue {
    match value {
        Some(Value::Number(n)) => n.as_f64().map(OddsValue::Number).unwrap_or(OddsValue::Null),
        Some(Value::String(s)) => OddsValue::Text(s.clone()),
        _ => OddsValue::Null,
    }
}

fn has_value(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// Market types are sniffed by keyword; selections are positional for
/// moneylines, indexed for spreads and typed for totals.
fn api_market_odds(markets: &[ApiMarket]) -> OddsMap {
    let mut odds = OddsMap::new();
    for market in markets {
        let market_type = market.market_type.to_lowercase();
        let selections = &market.selections;

        if market_type.contains("moneyline") || market_type.contains("match") {
            if selections.len() >= 2 {
                odds.insert("home_odds".into(), odds_value(&selections[0].price));
                odds.insert("away_odds".into(), odds_value(&selections[1].price));
            }
        } else if market_type.contains("spread") || market_type.contains("handicap") {
            for selection in selections.iter().filter(|s| has_value(&s.handicap)) {
                let side = if selection.index == Some(0) { "home" } else { "away" };
                odds.insert(format!("spread_{}", side), odds_value(&selection.handicap));
                odds.insert(format!("spread_{}_odds", side), odds_value(&selection.price));
            }
        } else if market_type.contains("total") || market_type.contains("over") {
            for selection in selections {
                let kind = selection.selection_type.to_lowercase();
                let side = if kind.contains("over") {
                    "over"
                } else if kind.contains("under") {
                    "under"
                } else {
                    continue;
                };
                odds.insert(format!("total_{}", side), odds_value(&selection.handicap));
                odds.insert(format!("total_{}_odds", side), odds_value(&selection.price));
            }
        }
    }
    odds
}

fn parse_api_fixtures(fixtures: Vec<Value>) -> Vec<StructuredFixture> {
    let mut out = Vec::new();
    for item in fixtures {
        let fixture = match serde_json::from_value::<ApiFixture>(item) {
            Ok(fixture) => fixture,
            Err(e) => {
                warn!("Error processing fixture: {}", e);
                continue;
            }
        };
        let (Some(home), Some(away)) = (
            fixture.home_team.name.filter(|n| !n.trim().is_empty()),
            fixture.away_team.name.filter(|n| !n.trim().is_empty()),
        ) else {
            continue;
        };
        out.push(StructuredFixture {
            source_id: fixture.id.as_ref().and_then(value_text),
            league_name: fixture.competition.name,
            home,
            away,
            match_time: fixture.start_time.as_ref().and_then(value_text),
            odds: api_market_odds(&fixture.markets),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{
        "data": [
            {
                "name": "Premier League",
                "events": [
                    {
                        "id": 991,
                        "name": "Arsenal v Chelsea",
                        "startTime": "2025-09-22T15:00:00Z",
                        "markets": [
                            {"name": "Full Time Result", "outcomes": [
                                {"name": "Arsenal", "odds": 2.104},
                                {"name": "Draw", "odds": "3.4"},
                                {"name": "Chelsea", "odds": "n/a"},
                                {"name": "Void", "odds": null}
                            ]}
                        ]
                    },
                    {"id": "992", "name": "TBC", "markets": []},
                    {"id": "993", "name": "Lyon-Marseille", "time": "20:45"}
                ]
            },
            {"title": "not a league"},
            42
        ]
    }"#;

    #[test]
    fn test_parse_feed() {
        let fixtures = parse_feed(FEED);
        assert_eq!(fixtures.len(), 2);

        let first = &fixtures[0];
        assert_eq!(first.source_id.as_deref(), Some("991"));
        assert_eq!(first.league_name.as_deref(), Some("Premier League"));
        assert_eq!(first.home, "Arsenal");
        assert_eq!(first.away, "Chelsea");
        assert_eq!(first.match_time.as_deref(), Some("2025-09-22T15:00:00Z"));
        assert_eq!(first.odds["full_time_result:arsenal"], OddsValue::Number(2.1));
        assert_eq!(first.odds["full_time_result:draw"], OddsValue::Number(3.4));
        assert_eq!(first.odds.len(), 2);

        let second = &fixtures[1];
        assert_eq!(second.home, "Lyon");
        assert_eq!(second.away, "Marseille");
        assert_eq!(second.match_time.as_deref(), Some("20:45"));
        assert!(second.odds.is_empty());
    }

    #[test]
    fn test_non_feed_bodies() {
        assert!(parse_feed("not json").is_empty());
        assert!(parse_feed(r#"{"other": 1}"#).is_empty());
        assert!(parse_feed(r#"{"data": "string"}"#).is_empty());
        assert!(parse_feed(r#"{"fixtures": {}}"#).is_empty());
        assert!(looks_like_json("  {\"data\": []}"));
        assert!(!looks_like_json("CL;ID=1"));
    }

    #[test]
    fn test_parse_api_fixtures() {
        let body = r#"{
            "fixtures": [
                {
                    "id": "f1",
                    "homeTeam": {"name": "DET Lions"},
                    "awayTeam": {"name": "BAL Ravens"},
                    "competition": {"name": "NFL"},
                    "markets": [
                        {"type": "Moneyline", "selections": [{"price": -150}, {"price": "+130"}]},
                        {"type": "Point Spread", "selections": [
                            {"index": 0, "handicap": "-3.5", "price": -110},
                            {"index": 1, "handicap": "+3.5", "price": -110}
                        ]},
                        {"type": "Total Points", "selections": [
                            {"type": "Over", "handicap": 44.5, "price": -105},
                            {"type": "Under", "handicap": 44.5, "price": -115}
                        ]}
                    ]
                },
                {"homeTeam": {"name": "Only Home"}}
            ]
        }"#;
        let fixtures = parse_feed(body);
        assert_eq!(fixtures.len(), 1);
        let f = &fixtures[0];
        assert_eq!(f.league_name.as_deref(), Some("NFL"));
        assert_eq!(f.odds["home_odds"], OddsValue::Number(-150.0));
        assert_eq!(f.odds["away_odds"], OddsValue::text("+130"));
        assert_eq!(f.odds["spread_home"], OddsValue::text("-3.5"));
        assert_eq!(f.odds["spread_away_odds"], OddsValue::Number(-110.0));
        assert_eq!(f.odds["total_over"], OddsValue::Number(44.5));
        assert_eq!(f.odds["total_under_odds"], OddsValue::Number(-115.0));
    }
}
