// Shared models for the fixture resolution engine
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod fixture;
pub mod odds;

pub use fixture::{derive_identity, Fixture, StructuredFixture};
pub use odds::{merge_odds, OddsMap, OddsValue};

// ============================================================================
// Sport & Match Kind Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sport {
    Soccer,
    Basketball,
    Cricket,
    Tennis,
    Golf,
    #[serde(rename = "Ice Hockey")]
    IceHockey,
    Snooker,
    #[serde(rename = "American Football")]
    AmericanFootball,
    Baseball,
    Handball,
    Volleyball,
    Rugby,
    Boxing,
    MMA,
    #[serde(rename = "Formula 1")]
    Formula1,
    Cycling,
    Darts,
    Bowls,
    Badminton,
    Squash,
    #[serde(rename = "Table Tennis")]
    TableTennis,
    Unknown,
}

impl Sport {
    pub const ALL: [Sport; 22] = [
        Sport::Soccer,
        Sport::Basketball,
        Sport::Cricket,
        Sport::Tennis,
        Sport::Golf,
        Sport::IceHockey,
        Sport::Snooker,
        Sport::AmericanFootball,
        Sport::Baseball,
        Sport::Handball,
        Sport::Volleyball,
        Sport::Rugby,
        Sport::Boxing,
        Sport::MMA,
        Sport::Formula1,
        Sport::Cycling,
        Sport::Darts,
        Sport::Bowls,
        Sport::Badminton,
        Sport::Squash,
        Sport::TableTennis,
        Sport::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Soccer => "Soccer",
            Sport::Basketball => "Basketball",
            Sport::Cricket => "Cricket",
            Sport::Tennis => "Tennis",
            Sport::Golf => "Golf",
            Sport::IceHockey => "Ice Hockey",
            Sport::Snooker => "Snooker",
            Sport::AmericanFootball => "American Football",
            Sport::Baseball => "Baseball",
            Sport::Handball => "Handball",
            Sport::Volleyball => "Volleyball",
            Sport::Rugby => "Rugby",
            Sport::Boxing => "Boxing",
            Sport::MMA => "MMA",
            Sport::Formula1 => "Formula 1",
            Sport::Cycling => "Cycling",
            Sport::Darts => "Darts",
            Sport::Bowls => "Bowls",
            Sport::Badminton => "Badminton",
            Sport::Squash => "Squash",
            Sport::TableTennis => "Table Tennis",
            Sport::Unknown => "Unknown",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Sport> {
        let name = name.trim();
        Sport::ALL
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }

    pub fn is_known(&self) -> bool {
        *self != Sport::Unknown
    }
}

impl Default for Sport {
    fn default() -> Self {
        Sport::Unknown
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    #[default]
    Prematch,
    Live,
}

impl MatchKind {
    /// In-play views are served under `/IP/` paths or `inplay` endpoints.
    pub fn from_source_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if url.contains("/IP/") || lower.contains("inplay") {
            MatchKind::Live
        } else {
            MatchKind::Prematch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_round_trips_display_name() {
        for sport in Sport::ALL {
            assert_eq!(Sport::from_name(sport.as_str()), Some(sport));
        }
        assert_eq!(Sport::from_name("ice hockey"), Some(Sport::IceHockey));
        assert_eq!(Sport::from_name("curling"), None);
    }

    #[test]
    fn test_sport_serializes_as_display_name() {
        let json = serde_json::to_string(&Sport::AmericanFootball).unwrap();
        assert_eq!(json, "\"American Football\"");
        let back: Sport = serde_json::from_str("\"Table Tennis\"").unwrap();
        assert_eq!(back, Sport::TableTennis);
    }

    #[test]
    fn test_match_kind_from_url() {
        assert_eq!(
            MatchKind::from_source_url("https://www.bet365.com/#/IP/B1"),
            MatchKind::Live
        );
        assert_eq!(
            MatchKind::from_source_url("https://x.example/inplayapi/feed"),
            MatchKind::Live
        );
        assert_eq!(
            MatchKind::from_source_url("https://www.bet365.com/#/AS/B1"),
            MatchKind::Prematch
        );
    }
}
