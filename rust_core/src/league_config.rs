//! League configuration for supported sports.
//!
//! This module provides:
//! - Static configuration for every league the classifier can emit
//! - League → canonical sport and league → home country lookups
//! - Sport → default league fallbacks
//! - The sportsbook's `B<n>` sport-code table

use crate::models::Sport;
use regex::Regex;
use std::sync::OnceLock;

/// Configuration for a single league.
#[derive(Debug, Clone)]
pub struct LeagueConfig {
    /// Display name (e.g., "NFL", "Premier League")
    pub name: &'static str,
    /// Sport the league implies
    pub sport: Sport,
    /// Home country for domestic competitions; None for international ones
    pub country: Option<&'static str>,
}

/// Static configuration for all supported leagues.
pub static LEAGUE_CONFIGS: &[LeagueConfig] = &[
    // Football
    LeagueConfig { name: "NFL", sport: Sport::AmericanFootball, country: Some("USA") },
    // Basketball
    LeagueConfig { name: "NBA", sport: Sport::Basketball, country: Some("USA") },
    LeagueConfig { name: "WNBA", sport: Sport::Basketball, country: Some("USA") },
    // Baseball
    LeagueConfig { name: "MLB", sport: Sport::Baseball, country: Some("USA") },
    LeagueConfig { name: "NPB", sport: Sport::Baseball, country: Some("Japan") },
    // Soccer - domestic
    LeagueConfig { name: "Premier League", sport: Sport::Soccer, country: Some("England") },
    LeagueConfig { name: "La Liga", sport: Sport::Soccer, country: Some("Spain") },
    LeagueConfig { name: "Bundesliga", sport: Sport::Soccer, country: Some("Germany") },
    LeagueConfig { name: "Serie A", sport: Sport::Soccer, country: Some("Italy") },
    LeagueConfig { name: "Ligue 1", sport: Sport::Soccer, country: Some("France") },
    // Soccer - continental
    LeagueConfig { name: "Champions League", sport: Sport::Soccer, country: None },
    LeagueConfig { name: "Europa League", sport: Sport::Soccer, country: None },
    LeagueConfig { name: "Conference League", sport: Sport::Soccer, country: None },
    // Hockey
    LeagueConfig { name: "NHL", sport: Sport::IceHockey, country: None },
    // Individual sports
    LeagueConfig { name: "PGA Tour", sport: Sport::Golf, country: None },
    LeagueConfig { name: "World Snooker Tour", sport: Sport::Snooker, country: None },
    LeagueConfig { name: "ATP", sport: Sport::Tennis, country: None },
    LeagueConfig { name: "WTA", sport: Sport::Tennis, country: None },
];

/// Fallback league when nothing more specific is known.
static SPORT_DEFAULT_LEAGUES: &[(Sport, &str)] = &[
    (Sport::AmericanFootball, "NFL"),
    (Sport::Basketball, "NBA"),
    (Sport::Baseball, "MLB"),
    (Sport::Soccer, "Premier League"),
    (Sport::IceHockey, "NHL"),
    (Sport::Tennis, "ATP"),
    (Sport::Golf, "PGA Tour"),
    (Sport::Snooker, "World Snooker Tour"),
];

/// Sportsbook navigation codes. B13 serves the soccer-only view.
pub static SPORT_CODES: &[(&str, Sport)] = &[
    ("B1", Sport::Soccer),
    ("B2", Sport::Basketball),
    ("B3", Sport::Cricket),
    ("B4", Sport::Tennis),
    ("B5", Sport::Golf),
    ("B6", Sport::IceHockey),
    ("B7", Sport::Snooker),
    ("B8", Sport::AmericanFootball),
    ("B9", Sport::Baseball),
    ("B10", Sport::Handball),
    ("B11", Sport::Volleyball),
    ("B12", Sport::Rugby),
    ("B13", Sport::Soccer),
    ("B14", Sport::Boxing),
    ("B15", Sport::MMA),
    ("B16", Sport::Formula1),
    ("B17", Sport::Cycling),
    ("B18", Sport::Darts),
    ("B19", Sport::Bowls),
    ("B20", Sport::Badminton),
    ("B21", Sport::Squash),
    ("B22", Sport::TableTennis),
];

pub const SOCCER_ONLY_CODE: &str = "B13";

pub const UNKNOWN_LEAGUE: &str = "Unknown";

/// Get league configuration by name.
pub fn get_league_config(league: &str) -> Option<&'static LeagueConfig> {
    LEAGUE_CONFIGS
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(league))
}

/// Canonical sport implied by a league, if it is a known league.
pub fn sport_for_league(league: &str) -> Option<Sport> {
    get_league_config(league).map(|c| c.sport)
}

/// Home country of a domestic league.
pub fn country_for_league(league: &str) -> Option<&'static str> {
    get_league_config(league).and_then(|c| c.country)
}

pub fn default_league_for_sport(sport: Sport) -> Option<&'static str> {
    SPORT_DEFAULT_LEAGUES
        .iter()
        .find(|(s, _)| *s == sport)
        .map(|(_, league)| *league)
}

pub fn sport_from_code(code: &str) -> Option<Sport> {
    SPORT_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, sport)| *sport)
}

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"B\d+").expect("valid sport code regex"))
}

/// All `B<n>` tokens in a URL, in order of appearance.
pub fn sport_codes_in_url(url: &str) -> Vec<&str> {
    code_regex().find_iter(url).map(|m| m.as_str()).collect()
}

/// Sport for the last recognised code in the URL.
///
/// The trailing code is the most recently navigated view.
pub fn sport_from_url(url: &str) -> Sport {
    sport_codes_in_url(url)
        .into_iter()
        .rev()
        .find_map(sport_from_code)
        .unwrap_or(Sport::Unknown)
}

/// True when the URL carries exactly one code and it is the soccer-only view.
pub fn is_soccer_only_url(url: &str) -> bool {
    let codes = sport_codes_in_url(url);
    codes.len() == 1 && codes[0] == SOCCER_ONLY_CODE
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_league_config() {
        let nfl = get_league_config("nfl").unwrap();
        assert_eq!(nfl.name, "NFL");
        assert_eq!(nfl.sport, Sport::AmericanFootball);
    }

    #[test]
    fn test_missing_league() {
        assert!(get_league_config("nonexistent").is_none());
        assert_eq!(sport_for_league("Unknown"), None);
    }

    #[test]
    fn test_league_implies_sport() {
        assert_eq!(sport_for_league("NBA"), Some(Sport::Basketball));
        assert_eq!(sport_for_league("NPB"), Some(Sport::Baseball));
        assert_eq!(sport_for_league("WTA"), Some(Sport::Tennis));
        assert_eq!(sport_for_league("Champions League"), Some(Sport::Soccer));
    }

    #[test]
    fn test_continental_competitions_have_no_country() {
        assert_eq!(country_for_league("Premier League"), Some("England"));
        assert_eq!(country_for_league("Champions League"), None);
        assert_eq!(country_for_league("Europa League"), None);
    }

    #[test]
    fn test_sport_defaults() {
        assert_eq!(default_league_for_sport(Sport::Soccer), Some("Premier League"));
        assert_eq!(default_league_for_sport(Sport::Cricket), None);
    }

    #[test]
    fn test_last_code_in_url_wins() {
        assert_eq!(
            sport_from_url("https://www.co.bet365.com/#/HO/IP/B1/B13"),
            Sport::Soccer
        );
        assert_eq!(
            sport_from_url("https://www.co.bet365.com/#/AS/B1/B8"),
            Sport::AmericanFootball
        );
        assert_eq!(sport_from_url("https://www.co.bet365.com/#/AS/B99"), Sport::Unknown);
        assert_eq!(sport_from_url(""), Sport::Unknown);
    }

    #[test]
    fn test_unrecognised_trailing_code_is_skipped() {
        assert_eq!(sport_from_url("https://x/#/AS/B4/B99"), Sport::Tennis);
    }

    #[test]
    fn test_soccer_only_url() {
        assert!(is_soccer_only_url("https://www.co.bet365.com/#/AS/B13"));
        assert!(!is_soccer_only_url("https://www.co.bet365.com/#/AS/B1/B13"));
        assert!(!is_soccer_only_url("https://www.co.bet365.com/#/AS/B1"));
    }
}
