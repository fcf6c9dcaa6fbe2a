//! Stateless league rules. Learned associations live in `ClassifierState`.

use super::gazetteer::{
    any_hit, count_hits, seed_patterns, CONTINENTAL_COMPETITIONS, DOMESTIC_SOCCER_LEAGUES,
    FEMININE_ENDINGS, FOOTBALL_DISAMBIGUATION, JAPANESE_TEAMS, LEAGUE_KEYWORDS,
    MASCULINE_ENDINGS, MENS_TENNIS_PLAYERS, SEED_PATTERNS, WNBA_TEAMS, WOMENS_TENNIS_PLAYERS,
};
use crate::league_config::country_for_league;
use crate::models::Sport;
use std::collections::BTreeSet;

fn teams_text(home: &str, away: &str) -> String {
    format!("{} {}", home, away).to_lowercase()
}

/// Deterministic per-sport rules. `None` when the sport has no rule.
pub fn league_by_sport_rule(home: &str, away: &str, sport: Sport) -> Option<&'static str> {
    let teams = teams_text(home, away);
    let league = match sport {
        Sport::Tennis => {
            if is_womens_tennis(home, away) {
                "WTA"
            } else {
                "ATP"
            }
        }
        Sport::Basketball => {
            if any_hit(&teams, WNBA_TEAMS) {
                "WNBA"
            } else {
                "NBA"
            }
        }
        Sport::AmericanFootball => football_disambiguation(&teams).unwrap_or("NFL"),
        Sport::Baseball => {
            if any_hit(&teams, JAPANESE_TEAMS) {
                "NPB"
            } else {
                "MLB"
            }
        }
        Sport::IceHockey => "NHL",
        Sport::Golf => "PGA Tour",
        Sport::Snooker => "World Snooker Tour",
        Sport::Soccer => soccer_league(home, away),
        _ => return None,
    };
    Some(league)
}

/// Two or more seed names of another league outweigh an American-football
/// reading.
fn football_disambiguation(teams: &str) -> Option<&'static str> {
    FOOTBALL_DISAMBIGUATION
        .iter()
        .copied()
        .find(|league| count_hits(teams, seed_patterns(league)) >= 2)
}

/// Gender from known player names, then surname endings.
pub fn is_womens_tennis(home: &str, away: &str) -> bool {
    let words: BTreeSet<String> = home
        .split_whitespace()
        .chain(away.split_whitespace())
        .map(str::to_lowercase)
        .collect();

    let women = words
        .iter()
        .filter(|w| WOMENS_TENNIS_PLAYERS.contains(&w.as_str()))
        .count();
    let men = words
        .iter()
        .filter(|w| MENS_TENNIS_PLAYERS.contains(&w.as_str()))
        .count();
    if women > 0 && men == 0 {
        return true;
    }
    if men > 0 && women == 0 {
        return false;
    }

    let mut feminine = 0;
    let mut masculine = 0;
    for word in words.iter().filter(|w| w.chars().count() > 3) {
        if FEMININE_ENDINGS.iter().any(|e| word.ends_with(e)) {
            feminine += 1;
        } else if MASCULINE_ENDINGS.iter().any(|e| word.ends_with(e)) {
            masculine += 1;
        }
    }
    feminine > masculine
}

/// Home country of a club, from the domestic league gazetteers.
pub fn team_country(team: &str) -> Option<&'static str> {
    let team = team.to_lowercase();
    DOMESTIC_SOCCER_LEAGUES
        .iter()
        .find(|league| any_hit(&team, seed_patterns(league)))
        .and_then(|league| country_for_league(league))
}

/// Continental competitions only when the sides come from different
/// countries, then domestic gazetteers, then the Premier League.
fn soccer_league(home: &str, away: &str) -> &'static str {
    let teams = teams_text(home, away);

    let cross_border = match (team_country(home), team_country(away)) {
        (Some(h), Some(a)) => h != a,
        _ => false,
    };
    if cross_border {
        if let Some((league, _)) = CONTINENTAL_COMPETITIONS
            .iter()
            .find(|(_, clubs)| any_hit(&teams, clubs))
        {
            return *league;
        }
    }

    DOMESTIC_SOCCER_LEAGUES
        .iter()
        .copied()
        .find(|league| any_hit(&teams, seed_patterns(league)))
        .unwrap_or("Premier League")
}

/// League with the most seed-name hits; earlier leagues win ties.
pub fn seed_league(home: &str, away: &str) -> Option<&'static str> {
    let teams = teams_text(home, away);
    let mut best: Option<(&'static str, usize)> = None;
    for (league, patterns) in SEED_PATTERNS {
        let hits = count_hits(&teams, patterns);
        if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
            best = Some((*league, hits));
        }
    }
    best.map(|(league, _)| league)
}

/// First league whose keywords appear in the context or the sport name.
pub fn context_league(context: &str, sport: Sport) -> Option<&'static str> {
    let context = context.to_lowercase();
    let sport_name = sport.as_str().to_lowercase();
    LEAGUE_KEYWORDS
        .iter()
        .find(|(_, keywords)| any_hit(&context, keywords) || any_hit(&sport_name, keywords))
        .map(|(league, _)| *league)
}
