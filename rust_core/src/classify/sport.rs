//! Sport detection from team names, free text and the source URL.

use super::gazetteer::{
    any_hit, contains_phrase, count_hits, CLUB_TERMS, COLLEGE_TERMS, SPORT_GAZETTEERS,
    SPORT_KEYWORDS,
};
use crate::league_config::sport_from_url;
use crate::models::Sport;

/// Which rule produced a sport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SportSource {
    Gazetteer,
    CollegeName,
    PlayerNames,
    Keywords,
    UrlCode,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SportSignal {
    pub sport: Sport,
    pub source: SportSource,
    /// Keyword score over bag size, only for keyword matches.
    pub confidence: Option<f64>,
}

impl SportSignal {
    fn new(sport: Sport, source: SportSource) -> Self {
        Self {
            sport,
            source,
            confidence: None,
        }
    }
}

/// Detect the sport. Rules run in precedence order: gazetteers, name shape,
/// keywords, URL sport code.
pub fn detect_sport(text: &str, url: &str, teams: &[&str]) -> SportSignal {
    let teams: Vec<String> = teams
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(sport) = gazetteer_sport(&teams) {
        return SportSignal::new(sport, SportSource::Gazetteer);
    }
    if let Some(signal) = name_shape_sport(&teams) {
        return signal;
    }
    if let Some((sport, confidence)) = keyword_sport(text, &teams) {
        return SportSignal {
            sport,
            source: SportSource::Keywords,
            confidence: Some(confidence),
        };
    }
    match sport_from_url(url) {
        Sport::Unknown => SportSignal::new(Sport::Unknown, SportSource::None),
        sport => SportSignal::new(sport, SportSource::UrlCode),
    }
}

/// Best gazetteer score per sport is `entry length × sport weight`; the
/// highest sport wins, earlier sports winning ties.
fn gazetteer_sport(teams: &[String]) -> Option<Sport> {
    let mut best: Option<(Sport, usize)> = None;

    for gazetteer in SPORT_GAZETTEERS {
        let mut sport_best = 0;
        for team in teams {
            let team = team.to_lowercase();
            for entry in gazetteer.names {
                let hit = (entry.len() >= 3 && contains_phrase(&team, entry))
                    || (team.len() >= 3 && contains_phrase(entry, &team));
                if hit {
                    sport_best = sport_best.max(entry.len() * gazetteer.weight);
                }
            }
        }
        if sport_best > 0 && best.map_or(true, |(_, score)| sport_best > score) {
            best = Some((gazetteer.sport, sport_best));
        }
    }
    best.map(|(sport, _)| sport)
}

/// College names force American football. Otherwise two capitalised
/// "Firstname Lastname" sides read as tennis, unless a club word appears.
fn name_shape_sport(teams: &[String]) -> Option<SportSignal> {
    if teams.is_empty() {
        return None;
    }

    let mut player_score = 0;
    for team in teams {
        if any_hit(&team.to_lowercase(), COLLEGE_TERMS) {
            return Some(SportSignal::new(Sport::AmericanFootball, SportSource::CollegeName));
        }
        let words: Vec<&str> = team.split_whitespace().collect();
        let capitalised = words
            .iter()
            .all(|w| w.chars().next().is_some_and(char::is_uppercase));
        if words.len() == 2 && capitalised {
            let name_sized = words.iter().all(|w| (3..=12).contains(&w.chars().count()));
            player_score += if name_sized { 2 } else { 1 };
        }
    }

    if player_score >= 3 {
        let joined = teams.join(" ").to_lowercase();
        if !any_hit(&joined, CLUB_TERMS) {
            return Some(SportSignal::new(Sport::Tennis, SportSource::PlayerNames));
        }
    }
    None
}

/// One point per keyword in the text, two per keyword inside a team name.
fn keyword_sport(text: &str, teams: &[String]) -> Option<(Sport, f64)> {
    let text = text.to_lowercase();
    let teams: Vec<String> = teams.iter().map(|t| t.to_lowercase()).collect();

    let mut best: Option<(Sport, usize, usize)> = None;
    for (sport, keywords) in SPORT_KEYWORDS {
        let mut score = count_hits(&text, keywords);
        for team in &teams {
            score += 2 * count_hits(team, keywords);
        }
        if score > 0 && best.map_or(true, |(_, s, _)| score > s) {
            best = Some((*sport, score, keywords.len()));
        }
    }
    best.map(|(sport, score, bag)| (sport, score as f64 / bag.max(1) as f64))
}
