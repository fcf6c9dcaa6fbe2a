use regex::Regex;
use std::sync::OnceLock;

const BETTING_TERMS: &[&str] = &[
    "total", "over", "under", "spread", "moneyline", "money", "point", "@", "+", "-",
];

/// Short all-letter names are kept only for these club markers.
const SHORT_NAME_MARKERS: &[&str] = &["psg", "psv", "ac", "fc", "sc"];

const MAX_NAME_LEN: usize = 30;

fn parenthetical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").expect("valid parenthetical regex"))
}

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[+-]?\d+(\.\d+)?\s*$").expect("valid numeric regex"))
}

fn trailing_odds_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+[+-]?\d+(?:\.\d+)?$").expect("valid trailing odds regex"))
}

/// Clean a side name read from a label.
///
/// Returns `None` when the fragment is not a usable team name: betting noise,
/// numbers, overlong captures, or bare two/three-letter codes such as `CLE`.
/// Casing is preserved.
pub fn clean_team_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains('@') {
        return None;
    }
    let lower = trimmed.to_lowercase();
    let term_hits = BETTING_TERMS.iter().filter(|t| lower.contains(*t)).count();
    if term_hits > 1 || trimmed.chars().count() > MAX_NAME_LEN {
        return None;
    }
    if numeric_re().is_match(trimmed) || trimmed.chars().count() < 2 {
        return None;
    }

    let cleaned = parenthetical_re().replace_all(trimmed, "");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = trailing_odds_re().replace(&cleaned, "").trim().to_string();

    if cleaned.is_empty() {
        return None;
    }
    let short_code = cleaned.chars().count() <= 3 && cleaned.chars().all(char::is_alphabetic);
    if short_code && !SHORT_NAME_MARKERS.iter().any(|m| lower.contains(m)) {
        return None;
    }
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_parenthetical_annotations() {
        assert_eq!(clean_team_name("MIL Brewers (F Peralta)").as_deref(), Some("MIL Brewers"));
        assert_eq!(
            clean_team_name("LA Dodgers (Y Yamamoto) (R)").as_deref(),
            Some("LA Dodgers")
        );
    }

    #[test]
    fn test_rejects_bare_codes() {
        assert_eq!(clean_team_name("CLE"), None);
        assert_eq!(clean_team_name("ATL"), None);
        assert_eq!(clean_team_name("PSG").as_deref(), Some("PSG"));
    }

    #[test]
    fn test_rejects_betting_noise() {
        assert_eq!(clean_team_name("Total Over"), None);
        assert_eq!(clean_team_name("+150"), None);
        assert_eq!(clean_team_name("-7.5"), None);
        assert_eq!(clean_team_name("A"), None);
        assert_eq!(clean_team_name("Chelsea Draw @"), None);
        assert_eq!(clean_team_name("Celtics Winner Lakers @"), None);
        assert_eq!(clean_team_name("   "), None);
        assert_eq!(
            clean_team_name("Some Extremely Long Captured Fragment Of Text"),
            None
        );
    }

    #[test]
    fn test_collapses_whitespace_and_trailing_odds() {
        assert_eq!(clean_team_name("Boston   Red Sox 150").as_deref(), Some("Boston Red Sox"));
        assert_eq!(clean_team_name("Manchester United").as_deref(), Some("Manchester United"));
    }
}
