//! Static name tables used for membership-based classification.
//!
//! All entries are lowercase. Matching is on word boundaries, so `sun` does
//! not hit `suns` and `inter` does not hit `international`.

use crate::models::Sport;

/// Case-insensitive containment of `needle` in `haystack` as whole words.
/// Both arguments must already be lowercase.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Count of `patterns` present in `text` as whole words.
pub fn count_hits(text: &str, patterns: &[&str]) -> usize {
    patterns.iter().filter(|p| contains_phrase(text, p)).count()
}

pub fn any_hit(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| contains_phrase(text, p))
}

// ============================================================================
// Sport gazetteers
// ============================================================================

/// A per-sport name list and its tie-break weight.
pub struct SportGazetteer {
    pub sport: Sport,
    pub weight: usize,
    pub names: &'static [&'static str],
}

/// Checked in this order; a later sport must score strictly higher to win.
pub static SPORT_GAZETTEERS: &[SportGazetteer] = &[
    SportGazetteer { sport: Sport::Soccer, weight: 4, names: SOCCER_TEAMS },
    SportGazetteer { sport: Sport::AmericanFootball, weight: 3, names: AMERICAN_FOOTBALL_TEAMS },
    SportGazetteer { sport: Sport::Basketball, weight: 2, names: BASKETBALL_TEAMS },
    SportGazetteer { sport: Sport::Baseball, weight: 2, names: BASEBALL_TEAMS },
    SportGazetteer { sport: Sport::IceHockey, weight: 2, names: ICE_HOCKEY_TEAMS },
    SportGazetteer { sport: Sport::Golf, weight: 2, names: GOLF_PLAYERS },
    SportGazetteer { sport: Sport::Snooker, weight: 2, names: SNOOKER_PLAYERS },
];

pub static SOCCER_TEAMS: &[&str] = &[
    "manchester united", "manchester city", "chelsea", "arsenal", "liverpool",
    "tottenham", "aston villa", "wolverhampton wanderers", "wolverhampton", "everton",
    "newcastle", "west ham", "brighton", "crystal palace", "fulham",
    "bournemouth", "nottingham forest", "brentford", "luton", "burnley",
    "barcelona", "real madrid", "atletico madrid", "valencia", "sevilla",
    "bayern munich", "dortmund", "leverkusen", "rb leipzig", "juventus",
    "ac milan", "inter milan", "napoli", "roma", "lazio", "psg", "lyon",
    "marseille", "monaco",
];

pub static AMERICAN_FOOTBALL_TEAMS: &[&str] = &[
    "lions", "ravens", "cowboys", "patriots", "chiefs", "bills",
    "browns", "steelers", "bengals", "titans", "colts", "jaguars",
    "texans", "broncos", "chargers", "raiders", "rams", "seahawks",
    "49ers", "cardinals", "bears", "packers", "vikings", "eagles",
    "commanders", "giants", "falcons", "panthers", "saints", "bucs",
    "dolphins", "jets",
];

pub static BASKETBALL_TEAMS: &[&str] = &[
    "lakers", "warriors", "celtics", "heat", "bulls", "knicks",
    "grizzlies", "cavaliers", "nets", "raptors", "jazz", "thunder",
    "clippers", "kings", "suns", "mavericks", "spurs", "rockets",
    "pelicans", "timberwolves", "pistons", "hornets", "wizards",
    "hawks", "magic", "pacers", "sixers", "nuggets", "trail blazers",
    "bucks",
    "mercury", "lynx", "storm", "aces", "sun", "wings", "fever",
    "sparks", "sky", "mystics", "liberty", "dream",
];

pub static WNBA_TEAMS: &[&str] = &[
    "mercury", "lynx", "storm", "aces", "sun", "wings", "fever", "sparks", "sky", "mystics",
    "liberty", "dream",
];

pub static BASEBALL_TEAMS: &[&str] = &[
    "lotte marines", "nippon", "hanshin tigers", "yomiuri giants",
    "yakult swallows", "chunichi dragons", "hiroshima toyo carp",
    "yokohama dena baystars", "hokkaido nippon-ham fighters",
    "chiba lotte marines", "saitama seibu lions", "tohoku rakuten eagles",
    "orix buffaloes", "fukuoka softbank hawks", "yankees", "dodgers",
    "red sox", "astros", "braves", "brewers", "padres", "cardinals",
    "giants", "mets", "phillies", "nationals", "cubs", "reds",
    "pirates", "marlins", "rockies", "diamondbacks", "rangers",
    "athletics", "mariners", "angels", "orioles", "rays", "blue jays",
    "white sox", "guardians", "tigers", "twins", "royals",
];

pub static JAPANESE_TEAMS: &[&str] = &[
    "lotte marines", "nippon", "hanshin", "yomiuri", "yakult", "chunichi", "hiroshima",
    "yokohama", "hokkaido", "chiba", "saitama", "tohoku", "orix", "fukuoka",
];

pub static ICE_HOCKEY_TEAMS: &[&str] = &[
    "rangers", "bruins", "blackhawks", "penguins", "kings", "capitals",
    "devils", "islanders", "flyers", "avalanche", "blues", "predators",
    "lightning", "panthers", "hurricanes", "maple leafs", "senators",
    "sabres", "red wings", "blue jackets", "wild", "stars", "flames",
    "oilers", "canucks", "kraken", "golden knights", "ducks", "sharks",
    "jets", "canadiens", "coyotes",
];

pub static GOLF_PLAYERS: &[&str] = &[
    "woods", "mcilroy", "rahm", "schauffele", "koepka", "dechambeau",
    "cantlay", "morikawa", "thomas", "spieth", "johnson", "fowler",
    "mickelson", "watson", "garcia", "rose", "casey", "poulter",
    "westwood", "fleetwood", "fitzpatrick", "hovland", "matsuyama",
    "na", "kim", "lee", "park", "choi", "im", "finau", "reed",
    "simpson", "kuchar", "berger", "english", "horschel", "mitchell",
    "zalatoris", "young", "palmer", "nicklaus", "player", "trevino",
    "norman", "faldo", "ballesteros", "langer", "montgomerie",
];

pub static SNOOKER_PLAYERS: &[&str] = &[
    "trump", "selby", "robertson", "higgins", "williams", "murphy",
    "wilson", "lisowski", "allen", "ding", "zhao", "yan", "brecel",
    "gilbert", "milkins", "carter", "bingham", "hawkins", "perry",
    "maguire", "stevens", "ford", "mcgill", "grace", "burns",
    "hossein", "jones", "white", "wakelin", "brown", "joyce",
    "clarke", "dunham", "lines", "day", "selt", "donaldson",
    "craig", "mann", "dunn", "davis", "hendry", "parrott",
    "thorne", "virgo", "foulds",
];

// ============================================================================
// Name-shape heuristics
// ============================================================================

/// Any of these in a side name means college athletics.
pub static COLLEGE_TERMS: &[&str] = &[
    "state", "university", "college", "tech", "dame", "texas", "florida", "georgia",
    "virginia", "north", "south", "west", "east",
];

/// Club words that veto a tennis reading of two-word names.
pub static CLUB_TERMS: &[&str] = &[
    "united", "city", "wanderers", "villa", "fc", "ac", "madrid", "barcelona",
];

pub static WOMENS_TENNIS_PLAYERS: &[&str] = &[
    "maria", "timofeeva", "greet", "minnen", "varvara", "gracheva",
    "lanlana", "tararudee", "cristina", "bucsa", "clervie", "ngounoue",
    "leolia", "jeanjean", "lepchenko", "storm", "hunter", "katarzyna",
    "kawa", "viktoriya", "tomova", "whitney", "osuigwe", "yufei", "ren",
    "lourdes", "carle", "sabalenka", "swiatek", "jabeur", "pegula",
    "sakkari", "azarenka", "collins", "garcia", "halep", "raducanu",
    "pliskova", "kvitova", "muguruza", "osaka", "kenin", "andreescu",
    "keys", "mertens", "vekic", "putintseva", "kontaveit", "krejcikova",
    "muchova", "ostapenko", "rybakina", "badosa", "fernandez", "gauff",
];

pub static MENS_TENNIS_PLAYERS: &[&str] = &[
    "aleksandar", "kovacevic", "vukic", "rei", "sakamoto", "adam",
    "walton", "sho", "shimabukuro", "mariano", "navone", "brandon",
    "nakashima", "alejandro", "valentin", "royer", "corentin",
    "lorenzo", "musetti", "alexander", "bublik", "yibing",
    "djokovic", "nadal", "federer", "medvedev", "alcaraz", "sinner",
    "rublev", "tsitsipas", "berrettini", "zverev", "humbert", "ruud",
    "fognini", "seppi", "lorenzi", "travaglia", "caruso", "sonego",
    "mager", "cecchinato", "giustino", "marcora", "bellucci", "gaio",
    "giannessi", "brugnoli", "napolitano", "passaro",
];

pub static FEMININE_ENDINGS: &[&str] = &["a", "ia", "ova", "eva", "ina", "ana"];
pub static MASCULINE_ENDINGS: &[&str] = &["ic", "ov", "ez"];

// ============================================================================
// Keyword bags
// ============================================================================

pub static SPORT_KEYWORDS: &[(Sport, &[&str])] = &[
    (
        Sport::AmericanFootball,
        &["nfl", "football", "touchdown", "yard", "quarterback", "patriots", "cowboys", "chiefs", "lions", "ravens"],
    ),
    (
        Sport::Basketball,
        &[
            "nba", "basketball", "points", "lakers", "warriors", "celtics", "heat", "bucks", "bulls",
            "grizzlies", "cavaliers", "knicks", "nets", "raptors", "jazz", "thunder", "clippers",
            "kings", "suns", "mavericks", "spurs", "rockets", "pelicans", "timberwolves", "pistons",
            "hornets", "wizards", "hawks", "magic", "pacers", "sixers",
        ],
    ),
    (
        Sport::Baseball,
        &[
            "mlb", "baseball", "inning", "yankees", "dodgers", "red sox", "astros", "braves",
            "brewers", "padres", "cardinals", "giants", "mets", "phillies", "lotte marines",
            "nippon", "hanshin", "yomiuri", "yakult",
        ],
    ),
    (
        Sport::Soccer,
        &[
            "premier league", "fifa", "goal", "arsenal", "chelsea", "liverpool", "barcelona",
            "manchester", "tottenham", "bayern", "real madrid", "juventus", "ac milan",
            "inter milan", "napoli", "roma", "psg", "lyon", "marseille", "monaco", "dortmund",
            "leverkusen", "rb leipzig", "champions league", "europa league", "conference league",
            "ucl", "uel", "uecl", "aston villa", "wolverhampton",
        ],
    ),
    (
        Sport::IceHockey,
        &[
            "nhl", "hockey", "ice hockey", "puck", "goal", "assist", "rangers", "bruins",
            "blackhawks", "penguins", "kings", "capitals", "devils", "islanders", "flyers",
            "avalanche", "blues", "predators", "lightning", "panthers", "hurricanes",
            "maple leafs", "senators", "sabres", "red wings", "blue jackets",
        ],
    ),
    (
        Sport::Golf,
        &[
            "golf", "pga", "tour", "major", "masters", "open", "championship", "birdie", "eagle",
            "par", "hole", "round", "course", "driver", "iron", "putter", "woods", "mcilroy",
            "rahm", "schauffele", "koepka", "dechambeau", "cantlay", "morikawa", "thomas",
            "spieth", "johnson", "fowler", "mickelson",
        ],
    ),
    (
        Sport::Snooker,
        &[
            "snooker", "frame", "century", "break", "pot", "cue", "table", "world championship",
            "masters", "uk championship", "ranking", "trump", "selby", "robertson", "higgins",
            "williams", "murphy", "wilson", "lisowski", "allen", "ding", "zhao", "yan", "brecel",
            "gilbert", "milkins", "carter", "bingham", "hawkins",
        ],
    ),
    (
        Sport::Tennis,
        &[
            "atp", "wta", "tennis", "set", "match", "djokovic", "nadal", "federer", "bublik", "wu",
            "alcaraz", "sinner", "medvedev", "rublev", "tsitsipas", "berrettini", "zverev",
            "humbert", "ruud", "musetti", "bellucci", "uchiyama", "kovacevic", "vukic",
            "cerundolo", "noguchi", "sakamoto", "walton", "jacquemot", "aiava", "shimabukuro",
            "navone", "timofeeva", "minnen", "gracheva", "tararudee", "bucsa", "ngounoue",
            "sakkari", "sabalenka", "swiatek", "jabeur", "pegula", "gaud", "murray", "wawrinka",
            "del potro", "cilic", "thiem", "fognini", "seppi", "lorenzi", "travaglia", "caruso",
            "sonego", "mager", "cecchinato", "giustino", "marcora", "gaio", "giannessi",
            "brugnoli", "napolitano", "passaro", "taberner", "munar", "davidovich", "bautista",
            "carreno", "diaz", "etcheverry", "galan", "londero", "mayer", "molinero", "pella",
            "schwartzman", "tirante", "varillas", "zeballos",
        ],
    ),
];

// ============================================================================
// League gazetteers
// ============================================================================

/// Seed names per league, scored by hit count.
pub static SEED_PATTERNS: &[(&str, &[&str])] = &[
    ("NFL", &["lions", "ravens", "cowboys", "patriots", "chiefs", "bills", "browns"]),
    (
        "NBA",
        &[
            "lakers", "warriors", "celtics", "heat", "bulls", "knicks", "grizzlies", "cavaliers",
            "nets", "raptors", "jazz", "thunder", "clippers", "kings", "suns", "mavericks", "spurs",
            "rockets", "pelicans", "timberwolves", "pistons", "hornets", "wizards", "hawks",
            "magic", "pacers", "sixers",
        ],
    ),
    (
        "MLB",
        &[
            "yankees", "dodgers", "red sox", "astros", "braves", "mets", "brewers", "padres",
            "cardinals", "giants", "phillies",
        ],
    ),
    (
        "Premier League",
        &[
            "arsenal", "chelsea", "liverpool", "manchester united", "manchester city", "tottenham",
            "everton", "newcastle", "west ham", "aston villa", "wolves", "southampton", "brighton",
            "crystal palace", "fulham", "bournemouth", "nottingham forest", "brentford", "luton",
            "burnley",
        ],
    ),
    (
        "La Liga",
        &[
            "barcelona", "real madrid", "atletico madrid", "valencia", "sevilla", "villarreal",
            "real sociedad", "athletic bilbao", "betis", "celta vigo", "rayo vallecano", "osasuna",
            "mallorca", "girona", "almeria", "getafe", "cadiz", "las palmas", "alaves", "granada",
        ],
    ),
    (
        "Bundesliga",
        &[
            "bayern munich", "bayern", "dortmund", "leverkusen", "rb leipzig", "union berlin",
            "freiburg", "wolfsburg", "eintracht frankfurt", "mainz", "borussia monchengladbach",
            "werder bremen", "augsburg", "hoffenheim", "stuttgart", "bochum", "heidelberg",
            "darmstadt",
        ],
    ),
    (
        "Serie A",
        &[
            "juventus", "ac milan", "inter milan", "napoli", "roma", "lazio", "atalanta",
            "fiorentina", "torino", "sassuolo", "hellas verona", "bologna", "empoli", "udinese",
            "monza", "lecce", "salernitana", "frosinone", "genoa", "cagliari",
        ],
    ),
    (
        "Ligue 1",
        &[
            "psg", "lyon", "marseille", "monaco", "lille", "nice", "lens", "rennes", "strasbourg",
            "nantes", "toulouse", "reims", "montpellier", "brest", "lorient", "clermont", "metz",
            "auxerre", "angers", "ajaccio",
        ],
    ),
    (
        "Champions League",
        &[
            "champions league", "ucl", "bayern", "psg", "real madrid", "barcelona",
            "manchester city", "manchester united", "chelsea", "arsenal", "juventus", "ac milan",
            "inter milan", "napoli", "dortmund", "psv", "benfica", "porto",
        ],
    ),
    (
        "Europa League",
        &[
            "europa league", "uel", "roma", "lazio", "arsenal", "liverpool", "leverkusen", "rennes",
            "brighton", "west ham", "villarreal", "slavia prague", "panathinaikos",
        ],
    ),
    (
        "Conference League",
        &[
            "conference league", "uecl", "fiorentina", "lazio", "nice", "aston villa", "fenerbahce",
            "olympiacos", "slavia prague", "liverpool", "roma",
        ],
    ),
    (
        "NHL",
        &[
            "rangers", "bruins", "blackhawks", "penguins", "kings", "capitals", "devils",
            "islanders", "flyers", "avalanche", "blues", "predators", "lightning", "panthers",
            "hurricanes", "maple leafs", "senators", "sabres", "red wings", "blue jackets",
        ],
    ),
    (
        "PGA Tour",
        &[
            "woods", "mcilroy", "rahm", "schauffele", "koepka", "dechambeau", "cantlay", "morikawa",
            "thomas", "spieth", "johnson", "fowler", "mickelson", "watson", "garcia", "rose",
            "casey", "poulter", "westwood", "fleetwood", "fitzpatrick", "hovland", "matsuyama",
        ],
    ),
    (
        "World Snooker Tour",
        &[
            "trump", "selby", "robertson", "higgins", "williams", "murphy", "wilson", "lisowski",
            "allen", "ding", "zhao", "yan", "brecel", "gilbert", "milkins", "carter", "bingham",
            "hawkins", "perry", "maguire", "stevens", "ford", "mcgill",
        ],
    ),
    (
        "ATP",
        &[
            "atp", "djokovic", "nadal", "federer", "medvedev", "alcaraz", "sinner", "rublev",
            "tsitsipas", "berrettini", "zverev", "humbert", "ruud", "musetti", "bublik", "wu",
            "cerundolo", "noguchi", "sakamoto", "walton", "jacquemot", "aiava", "shimabukuro",
            "navone",
        ],
    ),
];

pub fn seed_patterns(league: &str) -> &'static [&'static str] {
    SEED_PATTERNS
        .iter()
        .find(|(l, _)| *l == league)
        .map(|(_, patterns)| *patterns)
        .unwrap_or(&[])
}

/// Domestic soccer leagues, checked in order.
pub static DOMESTIC_SOCCER_LEAGUES: &[&str] =
    &["Premier League", "La Liga", "Bundesliga", "Serie A", "Ligue 1"];

/// Continental competitions and their participant gazetteers.
pub static CONTINENTAL_COMPETITIONS: &[(&str, &[&str])] = &[
    (
        "Champions League",
        &[
            "bayern", "psg", "real madrid", "barcelona", "manchester city", "manchester united",
            "chelsea", "arsenal", "juventus", "ac milan", "inter milan", "napoli", "dortmund", "psv",
            "benfica", "porto", "shakhtar", "salzburg", "lazio", "roma", "leverkusen",
            "real sociedad", "young boys", "red star", "copenhagen", "galatasaray", "feyenoord",
        ],
    ),
    (
        "Europa League",
        &[
            "roma", "lazio", "arsenal", "liverpool", "leverkusen", "rennes", "brighton", "west ham",
            "villarreal", "slavia prague", "panathinaikos", "fenerbahce", "olympiacos", "qarabag",
            "maccabi haifa", "hapoel beer sheva", "sheriff", "shakhtar", "dynamo kyiv",
        ],
    ),
    (
        "Conference League",
        &[
            "fiorentina", "lazio", "nice", "aston villa", "fenerbahce", "olympiacos",
            "slavia prague", "liverpool", "roma",
        ],
    ),
];

/// League names and nicknames looked for in free-text context.
pub static LEAGUE_KEYWORDS: &[(&str, &[&str])] = &[
    ("NFL", &["nfl", "football", "american football"]),
    ("NBA", &["nba", "basketball"]),
    ("MLB", &["mlb", "baseball", "major league"]),
    (
        "Premier League",
        &["premier league", "epl", "english", "manchester", "chelsea", "arsenal", "liverpool", "tottenham"],
    ),
    (
        "La Liga",
        &["la liga", "spanish", "barcelona", "real madrid", "atletico", "valencia", "sevilla"],
    ),
    (
        "Bundesliga",
        &["bundesliga", "german", "bayern", "dortmund", "leverkusen", "schalke", "werder"],
    ),
    ("Serie A", &["serie a", "italian", "juventus", "milan", "inter", "napoli", "roma"]),
    ("Ligue 1", &["ligue 1", "french", "psg", "lyon", "marseille", "monaco"]),
    ("Champions League", &["champions league", "ucl", "champions"]),
    ("Europa League", &["europa league", "uel", "europa"]),
    ("Conference League", &["conference league", "uecl", "conference"]),
    ("NHL", &["nhl", "hockey", "ice hockey"]),
];

/// Leagues whose seed names can pull an American-football reading elsewhere.
pub static FOOTBALL_DISAMBIGUATION: &[&str] = &["NBA", "MLB", "Premier League"];
