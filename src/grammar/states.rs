use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Lowercased state name or postal abbreviation → postal code.
const STATES: &[(&str, &str)] = &[
    ("al", "AL"), ("ak", "AK"), ("az", "AZ"), ("ar", "AR"), ("ca", "CA"),
    ("co", "CO"), ("ct", "CT"), ("de", "DE"), ("fl", "FL"), ("ga", "GA"),
    ("hi", "HI"), ("id", "ID"), ("il", "IL"), ("in", "IN"), ("ia", "IA"),
    ("ks", "KS"), ("ky", "KY"), ("la", "LA"), ("me", "ME"), ("md", "MD"),
    ("ma", "MA"), ("mi", "MI"), ("mn", "MN"), ("ms", "MS"), ("mo", "MO"),
    ("mt", "MT"), ("ne", "NE"), ("nv", "NV"), ("nh", "NH"), ("nj", "NJ"),
    ("nm", "NM"), ("ny", "NY"), ("nc", "NC"), ("nd", "ND"), ("oh", "OH"),
    ("ok", "OK"), ("or", "OR"), ("pa", "PA"), ("ri", "RI"), ("sc", "SC"),
    ("sd", "SD"), ("tn", "TN"), ("tx", "TX"), ("ut", "UT"), ("vt", "VT"),
    ("va", "VA"), ("wa", "WA"), ("wv", "WV"), ("wi", "WI"), ("wy", "WY"),
    ("alabama", "AL"), ("alaska", "AK"), ("arizona", "AZ"), ("arkansas", "AR"),
    ("california", "CA"), ("colorado", "CO"), ("connecticut", "CT"),
    ("delaware", "DE"), ("florida", "FL"), ("georgia", "GA"), ("hawaii", "HI"),
    ("idaho", "ID"), ("illinois", "IL"), ("indiana", "IN"), ("iowa", "IA"),
    ("kansas", "KS"), ("kentucky", "KY"), ("louisiana", "LA"), ("maine", "ME"),
    ("maryland", "MD"), ("massachusetts", "MA"), ("michigan", "MI"),
    ("minnesota", "MN"), ("mississippi", "MS"), ("missouri", "MO"),
    ("montana", "MT"), ("nebraska", "NE"), ("nevada", "NV"),
    ("new hampshire", "NH"), ("new jersey", "NJ"), ("new mexico", "NM"),
    ("new york", "NY"), ("north carolina", "NC"), ("north dakota", "ND"),
    ("ohio", "OH"), ("oklahoma", "OK"), ("oregon", "OR"), ("pennsylvania", "PA"),
    ("rhode island", "RI"), ("south carolina", "SC"), ("south dakota", "SD"),
    ("tennessee", "TN"), ("texas", "TX"), ("utah", "UT"), ("vermont", "VT"),
    ("virginia", "VA"), ("washington", "WA"), ("west virginia", "WV"),
    ("wisconsin", "WI"), ("wyoming", "WY"),
];

static STATE_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| STATES.iter().copied().collect());

/// Keys ordered longest first so "new york" is tried before "ny".
static BY_LENGTH: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut keys: Vec<&str> = STATES.iter().map(|(k, _)| *k).collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    keys
});

/// Whole-word, case-insensitive match of any state key. Alternation is
/// longest-first, so at a given position the longest name wins.
static STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = BY_LENGTH
        .iter()
        .map(|k| regex::escape(k).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
});

static LEADING_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(?:{})", STATE_RE.as_str())).unwrap());

/// Postal code for a state name or abbreviation, if known.
pub fn lookup(token: &str) -> Option<&'static str> {
    let key = token.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    STATE_MAP.get(key.as_str()).copied()
}

/// All state keys, longest first.
pub fn keys_by_length() -> &'static [&'static str] {
    &BY_LENGTH
}

/// First whole-word state occurrence in `text` as a byte range.
pub fn find_first(text: &str) -> Option<(usize, usize)> {
    STATE_RE.find(text).map(|m| (m.start(), m.end()))
}

/// True when `text` begins with a state name or abbreviation.
pub fn starts_with_state(text: &str) -> bool {
    LEADING_STATE_RE.is_match(text.trim_start())
}
