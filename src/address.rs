use std::sync::LazyLock;

use regex::Regex;

use crate::grammar::{normalize_state, proper_case, states, AddressSplit};
use crate::text::collapse_whitespace;

static COMMA_SPACING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());
static BARE_ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^,\s])\s+(\d{5}(?:-\d{4})?)\b").unwrap());
static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").unwrap());
static ZIP_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(?:-\d{4})?$").unwrap());

/// The four derived address columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub city: String,
    pub state: String,
    pub zip: String,
    pub other: String,
}

impl AddressParts {
    fn city_only(city: &str) -> Self {
        AddressParts {
            city: proper_case(city),
            ..Default::default()
        }
    }

    /// A bare "campus" value is the institution's own address.
    fn campus(raw: &str) -> Option<Self> {
        raw.trim()
            .eq_ignore_ascii_case("campus")
            .then(|| AddressParts::city_only("Campus"))
    }
}

/// Break a raw "City, State, Zip" value apart with the given strategy.
pub fn split(raw: &str, strategy: AddressSplit) -> AddressParts {
    match strategy {
        AddressSplit::None => AddressParts::campus(raw).unwrap_or_default(),
        AddressSplit::CommaSplit => comma_split(raw),
        AddressSplit::Heuristic => decompose(raw),
    }
}

/// Comma-first decomposition with state and ZIP scanning for lines that
/// lack delimiters. Never fails; text it cannot place lands in `other`.
pub fn decompose(raw: &str) -> AddressParts {
    if let Some(parts) = AddressParts::campus(raw) {
        return parts;
    }
    let trimmed = raw.trim();

    let mut address = COMMA_SPACING_RE.replace_all(trimmed, ", ").into_owned();
    if !has_delimited_state(&address) {
        address = insert_comma_before_state(&address);
    }
    address = BARE_ZIP_RE.replace_all(&address, "$1, $2").into_owned();

    let parts: Vec<&str> = address.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return AddressParts::city_only(trimmed);
    }

    let city = parts[0];
    let mut remaining = parts[1..]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let mut state = String::new();
    if let Some((start, end)) = states::find_first(&remaining) {
        state = normalize_state(&remaining[start..end]);
        remaining = cut(&remaining, start, end);
    }

    let mut zip = String::new();
    if let Some(m) = ZIP_RE.find(&remaining) {
        zip = m.as_str().to_string();
        remaining = cut(&remaining, m.start(), m.end());
    }

    AddressParts {
        city: proper_case(city),
        state,
        zip,
        other: collapse_whitespace(&remaining),
    }
}

/// Comma-only partition: one part is a city; two parts are city and
/// "state [zip]"; three or more are city, ..., state, zip.
pub fn comma_split(raw: &str) -> AddressParts {
    if let Some(parts) = AddressParts::campus(raw) {
        return parts;
    }
    let parts: Vec<&str> = raw.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [] => AddressParts::default(),
        [city] => AddressParts::city_only(city),
        [city, state_zip] => {
            let words: Vec<&str> = state_zip.split_whitespace().collect();
            let (state, zip) = match words.split_last() {
                Some((last, rest)) if !rest.is_empty() && ZIP_SHAPE_RE.is_match(last) => {
                    (rest.join(" "), last.to_string())
                }
                Some((last, [])) if ZIP_SHAPE_RE.is_match(last) => (String::new(), last.to_string()),
                _ => (state_zip.to_string(), String::new()),
            };
            AddressParts {
                city: proper_case(city),
                state: normalize_state(&state),
                zip,
                other: String::new(),
            }
        }
        [city, middle @ .., state, last] => {
            let (zip, other) = if ZIP_SHAPE_RE.is_match(last) {
                (last.to_string(), middle.join(", "))
            } else {
                let mut rest = middle.to_vec();
                rest.push(*last);
                (String::new(), rest.join(", "))
            };
            AddressParts {
                city: proper_case(city),
                state: normalize_state(state),
                zip,
                other,
            }
        }
    }
}

/// A segment after the first comma already opens with a state token.
fn has_delimited_state(address: &str) -> bool {
    address.split(',').skip(1).any(states::starts_with_state)
}

/// Put a comma in front of the best state candidate: longest name wins,
/// ties go to the rightmost occurrence. A state at the very start is the
/// city itself and is left alone.
fn insert_comma_before_state(address: &str) -> String {
    let lower = address.to_ascii_lowercase();
    let mut best: Option<(usize, usize)> = None;
    for key in states::keys_by_length() {
        if let Some((len, _)) = best {
            if key.len() < len {
                break;
            }
        }
        for pos in word_positions(&lower, key) {
            let preceded_by_space = lower[..pos].ends_with(char::is_whitespace);
            if pos > 0 && preceded_by_space {
                let candidate = (key.len(), pos);
                if best.map_or(true, |b| candidate > b) {
                    best = Some(candidate);
                }
            }
        }
    }
    match best {
        Some((_, pos)) => format!("{}, {}", address[..pos].trim_end(), &address[pos..]),
        None => address.to_string(),
    }
}

/// Byte offsets where `needle` occurs as a whole word in `haystack`.
fn word_positions(haystack: &str, needle: &str) -> Vec<usize> {
    let is_word = |c: char| c.is_alphanumeric();
    haystack
        .match_indices(needle)
        .filter(|(pos, _)| {
            let before_ok = !haystack[..*pos].chars().next_back().is_some_and(is_word);
            let after_ok = !haystack[pos + needle.len()..].chars().next().is_some_and(is_word);
            before_ok && after_ok
        })
        .map(|(pos, _)| pos)
        .collect()
}

fn cut(s: &str, start: usize, end: usize) -> String {
    format!("{} {}", s[..start].trim(), s[end..].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(city: &str, state: &str, zip: &str, other: &str) -> AddressParts {
        AddressParts {
            city: city.to_string(),
            state: state.to_string(),
            zip: zip.to_string(),
            other: other.to_string(),
        }
    }

    #[test]
    fn city_state_zip() {
        assert_eq!(decompose("Dallas, TX 75201"), parts("Dallas", "TX", "75201", ""));
    }

    #[test]
    fn full_state_name_and_zip_plus_four() {
        assert_eq!(
            decompose("Dallas, Texas 75201-1234"),
            parts("Dallas", "TX", "75201-1234", "")
        );
    }

    #[test]
    fn campus_short_circuit() {
        assert_eq!(decompose("Campus"), parts("Campus", "", "", ""));
        assert_eq!(decompose("  CAMPUS "), parts("Campus", "", "", ""));
        assert_eq!(split("campus", AddressSplit::CommaSplit), parts("Campus", "", "", ""));
        assert_eq!(split("campus", AddressSplit::None), parts("Campus", "", "", ""));
    }

    #[test]
    fn no_comma_state_scan() {
        assert_eq!(decompose("El Paso TX"), parts("El Paso", "TX", "", ""));
        assert_eq!(decompose("Santa Fe New Mexico 87501"), parts("Santa Fe", "NM", "87501", ""));
    }

    #[test]
    fn state_at_start_stays_city() {
        assert_eq!(decompose("New York NY 10001"), parts("New York", "NY", "10001", ""));
    }

    #[test]
    fn comma_spacing_is_normalized() {
        assert_eq!(decompose("Austin ,TX,78701"), parts("Austin", "TX", "78701", ""));
    }

    #[test]
    fn single_word_is_city() {
        assert_eq!(decompose("lubbock"), parts("Lubbock", "", "", ""));
        assert_eq!(decompose(""), parts("", "", "", ""));
    }

    #[test]
    fn unknown_region_goes_to_other() {
        assert_eq!(
            decompose("Washington, DC 20001"),
            parts("Washington", "", "20001", "DC")
        );
        assert_eq!(
            decompose("Toronto, Ontario"),
            parts("Toronto", "", "", "Ontario")
        );
    }

    #[test]
    fn extra_segments_kept() {
        assert_eq!(
            decompose("Canyon, Box 42, TX 79015"),
            parts("Canyon", "TX", "79015", "Box 42")
        );
    }

    #[test]
    fn zip_without_state() {
        assert_eq!(decompose("Amarillo 79101"), parts("Amarillo", "", "79101", ""));
    }

    #[test]
    fn comma_split_shapes() {
        assert_eq!(comma_split("Lubbock"), parts("Lubbock", "", "", ""));
        assert_eq!(comma_split("Dallas, Texas 75201"), parts("Dallas", "TX", "75201", ""));
        assert_eq!(comma_split("Dallas, TX"), parts("Dallas", "TX", "", ""));
        assert_eq!(comma_split("Dallas, 75201"), parts("Dallas", "", "75201", ""));
        assert_eq!(
            comma_split("Canyon, Box 42, Texas, 79015"),
            parts("Canyon", "TX", "79015", "Box 42")
        );
        assert_eq!(comma_split("a, b, c"), parts("A", "B", "", "c"));
    }

    #[test]
    fn none_strategy_leaves_columns_empty() {
        assert_eq!(split("Dallas, TX 75201", AddressSplit::None), AddressParts::default());
    }

    #[test]
    fn short_state_word_after_comma_counts_as_delimited() {
        // "In" is Indiana's key, so the care-of segment claims the state slot.
        assert_eq!(
            decompose("Houston, In care of X, TX"),
            parts("Houston", "IN", "", "care of X TX")
        );
    }

    #[test]
    fn word_positions_need_boundaries() {
        assert_eq!(word_positions("el paso pa", "pa"), vec![8]);
        assert!(word_positions("inland", "in").is_empty());
    }
}
