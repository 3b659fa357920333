use std::sync::LazyLock;

use regex::Regex;

use crate::grammar::donation_type_code;

/// Two-digit year, sequence, one-letter donation type, e.g. `84-123-A`.
/// Anything after the letter is ignored.
static ACCESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?\s*(\d{2})-(\d+)-([A-Za-z])").unwrap());

const CENTURY_PREFIX: &str = "19";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accession {
    pub year: String,
    pub sequence: String,
    pub suffix: char,
}

impl Accession {
    /// Parse the text that follows the record-start label.
    pub fn parse(remainder: &str) -> Option<Accession> {
        let caps = ACCESSION_RE.captures(remainder.trim_start())?;
        let suffix = caps[3].chars().next()?;
        Some(Accession {
            year: format!("{}{}", CENTURY_PREFIX, &caps[1]),
            sequence: caps[2].to_string(),
            suffix,
        })
    }

    /// Stored form: four-digit year and sequence, `1984-123`.
    pub fn number(&self) -> String {
        format!("{}-{}", self.year, self.sequence)
    }

    pub fn donation_type_id(&self) -> &'static str {
        donation_type_code(self.suffix)
    }
}
