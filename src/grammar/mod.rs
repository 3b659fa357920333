pub mod states;

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::GrammarError;
use crate::text::starts_with_label;

pub const RECORD_START_LABEL: &str = "Number";
pub const ADDRESS_LABEL: &str = "City, State, Zip";
pub const SECTION_HEADER: &str = "Accession Records";

pub const DONATION_TYPE_COLUMN: &str = "DonationTypeID";
pub const ADDRESS_COLUMNS: [&str; 4] = ["City", "State", "Zip", "Address_Other"];

/// Catalog order is match precedence: "Assigned to Record Group" must stay
/// ahead of "Assigned to", "Returned by" ahead of "Returned".
const LEGACY_LABELS: &[&str] = &[
    "Number",
    "Donor",
    "Courtesy of",
    "Street",
    "City, State, Zip",
    "Donation/Lending Date",
    "Main Entry",
    "Quantity",
    "Restrictions",
    "Priority",
    "Assigned to Record Group",
    "Assigned for Processing?",
    "Date assigned",
    "Processing Completed?",
    "Date completed",
    "Processor",
    "Lender",
    "Provenance",
    "Temporary Location",
    "Special Notes",
    "Returned by",
    "Returned",
    "Date returned",
    "Assigned to",
    "Scope and Content Note",
    "Materials Received By",
    "Permanent Location",
];

const BIOGRAPHICAL_LABEL: &str = "Biographical/Historical";

const TITLE_CASE_FIELDS: &[&str] = &[
    "Donor",
    "Courtesy of",
    "Street",
    "City",
    "Processor",
    "Lender",
    "Returned by",
    "Assigned to",
    "Materials Received By",
];

const STOPWORDS: &[&str] = &["of", "the", "in", "on", "at", "to", "for", "and", "by"];

/// How the composite address line is broken into City/State/Zip/Address_Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSplit {
    /// Keep only the raw line; derived columns stay empty.
    None,
    /// Partition on commas alone.
    CommaSplit,
    /// Comma-first, falling back to state-name and ZIP scanning.
    Heuristic,
}

/// Named grammar presets, one per historical converter generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarVariant {
    Legacy,
    CommaSplit,
    #[default]
    Standard,
}

#[derive(Debug, Clone)]
pub struct FieldGrammar {
    labels: Vec<String>,
    title_case: HashSet<String>,
    address_split: AddressSplit,
    section_header: String,
}

impl FieldGrammar {
    pub fn new(
        labels: Vec<String>,
        title_case: HashSet<String>,
        address_split: AddressSplit,
    ) -> Self {
        FieldGrammar {
            labels,
            title_case,
            address_split,
            section_header: SECTION_HEADER.to_string(),
        }
    }

    pub fn for_variant(variant: GrammarVariant) -> Self {
        let mut labels: Vec<String> = LEGACY_LABELS.iter().map(|s| s.to_string()).collect();
        match variant {
            GrammarVariant::Legacy => FieldGrammar::new(labels, HashSet::new(), AddressSplit::None),
            GrammarVariant::CommaSplit => {
                labels.push(BIOGRAPHICAL_LABEL.to_string());
                FieldGrammar::new(labels, HashSet::new(), AddressSplit::CommaSplit)
            }
            GrammarVariant::Standard => {
                labels.push(BIOGRAPHICAL_LABEL.to_string());
                let title_case = TITLE_CASE_FIELDS.iter().map(|s| s.to_string()).collect();
                FieldGrammar::new(labels, title_case, AddressSplit::Heuristic)
            }
        }
    }

    pub fn with_section_header(mut self, header: impl Into<String>) -> Self {
        self.section_header = header.into();
        self
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn title_case_fields(&self) -> impl Iterator<Item = &str> {
        let mut fields: Vec<&str> = self.title_case.iter().map(String::as_str).collect();
        fields.sort_unstable();
        fields.into_iter()
    }

    pub fn is_title_case_field(&self, label: &str) -> bool {
        self.title_case.contains(label)
    }

    pub fn address_split(&self) -> AddressSplit {
        self.address_split
    }

    pub fn section_header(&self) -> &str {
        &self.section_header
    }

    /// First catalog label the text starts with, in catalog order.
    pub fn match_label(&self, text: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|label| starts_with_label(text, label))
            .map(String::as_str)
    }

    /// Output header: the catalog with `DonationTypeID` right after the
    /// record-start label, then the four address columns.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = Vec::with_capacity(self.labels.len() + 1 + ADDRESS_COLUMNS.len());
        for label in &self.labels {
            cols.push(label.clone());
            if label == RECORD_START_LABEL {
                cols.push(DONATION_TYPE_COLUMN.to_string());
            }
        }
        cols.extend(ADDRESS_COLUMNS.iter().map(|s| s.to_string()));
        cols
    }

    /// Pairs `(earlier, later)` where `later` can never match because
    /// `earlier` is listed first and claims every line `later` would.
    pub fn shadowed_labels(&self) -> Vec<(String, String)> {
        let mut shadowed = Vec::new();
        for (i, later) in self.labels.iter().enumerate() {
            if let Some(earlier) = self.labels[..i]
                .iter()
                .find(|earlier| starts_with_label(later, earlier))
            {
                shadowed.push((earlier.clone(), later.clone()));
            }
        }
        shadowed
    }

    pub fn validate(&self) -> Result<(), GrammarError> {
        let mut seen = HashSet::new();
        for label in &self.labels {
            if !seen.insert(label.as_str()) {
                return Err(GrammarError::DuplicateLabel(label.clone()));
            }
        }
        if !seen.contains(RECORD_START_LABEL) {
            return Err(GrammarError::MissingLabel(RECORD_START_LABEL.to_string()));
        }
        if self.address_split != AddressSplit::None && !seen.contains(ADDRESS_LABEL) {
            return Err(GrammarError::MissingLabel(ADDRESS_LABEL.to_string()));
        }
        if let Some((earlier, later)) = self.shadowed_labels().into_iter().next() {
            return Err(GrammarError::ShadowedLabel { earlier, later });
        }
        Ok(())
    }
}

impl Default for FieldGrammar {
    fn default() -> Self {
        FieldGrammar::for_variant(GrammarVariant::default())
    }
}

/// Capitalize each word; stopwords are forced lowercase wherever they
/// appear, first word included. Whitespace runs collapse to one space.
pub fn proper_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            if STOPWORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(lower: &str) -> String {
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Donation type code for an accession suffix letter; "0" when unknown.
pub fn donation_type_code(letter: char) -> &'static str {
    match letter.to_ascii_uppercase() {
        'A' => "1",
        'B' => "2",
        'C' => "3",
        'X' => "4",
        _ => "0",
    }
}

/// Two-letter postal code for a state name or abbreviation. Unknown input
/// comes back trimmed and upper-cased.
pub fn normalize_state(token: &str) -> String {
    match states::lookup(token) {
        Some(code) => code.to_string(),
        None => token.trim().to_uppercase(),
    }
}
