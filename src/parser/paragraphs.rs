use std::sync::LazyLock;

use regex::Regex;

use super::accession::Accession;
use crate::grammar::{proper_case, FieldGrammar, ADDRESS_LABEL, RECORD_START_LABEL};
use crate::text::{collapse_whitespace, value_after_label};

/// Pagination artifacts such as `[[12]]`.
static PAGE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\[\d+\]\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    Blank,
    SectionHeader,
    PageMarker,
    RecordStart(Accession),
    /// Record-start label whose payload is not an accession number; the
    /// text is handled as a continuation line.
    MalformedStart(String),
    Address { raw: String },
    Field { label: String, value: String },
    Text(String),
}

pub fn classify(raw: &str, grammar: &FieldGrammar) -> Paragraph {
    let text = raw.trim();

    if text.is_empty() {
        return Paragraph::Blank;
    }
    if text == grammar.section_header() {
        return Paragraph::SectionHeader;
    }
    if PAGE_MARKER_RE.is_match(text) {
        return Paragraph::PageMarker;
    }

    let Some(label) = grammar.match_label(text) else {
        return Paragraph::Text(collapse_whitespace(text));
    };
    let value = value_after_label(text, label);

    match label {
        RECORD_START_LABEL => match Accession::parse(&text[label.len()..]) {
            Some(accession) => Paragraph::RecordStart(accession),
            None => Paragraph::MalformedStart(collapse_whitespace(text)),
        },
        ADDRESS_LABEL => Paragraph::Address {
            raw: value.to_string(),
        },
        _ => {
            let value = if grammar.is_title_case_field(label) {
                proper_case(value)
            } else {
                collapse_whitespace(value)
            };
            Paragraph::Field {
                label: label.to_string(),
                value,
            }
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarVariant;

    fn classify_std(text: &str) -> Paragraph {
        classify(text, &FieldGrammar::default())
    }

    #[test]
    fn blank_and_header() {
        assert_eq!(classify_std(""), Paragraph::Blank);
        assert_eq!(classify_std("   \t "), Paragraph::Blank);
        assert_eq!(classify_std("  Accession Records "), Paragraph::SectionHeader);
    }

    #[test]
    fn custom_section_header() {
        let g = FieldGrammar::default().with_section_header("Loan Records");
        assert_eq!(classify("Loan Records", &g), Paragraph::SectionHeader);
        assert!(matches!(classify("Accession Records", &g), Paragraph::Text(_)));
    }

    #[test]
    fn page_marker() {
        assert_eq!(classify_std("[[12]]"), Paragraph::PageMarker);
        assert_eq!(classify_std(" [[3]] "), Paragraph::PageMarker);
        assert!(matches!(classify_std("[[a]]"), Paragraph::Text(_)));
    }

    #[test]
    fn record_start() {
        match classify_std("Number 84-123-A") {
            Paragraph::RecordStart(a) => {
                assert_eq!(a.number(), "1984-123");
                assert_eq!(a.donation_type_id(), "1");
            }
            other => panic!("expected record start, got {:?}", other),
        }
    }

    #[test]
    fn malformed_start_is_not_a_record() {
        assert_eq!(
            classify_std("Number  of boxes: 12"),
            Paragraph::MalformedStart("Number of boxes: 12".to_string())
        );
    }

    #[test]
    fn number_inside_a_word_is_text() {
        assert!(matches!(classify_std("Numbered folders 1-4"), Paragraph::Text(_)));
    }

    #[test]
    fn address_keeps_raw_value() {
        assert_eq!(
            classify_std("City, State, Zip: Dallas,  TX 75201"),
            Paragraph::Address {
                raw: "Dallas,  TX 75201".to_string()
            }
        );
    }

    #[test]
    fn field_with_and_without_colon() {
        assert_eq!(
            classify_std("Quantity: 3 boxes"),
            Paragraph::Field {
                label: "Quantity".to_string(),
                value: "3 boxes".to_string()
            }
        );
        assert_eq!(
            classify_std("Quantity 3 boxes"),
            Paragraph::Field {
                label: "Quantity".to_string(),
                value: "3 boxes".to_string()
            }
        );
    }

    #[test]
    fn field_value_whitespace_is_collapsed() {
        assert_eq!(
            classify_std("Scope and Content Note: Letters  from\tthe   clerk "),
            Paragraph::Field {
                label: "Scope and Content Note".to_string(),
                value: "Letters from the clerk".to_string()
            }
        );
    }

    #[test]
    fn address_raw_value_is_not_collapsed() {
        assert_eq!(
            classify_std("City, State, Zip: El  Paso   TX"),
            Paragraph::Address {
                raw: "El  Paso   TX".to_string()
            }
        );
    }

    #[test]
    fn title_case_field_is_normalized() {
        assert_eq!(
            classify_std("Donor: JOHN AND MARY SMITH"),
            Paragraph::Field {
                label: "Donor".to_string(),
                value: "John and Mary Smith".to_string()
            }
        );
    }

    #[test]
    fn legacy_grammar_keeps_case() {
        let g = FieldGrammar::for_variant(GrammarVariant::Legacy);
        assert_eq!(
            classify("Donor: JOHN SMITH", &g),
            Paragraph::Field {
                label: "Donor".to_string(),
                value: "JOHN SMITH".to_string()
            }
        );
    }

    #[test]
    fn unlabeled_text_is_collapsed() {
        assert_eq!(
            classify_std("  letters   and\tclippings "),
            Paragraph::Text("letters and clippings".to_string())
        );
    }
}
