use std::collections::BTreeMap;

use super::paragraphs::{classify, Paragraph};
use crate::address::{self, AddressParts};
use crate::diagnostics::Diagnostics;
use crate::grammar::{FieldGrammar, ADDRESS_LABEL, DONATION_TYPE_COLUMN, RECORD_START_LABEL};
use crate::text::join_spaced;

/// One accession record: field label → accumulated value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    pub fn set(&mut self, label: &str, value: impl Into<String>) {
        self.fields.insert(label.to_string(), value.into());
    }

    /// Append with one separating space, creating the field if absent.
    pub fn append(&mut self, label: &str, text: &str) -> &str {
        let entry = self.fields.entry(label.to_string()).or_default();
        *entry = join_spaced(entry, text);
        entry
    }

    fn set_address(&mut self, parts: AddressParts) {
        self.set("City", parts.city);
        self.set("State", parts.state);
        self.set("Zip", parts.zip);
        self.set("Address_Other", parts.other);
    }

    /// Values in column order; missing fields are empty.
    pub fn row<'a>(&'a self, columns: &[String]) -> Vec<&'a str> {
        columns.iter().map(|c| self.get(c).unwrap_or("")).collect()
    }
}

/// What a single paragraph turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ignored,
    RecordStart,
    FieldAssignment,
    Continuation,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    NoActiveRecord,
    BuildingRecord {
        record: Record,
        last_field: String,
    },
}

/// Paragraph-at-a-time record builder. Feed paragraphs in document order,
/// then call `finish` to seal the last record.
pub struct Extractor<'g, D: Diagnostics> {
    grammar: &'g FieldGrammar,
    diagnostics: D,
    state: State,
    records: Vec<Record>,
    seen: usize,
}

impl<'g, D: Diagnostics> Extractor<'g, D> {
    pub fn new(grammar: &'g FieldGrammar, diagnostics: D) -> Self {
        Extractor {
            grammar,
            diagnostics,
            state: State::NoActiveRecord,
            records: Vec::new(),
            seen: 0,
        }
    }

    pub fn feed(&mut self, raw: &str) -> Disposition {
        self.seen += 1;
        let text = raw.trim();
        self.diagnostics
            .trace(&format!("Processing paragraph {}: {}", self.seen, text));

        match classify(text, self.grammar) {
            Paragraph::Blank | Paragraph::SectionHeader | Paragraph::PageMarker => {
                Disposition::Ignored
            }
            Paragraph::RecordStart(accession) => {
                self.seal();
                let mut record = Record::default();
                let number = accession.number();
                let type_id = accession.donation_type_id();
                self.diagnostics
                    .trace(&format!("Found field: {} = {}", RECORD_START_LABEL, number));
                self.diagnostics
                    .trace(&format!("Found field: {} = {}", DONATION_TYPE_COLUMN, type_id));
                record.set(RECORD_START_LABEL, number);
                record.set(DONATION_TYPE_COLUMN, type_id);
                self.state = State::BuildingRecord {
                    record,
                    last_field: RECORD_START_LABEL.to_string(),
                };
                Disposition::RecordStart
            }
            Paragraph::MalformedStart(text) => {
                self.diagnostics
                    .trace(&format!("Warning: Unexpected Number format: {}", text));
                self.continuation(&text)
            }
            Paragraph::Address { raw } => self.assign_address(raw),
            Paragraph::Field { label, value } => self.assign(label, value),
            Paragraph::Text(text) => self.continuation(&text),
        }
    }

    pub fn finish(mut self) -> Vec<Record> {
        self.seal();
        self.diagnostics
            .trace(&format!("Total records found: {}", self.records.len()));
        self.records
    }

    fn seal(&mut self) {
        if let State::BuildingRecord { record, .. } = std::mem::take(&mut self.state) {
            self.records.push(record);
        }
    }

    fn assign(&mut self, label: String, value: String) -> Disposition {
        let State::BuildingRecord { record, last_field } = &mut self.state else {
            self.diagnostics
                .trace(&format!("Discarded field outside a record: {} = {}", label, value));
            return Disposition::Ignored;
        };
        self.diagnostics
            .trace(&format!("Found field: {} = {}", label, value));
        record.set(&label, value);
        *last_field = label;
        Disposition::FieldAssignment
    }

    fn assign_address(&mut self, raw: String) -> Disposition {
        let State::BuildingRecord { record, last_field } = &mut self.state else {
            self.diagnostics
                .trace(&format!("Discarded field outside a record: {} = {}", ADDRESS_LABEL, raw));
            return Disposition::Ignored;
        };
        self.diagnostics
            .trace(&format!("Found field: {} = {}", ADDRESS_LABEL, raw));
        let parts = address::split(&raw, self.grammar.address_split());
        trace_address(&mut self.diagnostics, &parts);
        record.set_address(parts);
        record.set(ADDRESS_LABEL, raw);
        *last_field = ADDRESS_LABEL.to_string();
        Disposition::FieldAssignment
    }

    fn continuation(&mut self, text: &str) -> Disposition {
        let State::BuildingRecord { record, last_field } = &mut self.state else {
            self.diagnostics
                .trace(&format!("Discarded continuation outside a record: {}", text));
            return Disposition::Ignored;
        };
        let extended = record.append(last_field, text).to_string();
        self.diagnostics
            .trace(&format!("Appended to {}: {}", last_field, text));
        if last_field.as_str() == ADDRESS_LABEL {
            let parts = address::split(&extended, self.grammar.address_split());
            trace_address(&mut self.diagnostics, &parts);
            record.set_address(parts);
        }
        Disposition::Continuation
    }
}

fn trace_address<D: Diagnostics>(diagnostics: &mut D, parts: &AddressParts) {
    diagnostics.trace(&format!("Found field: City = {}", parts.city));
    diagnostics.trace(&format!("Found field: State = {}", parts.state));
    diagnostics.trace(&format!("Found field: Zip = {}", parts.zip));
    diagnostics.trace(&format!("Found field: Address_Other = {}", parts.other));
}

/// Run a whole paragraph sequence through a fresh extractor.
pub fn extract_records<I, S, D>(paragraphs: I, grammar: &FieldGrammar, diagnostics: D) -> Vec<Record>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    D: Diagnostics,
{
    let mut extractor = Extractor::new(grammar, diagnostics);
    for paragraph in paragraphs {
        extractor.feed(paragraph.as_ref());
    }
    extractor.finish()
}

// ── Tests ──
