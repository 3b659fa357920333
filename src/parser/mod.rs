pub mod accession;
pub mod paragraphs;
pub mod records;

use crate::diagnostics::Diagnostics;
use crate::grammar::FieldGrammar;
use records::Record;

/// One sequential pass: each paragraph is classified and fed to the
/// record state machine in document order.
pub fn process_document<D: Diagnostics>(
    paragraphs: &[String],
    grammar: &FieldGrammar,
    diagnostics: D,
) -> Vec<Record> {
    records::extract_records(paragraphs, grammar, diagnostics)
}
