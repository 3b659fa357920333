use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("label {0:?} appears more than once in the catalog")]
    DuplicateLabel(String),

    #[error("required label {0:?} is missing from the catalog")]
    MissingLabel(String),

    #[error("label {later:?} can never match: {earlier:?} is listed first")]
    ShadowedLabel { earlier: String, later: String },
}

/// Failures of the I/O shims around the extractor. Extraction itself
/// never fails.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a readable .docx archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("unsupported input {0:?}")]
    UnsupportedInput(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
