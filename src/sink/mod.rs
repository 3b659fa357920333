pub mod csv;
pub mod db;
pub mod json;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::parser::records::Record;

/// Serialized output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Csv,
    Json,
    Sqlite,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Sqlite => "sqlite",
        }
    }

    /// `output.{ext}` in the working directory.
    pub fn default_output(&self) -> PathBuf {
        PathBuf::from(format!("output.{}", self.extension()))
    }
}

/// Accepts sealed records under a fixed column header.
pub trait RecordSink {
    fn write_records(&mut self, columns: &[String], records: &[Record]) -> Result<usize>;
}

/// Write `records` to `path` in the chosen format. `document` names the
/// source in formats that keep provenance.
pub fn write_to_path(
    format: Format,
    path: &Path,
    table: &str,
    document: &str,
    columns: &[String],
    records: &[Record],
) -> Result<usize> {
    match format {
        Format::Csv => csv::CsvSink::create(path)?.write_records(columns, records),
        Format::Json => json::JsonSink::create(path)?.write_records(columns, records),
        Format::Sqlite => {
            db::SqliteSink::open(path, table, document)?.write_records(columns, records)
        }
    }
}
