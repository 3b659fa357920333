use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use super::RecordSink;
use crate::error::Result;
use crate::parser::records::Record;

/// Header row plus one row per record, every field quoted.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(CsvSink::new(File::create(path)?))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(inner);
        CsvSink { writer }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|_| panic!("flush failed"))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_records(&mut self, columns: &[String], records: &[Record]) -> Result<usize> {
        self.writer.write_record(columns)?;
        for record in records {
            self.writer.write_record(record.row(columns))?;
        }
        self.writer.flush()?;
        Ok(records.len())
    }
}
