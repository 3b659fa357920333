use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};

use super::RecordSink;
use crate::error::Result;
use crate::parser::records::Record;

/// Pretty-printed array of objects, one per record, every column present.
pub struct JsonSink<W: Write> {
    inner: W,
}

impl JsonSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(JsonSink::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(inner: W) -> Self {
        JsonSink { inner }
    }
}

pub fn to_value(columns: &[String], record: &Record) -> Value {
    let object: Map<String, Value> = columns
        .iter()
        .zip(record.row(columns))
        .map(|(c, v)| (c.clone(), Value::String(v.to_string())))
        .collect();
    Value::Object(object)
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn write_records(&mut self, columns: &[String], records: &[Record]) -> Result<usize> {
        let rows: Vec<Value> = records.iter().map(|r| to_value(columns, r)).collect();
        serde_json::to_writer_pretty(&mut self.inner, &rows)?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        Ok(rows.len())
    }
}
