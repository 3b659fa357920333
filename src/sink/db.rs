use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use super::RecordSink;
use crate::error::Result;
use crate::parser::records::Record;

pub const DEFAULT_TABLE: &str = "accessions";

/// One wide table per grammar: an id, the source document, the record's
/// ordinal within it, then one TEXT column per output column.
pub struct SqliteSink {
    conn: Connection,
    table: String,
    document: String,
}

impl SqliteSink {
    pub fn open(path: &Path, table: &str, document: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(SqliteSink::new(conn, table, document))
    }

    pub fn new(conn: Connection, table: &str, document: &str) -> Self {
        SqliteSink {
            conn,
            table: table.to_string(),
            document: document.to_string(),
        }
    }

    #[cfg(test)]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn init_schema(&self, columns: &[String]) -> Result<()> {
        let field_columns = columns
            .iter()
            .map(|c| format!("{} TEXT NOT NULL DEFAULT ''", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(",\n            ");
        self.conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
            id         INTEGER PRIMARY KEY,
            document   TEXT NOT NULL,
            ordinal    INTEGER NOT NULL,
            {field_columns},
            UNIQUE(document, ordinal)
            );
            CREATE INDEX IF NOT EXISTS {index} ON {table}(document);

            CREATE TABLE IF NOT EXISTS conversions (
                id           INTEGER PRIMARY KEY,
                document     TEXT NOT NULL,
                target_table TEXT NOT NULL,
                records      INTEGER NOT NULL,
                converted_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
            table = quote_ident(&self.table),
            index = quote_ident(&format!("idx_{}_document", self.table)),
        ))?;
        Ok(())
    }
}

impl RecordSink for SqliteSink {
    fn write_records(&mut self, columns: &[String], records: &[Record]) -> Result<usize> {
        self.init_schema(columns)?;

        let names = columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
        let placeholders = (3..columns.len() + 3)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT OR REPLACE INTO {} (document, ordinal, {}) VALUES (?1, ?2, {})",
            quote_ident(&self.table),
            names,
            placeholders
        );

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (ordinal, record) in records.iter().enumerate() {
                let ordinal = ordinal as i64 + 1;
                let row = record.row(columns);
                let mut values: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(row.len() + 2);
                values.push(&self.document);
                values.push(&ordinal);
                for v in &row {
                    values.push(v);
                }
                stmt.execute(values.as_slice())?;
            }
            tx.execute(
                "INSERT INTO conversions (document, target_table, records) VALUES (?1, ?2, ?3)",
                rusqlite::params![self.document, self.table, records.len() as i64],
            )?;
        }
        tx.commit()?;
        info!(table = %self.table, document = %self.document, rows = records.len(), "Saved records");
        Ok(records.len())
    }
}

/// Double-quoted SQL identifier; labels carry spaces, commas and `?`.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
