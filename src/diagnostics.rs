use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Append-only sink for classification trace lines. Implementations must
/// not fail: extraction keeps going whether or not a line was recorded.
pub trait Diagnostics {
    fn trace(&mut self, line: &str);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn trace(&mut self, line: &str) {
        (**self).trace(line);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for Box<D> {
    fn trace(&mut self, line: &str) {
        (**self).trace(line);
    }
}

pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn trace(&mut self, _line: &str) {}
}

/// Forwards every line to `tracing` at debug level.
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn trace(&mut self, line: &str) {
        debug!(target: "accession::trace", "{}", line);
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryDiagnostics {
    lines: Vec<String>,
}

#[cfg(test)]
impl MemoryDiagnostics {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[cfg(test)]
impl Diagnostics for MemoryDiagnostics {
    fn trace(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Trace file, truncated when opened and written one line per decision.
/// Lines are mirrored to `tracing`. The first write error is logged and
/// the file is dropped; later lines only reach `tracing`.
pub struct TraceFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl TraceFile {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut trace = TraceFile {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
        };
        let started = chrono::Local::now().to_rfc3339();
        trace.write_line(&format!("# trace started {}", started));
        Ok(trace)
    }

    /// Open the trace file, or fall back to `tracing` alone when the file
    /// cannot be created.
    pub fn open_or_tracing(path: &Path) -> Box<dyn Diagnostics + Send> {
        match TraceFile::create(path) {
            Ok(trace) => Box::new(trace),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "trace file unavailable, tracing only");
                Box::new(TracingDiagnostics)
            }
        }
    }

    fn write_line(&mut self, line: &str) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!(path = %self.path.display(), error = %e, "trace file write failed, disabling");
            self.writer = None;
        }
    }
}

impl Diagnostics for TraceFile {
    fn trace(&mut self, line: &str) {
        debug!(target: "accession::trace", "{}", line);
        self.write_line(line);
    }
}

impl Drop for TraceFile {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!(path = %self.path.display(), error = %e, "trace file flush failed");
            }
        }
    }
}
