//! Renderer module
//!
//! Renders match records as they arrive, in `line` or `jsonl` format, and
//! defines the sinks the walker emits into.

use crate::core::model::MatchRecord;
use crate::core::paths::display_path;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `<worker> : <name> : <path>`
    #[default]
    Line,
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" | "text" => Ok(OutputFormat::Line),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Renders single records
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    format: OutputFormat,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render one record, without a trailing newline
    pub fn render(&self, record: &MatchRecord) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Line => Ok(format!(
                "{} : {} : {}",
                record.worker_id,
                record.name,
                display_path(&record.path)
            )),
            OutputFormat::Jsonl => serde_json::to_string(record),
        }
    }
}

/// Destination for matches. Called concurrently from every worker.
pub trait MatchSink: Send + Sync {
    fn emit(&self, record: MatchRecord);
}

/// Writes each record as one line to a writer (stdout in the binary)
pub struct WriterSink<W: Write + Send> {
    renderer: Renderer,
    writer: Mutex<W>,
    failed: AtomicBool,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            renderer: Renderer::new(format),
            writer: Mutex::new(writer),
            failed: AtomicBool::new(false),
        }
    }

    /// Recover the writer to inspect its buffer
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> MatchSink for WriterSink<W> {
    fn emit(&self, record: MatchRecord) {
        let mut line = match self.renderer.render(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!(path = %display_path(&record.path), error = %e, "cannot render match");
                return;
            }
        };
        line.push('\n');

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let result = writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.flush());

        // A closed pipe fails every write after the first; report it once
        if let Err(e) = result {
            if !self.failed.swap(true, Ordering::Relaxed) {
                debug!(error = %e, "failed to write match");
            }
        }
    }
}

/// Keeps every record in memory
#[cfg(test)]
#[derive(Default)]
pub struct CollectSink {
    records: Mutex<Vec<MatchRecord>>,
}

#[cfg(test)]
impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
impl MatchSink for CollectSink {
    fn emit(&self, record: MatchRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }
}
