//! Transform reports in JSON or JSONL form.
//!
//! JSONL records stream out as they are written. JSON records are held
//! until [`ReportWriter::finish`] so they can be emitted as one array.

use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::types::OutputCodec;

/// Report serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array
    Json,
    /// One JSON object per line
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Result of transforming one source file.
#[derive(Debug, Clone, Serialize)]
pub struct TransformRecord {
    pub source: PathBuf,
    /// Canonical option string the transform ran with
    pub options: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// What happened to one source.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Ok {
        output: PathBuf,
        width: u32,
        height: u32,
        codec: OutputCodec,
        bytes: usize,
        /// BLAKE3 of the encoded output, hex
        blake3: String,
    },
    Failed {
        error: String,
    },
}

impl TransformRecord {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok { .. })
    }
}

/// Writes serializable records in the chosen format.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<serde_json::Value>,
    written: usize,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects JSON arrays; JSONL is always one line per record.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            written: 0,
        }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.writer.flush()?;
            }
            OutputFormat::Json => {
                let value = serde_json::to_value(record).map_err(io::Error::other)?;
                self.pending.push(value);
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Records accepted so far.
    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Emit any held JSON array and flush; returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &self.pending)
                    .map_err(io::Error::other)?;
            } else {
                serde_json::to_writer(&mut self.writer, &self.pending).map_err(io::Error::other)?;
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
