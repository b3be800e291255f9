//! Report output as a JSON array or JSON Lines.
//!
//! JSONL reports are written as soon as they arrive. JSON reports are held
//! until [`OutputWriter::finish`] so they can be emitted as a single array
//! (or a bare object when there is exactly one).

use serde::Serialize;
use std::io::{self, Write};

use crate::types::ResizeReport;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object, or an array for several reports
    Json,
    /// One JSON object per line (newline-delimited JSON)
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

/// Writes [`ResizeReport`]s in the chosen format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<ResizeReport>,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSONL is always one line per report.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
        }
    }

    /// Record one report.
    pub fn write(&mut self, report: &ResizeReport) -> io::Result<()> {
        match self.format {
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, report).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
            OutputFormat::Json => self.pending.push(report.clone()),
        }
        Ok(())
    }

    /// Flush buffered JSON reports and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json && !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            if let [single] = pending.as_slice() {
                self.emit_json(single)?;
            } else {
                self.emit_json(&pending)?;
            }
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn emit_json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, value).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, value).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::Orientation;
    use std::path::PathBuf;

    fn report(name: &str) -> ResizeReport {
        ResizeReport {
            source: PathBuf::from(name),
            format: "png".to_string(),
            original_width: 10,
            original_height: 5,
            orientation: Orientation::Other,
            planned_width: 10.0,
            planned_height: 5.0,
            width: 10,
            height: 5,
            scaled: false,
            rotated: false,
            output_size: 64,
            output_path: None,
        }
    }

    #[test]
    fn test_jsonl_streams_lines() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::JsonLines, true);
        writer.write(&report("a.png")).unwrap();
        // Streamed immediately, before finish
        assert!(!writer.writer.is_empty());
        writer.write(&report("b.png")).unwrap();

        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"source\":\"b.png\""));
    }

    #[test]
    fn test_json_single_is_object() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.write(&report("a.png")).unwrap();
        assert!(writer.writer.is_empty());

        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(output.starts_with('{'));
    }

    #[test]
    fn test_json_many_is_array() {
        let mut writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.write(&report("a.png")).unwrap();
        writer.write(&report("b.png")).unwrap();

        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim().ends_with(']'));
    }

    #[test]
    fn test_json_empty_writes_nothing() {
        let writer = OutputWriter::new(Vec::new(), OutputFormat::Json, false);
        assert!(writer.finish().unwrap().is_empty());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("ndjson"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("xml"), None);
    }
}
