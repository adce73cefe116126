pub mod csv_sink;

pub use csv_sink::CsvLogSink;

use std::io;

/// One data-log row: sample index, unix time, then the raw value
/// tokens of the record that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub index: u64,
    pub unixtime: f64,
    pub values: Vec<String>,
}

impl LogRow {
    pub fn into_record(self) -> Vec<String> {
        let mut record = Vec::with_capacity(2 + self.values.len());
        record.push(self.index.to_string());
        record.push(format!("{:.3}", self.unixtime));
        record.extend(self.values);
        record
    }
}

/// Append-only destination for batched log rows. A destination id maps
/// to one named sink target (e.g. one CSV file per run); concurrent
/// writers to the same destination are not supported.
pub trait LogSink: Send {
    fn append_rows(&mut self, destination: &str, rows: &[Vec<String>]) -> io::Result<()>;
}

/// Accumulates rows and hands them to the sink in batches.
///
/// The header row is written once at construction and never again.
/// `record` appends; once the pending count exceeds `flush_threshold`
/// the whole buffer is handed to the sink and cleared, so the sink
/// sees one call every `flush_threshold + 1` records.
pub struct LogBuffer {
    destination: String,
    flush_threshold: usize,
    rows: Vec<Vec<String>>,
    sink: Box<dyn LogSink>,
}

impl LogBuffer {
    pub fn new(
        mut sink: Box<dyn LogSink>,
        destination: String,
        labels: &[String],
        flush_threshold: usize,
    ) -> io::Result<Self> {
        let mut header = vec!["count".to_string(), "unixtime".to_string()];
        header.extend(labels.iter().cloned());
        sink.append_rows(&destination, &[header])?;

        Ok(Self {
            destination,
            flush_threshold: flush_threshold.max(1),
            rows: Vec::new(),
            sink,
        })
    }

    /// The sink target this buffer writes to, fixed for its lifetime.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn pending(&self) -> usize {
        self.rows.len()
    }

    pub fn record(&mut self, row: LogRow) -> io::Result<()> {
        self.rows.push(row.into_record());
        if self.rows.len() > self.flush_threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Drain everything still pending. No-op when empty.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }
        let batch: Vec<Vec<String>> = self.rows.drain(..).collect();
        self.sink.append_rows(&self.destination, &batch)
    }
}
