use super::LogSink;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Appends row batches to `<directory>/<destination>.csv`.
///
/// The directory is created on first write. Files are only ever opened
/// in append mode; one pipeline run owns one destination, so rows
/// stay in ingestion order.
pub struct CsvLogSink {
    directory: PathBuf,
}

impl CsvLogSink {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Timestamp-derived destination id, stable for one run.
    pub fn run_destination() -> String {
        format!("acc_{}", chrono::Local::now().format("%Y%m%d-%H%M%S"))
    }
}

impl LogSink for CsvLogSink {
    fn append_rows(&mut self, destination: &str, rows: &[Vec<String>]) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(format!("{destination}.csv"));
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        let mut writer = csv::Writer::from_writer(file);
        for row in rows {
            writer
                .write_record(row)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        }
        writer.flush()
    }
}
