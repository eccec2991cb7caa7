//! CSV file backed audit sink

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::types::AuditEvent;
use super::AuditSink;
use crate::error::{Error, Result};

/// Header line written to a fresh audit file
pub const CSV_HEADER: &str = "timestamp,imsi,action\n";

/// Append-only CSV audit log (one line per event, flushed on every write).
#[derive(Debug)]
pub struct CsvAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl CsvAuditSink {
    /// Open `path` for appending, creating it if needed.
    ///
    /// The header is written only when the file is empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| Error::AuditOpen {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;

        let len = file.metadata().map_err(open_err)?.len();
        if len == 0 {
            file.write_all(CSV_HEADER.as_bytes()).map_err(open_err)?;
            file.flush().map_err(open_err)?;
            debug!("Wrote audit header to {}", path.display());
        }

        info!("Audit log opened: {}", path.display());

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for CsvAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        let line = event.to_csv_line();

        let mut file = self.file.lock();
        file.write_all(line.as_bytes()).map_err(Error::AuditWrite)?;
        file.flush().map_err(Error::AuditWrite)?;
        Ok(())
    }
}
