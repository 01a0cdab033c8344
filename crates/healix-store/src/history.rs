//! File-backed diagnosis history.
//!
//! One JSON object per line, appended under a mutex so concurrent diagnose
//! calls never interleave partial lines. Reads tolerate a torn or hand-edited
//! file: lines that fail to parse are skipped with a warning.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use healix_core::{HistoryEntry, HistorySink};
use tracing::{debug, info, warn};

use crate::StoreError;

/// Append-only JSON-lines history log.
#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
    writer: Mutex<()>,
}

impl HistoryLog {
    /// Open (or prepare to create) the log at `path`, creating parent
    /// directories as needed. The file itself appears on the first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.is_dir() {
            return Err(StoreError::NotAFile(path));
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        info!(path = %path.display(), "opened history log");
        Ok(Self {
            path,
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single line.
    pub fn append(&self, entry: &HistoryEntry) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.writer.lock().map_err(|_| StoreError::Poisoned)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        debug!(disease = %entry.disease, subject = ?entry.subject, "history entry appended");
        Ok(())
    }

    /// All entries, newest first. A log that does not exist yet is empty.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(line = n + 1, error = %e, "skipping malformed history line"),
            }
        }

        // Equal timestamps come out in reverse append order.
        entries.sort_by_key(|e| e.recorded_at);
        entries.reverse();
        Ok(entries)
    }

    /// Entries recorded for `subject`, newest first.
    pub fn entries_for(&self, subject: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut entries = self.entries()?;
        entries.retain(|e| e.subject.as_deref() == Some(subject));
        Ok(entries)
    }

    /// Entries recorded at or after `since`, newest first.
    pub fn entries_since(&self, since: DateTime<Utc>) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut entries = self.entries()?;
        entries.retain(|e| e.recorded_at >= since);
        Ok(entries)
    }
}

impl HistorySink for HistoryLog {
    fn record(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
        self.append(entry)?;
        Ok(())
    }
}
