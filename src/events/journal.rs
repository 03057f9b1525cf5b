// Notification journal
// Append-only JSONL record of notifications for replay and debugging

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc::Receiver;

use super::types::Notification;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// One journaled notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// ISO 8601 timestamp
    pub timestamp: String,
    pub notification: Notification,
}

impl JournalEntry {
    pub fn new(notification: Notification) -> Self {
        JournalEntry {
            timestamp: Utc::now().to_rfc3339(),
            notification,
        }
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

pub struct Journal {
    file_path: PathBuf,
}

impl Journal {
    pub fn new(file_path: PathBuf) -> Self {
        Journal { file_path }
    }

    /// Append one entry, creating the file if needed
    pub fn write(&self, entry: &JournalEntry) -> Result<(), JournalError> {
        self.write_batch(std::slice::from_ref(entry))
    }

    pub fn write_batch(&self, entries: &[JournalEntry]) -> Result<(), JournalError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        for entry in entries {
            file.write_all(entry.to_json_line()?.as_bytes())?;
        }

        file.flush()?;
        Ok(())
    }

    /// Drain whatever is queued on `rx` without waiting; returns the count written
    pub fn record_pending(
        &self,
        rx: &mut Receiver<Notification>,
    ) -> Result<usize, JournalError> {
        let mut entries = Vec::new();
        while let Ok(notification) = rx.try_recv() {
            entries.push(JournalEntry::new(notification));
        }
        if !entries.is_empty() {
            self.write_batch(&entries)?;
        }
        Ok(entries.len())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read every entry from a JSONL journal
pub fn read_journal(path: &Path) -> Result<Vec<JournalEntry>, JournalError> {
    let contents = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(line)?);
    }

    Ok(entries)
}
