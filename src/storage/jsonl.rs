//! JSONL (JSON Lines) event log.
//!
//! The event log is the source of truth for battle history: one battle or
//! tournament event per line, oldest first. Replaying it rebuilds the database.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::StorageError;
use crate::aggregate::LoggedEvent;

/// Append-only log of battle and tournament events.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn open_for_append(&self) -> Result<BufWriter<File>, StorageError> {
        self.ensure_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(BufWriter::new(file))
    }

    /// Append a single event.
    pub fn append(&self, event: &LoggedEvent) -> Result<(), StorageError> {
        let mut writer = self.open_for_append()?;
        writeln!(writer, "{}", serde_json::to_string(event)?)?;
        writer.flush()?;

        debug!("Appended {:?} event to {:?}", kind(event), self.path);
        Ok(())
    }

    /// Read every event. A missing log is empty; unparseable lines are skipped.
    pub fn read_all(&self) -> Result<Vec<LoggedEvent>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut events = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(
                        "Skipping line {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} events from {:?}", events.len(), self.path);
        Ok(events)
    }
}

fn kind(event: &LoggedEvent) -> &'static str {
    match event {
        LoggedEvent::Battle(_) => "battle",
        LoggedEvent::Tournament(_) => "tournament",
    }
}
