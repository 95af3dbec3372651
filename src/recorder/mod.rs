//! # Channel Stream Recorder
//!
//! Writes decoded snapshots to JSONL (JSON Lines) files with rotation.
//!
//! This module handles:
//! - Formatting snapshots as one JSON object per line
//! - Rotating files after a configured number of records
//! - Retaining only the most recent files

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::config::RecorderConfig;
use crate::error::Result;
use crate::ibus::protocol::ChannelSnapshot;

/// One JSONL record: wall-clock receive time plus the snapshot fields
#[derive(Debug, Serialize)]
struct SnapshotRecord<'a> {
    timestamp: String,
    #[serde(flatten)]
    snapshot: &'a ChannelSnapshot,
}

/// Appends snapshots to rotating JSONL files in the configured directory.
///
/// File names embed the UTC open time plus a sequence number, so
/// lexicographic order is rotation order and pruning can drop the oldest.
pub struct SnapshotRecorder {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    current: Option<File>,
    records_in_current: usize,
    file_seq: u64,
}

impl std::fmt::Debug for SnapshotRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotRecorder")
            .field("dir", &self.dir)
            .field("records_in_current", &self.records_in_current)
            .finish_non_exhaustive()
    }
}

impl SnapshotRecorder {
    /// Create the log directory; the first file is opened lazily on the
    /// first record
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(config: &RecorderConfig) -> Result<Self> {
        fs::create_dir_all(&config.log_dir)?;

        Ok(Self {
            dir: PathBuf::from(&config.log_dir),
            max_records_per_file: config.max_records_per_file,
            max_files_to_keep: config.max_files_to_keep,
            current: None,
            records_in_current: 0,
            file_seq: 0,
        })
    }

    /// Append one snapshot as a JSON line, rotating when the file is full
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the file write fails
    pub fn append(&mut self, snapshot: &ChannelSnapshot) -> Result<()> {
        if self.current.is_none() || self.records_in_current >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = SnapshotRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            snapshot,
        };
        let line = serde_json::to_string(&record)?;

        if let Some(file) = self.current.as_mut() {
            writeln!(file, "{}", line)?;
            self.records_in_current += 1;
        }

        Ok(())
    }

    /// Open the next log file and prune old ones
    fn rotate(&mut self) -> Result<()> {
        self.file_seq += 1;
        let name = format!(
            "channels-{}-{:04}.jsonl",
            Utc::now().format("%Y%m%d-%H%M%S"),
            self.file_seq
        );
        let path = self.dir.join(name);

        debug!("Opening channel log file {}", path.display());
        self.current = Some(File::create(&path)?);
        self.records_in_current = 0;

        self.prune()?;
        Ok(())
    }

    /// Delete the oldest log files beyond the retention limit
    fn prune(&self) -> Result<()> {
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "jsonl"))
            .collect();
        logs.sort();

        while logs.len() > self.max_files_to_keep {
            let oldest = logs.remove(0);
            debug!("Pruning channel log file {}", oldest.display());
            fs::remove_file(oldest)?;
        }

        Ok(())
    }
}
