//! Durable key-value storage in the data directory.
//!
//! # Directory Structure
//!
//! ```text
//! <data dir>/
//!   assignments.json        # JSON array of assignments
//!   assignments.json.lock   # Advisory lock for read-modify-write cycles
//!   theme                   # "dark" or "light"
//!   permission              # "granted", "denied" or "default"
//!   config.toml             # Optional configuration
//! ```
//!
//! The data directory is `--data-dir`, else `$ASSIGNMATE_DIR`, else the
//! platform data directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::assignment::Assignment;
use crate::error::{Error, Result};
use crate::lock::{self, DataLock, LOCK_TIMEOUT};

pub const ASSIGNMENTS_KEY: &str = "assignments.json";
pub const THEME_KEY: &str = "theme";
pub const PERMISSION_KEY: &str = "permission";
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ASSIGNMATE_DIR";

#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the data directory from an explicit path, the environment, or
    /// the platform default.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = explicit {
            return Ok(Self::new(dir));
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(Self::new(dir.trim()));
            }
        }
        let dirs = ProjectDirs::from("com", "assignmate", "assignmate").ok_or(Error::NoDataDir)?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(key)
    }

    pub fn assignments_file(&self) -> PathBuf {
        self.entry_path(ASSIGNMENTS_KEY)
    }

    pub fn config_file(&self) -> PathBuf {
        self.entry_path(CONFIG_FILE)
    }

    /// Take the lock guarding the assignment collection.
    pub fn lock_assignments(&self) -> Result<DataLock> {
        DataLock::for_file(&self.assignments_file(), LOCK_TIMEOUT)
    }

    /// Load the collection. Absent or malformed data yields an empty list.
    pub fn load_assignments(&self) -> Vec<Assignment> {
        let path = self.assignments_file();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved assignments");
                return Vec::new();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read assignments; starting empty");
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<Assignment>>(&content) {
            Ok(assignments) => assignments,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "malformed assignments data; starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize and atomically write the full collection.
    pub fn save_assignments(&self, assignments: &[Assignment]) -> Result<()> {
        let json = serde_json::to_string_pretty(assignments)?;
        lock::replace_file(&self.assignments_file(), json.as_bytes())?;
        debug!(count = assignments.len(), "saved assignments");
        Ok(())
    }

    /// Read a small text entry, trimmed. Missing or unreadable entries are `None`.
    pub fn read_entry(&self, key: &str) -> Option<String> {
        let value = fs::read_to_string(self.entry_path(key)).ok()?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn write_entry(&self, key: &str, value: &str) -> Result<()> {
        lock::replace_file(&self.entry_path(key), format!("{value}\n").as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{AssignmentDraft, ReminderKind};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn sample(title: &str) -> Assignment {
        Assignment::new(AssignmentDraft {
            title: title.to_string(),
            subject: "History".to_string(),
            due_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
            notes: Some("chapter 4".to_string()),
            reminders: BTreeSet::from([ReminderKind::AtDueDate, ReminderKind::OneDayBefore]),
        })
    }

    #[test]
    fn entry_paths_live_in_data_dir() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        assert_eq!(storage.assignments_file(), temp.path().join("assignments.json"));
        assert_eq!(storage.config_file(), temp.path().join("config.toml"));
        assert_eq!(storage.entry_path(THEME_KEY), temp.path().join("theme"));
    }

    #[test]
    fn explicit_dir_wins() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::resolve(Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(storage.data_dir(), temp.path());
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("fresh"));
        assert!(storage.load_assignments().is_empty());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        fs::write(storage.assignments_file(), "{ not json").unwrap();
        assert!(storage.load_assignments().is_empty());

        fs::write(storage.assignments_file(), r#"{"id": "object not array"}"#).unwrap();
        assert!(storage.load_assignments().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_records() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        let mut records = vec![sample("Essay"), sample("Lab report"), sample("Quiz prep")];
        records[1].is_completed = true;
        records[2].last_notified.mark(ReminderKind::OneDayBefore);

        storage.save_assignments(&records).unwrap();
        assert_eq!(storage.load_assignments(), records);
    }

    #[test]
    fn entries_round_trip_trimmed() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        assert_eq!(storage.read_entry(THEME_KEY), None);
        storage.write_entry(THEME_KEY, "dark").unwrap();
        assert_eq!(storage.read_entry(THEME_KEY).as_deref(), Some("dark"));
    }
}
