//! CSV session log.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::{Storage, StorageError};
use crate::types::{SessionStatus, SessionType};

const DATA_DIR_NAME: &str = ".gopomodoro";
const LOG_FILE_NAME: &str = "sessions.log";
const CSV_HEADER: &str = "timestamp,session_type,event,duration_minutes";

/// Appends session records to a CSV file.
///
/// The parent directory and the header line are created on the first write,
/// so an unused storage leaves no trace on disk.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    path: PathBuf,
}

impl CsvStorage {
    /// Creates a storage writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a storage at `~/.gopomodoro/sessions.log`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoHomeDir`] if the home directory is unknown.
    pub fn default_location() -> Result<Self, StorageError> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Returns the default log path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoHomeDir`] if the home directory is unknown.
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let home = dirs::home_dir().ok_or(StorageError::NoHomeDir)?;
        Ok(home.join(DATA_DIR_NAME).join(LOG_FILE_NAME))
    }

    /// Returns the file this storage appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<(), StorageError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }
}

impl Storage for CsvStorage {
    fn log_session(
        &self,
        timestamp: DateTime<Utc>,
        session_type: SessionType,
        status: SessionStatus,
        duration_minutes: u32,
    ) -> Result<(), StorageError> {
        self.ensure_parent_dir()?;

        let needs_header = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StorageError::Open {
                path: self.path.clone(),
                source,
            })?;

        let mut buf = String::new();
        if needs_header {
            buf.push_str(CSV_HEADER);
            buf.push('\n');
        }
        buf.push_str(&format_line(timestamp, session_type, status, duration_minutes));
        buf.push('\n');
        file.write_all(buf.as_bytes())?;

        debug!(path = %self.path.display(), %session_type, %status, "session logged");
        Ok(())
    }
}

fn format_line(
    timestamp: DateTime<Utc>,
    session_type: SessionType,
    status: SessionStatus,
    duration_minutes: u32,
) -> String {
    format!(
        "{},{},{},{}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        session_type.as_str(),
        status.as_str(),
        duration_minutes
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line(timestamp(), SessionType::ShortBreak, SessionStatus::Completed, 5),
            "2025-01-15T09:30:00Z,short_break,completed,5"
        );
    }

    #[test]
    fn test_first_write_creates_dir_and_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("sessions.log");
        let storage = CsvStorage::new(&path);

        storage
            .log_session(timestamp(), SessionType::Work, SessionStatus::Started, 0)
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "timestamp,session_type,event,duration_minutes\n\
             2025-01-15T09:30:00Z,work,started,0\n"
        );
    }

    #[test]
    fn test_appends_without_repeating_header() {
        let dir = TempDir::new().unwrap();
        let storage = CsvStorage::new(dir.path().join("sessions.log"));

        storage
            .log_session(timestamp(), SessionType::Work, SessionStatus::Started, 0)
            .unwrap();
        storage
            .log_session(timestamp(), SessionType::Work, SessionStatus::Completed, 25)
            .unwrap();
        storage
            .log_session(timestamp(), SessionType::ShortBreak, SessionStatus::Skipped, 2)
            .unwrap();

        let contents = fs::read_to_string(storage.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[2], "2025-01-15T09:30:00Z,work,completed,25");
        assert_eq!(lines[3], "2025-01-15T09:30:00Z,short_break,skipped,2");
    }

    #[test]
    fn test_existing_file_gets_no_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.log");
        fs::write(&path, "").unwrap();

        CsvStorage::new(&path)
            .log_session(timestamp(), SessionType::LongBreak, SessionStatus::Completed, 15)
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2025-01-15T09:30:00Z,long_break,completed,15\n"
        );
    }

    #[test]
    fn test_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let storage = CsvStorage::new(blocker.join("sessions.log"));
        let result = storage.log_session(timestamp(), SessionType::Work, SessionStatus::Started, 0);
        assert!(matches!(result, Err(StorageError::CreateDir { .. })));
    }

    #[test]
    fn test_default_path() {
        if let Ok(path) = CsvStorage::default_path() {
            assert!(path.ends_with(".gopomodoro/sessions.log"));
        }
    }
}
