//! Session history persistence.
//!
//! The service records every session start, completion and skip through the
//! [`Storage`] trait. Writes are best effort: a failing backend is reported
//! through `tracing` and never interrupts the timer.

mod csv;
mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SessionStatus, SessionType};

pub use csv::CsvStorage;
pub use error::StorageError;

/// Backend for session history records.
pub trait Storage: Send + Sync {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written.
    fn log_session(
        &self,
        timestamp: DateTime<Utc>,
        session_type: SessionType,
        status: SessionStatus,
        duration_minutes: u32,
    ) -> Result<(), StorageError>;
}

/// One session history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp: DateTime<Utc>,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub duration_minutes: u32,
}

impl SessionRecord {
    /// Writes this record to `storage`.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    pub fn write_to(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        storage.log_session(
            self.timestamp,
            self.session_type,
            self.status,
            self.duration_minutes,
        )
    }
}

// ============================================================================
// MockStorage
// ============================================================================

/// In-memory storage for testing.
#[derive(Debug, Default)]
pub struct MockStorage {
    records: Mutex<Vec<SessionRecord>>,
    should_fail: AtomicBool,
}

impl MockStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn records(&self) -> Vec<SessionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Storage for MockStorage {
    fn log_session(
        &self,
        timestamp: DateTime<Utc>,
        session_type: SessionType,
        status: SessionStatus,
        duration_minutes: u32,
    ) -> Result<(), StorageError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("Mock failure".to_string()));
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SessionRecord {
                timestamp,
                session_type,
                status,
                duration_minutes,
            });
        Ok(())
    }
}
