// src/model/record.rs

//! Last-synchronization record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the most recent refresh attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// RFC 3339 time of the attempt
    pub timestamp: String,
    /// Human-readable failure, `None` on success
    pub error: Option<String>,
}

impl SyncRecord {
    pub fn now(error: Option<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            error,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Parsed timestamp, `None` if it is not valid RFC 3339
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
