//! Counters reported by a full-replace sync run.

use serde::Serialize;

use crate::types::Timestamp;

/// PostgreSQL advisory lock ID for sync runs.
/// Only one sync may replace the local mirror at a time.
pub const SYNC_LOCK_ID: i64 = 615_004_042;

/// Outcome counters of one sync run.
///
/// For a non-empty feed, `inserted + skipped + errors == fetched`.
/// `updated` is always zero: the local mirror is replaced, never patched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatistics {
    pub fetched: u64,
    pub inserted: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl SyncStatistics {
    /// Counters for a feed of `fetched` records, before any processing.
    pub fn for_feed(fetched: usize) -> Self {
        Self {
            fetched: fetched as u64,
            ..Self::default()
        }
    }

    /// Whether every fetched record was either inserted, skipped, or failed.
    pub fn is_balanced(&self) -> bool {
        self.inserted + self.skipped + self.errors == self.fetched
    }
}

/// Freshness summary of the local mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatistics {
    pub total_records: i64,
    pub last_sync: Option<Timestamp>,
    pub synced_today: i64,
    pub synced_this_week: i64,
    pub synced_this_month: i64,
}
