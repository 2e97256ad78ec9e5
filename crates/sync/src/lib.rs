//! Full-replace synchronization of the local NIK confirmation mirror.
//!
//! A run fetches the complete feed from the SAP gateway, deletes every
//! local row, and inserts the feed row by row. Runs are serialized with a
//! PostgreSQL advisory lock.

pub mod error;
pub mod job;

pub use error::SyncError;
pub use job::SyncJob;
