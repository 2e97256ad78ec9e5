//! Domain rules shared by every NIK confirmation crate.
//!
//! Nothing in here touches the network or the database, so the API server,
//! the sync job, and the operator CLI can all depend on it.

pub mod crypto;
pub mod display;
pub mod error;
pub mod hashing;
pub mod nik;
pub mod roles;
pub mod sync;
pub mod types;
