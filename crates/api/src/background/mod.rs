//! Background tasks.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn` and aborted on shutdown.

pub mod session_cleanup;
