//! SAST REST API collaborator
//!
//! Fetches the engine server list and the scan queue, and keeps the bearer
//! credential those calls need. Wire records are validated here and handed
//! on as typed snapshots.

pub mod api;
pub mod client;
pub mod error;
pub mod token;
pub mod types;

pub use error::{SastError, SastResult};
