//! Engine Slot Cache
//!
//! Tracks every concurrency slot of every SAST engine and which scan, if any,
//! currently occupies it. Slots are keyed by (engine id, slot index) and are
//! reconciled against each new engine list and scan queue.

pub mod api;
pub mod cache;
pub mod slot;

#[cfg(test)]
mod tests;
