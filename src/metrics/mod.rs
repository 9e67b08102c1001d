//! Metrics Emitter and scrape endpoint
//!
//! Turns the slot cache and classified scans into Prometheus gauges, one
//! collection pass per scrape.

pub mod api;
pub mod collector;
pub mod emitter;
pub mod error;
pub mod server;

#[cfg(test)]
mod tests;
