//! Command-line arguments and configuration file handling

pub mod api;
pub mod args;
pub mod config;
