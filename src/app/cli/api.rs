//! Public API exports for the CLI module

pub use crate::app::cli::args::Args;
pub use crate::app::cli::config::{default_config_path, resolve_config_path, ConfigError, Settings};
