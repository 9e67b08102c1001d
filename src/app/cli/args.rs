//! Command-line arguments
//!
//! Every option can also be set in the TOML configuration file under the same
//! kebab-case name; values given here win.

use clap::Parser;
use std::path::PathBuf;

use crate::core::logging::LogFormat;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sastwatch")]
#[command(about = "Prometheus exporter for SAST scan engine workload")]
#[command(version = crate::core::version::long_version())]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// SAST host name, optionally with scheme and port
    #[arg(short = 'H', long = "hostname", value_name = "HOST")]
    pub hostname: Option<String>,

    /// SAST user name
    #[arg(short = 'u', long = "username", value_name = "USER")]
    pub username: Option<String>,

    /// SAST password
    #[arg(long = "password", value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Address the metrics endpoint binds to
    #[arg(short = 'a', long = "listen-address", value_name = "ADDRESS")]
    pub listen_address: Option<String>,

    /// Port the metrics endpoint listens on
    #[arg(short = 'p', long = "listen-port", value_name = "PORT")]
    pub listen_port: Option<u16>,

    /// Seconds a SAST credential is reused before logging on again
    #[arg(long = "token-ttl", value_name = "SECONDS")]
    pub token_ttl: Option<u64>,

    /// Seconds allowed per SAST REST request
    #[arg(long = "request-timeout", value_name = "SECONDS")]
    pub request_timeout: Option<u64>,

    /// Accept self-signed or otherwise invalid SAST certificates
    #[arg(
        long = "accept-invalid-certs",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub accept_invalid_certs: Option<bool>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Force colored console logs
    #[arg(short = 'g', long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored console logs
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Color override from the flags: `None` leaves it to config or terminal detection
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
