//! TOML configuration file loading and effective settings
//!
//! Settings are built from defaults, then the configuration file, then the
//! command line. Validation reports every problem at once.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::logging::LogFormat;
use crate::sast::api::{SastSettings, DEFAULT_TOKEN_TTL_SECS};

use super::args::Args;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 9700;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_TOKEN_TTL_SECS: u64 = 100 * 365 * 24 * 3600;

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Cannot read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse configuration file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{summary}")]
    Invalid {
        problems: Vec<String>,
        summary: String,
    },
}

impl ConfigError {
    fn invalid(problems: Vec<String>) -> Self {
        let summary = problems.join("; ");
        ConfigError::Invalid { problems, summary }
    }
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ConfigError::NotFound { .. }
            | ConfigError::Parse { .. }
            | ConfigError::Invalid { .. } => true,
            ConfigError::Read { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::NotFound { .. } => {
                Some("The specified configuration file does not exist (config-file)")
            }
            ConfigError::Parse { message, .. } => Some(message),
            ConfigError::Invalid { summary, .. } => Some(summary),
            ConfigError::Read { .. } => None,
        }
    }
}

/// Effective exporter settings
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub listen_address: String,
    pub listen_port: u16,
    pub token_ttl: u64,
    pub request_timeout: u64,
    pub accept_invalid_certs: bool,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub log_format: LogFormat,
    /// `None` means color when stdout is a terminal
    pub color: Option<bool>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("listen_address", &self.listen_address)
            .field("listen_port", &self.listen_port)
            .field("token_ttl", &self.token_ttl)
            .field("request_timeout", &self.request_timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("log_format", &self.log_format)
            .field("color", &self.color)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            username: String::new(),
            password: String::new(),
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            token_ttl: DEFAULT_TOKEN_TTL_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            accept_invalid_certs: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            log_format: LogFormat::Text,
            color: None,
        }
    }
}

impl Settings {
    /// Build settings from the configuration file and the command line
    pub async fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(path) = resolve_config_path(args.config_file.as_deref())? {
            let config = read_config_file(&path).await?;
            settings.apply_toml_values(&config, &path)?;
        }
        settings.apply_args(args);
        Ok(settings)
    }

    /// Apply TOML configuration values
    pub fn apply_toml_values(&mut self, config: &toml::Table, path: &Path) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if let Some(v) = string_value(config, "hostname", &mut problems) {
            self.hostname = v;
        }
        if let Some(v) = string_value(config, "username", &mut problems) {
            self.username = v;
        }
        if let Some(v) = string_value(config, "password", &mut problems) {
            self.password = v;
        }
        if let Some(v) = string_value(config, "listen-address", &mut problems) {
            self.listen_address = v;
        }
        if let Some(v) = integer_value(config, "listen-port", &mut problems) {
            match u16::try_from(v) {
                Ok(port) => self.listen_port = port,
                Err(_) => problems.push(format!("listen-port {} is out of range", v)),
            }
        }
        if let Some(v) = integer_value(config, "token-ttl", &mut problems) {
            match u64::try_from(v) {
                Ok(secs) => self.token_ttl = secs,
                Err(_) => problems.push(format!("token-ttl {} must not be negative", v)),
            }
        }
        if let Some(v) = integer_value(config, "request-timeout", &mut problems) {
            match u64::try_from(v) {
                Ok(secs) => self.request_timeout = secs,
                Err(_) => problems.push(format!("request-timeout {} must not be negative", v)),
            }
        }
        if let Some(v) = bool_value(config, "accept-invalid-certs", &mut problems) {
            self.accept_invalid_certs = v;
        }
        if let Some(v) = string_value(config, "log-level", &mut problems) {
            self.log_level = v;
        }
        if let Some(v) = string_value(config, "log-file", &mut problems) {
            self.log_file = log_file_value(&v);
        }
        if let Some(v) = string_value(config, "log-format", &mut problems) {
            match <LogFormat as clap::ValueEnum>::from_str(&v, true) {
                Ok(format) => self.log_format = format,
                Err(_) => problems.push(format!("log-format '{}' is not one of text, ext, json", v)),
            }
        }
        if let Some(v) = bool_value(config, "color", &mut problems) {
            self.color = Some(v);
        }
        if let Some(v) = bool_value(config, "no-color", &mut problems) {
            self.color = Some(!v);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Parse {
                path: path.to_path_buf(),
                message: problems.join("; "),
            })
        }
    }

    /// Apply command-line overrides
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(v) = &args.hostname {
            self.hostname.clone_from(v);
        }
        if let Some(v) = &args.username {
            self.username.clone_from(v);
        }
        if let Some(v) = &args.password {
            self.password.clone_from(v);
        }
        if let Some(v) = &args.listen_address {
            self.listen_address.clone_from(v);
        }
        if let Some(v) = args.listen_port {
            self.listen_port = v;
        }
        if let Some(v) = args.token_ttl {
            self.token_ttl = v;
        }
        if let Some(v) = args.request_timeout {
            self.request_timeout = v;
        }
        if let Some(v) = args.accept_invalid_certs {
            self.accept_invalid_certs = v;
        }
        if let Some(v) = &args.log_level {
            self.log_level.clone_from(v);
        }
        if let Some(v) = &args.log_file {
            self.log_file = log_file_value(&v.to_string_lossy());
        }
        if let Some(v) = args.log_format {
            self.log_format = v;
        }
        if let Some(v) = args.color_override() {
            self.color = Some(v);
        }
    }

    /// Check required values, collecting every problem
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.hostname.trim().is_empty() {
            problems.push("Missing SAST host name in configuration (hostname)".to_string());
        }
        if self.username.trim().is_empty() {
            problems.push("Missing SAST user name in configuration (username)".to_string());
        }
        if self.password.is_empty() {
            problems.push("Missing SAST user credentials in configuration (password)".to_string());
        }
        if self.listen_port == 0 {
            problems.push("Missing prometheus exporter port in configuration (listen-port)".to_string());
        }
        if self.token_ttl == 0 {
            problems.push("Token lifetime must be at least one second (token-ttl)".to_string());
        }
        if self.request_timeout == 0 {
            problems.push("Request timeout must be at least one second (request-timeout)".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::invalid(problems))
        }
    }

    /// Connection settings for the SAST client
    pub fn sast_settings(&self) -> SastSettings {
        SastSettings {
            hostname: self.hostname.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            request_timeout: Duration::from_secs(self.request_timeout),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        // Anything past a century is effectively "never expires"
        chrono::Duration::seconds(self.token_ttl.min(MAX_TOKEN_TTL_SECS) as i64)
    }
}

/// Pick the configuration file: the named one, else the default if present
pub fn resolve_config_path(config_file: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match config_file {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        }),
        None => Ok(default_config_path().filter(|path| path.exists())),
    }
}

/// `<config dir>/Sastwatch/sastwatch.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Sastwatch").join("sastwatch.toml"))
}

async fn read_config_file(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str::<toml::Table>(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

// "none" and "-" disable file logging
fn log_file_value(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value.eq_ignore_ascii_case("none") || value == "-" {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn string_value(config: &toml::Table, key: &str, problems: &mut Vec<String>) -> Option<String> {
    let value = config.get(key)?;
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            problems.push(format!("{} must be a string", key));
            None
        }
    }
}

fn integer_value(config: &toml::Table, key: &str, problems: &mut Vec<String>) -> Option<i64> {
    let value = config.get(key)?;
    match value.as_integer() {
        Some(i) => Some(i),
        None => {
            problems.push(format!("{} must be an integer", key));
            None
        }
    }
}

fn bool_value(config: &toml::Table, key: &str, problems: &mut Vec<String>) -> Option<bool> {
    let value = config.get(key)?;
    match value.as_bool() {
        Some(b) => Some(b),
        None => {
            problems.push(format!("{} must be true or false", key));
            None
        }
    }
}
