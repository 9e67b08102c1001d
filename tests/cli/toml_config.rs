//! Configuration file discovery, parsing and validation

use std::io::Write;
use std::path::PathBuf;

use sastwatch::app::cli::api::{Args, ConfigError, Settings};
use sastwatch::core::error_handling::ContextualError;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn args_for(file: &tempfile::NamedTempFile) -> Args {
    Args {
        config_file: Some(file.path().to_path_buf()),
        ..Args::default()
    }
}

#[tokio::test]
async fn test_complete_file() {
    let file = config_file(
        r#"
hostname = "https://sast.example.com"
username = "monitor"
password = "secret"
listen-address = "127.0.0.1"
listen-port = 9701
token-ttl = 900
request-timeout = 15
accept-invalid-certs = false
log-level = "debug"
log-file = "-"
"#,
    );

    let settings = Settings::load(&args_for(&file)).await.unwrap();

    assert_eq!(settings.listen_address, "127.0.0.1");
    assert_eq!(settings.listen_port, 9701);
    assert_eq!(settings.token_ttl, 900);
    assert_eq!(settings.request_timeout, 15);
    assert!(!settings.accept_invalid_certs);
    assert_eq!(settings.log_level, "debug");
    assert_eq!(settings.log_file, None);
    assert!(settings.validate().is_ok());
}

#[tokio::test]
async fn test_missing_named_file() {
    let args = Args {
        config_file: Some(PathBuf::from("/nonexistent/dir/sastwatch.toml")),
        ..Args::default()
    };

    let err = Settings::load(&args).await.unwrap_err();

    assert!(matches!(err, ConfigError::NotFound { .. }));
    assert!(err.is_user_actionable());
}

#[tokio::test]
async fn test_malformed_file() {
    let file = config_file("hostname = \"unterminated\n");

    let err = Settings::load(&args_for(&file)).await.unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.user_message().is_some());
}

#[tokio::test]
async fn test_incomplete_file_fails_validation() {
    let file = config_file("hostname = \"sast.example.com\"\nlisten-port = 0\n");

    let settings = Settings::load(&args_for(&file)).await.unwrap();
    let err = settings.validate().unwrap_err();

    match err {
        ConfigError::Invalid { problems, .. } => {
            assert_eq!(problems.len(), 3);
            assert!(problems.iter().any(|p| p.ends_with("(username)")));
            assert!(problems.iter().any(|p| p.ends_with("(password)")));
            assert!(problems.iter().any(|p| p.ends_with("(listen-port)")));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_default_path_location() {
    if let Some(path) = sastwatch::app::cli::api::default_config_path() {
        assert!(path.ends_with("Sastwatch/sastwatch.toml"));
    }
}
