//! Command-line flags and their precedence over the configuration file

use clap::Parser;
use std::io::Write;

use sastwatch::app::cli::api::{Args, Settings};
use sastwatch::core::logging::LogFormat;

#[tokio::test]
async fn test_command_line_only_configuration() {
    let args = Args::try_parse_from([
        "sastwatch",
        "--hostname",
        "sast.example.com",
        "--username",
        "monitor",
        "--password",
        "secret",
    ])
    .unwrap();

    let settings = Settings::load(&args).await.unwrap();

    assert_eq!(settings.hostname, "sast.example.com");
    assert_eq!(settings.listen_port, 9700);
    assert!(settings.validate().is_ok());
}

#[tokio::test]
async fn test_flags_override_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
hostname = "file-host"
username = "file-user"
password = "file-pass"
listen-port = 9800
log-format = "ext"
"#
    )
    .unwrap();
    let path = file.path().to_string_lossy().to_string();

    let args = Args::try_parse_from([
        "sastwatch",
        "--config-file",
        path.as_str(),
        "--hostname",
        "cli-host",
        "--log-format",
        "json",
    ])
    .unwrap();
    let settings = Settings::load(&args).await.unwrap();

    assert_eq!(settings.hostname, "cli-host");
    assert_eq!(settings.username, "file-user");
    assert_eq!(settings.listen_port, 9800);
    assert_eq!(settings.log_format, LogFormat::Json);
}

#[test]
fn test_version_flag_is_available() {
    let err = Args::try_parse_from(["sastwatch", "--version"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
}
