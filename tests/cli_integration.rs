//! CLI integration tests.
//!
//! These verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

use repl_bridge::cli::{parse_args_from, Args};
use repl_bridge::config::Config;
use repl_bridge::DialectKind;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("repl-bridge")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.dialect.is_none());
    assert!(result.program.is_none());
    assert!(result.timeout_secs.is_none());
    assert!(result.host.is_none());
    assert!(result.port.is_none());
    assert!(result.config.is_none());
    assert!(!result.no_auth);
}

#[test]
fn test_cli_exec_mode() {
    let result = parse_args_from(args(&[
        "--dialect",
        "posix",
        "--timeout",
        "20",
        "--exec",
        "echo one",
        "--exec",
        "echo two",
        "--json",
    ]))
    .unwrap();

    assert_eq!(result.dialect, Some(DialectKind::Posix));
    assert_eq!(result.timeout_secs, Some(20));
    assert_eq!(result.exec, vec!["echo one", "echo two"]);
    assert!(result.json);
}

#[test]
fn test_cli_serve_mode() {
    let result = parse_args_from(args(&[
        "--serve",
        "--host",
        "0.0.0.0",
        "--port",
        "8080",
        "--api-key",
        "secret",
        "--log-level",
        "debug",
    ]))
    .unwrap();

    assert!(result.serve);
    assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
    assert_eq!(result.port, Some(8080));
    assert_eq!(result.api_key.as_deref(), Some("secret"));
    assert_eq!(result.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_cli_invalid_values() {
    assert!(parse_args_from(args(&["-H", "localhost"])).is_err());
    assert!(parse_args_from(args(&["-p", "70000"])).is_err());
    assert!(parse_args_from(args(&["-t", "0"])).is_err());
    assert!(parse_args_from(args(&["--unknown"])).is_err());
}

#[test]
fn test_cli_serve_and_exec_conflict() {
    assert!(parse_args_from(args(&["-e", "ls", "--serve"])).is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_load_from_file() {
    let file = config_file(
        r#"{
            "interpreter": { "dialect": "posix", "working_dir": "/tmp" },
            "server": { "port": 4040 },
            "security": { "auth": { "enabled": true, "api_keys": ["file-key"] } }
        }"#,
    );

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.interpreter.dialect, DialectKind::Posix);
    assert_eq!(config.server.port, 4040);

    let session = config.to_session_config();
    assert_eq!(session.working_dir.as_deref(), Some(std::path::Path::new("/tmp")));

    let server = config.to_server_config().unwrap();
    assert_eq!(server.api_keys, vec!["file-key"]);
}

#[test]
fn test_load_args_override_file() {
    let file = config_file(r#"{ "execution": { "default_timeout_secs": 60 } }"#);
    let path = file.path().to_str().unwrap();

    let cli = parse_args_from(args(&["-c", path, "-t", "9", "--strip-ansi", "--no-auth"])).unwrap();
    let config = Config::load(&cli).unwrap();

    let options = config.to_executor_options();
    assert_eq!(options.default_timeout, Duration::from_secs(9));
    assert!(options.strip_ansi);
    assert!(!config.security.auth.enabled);
}

#[test]
fn test_load_missing_file() {
    let cli = Args {
        config: Some("/nonexistent/repl-bridge.json".into()),
        ..Args::default()
    };

    let err = Config::load(&cli).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_cli_api_key_enables_auth() {
    let mut config = Config::default();
    config.apply_args(&parse_args_from(args(&["-k", "cli-key"])).unwrap());

    assert!(config.security.auth.enabled);
    let server = config.to_server_config().unwrap();
    assert_eq!(server.api_keys, vec!["cli-key"]);
}
