//! Integration tests for configuration loading.

use std::path::PathBuf;
use std::time::Duration;

use passroll::config::file::FileConfig;
use passroll::{HostKeyPolicy, LineEnding, RotationConfig, RotationError};

fn write_config(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("passroll-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn load_without_file_gives_defaults() {
    let config = RotationConfig::load(None).unwrap();
    assert_eq!(config.command, "passwd");
    assert!(config.prompts.current.matches("Current password:"));
}

#[test]
fn load_layers_file_over_defaults() {
    let path = write_config(
        "full.toml",
        r#"
[session]
timeout_secs = 12
result_grace_ms = 1500
command = "sudo passwd admin"
line_ending = "crlf"

[batch]
concurrency = 8
pacing_ms = 250

[ssh]
port = 2222
host_key_policy = "known-hosts"

[prompts]
confirm = ["repeat"]
success = ["changed"]
"#,
    );

    let config = RotationConfig::load(Some(&path)).unwrap();
    assert_eq!(config.timeout, Duration::from_secs(12));
    assert_eq!(config.result_grace, Duration::from_millis(1500));
    assert_eq!(config.command, "sudo passwd admin");
    assert_eq!(config.line_ending, LineEnding::Crlf);
    assert_eq!(config.concurrency, 8);
    assert_eq!(config.pacing, Duration::from_millis(250));
    assert_eq!(config.port, 2222);
    assert_eq!(config.host_key_policy, HostKeyPolicy::KnownHosts);
    assert!(config.prompts.confirm.matches("Repeat password: "));
    assert!(config.prompts.confirm.matches("Retype password: "));
    assert!(config.prompts.success.matches("password changed"));

    let params = config.connect_params("ops");
    assert_eq!(params.port, 2222);
    assert_eq!(params.timeout, Duration::from_secs(12));
}

#[test]
fn replacing_defaults_requires_complete_table() {
    let path = write_config(
        "partial.toml",
        r#"
[prompts]
replace_defaults = true
current = ["old password"]
"#,
    );

    let err = RotationConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, RotationError::Config { .. }));
    assert!(err.to_string().contains("'new'"));
}

#[test]
fn zero_concurrency_is_rejected() {
    let path = write_config("zero.toml", "[batch]\nconcurrency = 0\n");
    assert!(RotationConfig::load(Some(&path)).is_err());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = FileConfig::parse("[session]\ntimout_secs = 3\n").unwrap_err();
    assert!(matches!(err, RotationError::Config { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = RotationConfig::load(Some(std::path::Path::new("/nonexistent/passroll.toml")))
        .unwrap_err();
    assert!(matches!(err, RotationError::Io { .. }));
    assert!(!err.is_invalid_input());
}
