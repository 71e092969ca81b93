//! Integration smoke tests for the `hsb` CLI surface.

mod common;

#[test]
fn help_command_prints_usage() {
    let result = common::run_cli_case("help_command_prints_usage", &["--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: hsb [OPTIONS] <COMMAND>"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn version_command_prints_version() {
    let result = common::run_cli_case("version_command_prints_version", &["--version"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("hsb") && result.stdout.contains(env!("CARGO_PKG_VERSION")),
        "missing version output; log: {}",
        result.log_path.display()
    );
}

#[test]
fn run_without_credentials_is_fatal() {
    let result = common::run_cli_case("run_without_credentials_is_fatal", &["run", "--once"]);
    assert_eq!(
        result.status.code(),
        Some(1),
        "expected exit 1; log: {}",
        result.log_path.display()
    );
    for needle in ["HSB-1001", "PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"] {
        assert!(
            result.stderr.contains(needle),
            "stderr lacks {needle}; log: {}",
            result.log_path.display()
        );
    }
}

#[test]
fn run_reports_only_the_missing_variable() {
    let result = common::run_cli_case_with_env(
        "run_reports_only_the_missing_variable",
        &["run", "--once"],
        &[("PRACTICUM_TOKEN", "p"), ("TELEGRAM_TOKEN", "t")],
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    let last_line = result.stderr.lines().last().unwrap_or_default();
    assert!(
        last_line.contains("TELEGRAM_CHAT_ID") && !last_line.contains("PRACTICUM_TOKEN"),
        "unexpected error line `{last_line}`; log: {}",
        result.log_path.display()
    );
}

#[test]
fn check_without_credentials_is_fatal() {
    let result = common::run_cli_case("check_without_credentials_is_fatal", &["check"]);
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("HSB-1001"), "log: {}", result.log_path.display());
}

#[test]
fn config_command_masks_tokens() {
    let result = common::run_cli_case_with_env(
        "config_command_masks_tokens",
        &["config"],
        &[
            ("PRACTICUM_TOKEN", "very-secret-practicum"),
            ("TELEGRAM_TOKEN", "very-secret-telegram"),
            ("TELEGRAM_CHAT_ID", "777"),
            ("HSB_POLL_INTERVAL_SECS", "120"),
        ],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(
        !result.stdout.contains("very-secret"),
        "token leaked; log: {}",
        result.log_path.display()
    );
    assert!(result.stdout.contains("chat_id = \"777\""));
    assert!(result.stdout.contains("interval_secs = 120"));
    assert!(result.stdout.contains("practicum.yandex.ru"));
}

#[test]
fn config_command_reads_toml_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("hsb.toml");
    std::fs::write(&path, "[poll]\nempty_batch = \"accept\"\ninterval_secs = 30\n")
        .expect("write config");
    let path = path.display().to_string();

    let result = common::run_cli_case(
        "config_command_reads_toml_file",
        &["--config", &path, "config"],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("empty_batch = \"accept\""));
    assert!(result.stdout.contains("interval_secs = 30"));
}

#[test]
fn config_command_rejects_missing_file() {
    let result = common::run_cli_case(
        "config_command_rejects_missing_file",
        &["--config", "/nonexistent/hsb.toml", "config"],
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("HSB-1002"));
}

#[test]
fn completions_command_generates_shell_script() {
    let result = common::run_cli_case(
        "completions_command_generates_shell_script",
        &["completions", "bash"],
    );
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("hsb"),
        "expected completion script contents; log: {}",
        result.log_path.display()
    );
}
