//! Shared harness for running the `hsb` binary in a clean environment.

#![allow(dead_code, missing_docs)]

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

pub struct CliResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

const SCRUBBED_VARS: [&str; 7] = [
    "PRACTICUM_TOKEN",
    "TELEGRAM_TOKEN",
    "TELEGRAM_CHAT_ID",
    "HSB_CONFIG",
    "HSB_POLL_INTERVAL_SECS",
    "HSB_JOURNAL",
    "RUST_LOG",
];

/// Run `hsb` with `args`, no credentials, from an empty working directory so
/// no stray `.env` is picked up.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CliResult {
    run_cli_case_with_env(case_name, args, &[])
}

pub fn run_cli_case_with_env(case_name: &str, args: &[&str], env: &[(&str, &str)]) -> CliResult {
    let workdir = case_dir(case_name);
    let mut command = Command::new(env!("CARGO_BIN_EXE_hsb"));
    command.args(args).current_dir(&workdir);
    for var in SCRUBBED_VARS {
        command.env_remove(var);
    }
    for (key, value) in env {
        command.env(key, value);
    }

    let output = command.output().expect("failed to spawn hsb binary");
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let log_path = workdir.join("case.log");
    let log = format!(
        "args: {args:?}\nstatus: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
        output.status
    );
    std::fs::write(&log_path, log).expect("failed to write case log");

    CliResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

fn case_dir(case_name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR"))
        .join("cli-cases")
        .join(case_name);
    std::fs::create_dir_all(&dir).expect("failed to create case dir");
    dir
}
