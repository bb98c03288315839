#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::TempDir;

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

const PSIM_ENV: &[&str] = &[
    "PSIM_SEED",
    "PSIM_LOG_FILE",
    "PSIM_LOG_FORMAT",
    "PSIM_PLOT_FILE",
    "PSIM_SCALING_MAX_PRISONERS",
    "PSIM_PLOT_WIDTH",
    "PSIM_PLOT_HEIGHT",
    "PSIM_OUTPUT_FORMAT",
];

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_prisoners") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) {
        "prisoners.exe"
    } else {
        "prisoners"
    };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve prisoners binary path for integration test"),
    }
}

/// Fresh working directory so the default `log.txt` / `plot.svg` land in isolation.
pub fn workdir() -> TempDir {
    tempfile::tempdir().expect("create temp working directory")
}

/// Run the binary with `cwd` as working directory and a scrubbed `PSIM_*` environment.
pub fn run_cli_in(cwd: &Path, case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_with_env(cwd, case_name, args, &[])
}

/// Start the binary without waiting for it; stdout and stderr are piped.
pub fn spawn_cli_in(cwd: &Path, args: &[&str]) -> Child {
    let mut command = Command::new(resolve_bin_path());
    command
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for key in PSIM_ENV {
        command.env_remove(key);
    }
    command.spawn().expect("spawn prisoners command")
}

/// Deliver SIGINT, as Ctrl+C in a terminal would.
#[cfg(unix)]
pub fn send_sigint(child: &Child) {
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("run kill");
    assert!(status.success(), "kill -INT failed: {status}");
}

pub fn run_cli_with_env(
    cwd: &Path,
    case_name: &str,
    args: &[&str],
    env: &[(&str, &str)],
) -> CmdResult {
    let root = std::env::temp_dir().join("psim-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env("RUST_BACKTRACE", "1");
    for key in PSIM_ENV {
        command.env_remove(key);
    }
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().expect("execute prisoners command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("cwd={}\n", cwd.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
