//! Shared black-box test harness: spawns the `memod` daemon binary and
//! drives it through the `memo` CLI binary, verifying behavior the way a
//! real operator would.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output};
use std::time::Duration;

pub const SPEC_WAIT_MAX_MS: u64 = 5_000;
const SPEC_POLL_INTERVAL_MS: u64 = 20;

/// Locates a workspace binary, falling back to resolving relative to the
/// test binary itself when `CARGO_MANIFEST_DIR` doesn't hold a `target/`
/// (e.g. a shared out-of-tree build directory).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

fn memod_binary() -> PathBuf {
    binary_path("memod")
}

fn memo_binary() -> PathBuf {
    binary_path("memo")
}

/// Polls `condition` until it returns true or `timeout_ms` elapses.
pub fn wait_for<F: FnMut() -> bool>(timeout_ms: u64, mut condition: F) -> bool {
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS));
    }
    false
}

/// A running `memod` instance on a fixed port with its own state
/// directory. Tests that construct one must be `#[serial]` — the port is
/// shared across the whole test binary to keep the harness simple.
pub struct Daemon {
    child: Child,
    state_dir: tempfile::TempDir,
    port: u16,
}

impl Daemon {
    pub fn start(port: u16) -> Self {
        let state_dir = tempfile::tempdir().expect("tempdir");
        let config_path = state_dir.path().join("memorizer.toml");
        std::fs::write(
            &config_path,
            format!(
                "state_dir = {:?}\nhttp_port = {port}\nrebuild_interval_secs = 0\nworkers = 1\n",
                state_dir.path()
            ),
        )
        .expect("write config");

        let child = Command::new(memod_binary())
            .arg(&config_path)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .expect("memod should spawn");

        let daemon = Self { child, state_dir, port };
        let ready = wait_for(SPEC_WAIT_MAX_MS, || {
            daemon.memo(&["status"]).output().map(|o| o.status.success()).unwrap_or(false)
        });
        assert!(ready, "daemon did not become ready in time");
        daemon
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Builds a `memo` command pointed at this daemon.
    pub fn memo(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(memo_binary());
        cmd.arg("--daemon-url").arg(self.url()).args(args);
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Run {
        Run { output: self.memo(args).output().expect("memo should run") }
    }
}

/// Runs `memo` against an arbitrary daemon URL, without spawning a real
/// daemon — used for exercising the unreachable-daemon exit code.
pub fn run_memo_at(daemon_url: &str, args: &[&str]) -> Run {
    let output = Command::new(memo_binary())
        .arg("--daemon-url")
        .arg(daemon_url)
        .args(args)
        .output()
        .expect("memo should run");
    Run { output }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Result of a `memo` invocation, with assertion helpers.
pub struct Run {
    output: Output,
}

impl Run {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn passes(self) -> Self {
        assert!(
            self.output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            self.output.status.code(),
            self.stdout(),
            self.stderr()
        );
        self
    }

    pub fn fails_with_code(self, expected: i32) -> Self {
        assert_eq!(
            self.output.status.code(),
            Some(expected),
            "stdout: {}\nstderr: {}",
            self.stdout(),
            self.stderr()
        );
        self
    }
}
