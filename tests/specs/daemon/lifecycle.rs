//! Daemon lifecycle specs: startup, readiness, PID file, shutdown.

use crate::prelude::*;
use serial_test::serial;

const PORT: u16 = 17_677;

#[test]
#[serial]
fn daemon_becomes_ready_and_writes_a_pid_file() {
    let daemon = Daemon::start(PORT);

    daemon.run(&["status"]).passes();

    let pid_path = daemon.state_path().join("memorizer.pid");
    assert!(pid_path.exists(), "pid file should exist while the daemon runs");
    let pid = std::fs::read_to_string(&pid_path).unwrap();
    assert!(pid.trim().parse::<u32>().is_ok(), "pid file should hold a plain integer");
}

#[test]
#[serial]
fn list_on_a_fresh_daemon_is_empty() {
    let daemon = Daemon::start(PORT);

    let run = daemon.run(&["list"]).passes();
    assert!(run.stdout().contains("No remembered paths"));
}
