//! CLI exit-code conventions (0 success, 1 generic failure, 2 invalid
//! input, 3 daemon unreachable), exercised end-to-end through the `memo`
//! binary rather than `DaemonClient` directly.

use crate::prelude::*;
use serial_test::serial;

const PORT: u16 = 17_679;

#[test]
fn status_against_an_unreachable_daemon_exits_3() {
    // Port 1 is privileged and normally unbound, so the connection is
    // refused immediately rather than timing out.
    run_memo_at("http://127.0.0.1:1", &["status"]).fails_with_code(3);
}

#[test]
#[serial]
fn forget_on_an_unregistered_path_exits_2() {
    let daemon = Daemon::start(PORT);

    daemon.run(&["forget", "/no/such/remembered/root"]).fails_with_code(2);
}

#[test]
#[serial]
fn remember_with_malformed_patch_json_exits_2() {
    let daemon = Daemon::start(PORT);

    let root = tempfile::tempdir().unwrap();
    let root_str = root.path().to_string_lossy().into_owned();

    daemon.run(&["remember", &root_str, "--patch", "not json"]).fails_with_code(2);
}
