//! Remember/list/rebuild/read/forget round trip against a real daemon.

use crate::prelude::*;
use serial_test::serial;

const PORT: u16 = 17_678;

#[test]
#[serial]
fn remember_list_rebuild_read_forget_round_trip() {
    let daemon = Daemon::start(PORT);

    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("a.txt"), "hello world\n").unwrap();
    let root_str = root.path().to_string_lossy().into_owned();

    daemon.run(&["remember", &root_str]).passes();

    let listed = daemon.run(&["list"]).passes();
    assert!(listed.stdout().contains(&root_str), "listed roots should include the remembered path");

    let rebuilt = daemon.run(&["rebuild"]).passes();
    assert!(rebuilt.stdout().contains("root(s)"));

    // The walk is queued onto a worker and finishes asynchronously, so poll
    // instead of asserting immediately after `rebuild` returns.
    let mut last_stdout = String::new();
    let walked = wait_for(SPEC_WAIT_MAX_MS, || {
        last_stdout = daemon.run(&["read"]).passes().stdout();
        last_stdout.contains("a.txt")
    });
    assert!(walked, "read should surface the file once walked, got: {last_stdout}");

    daemon.run(&["forget", &root_str]).passes();
    let after_forget = daemon.run(&["list"]).passes();
    assert!(!after_forget.stdout().contains(&root_str), "forgotten root should no longer be listed");
}

#[test]
#[serial]
fn remembering_the_same_root_twice_reports_updated_not_created() {
    let daemon = Daemon::start(PORT);

    let root = tempfile::tempdir().unwrap();
    let root_str = root.path().to_string_lossy().into_owned();

    let first = daemon.run(&["remember", &root_str]).passes();
    assert!(first.stdout().contains("Remembered"));

    let second = daemon.run(&["remember", &root_str]).passes();
    assert!(second.stdout().contains("Updated"));
}
