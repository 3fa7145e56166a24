// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;

#[test]
fn create_then_modify_before_window_elapses_coalesces_to_single_changed() {
    let mut deb = Debouncer::new(500, 1_500);
    deb.record_changed(PathBuf::from("/a/x.md"), 1_000);
    deb.record_changed(PathBuf::from("/a/x.md"), 1_200);
    assert!(deb.drain_ready(1_400).is_empty(), "window extended by second observation");
    let ready = deb.drain_ready(1_700);
    assert_eq!(ready, vec![(PathBuf::from("/a/x.md"), PendingKind::Changed)]);
}

#[test]
fn delete_immediately_followed_by_recreate_resurrects_as_changed() {
    let mut deb = Debouncer::new(500, 1_500);
    deb.record_deleted(PathBuf::from("/a/x.md"), 1_000);
    deb.record_changed(PathBuf::from("/a/x.md"), 1_100);
    let ready = deb.drain_ready(1_700);
    assert_eq!(ready, vec![(PathBuf::from("/a/x.md"), PendingKind::Changed)]);
}

#[test]
fn delete_with_no_resurrection_emits_deleted_after_grace_period() {
    let mut deb = Debouncer::new(500, 1_500);
    deb.record_deleted(PathBuf::from("/a/x.md"), 1_000);
    assert!(deb.drain_ready(2_000).is_empty());
    let ready = deb.drain_ready(2_600);
    assert_eq!(ready, vec![(PathBuf::from("/a/x.md"), PendingKind::Deleted)]);
}

#[test]
fn unrelated_paths_debounce_independently() {
    let mut deb = Debouncer::new(500, 1_500);
    deb.record_changed(PathBuf::from("/a/x.md"), 1_000);
    deb.record_changed(PathBuf::from("/a/y.md"), 1_400);
    let ready = deb.drain_ready(1_600);
    assert_eq!(ready, vec![(PathBuf::from("/a/x.md"), PendingKind::Changed)]);
    assert!(!deb.is_idle());
    let ready = deb.drain_ready(1_900);
    assert_eq!(ready, vec![(PathBuf::from("/a/y.md"), PendingKind::Changed)]);
    assert!(deb.is_idle());
}

#[test]
fn next_deadline_is_earliest_pending_entry() {
    let mut deb = Debouncer::new(500, 1_500);
    assert_eq!(deb.next_deadline_ms(), None);
    deb.record_changed(PathBuf::from("/a/x.md"), 1_000);
    deb.record_deleted(PathBuf::from("/a/y.md"), 900);
    assert_eq!(deb.next_deadline_ms(), Some(1_500));
}
