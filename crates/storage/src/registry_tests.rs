// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use memo_core::model::PipelineStage;
use memo_core::StageState;

fn registry(dir: &Path) -> Registry {
    Registry::open(RegistryPaths {
        wal_path: dir.join("registry.wal"),
        snapshot_path: dir.join("registry.snapshot"),
    })
    .unwrap()
}

#[test]
fn add_path_then_get_path_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    let got = reg.get_path(Path::new("/a")).unwrap();
    assert_eq!(got.path, PathBuf::from("/a"));
}

#[test]
fn add_path_twice_errors_path_exists() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    let err = reg.add_path(Path::new("/a"), 2_000, None).unwrap_err();
    assert!(matches!(err, RegistryError::PathExists(_)));
}

#[test]
fn remove_path_missing_errors_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    let err = reg.remove_path(Path::new("/a")).unwrap_err();
    assert!(matches!(err, RegistryError::PathNotFound(_)));
}

#[test]
fn remove_path_does_not_cascade_file_states() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    reg.update_file_state(memo_core::test_support::file_state("/a/x.md", "/a", "h1")).unwrap();
    reg.remove_path(Path::new("/a")).unwrap();
    assert!(reg.get_file_state(Path::new("/a/x.md")).is_some());
}

#[test]
fn find_containing_path_returns_longest_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    reg.add_path(Path::new("/a/b"), 1_000, None).unwrap();
    let found = reg.find_containing_path(Path::new("/a/b/c.md"));
    assert_eq!(found, Some(PathBuf::from("/a/b")));
}

#[test]
fn get_effective_config_merges_root_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    let root_config = PathConfig { skip_extensions: vec![".tmp".into()], ..Default::default() };
    reg.add_path(Path::new("/a"), 1_000, Some(root_config)).unwrap();
    let defaults = PathConfig { skip_hidden: true, ..Default::default() };
    let effective = reg.get_effective_config(Path::new("/a/x.tmp"), &defaults);
    assert!(effective.skip_hidden);
    assert_eq!(effective.skip_extensions, vec![".tmp".to_string()]);
}

#[test]
fn update_file_state_sets_parent_from_containing_path() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    let state = memo_core::test_support::file_state("/a/x.md", "/wrong", "h1");
    reg.update_file_state(state).unwrap();
    let got = reg.get_file_state(Path::new("/a/x.md")).unwrap();
    assert_eq!(got.parent, PathBuf::from("/a"));
}

#[test]
fn update_file_state_resets_stages_on_content_hash_change() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    let mut first = memo_core::test_support::file_state("/a/x.md", "/a", "h1");
    first.stages.insert(PipelineStage::Metadata, StageState::current(1));
    reg.update_file_state(first).unwrap();

    let second = memo_core::test_support::file_state("/a/x.md", "/a", "h2");
    reg.update_file_state(second).unwrap();
    let got = reg.get_file_state(Path::new("/a/x.md")).unwrap();
    assert!(!got.is_current_stage(PipelineStage::Metadata));
}

#[test]
fn delete_file_states_for_path_is_prefix_scoped() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    reg.add_path(Path::new("/b"), 1_000, None).unwrap();
    reg.update_file_state(memo_core::test_support::file_state("/a/x.md", "/a", "h1")).unwrap();
    reg.update_file_state(memo_core::test_support::file_state("/b/y.md", "/b", "h2")).unwrap();
    let count = reg.delete_file_states_for_path(Path::new("/a")).unwrap();
    assert_eq!(count, 1);
    assert!(reg.get_file_state(Path::new("/a/x.md")).is_none());
    assert!(reg.get_file_state(Path::new("/b/y.md")).is_some());
}

#[test]
fn list_files_needing_stage_includes_absent_and_retryable_failed() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    reg.update_file_state(memo_core::test_support::file_state("/a/x.md", "/a", "h1")).unwrap();
    let needing = reg.list_files_needing(Path::new("/a"), PipelineStage::Metadata, 5);
    assert_eq!(needing, vec![PathBuf::from("/a/x.md")]);
}

#[test]
fn validate_and_clean_paths_removes_missing_roots() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/definitely/does/not/exist"), 1_000, None).unwrap();
    let removed = reg.validate_and_clean_paths().unwrap();
    assert_eq!(removed, vec![PathBuf::from("/definitely/does/not/exist")]);
    assert!(reg.get_path(Path::new("/definitely/does/not/exist")).is_none());
}

#[test]
fn compact_if_needed_truncates_wal_below_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let reg = registry(dir.path());
    reg.add_path(Path::new("/a"), 1_000, None).unwrap();
    reg.add_path(Path::new("/b"), 1_000, None).unwrap();
    assert!(!reg.compact_if_needed(10).unwrap());
    assert!(reg.compact_if_needed(2).unwrap());
    assert_eq!(reg.wal_len(), 0);
}

#[test]
fn reopen_after_compaction_preserves_state() {
    let dir = tempfile::tempdir().unwrap();
    {
        let reg = registry(dir.path());
        reg.add_path(Path::new("/a"), 1_000, None).unwrap();
        reg.compact_if_needed(0).unwrap();
    }
    let reg = registry(dir.path());
    assert!(reg.get_path(Path::new("/a")).is_some());
}
