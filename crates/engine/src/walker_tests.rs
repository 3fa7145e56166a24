// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use memo_core::FakeClock;
use memo_storage::RegistryPaths;

fn registry(dir: &Path) -> Registry {
    Registry::open(RegistryPaths { wal_path: dir.join("r.wal"), snapshot_path: dir.join("r.snapshot") }).unwrap()
}

#[tokio::test]
async fn new_file_is_discovered_and_enqueued() {
    let state_dir = tempfile::tempdir().unwrap();
    let root_dir = tempfile::tempdir().unwrap();
    std::fs::write(root_dir.path().join("a.md"), "hello").unwrap();

    let registry = registry(state_dir.path());
    let queue = WorkQueue::new(8);
    let clock = FakeClock::new();
    let cancel = CancellationToken::new();

    let outcome = walk_root(
        root_dir.path(),
        &registry,
        &queue,
        &PathConfig::default(),
        &WalkConfig::default(),
        &clock,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(outcome.discovered.len(), 1);
    assert_eq!(queue.len(), 1);
    let job = queue.claim_next().await.unwrap();
    assert!(job.stages.contains(&memo_core::PipelineStage::Metadata));

    let state = registry.get_file_state(&root_dir.path().join("a.md")).unwrap();
    assert!(!state.content_hash.is_empty());
}

#[tokio::test]
async fn unchanged_current_file_is_discovery_only() {
    let state_dir = tempfile::tempdir().unwrap();
    let root_dir = tempfile::tempdir().unwrap();
    let file_path = root_dir.path().join("a.md");
    std::fs::write(&file_path, "hello").unwrap();

    let registry = registry(state_dir.path());
    let queue = WorkQueue::new(8);
    let clock = FakeClock::new();
    let cancel = CancellationToken::new();

    walk_root(root_dir.path(), &registry, &queue, &PathConfig::default(), &WalkConfig::default(), &clock, &cancel)
        .await
        .unwrap();
    let job = queue.claim_next().await.unwrap();
    queue.complete(&job.path);

    let mut state = registry.get_file_state(&file_path).unwrap();
    for stage in memo_core::PipelineStage::ALL {
        state.stages.insert(stage, memo_core::StageState::current(1));
    }
    registry.update_file_state(state).unwrap();

    walk_root(root_dir.path(), &registry, &queue, &PathConfig::default(), &WalkConfig::default(), &clock, &cancel)
        .await
        .unwrap();

    assert!(queue.is_empty(), "unchanged current file must not re-enqueue work");
}

#[tokio::test]
async fn content_change_resets_stages_and_enqueues_modified() {
    let state_dir = tempfile::tempdir().unwrap();
    let root_dir = tempfile::tempdir().unwrap();
    let file_path = root_dir.path().join("a.md");
    std::fs::write(&file_path, "v1").unwrap();

    let registry = registry(state_dir.path());
    let queue = WorkQueue::new(8);
    let clock = FakeClock::new();
    let cancel = CancellationToken::new();

    walk_root(root_dir.path(), &registry, &queue, &PathConfig::default(), &WalkConfig::default(), &clock, &cancel)
        .await
        .unwrap();
    let job = queue.claim_next().await.unwrap();
    queue.complete(&job.path);

    std::fs::write(&file_path, "v2 longer content").unwrap();
    walk_root(root_dir.path(), &registry, &queue, &PathConfig::default(), &WalkConfig::default(), &clock, &cancel)
        .await
        .unwrap();

    let job = queue.claim_next().await.unwrap();
    assert_eq!(job.reason, memo_core::JobReason::Modified);
}

#[tokio::test]
async fn excluded_extension_is_skipped_entirely() {
    let state_dir = tempfile::tempdir().unwrap();
    let root_dir = tempfile::tempdir().unwrap();
    std::fs::write(root_dir.path().join("a.tmp"), "hello").unwrap();

    let registry = registry(state_dir.path());
    let queue = WorkQueue::new(8);
    let clock = FakeClock::new();
    let cancel = CancellationToken::new();
    let config = PathConfig { skip_extensions: vec![".tmp".into()], ..Default::default() };

    let outcome =
        walk_root(root_dir.path(), &registry, &queue, &config, &WalkConfig::default(), &clock, &cancel)
            .await
            .unwrap();

    assert!(outcome.discovered.is_empty());
    assert!(queue.is_empty());
}

#[tokio::test]
async fn cancelled_walk_returns_cancelled_error() {
    let state_dir = tempfile::tempdir().unwrap();
    let root_dir = tempfile::tempdir().unwrap();
    std::fs::write(root_dir.path().join("a.md"), "hello").unwrap();

    let registry = registry(state_dir.path());
    let queue = WorkQueue::new(8);
    let clock = FakeClock::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err =
        walk_root(root_dir.path(), &registry, &queue, &PathConfig::default(), &WalkConfig::default(), &clock, &cancel)
            .await
            .unwrap_err();
    assert!(matches!(err, WalkError::Cancelled));
}
