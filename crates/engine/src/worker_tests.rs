// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use crate::queue::WorkQueue;
use crate::rate_limit::RateLimiter;
use memo_adapters::{ChunkerRegistry, EmbeddingsProviderRegistry, FakeGraphAdapter, FakeSemanticProvider, LineChunker, SemanticProviderRegistry};
use memo_bus::BusConfig;
use memo_core::{FakeClock, JobReason, Priority};
use memo_storage::RegistryPaths;
use std::time::Duration;

fn open_bus(dir: &std::path::Path) -> EventBus {
    EventBus::new(BusConfig { channel_capacity: 16, critical_queue_capacity: 16, overflow_path: dir.join("overflow.ndjson") })
}

fn deps_and_config(dir: &std::path::Path, clock: FakeClock) -> (Arc<PipelineDeps<FakeClock>>, Arc<FakeGraphAdapter>, Arc<PipelineConfig>) {
    let registry = Arc::new(
        memo_storage::Registry::open(RegistryPaths { wal_path: dir.join("r.wal"), snapshot_path: dir.join("r.snapshot") }).unwrap(),
    );
    let mut chunkers = ChunkerRegistry::new();
    chunkers.register(Arc::new(LineChunker::default()));
    let mut semantic = SemanticProviderRegistry::new();
    semantic.register(Arc::new(FakeSemanticProvider::new("fake-semantic")));
    let graph = Arc::new(FakeGraphAdapter::new());
    let deps = Arc::new(PipelineDeps {
        registry,
        graph: graph.clone(),
        chunkers: Arc::new(chunkers),
        semantic_providers: Arc::new(semantic),
        embeddings_providers: Arc::new(EmbeddingsProviderRegistry::new()),
        semantic_limiter: Arc::new(RateLimiter::new(600, &clock)),
        embeddings_limiter: Arc::new(RateLimiter::new(600, &clock)),
        clock,
    });
    let config = Arc::new(PipelineConfig {
        analysis_version: 1,
        embeddings_enabled: false,
        semantic_provider_name: "fake-semantic".into(),
        embeddings_provider_name: "fake-embeddings".into(),
        max_retries: 1,
    });
    (deps, graph, config)
}

#[tokio::test]
async fn successful_job_publishes_analysis_completed_and_marks_stage_current() {
    let tmp = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let (deps, graph, config) = deps_and_config(tmp.path(), clock.clone());

    let file_path = tmp.path().join("note.md");
    std::fs::write(&file_path, "hello world").unwrap();
    let state = memo_core::FileState::new(file_path.clone(), tmp.path().to_path_buf(), "hash1".into(), 11, 0);
    deps.registry.update_file_state(state).unwrap();

    let bus = Arc::new(open_bus(tmp.path()));
    let (_h, mut completed_rx) = bus.subscribe("analysis_completed", "test");

    let queue = Arc::new(WorkQueue::new(16));
    let job = Job::new(file_path.clone(), tmp.path().to_path_buf(), JobReason::Created, vec![PipelineStage::Metadata], clock.epoch_ms(), Priority::Normal);
    queue.enqueue(job, Duration::from_secs(1)).await.unwrap();

    let pool = WorkerPool::spawn(
        WorkerPoolConfig { workers: std::num::NonZeroUsize::new(1).unwrap(), graceful_shutdown_timeout: Duration::from_secs(1) },
        queue.clone(),
        deps.clone(),
        config,
        bus,
    );

    let event = tokio::time::timeout(Duration::from_secs(2), completed_rx.recv()).await.expect("timed out").expect("channel closed");
    assert!(matches!(event, Event::AnalysisCompleted { .. }));
    assert!(graph.has_file(&file_path));

    let state = deps.registry.get_file_state(&file_path).unwrap();
    assert!(state.is_current_stage(PipelineStage::Metadata));

    pool.shutdown().await;
}

#[tokio::test]
async fn unknown_provider_failure_publishes_analysis_failed_and_records_stage_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let (deps, _graph, mut config) = deps_and_config(tmp.path(), clock.clone());
    Arc::get_mut(&mut config).unwrap().semantic_provider_name = "does-not-exist".into();

    let file_path = tmp.path().join("note.txt");
    std::fs::write(&file_path, "hello").unwrap();
    let state = memo_core::FileState::new(file_path.clone(), tmp.path().to_path_buf(), "hash1".into(), 5, 0);
    deps.registry.update_file_state(state).unwrap();

    let bus = Arc::new(open_bus(tmp.path()));
    let (_h, mut failed_rx) = bus.subscribe("analysis_failed", "test");

    let queue = Arc::new(WorkQueue::new(16));
    let job = Job::new(file_path.clone(), tmp.path().to_path_buf(), JobReason::Created, vec![PipelineStage::Semantic], clock.epoch_ms(), Priority::Normal);
    queue.enqueue(job, Duration::from_secs(1)).await.unwrap();

    let pool = WorkerPool::spawn(
        WorkerPoolConfig { workers: std::num::NonZeroUsize::new(1).unwrap(), graceful_shutdown_timeout: Duration::from_secs(1) },
        queue.clone(),
        deps.clone(),
        config,
        bus,
    );

    let event = tokio::time::timeout(Duration::from_secs(2), failed_rx.recv()).await.expect("timed out").expect("channel closed");
    match event {
        Event::AnalysisFailed { stage, category, .. } => {
            assert_eq!(stage, PipelineStage::Semantic);
            assert_eq!(category, memo_core::FailureCategory::Policy);
        }
        other => panic!("expected AnalysisFailed, got {other:?}"),
    }

    let state = deps.registry.get_file_state(&file_path).unwrap();
    assert_eq!(state.stages.get(&PipelineStage::Semantic).unwrap().attempts, 1);

    pool.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_workers_without_hanging() {
    let tmp = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let (deps, _graph, config) = deps_and_config(tmp.path(), clock.clone());
    let bus = Arc::new(open_bus(tmp.path()));
    let queue = Arc::new(WorkQueue::new(16));

    let pool = WorkerPool::spawn(
        WorkerPoolConfig { workers: std::num::NonZeroUsize::new(2).unwrap(), graceful_shutdown_timeout: Duration::from_millis(200) },
        queue,
        deps,
        config,
        bus,
    );

    tokio::time::timeout(Duration::from_secs(1), pool.shutdown()).await.expect("shutdown should not hang");
}
