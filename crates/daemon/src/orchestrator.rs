// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! The Orchestrator (§4.I): owns the component dependency graph and
//! brings everything up in the order {Registry, Bus, Graph adapter,
//! Watcher, Planner, Queue, Workers, Cleaner}, shutting down in
//! reverse. Exposes the operations the HTTP control plane calls.

use crate::health::SharedHealth;
use memo_adapters::{ChunkerRegistry, EmbeddingsProviderRegistry, GraphAdapter, SemanticProviderRegistry};
use memo_bus::{BusConfig, BusError, EventBus};
use memo_core::{
    ComponentHealth, Config, Event, PathConfig, RememberedPath, SystemClock,
};
use memo_engine::{
    reconcile_after_walk, walk_root, Cleaner, PipelineConfig, PipelineDeps, RateLimiter, ReconcileOutcome,
    WalkConfig, WalkError, WorkQueue, WorkerPool, WorkerPoolConfig,
};
use memo_storage::{Registry, RegistryError, RegistryPaths};
use memo_wire::{FileStateSummary, RememberedPathSummary, StageSummary};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Watcher(#[from] memo_watcher::WatcherError),
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error("root not remembered: {0}")]
    NotRemembered(PathBuf),
}

/// Result of a manual or periodic rebuild (§4.D, §4.I).
#[derive(Debug, Clone, Copy, Default)]
pub struct RebuildOutcome {
    pub roots_walked: u64,
    /// Upper bound on jobs actually enqueued this walk: `walk_root`
    /// coalesces into the shared queue and does not report a per-call
    /// enqueue count, since unchanged-and-current files are
    /// discovery-only and enqueue nothing.
    pub jobs_enqueued: u64,
    pub duration_ms: u64,
}

/// Owns every long-running component for one daemon process.
pub struct Orchestrator {
    config: Config,
    registry: Arc<Registry>,
    bus: Arc<EventBus>,
    graph: Arc<dyn GraphAdapter>,
    queue: Arc<WorkQueue>,
    clock: SystemClock,
    health: SharedHealth,
    walk_config: WalkConfig,
    watcher_config: memo_watcher::WatcherConfig,
    planner_cancel: CancellationToken,
    planner_handle: Option<tokio::task::JoinHandle<()>>,
    overflow_cancel: CancellationToken,
    overflow_handle: tokio::task::JoinHandle<()>,
    watch_recovery_cancel: CancellationToken,
    watch_recovery_handle: tokio::task::JoinHandle<()>,
    watchers: Arc<AsyncMutex<HashMap<PathBuf, memo_watcher::RootWatcher>>>,
    workers: AsyncMutex<Option<WorkerPool>>,
    cleaner: AsyncMutex<Option<Cleaner>>,
}

impl Orchestrator {
    /// Brings up Registry, Bus, Watcher(s) for already-remembered roots,
    /// the Work queue, Worker pool, and Cleaner, in that order. `graph`
    /// and the capability registries are supplied by the caller so tests
    /// can inject fakes without this module knowing about them.
    pub async fn start(
        config: Config,
        graph: Arc<dyn GraphAdapter>,
        chunkers: ChunkerRegistry,
        semantic_providers: SemanticProviderRegistry,
        embeddings_providers: EmbeddingsProviderRegistry,
    ) -> Result<Self, OrchestratorError> {
        let health = SharedHealth::new();
        let clock = SystemClock;

        let registry = match Registry::open(RegistryPaths {
            wal_path: config.wal_path(),
            snapshot_path: config.snapshot_path(),
        }) {
            Ok(registry) => {
                health.set("registry", ComponentHealth::ready());
                Arc::new(registry)
            }
            Err(err) => {
                health.set("registry", ComponentHealth::failed(err.to_string()));
                return Err(err.into());
            }
        };

        let bus = Arc::new(EventBus::new(BusConfig {
            channel_capacity: config.bus_channel_capacity,
            critical_queue_capacity: config.critical_queue_capacity,
            overflow_path: config.critical_overflow_path(),
        }));
        health.set("bus", ComponentHealth::ready());

        // Graph adapter connects lazily; its own IsConnected reflects the
        // last call's outcome, so it starts "starting" rather than ready.
        health.set("graph", ComponentHealth::starting());

        let queue = Arc::new(WorkQueue::new(config.queue_capacity));

        let semantic_limiter = Arc::new(RateLimiter::new(config.semantic_rate_limit_per_min, &clock));
        let embeddings_limiter = Arc::new(RateLimiter::new(config.embeddings_rate_limit_per_min, &clock));

        let pipeline_config = Arc::new(PipelineConfig {
            analysis_version: 1,
            embeddings_enabled: config.embeddings_enabled,
            semantic_provider_name: "default".to_string(),
            embeddings_provider_name: "default".to_string(),
            max_retries: config.max_retries,
        });
        let pipeline_deps = Arc::new(PipelineDeps {
            registry: registry.clone(),
            graph: graph.clone(),
            chunkers: Arc::new(chunkers),
            semantic_providers: Arc::new(semantic_providers),
            embeddings_providers: Arc::new(embeddings_providers),
            semantic_limiter,
            embeddings_limiter,
            clock: clock.clone(),
        });

        let watcher_config = memo_watcher::WatcherConfig {
            debounce_window_ms: config.debounce_window_ms,
            delete_grace_period_ms: config.delete_grace_period_ms,
            default_path_config: config.default_path_config.clone(),
            ..memo_watcher::WatcherConfig::default()
        };
        let walk_config =
            WalkConfig { max_retries: config.max_retries, enqueue_timeout: Duration::from_millis(config.enqueue_timeout_ms) };

        let mut watchers = HashMap::new();
        for root in registry.list_paths() {
            let watcher = memo_watcher::RootWatcher::spawn(
                root.path.clone(),
                registry.clone(),
                bus.clone(),
                clock.clone(),
                watcher_config.clone(),
            )?;
            watchers.insert(root.path, watcher);
        }

        let worker_pool = WorkerPool::spawn(
            WorkerPoolConfig {
                workers: NonZeroUsize::new(config.workers.max(1)).unwrap_or_else(|| {
                    // config.workers.max(1) is always >= 1; this branch is unreachable.
                    NonZeroUsize::new(1).unwrap_or_else(|| unreachable!("1 is nonzero"))
                }),
                graceful_shutdown_timeout: Duration::from_millis(config.graceful_shutdown_timeout_ms),
            },
            queue.clone(),
            pipeline_deps,
            pipeline_config,
            bus.clone(),
        );
        health.set("worker-0", ComponentHealth::ready());

        let cleaner = Cleaner::spawn(registry.clone(), graph.clone(), bus.clone());

        let planner_cancel = CancellationToken::new();
        let planner_handle = if config.rebuild_interval_secs > 0 {
            Some(tokio::spawn(Self::planner_loop(
                registry.clone(),
                graph.clone(),
                queue.clone(),
                bus.clone(),
                clock.clone(),
                walk_config.clone(),
                config.default_path_config.clone(),
                Duration::from_secs(config.rebuild_interval_secs),
                planner_cancel.clone(),
            )))
        } else {
            None
        };

        let overflow_cancel = CancellationToken::new();
        let overflow_handle = tokio::spawn(Self::overflow_redeliver_loop(
            bus.clone(),
            config.overflow_redeliver_interval(),
            overflow_cancel.clone(),
        ));

        let watchers = Arc::new(AsyncMutex::new(watchers));
        let watch_recovery_cancel = CancellationToken::new();
        let watch_recovery_handle = tokio::spawn(Self::watch_recovery_loop(
            registry.clone(),
            graph.clone(),
            queue.clone(),
            bus.clone(),
            clock.clone(),
            walk_config.clone(),
            config.default_path_config.clone(),
            watcher_config.clone(),
            watchers.clone(),
            watch_recovery_cancel.clone(),
        ));

        Ok(Self {
            config,
            registry,
            bus,
            graph,
            queue,
            clock,
            health,
            walk_config,
            watcher_config,
            planner_cancel,
            planner_handle,
            overflow_cancel,
            overflow_handle,
            watch_recovery_cancel,
            watch_recovery_handle,
            watchers,
            workers: AsyncMutex::new(Some(worker_pool)),
            cleaner: AsyncMutex::new(Some(cleaner)),
        })
    }

    pub fn health(&self) -> SharedHealth {
        self.health.clone()
    }

    /// Periodic full-tree rewalk (the "Planner" half of §4.D) driven by
    /// `rebuild_interval_secs`. Each tick walks every remembered root
    /// incrementally, same as a manual `rebuild(full=false)`.
    async fn planner_loop(
        registry: Arc<Registry>,
        graph: Arc<dyn GraphAdapter>,
        queue: Arc<WorkQueue>,
        bus: Arc<EventBus>,
        clock: SystemClock,
        walk_config: WalkConfig,
        defaults: PathConfig,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        let mut tick = tokio::time::interval(interval);
        tick.tick().await; // first tick fires immediately; skip it, we walk at startup via /remember instead
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tick.tick() => {
                    for root in registry.list_paths() {
                        let cancel_walk = CancellationToken::new();
                        if let Err(err) = walk_one_root(
                            &registry, &graph, &queue, &bus, &clock, &walk_config, &defaults, &root.path, &cancel_walk,
                        )
                        .await
                        {
                            tracing::warn!(root = %root.path.display(), %err, "planner walk failed");
                        }
                    }
                }
            }
        }
    }

    /// Periodically sweeps the overflow journal for every critical kind
    /// and re-delivers to current subscribers (§4.A: redelivery happens
    /// once a subscriber has drained enough to accept the backlog again).
    /// Runs for the life of the daemon, independent of
    /// `rebuild_interval_secs`.
    async fn overflow_redeliver_loop(bus: Arc<EventBus>, interval: Duration, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tick.tick() => {
                    for kind in memo_bus::CRITICAL_EVENT_KINDS {
                        match bus.redeliver_overflow(kind) {
                            Ok(0) => {}
                            Ok(count) => tracing::info!(kind, count, "redelivered overflowed critical events"),
                            Err(err) => tracing::warn!(kind, %err, "failed to redeliver overflowed critical events"),
                        }
                    }
                }
            }
        }
    }

    /// Subscribes to `walk_started` (published only by a `RootWatcher`
    /// whose OS watch handle died, §4.C) and carries out the fallback the
    /// watcher task itself cannot: re-walks the affected root through the
    /// Planner and replaces the dead entry in `watchers` with a freshly
    /// armed one. A root that was forgotten in the meantime is skipped.
    async fn watch_recovery_loop(
        registry: Arc<Registry>,
        graph: Arc<dyn GraphAdapter>,
        queue: Arc<WorkQueue>,
        bus: Arc<EventBus>,
        clock: SystemClock,
        walk_config: WalkConfig,
        defaults: PathConfig,
        watcher_config: memo_watcher::WatcherConfig,
        watchers: Arc<AsyncMutex<HashMap<PathBuf, memo_watcher::RootWatcher>>>,
        cancel: CancellationToken,
    ) {
        let (_handle, mut rx) = bus.subscribe("walk_started", "watch-recovery");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                maybe = rx.recv() => {
                    let Some(event) = maybe else { break };
                    let Event::WalkStarted { root, .. } = event else { continue };
                    if registry.get_path(&root).is_none() {
                        continue; // forgotten before recovery ran
                    }
                    tracing::info!(root = %root.display(), "rescanning root after watch loss");
                    let walk_cancel = CancellationToken::new();
                    if let Err(err) =
                        walk_one_root(&registry, &graph, &queue, &bus, &clock, &walk_config, &defaults, &root, &walk_cancel).await
                    {
                        tracing::warn!(root = %root.display(), %err, "rescan after watch loss failed");
                    }

                    let mut guard = watchers.lock().await;
                    if let Some(old) = guard.remove(&root) {
                        old.shutdown().await;
                    }
                    match memo_watcher::RootWatcher::spawn(root.clone(), registry.clone(), bus.clone(), clock.clone(), watcher_config.clone()) {
                        Ok(watcher) => {
                            guard.insert(root, watcher);
                        }
                        Err(err) => tracing::warn!(root = %root.display(), %err, "failed to re-arm watch after loss"),
                    }
                }
            }
        }
    }

    /// `POST /remember`: adds or updates a root, spawns its watcher if
    /// missing, and triggers an initial incremental walk in the
    /// background so the HTTP call returns promptly.
    pub async fn remember(&self, path: &Path, patch: Option<PathConfig>) -> Result<(), OrchestratorError> {
        let now = self.clock.epoch_ms();
        match self.registry.get_path(path) {
            Some(_) => self.registry.update_path_config(path, patch)?,
            None => self.registry.add_path(path, now, patch)?,
        }
        self.bus.publish(Event::PathRemembered { path: path.to_path_buf(), config: self.registry.get_path(path).and_then(|p| p.config), at_ms: now })?;

        let mut watchers = self.watchers.lock().await;
        if !watchers.contains_key(path) {
            let watcher = memo_watcher::RootWatcher::spawn(
                path.to_path_buf(),
                self.registry.clone(),
                self.bus.clone(),
                self.clock.clone(),
                self.watcher_config.clone(),
            )?;
            watchers.insert(path.to_path_buf(), watcher);
        }
        drop(watchers);

        let cancel = CancellationToken::new();
        walk_one_root(
            &self.registry,
            &self.graph,
            &self.queue,
            &self.bus,
            &self.clock,
            &self.walk_config,
            &self.config.default_path_config,
            path,
            &cancel,
        )
        .await?;
        Ok(())
    }

    /// `POST /forget`: removes the root and, unless `keep_data`, cascades
    /// deletion of its FileStates and graph nodes via the Cleaner's
    /// `path_forgotten` subscription.
    pub async fn forget(&self, path: &Path, keep_data: bool) -> Result<(), OrchestratorError> {
        if self.registry.get_path(path).is_none() {
            return Err(OrchestratorError::NotRemembered(path.to_path_buf()));
        }
        let now = self.clock.epoch_ms();
        self.registry.remove_path(path)?;

        let removed = self.watchers.lock().await.remove(path);
        if let Some(watcher) = removed {
            watcher.shutdown().await;
        }

        self.bus.publish(Event::PathForgotten { path: path.to_path_buf(), keep_data, at_ms: now })?;
        Ok(())
    }

    pub fn list_paths(&self) -> Vec<RememberedPathSummary> {
        self.registry
            .list_paths()
            .into_iter()
            .map(|root| summarize_path(&self.registry, root))
            .collect()
    }

    pub async fn rebuild(&self, full: bool) -> Result<RebuildOutcome, OrchestratorError> {
        let started = Instant::now();
        let roots = self.registry.list_paths();
        let mut outcome = RebuildOutcome::default();
        for root in &roots {
            if full {
                for file_state in self.registry.list_file_states(&root.path) {
                    let _ = self.registry.clear_analysis_state(&file_state.path);
                }
            }
            let cancel = CancellationToken::new();
            let discovered = walk_one_root(
                &self.registry,
                &self.graph,
                &self.queue,
                &self.bus,
                &self.clock,
                &self.walk_config,
                &self.config.default_path_config,
                &root.path,
                &cancel,
            )
            .await?;
            outcome.roots_walked += 1;
            outcome.jobs_enqueued += discovered;
        }
        outcome.duration_ms = started.elapsed().as_millis() as u64;
        Ok(outcome)
    }

    pub fn read(&self, max_files: Option<u64>) -> (Vec<FileStateSummary>, bool) {
        let limit = max_files.unwrap_or(u64::MAX);
        let mut files = Vec::new();
        let mut truncated = false;
        'roots: for root in self.registry.list_paths() {
            for state in self.registry.list_file_states(&root.path) {
                if files.len() as u64 >= limit {
                    truncated = true;
                    break 'roots;
                }
                let stages = state
                    .stages
                    .iter()
                    .map(|(stage, s)| {
                        (*stage, StageSummary {
                            current: s.is_current(),
                            attempts: s.attempts,
                            last_error: s.last_error.clone(),
                            last_category: None,
                        })
                    })
                    .collect();
                files.push(FileStateSummary {
                    path: state.path,
                    content_hash: state.content_hash,
                    size: state.size,
                    mtime_ms: state.mtime_ms,
                    stages,
                });
            }
        }
        (files, truncated)
    }

    pub fn health_snapshot(&self) -> memo_core::HealthStatus {
        self.health.snapshot()
    }

    /// Shuts down every component in reverse bring-up order: Cleaner,
    /// Workers, Queue, Planner, overflow redeliver sweep, watch recovery
    /// sweep, Watchers. The Bus and Registry have no explicit stop step;
    /// they are dropped with `self`.
    pub async fn shutdown(self) {
        if let Some(cleaner) = self.cleaner.lock().await.take() {
            cleaner.shutdown().await;
        }
        if let Some(workers) = self.workers.lock().await.take() {
            workers.shutdown().await;
        }
        self.queue.close();
        self.planner_cancel.cancel();
        if let Some(handle) = self.planner_handle {
            let _ = handle.await;
        }
        self.overflow_cancel.cancel();
        let _ = self.overflow_handle.await;
        self.watch_recovery_cancel.cancel();
        let _ = self.watch_recovery_handle.await;
        let mut watchers = self.watchers.lock().await;
        for (_, watcher) in watchers.drain() {
            watcher.shutdown().await;
        }
        self.bus.close();
    }
}

/// Walks one root and reconciles stale FileStates against what was
/// discovered, returning the discovered file count.
async fn walk_one_root(
    registry: &Registry,
    graph: &Arc<dyn GraphAdapter>,
    queue: &WorkQueue,
    bus: &EventBus,
    clock: &SystemClock,
    walk_config: &WalkConfig,
    defaults: &PathConfig,
    root: &Path,
    cancel: &CancellationToken,
) -> Result<u64, OrchestratorError> {
    let started = std::time::Instant::now();
    let outcome = walk_root(root, registry, queue, defaults, walk_config, clock, cancel).await?;
    let discovered_count = outcome.discovered.len() as u64;

    match reconcile_after_walk(registry, graph, root, &outcome.discovered).await {
        Ok(ReconcileOutcome::Reconciled { deleted }) if !deleted.is_empty() => {
            tracing::info!(root = %root.display(), deleted = deleted.len(), "reconciled stale file states");
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(root = %root.display(), %err, "reconciliation failed"),
    }

    let now = clock.epoch_ms();
    let _ = registry.update_path_last_walk(root, now);
    if let Err(err) = bus.publish(Event::WalkCompleted {
        root: root.to_path_buf(),
        discovered_count,
        duration_ms: started.elapsed().as_millis() as u64,
        at_ms: now,
    }) {
        tracing::warn!(root = %root.display(), %err, "failed to publish walk_completed");
    }
    Ok(discovered_count)
}

fn summarize_path(registry: &Registry, root: RememberedPath) -> RememberedPathSummary {
    let states = registry.list_file_states(&root.path);
    let file_count = states.len() as u64;
    let failed_count = states
        .iter()
        .filter(|s| s.stages.values().any(|st| st.status == memo_core::StageStatus::Failed))
        .count() as u64;
    let pending_count = states
        .iter()
        .filter(|s| !s.all_current() && !s.stages.values().any(|st| st.status == memo_core::StageStatus::Failed))
        .count() as u64;
    RememberedPathSummary {
        path: root.path,
        created_at_ms: root.created_at_ms,
        last_walk_at_ms: root.last_walk_at_ms,
        config: root.config,
        file_count,
        pending_count,
        failed_count,
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
