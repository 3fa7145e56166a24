// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Fixed-size cooperative worker pool (§4.F): each worker loops claiming
//! a [`Job`] from the [`WorkQueue`], running it through the analysis
//! pipeline, and publishing `analysis_completed`/`analysis_failed`. A
//! shared `CancellationToken` drives shutdown, mirroring the debounce
//! task's `tokio::select!` idiom — in-flight jobs get up to a configured
//! grace period to finish before being abandoned.

use crate::error::PipelineError;
use crate::pipeline::{self, PipelineConfig, PipelineDeps};
use memo_bus::EventBus;
use memo_core::{Clock, Event, FailureCategory, Job, PipelineStage, StageState};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    pub workers: NonZeroUsize,
    pub graceful_shutdown_timeout: Duration,
}

fn one_worker() -> NonZeroUsize {
    NonZeroUsize::new(1).unwrap_or_else(|| unreachable!("1 is nonzero"))
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1);
        Self {
            workers: NonZeroUsize::new(cores.min(4)).unwrap_or_else(one_worker),
            graceful_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Owns the worker tasks. Dropping it leaves them running; callers that
/// want an orderly drain call [`WorkerPool::shutdown`].
pub struct WorkerPool {
    cancel: CancellationToken,
    handles: Vec<tokio::task::JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl WorkerPool {
    pub fn spawn<C: Clock + 'static>(
        config: WorkerPoolConfig,
        queue: Arc<crate::queue::WorkQueue>,
        deps: Arc<PipelineDeps<C>>,
        pipeline_config: Arc<PipelineConfig>,
        bus: Arc<EventBus>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handles = (0..config.workers.get())
            .map(|id| {
                tokio::spawn(run_worker_loop(
                    id,
                    queue.clone(),
                    deps.clone(),
                    pipeline_config.clone(),
                    bus.clone(),
                    cancel.clone(),
                ))
            })
            .collect();
        Self { cancel, handles, shutdown_timeout: config.graceful_shutdown_timeout }
    }

    /// Signals every worker to stop, then waits up to
    /// `graceful_shutdown_timeout` for in-flight jobs to finish before
    /// abandoning whatever remains.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let deadline = tokio::time::Instant::now() + self.shutdown_timeout;
        for handle in self.handles {
            let mut handle = handle;
            tokio::select! {
                _ = &mut handle => {}
                _ = tokio::time::sleep_until(deadline) => {
                    handle.abort();
                }
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_worker_loop<C: Clock + 'static>(
    worker_id: usize,
    queue: Arc<crate::queue::WorkQueue>,
    deps: Arc<PipelineDeps<C>>,
    pipeline_config: Arc<PipelineConfig>,
    bus: Arc<EventBus>,
    cancel: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => break,
            job = queue.claim_next() => job,
        };
        let Some(job) = job else { break };

        execute_job(&deps, &pipeline_config, &bus, &job).await;
        queue.complete(&job.path);
    }
    tracing::debug!(worker_id, "worker stopped");
}

/// Runs one job's pipeline inside its own task so a panic inside a
/// provider or chunker is caught at this boundary instead of taking the
/// worker down with it (§7).
async fn execute_job<C: Clock + 'static>(
    deps: &Arc<PipelineDeps<C>>,
    config: &Arc<PipelineConfig>,
    bus: &Arc<EventBus>,
    job: &Job,
) {
    let deps = deps.clone();
    let config = config.clone();
    let job_clone = job.clone();
    let outcome = tokio::spawn(async move { pipeline::run_job(&deps, &config, &job_clone).await }).await;

    let now_ms = deps.clock.epoch_ms();
    match outcome {
        Ok(Ok(())) => {
            publish(bus, Event::AnalysisCompleted {
                job_id: job.id,
                path: job.path.clone(),
                stages_completed: job.stages.clone(),
                at_ms: now_ms,
            });
        }
        Ok(Err((stage, err))) => {
            record_failure(&deps.registry, job, stage, &err);
            publish(bus, Event::AnalysisFailed {
                job_id: job.id,
                path: job.path.clone(),
                stage,
                error: err.to_string(),
                category: err.category(),
                at_ms: now_ms,
            });
        }
        Err(join_err) if join_err.is_panic() => {
            let stage = PipelineStage::Metadata;
            let err = PipelineError::Panic(format!("worker task panicked: {join_err}"));
            record_failure(&deps.registry, job, stage, &err);
            publish(bus, Event::AnalysisFailed {
                job_id: job.id,
                path: job.path.clone(),
                stage,
                error: err.to_string(),
                category: FailureCategory::Panic,
                at_ms: now_ms,
            });
        }
        Err(join_err) => {
            tracing::warn!(path = %job.path.display(), %join_err, "job task was cancelled");
        }
    }
}

fn record_failure(registry: &memo_storage::Registry, job: &Job, stage: PipelineStage, err: &PipelineError) {
    let Some(existing) = registry.get_file_state(&job.path) else { return };
    let prior = existing.stages.get(&stage).cloned().unwrap_or_else(StageState::absent);
    if let Err(registry_err) = registry.update_stage(&job.path, stage, prior.failed(err.to_string())) {
        tracing::warn!(path = %job.path.display(), %stage, %registry_err, "failed to record stage failure");
    }
}

fn publish(bus: &EventBus, event: Event) {
    if let Err(err) = bus.publish(event) {
        tracing::warn!(%err, "failed to publish worker event");
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
