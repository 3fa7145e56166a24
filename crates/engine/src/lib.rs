// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! memo-engine: the Walker/Planner, Work queue, Worker pool, Analysis
//! pipeline, and Cleaner/Reconciler (§4.D-H). Watched or walk-discovered
//! paths become Jobs; workers drain the queue through the pipeline and
//! the graph/registry stay reconciled against what walks actually find.

mod error;
mod pipeline;
mod queue;
mod rate_limit;
mod reconcile;
mod retry;
mod walker;
mod worker;

pub use error::{PipelineError, QueueError, ReconcileError, WalkError};
pub use pipeline::{run_job, PipelineConfig, PipelineDeps};
pub use queue::{SharedWorkQueue, WorkQueue};
pub use rate_limit::RateLimiter;
pub use reconcile::{reconcile_after_walk, Cleaner, ReconcileOutcome};
pub use walker::{walk_root, WalkConfig, WalkOutcome};
pub use worker::{WorkerPool, WorkerPoolConfig};
