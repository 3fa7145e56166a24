// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Bounded FIFO of [`Job`]s with a `path → Job` index enabling
//! coalescing (§4.E). Mirrors the push/dedupe-by-key/wake-workers shape
//! this codebase's own persisted-queue handlers use, generalized from
//! HTTP-request-scoped pushes to a single in-process producer/consumer
//! queue with three coalescing states instead of two, and from a
//! blocking handler to an async `tokio::sync::Notify`-driven wait.

use crate::error::QueueError;
use memo_core::{Job, PipelineStage};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

enum Slot {
    Pending(Job),
    InFlight { requeue_after: Option<Job> },
}

struct Inner {
    order: VecDeque<PathBuf>,
    slots: HashMap<PathBuf, Slot>,
    capacity: usize,
    closed: bool,
}

/// Bounded FIFO with coalescing-by-path (§4.E). `enqueue` waits up to
/// `enqueue_timeout` when full, then returns [`QueueError::QueueFull`];
/// the caller is expected to log and move on, since the next walk will
/// rediscover the path.
pub struct WorkQueue {
    inner: Mutex<Inner>,
    not_empty: Notify,
    not_full: Notify,
}

impl WorkQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                order: VecDeque::new(),
                slots: HashMap::new(),
                capacity: capacity.max(1),
                closed: false,
            }),
            not_empty: Notify::new(),
            not_full: Notify::new(),
        }
    }

    /// Enqueues `job`, coalescing with any existing pending or in-flight
    /// job for the same path (§4.E rules 1-3).
    pub async fn enqueue(&self, job: Job, enqueue_timeout: Duration) -> Result<(), QueueError> {
        tokio::time::timeout(enqueue_timeout, self.enqueue_inner(job)).await.unwrap_or(Err(QueueError::QueueFull))
    }

    async fn enqueue_inner(&self, job: Job) -> Result<(), QueueError> {
        loop {
            {
                let mut inner = self.inner.lock();
                if inner.closed {
                    return Err(QueueError::Closed);
                }
                match inner.slots.get_mut(&job.path) {
                    None => {
                        if inner.order.len() < inner.capacity {
                            inner.order.push_back(job.path.clone());
                            inner.slots.insert(job.path.clone(), Slot::Pending(job));
                            self.not_empty.notify_one();
                            return Ok(());
                        }
                    }
                    Some(Slot::Pending(existing)) => {
                        existing.coalesce(&job);
                        return Ok(());
                    }
                    Some(Slot::InFlight { requeue_after }) => {
                        match requeue_after {
                            Some(existing) => existing.coalesce(&job),
                            None => *requeue_after = Some(job),
                        }
                        return Ok(());
                    }
                }
            }
            self.not_full.notified().await;
        }
    }

    /// Pops the next pending job and marks its path in-flight. Waits
    /// until a job is available or the queue is closed.
    pub async fn claim_next(&self) -> Option<Job> {
        loop {
            {
                let mut inner = self.inner.lock();
                while let Some(path) = inner.order.front().cloned() {
                    if matches!(inner.slots.get(&path), Some(Slot::Pending(_))) {
                        inner.order.pop_front();
                        let job = match inner.slots.remove(&path) {
                            Some(Slot::Pending(job)) => job,
                            _ => unreachable!("front entry checked Pending above"),
                        };
                        inner.slots.insert(path, Slot::InFlight { requeue_after: None });
                        self.not_full.notify_one();
                        return Some(job);
                    }
                    inner.order.pop_front();
                }
                if inner.closed {
                    return None;
                }
            }
            self.not_empty.notified().await;
        }
    }

    /// Marks `path` as complete. If a job accumulated via `requeue_after`
    /// while this one was in flight, it is re-enqueued immediately.
    pub fn complete(&self, path: &Path) {
        let mut inner = self.inner.lock();
        let requeued = match inner.slots.remove(path) {
            Some(Slot::InFlight { requeue_after }) => requeue_after,
            _ => None,
        };
        if let Some(job) = requeued {
            inner.order.push_back(job.path.clone());
            inner.slots.insert(job.path.clone(), Slot::Pending(job));
            self.not_empty.notify_one();
        } else {
            self.not_full.notify_one();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
    }

    pub fn requested_stages(&self, path: &Path) -> Vec<PipelineStage> {
        match self.inner.lock().slots.get(path) {
            Some(Slot::Pending(job)) => job.stages.clone(),
            _ => Vec::new(),
        }
    }
}

pub type SharedWorkQueue = Arc<WorkQueue>;

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
