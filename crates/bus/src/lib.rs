// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! memo-bus: the typed in-process publish/subscribe event bus (§4.A).
//!
//! Subscribers register against one event kind and receive a bounded
//! `tokio::mpsc` channel. Publishing fans out synchronously, in
//! registration order, to every subscriber of that kind — this gives the
//! bus ordering invariant (§8.7) for free instead of requiring a
//! dispatcher task per kind to be raced against publishers. If a
//! subscriber's channel is full, non-critical events are dropped with a
//! counter increment; critical events (`path_deleted`,
//! `config_reload_failed`, `analysis_failed`) spill to a durable overflow
//! journal instead.

mod overflow;

pub use overflow::{CriticalEventRecord, OverflowJournal};

/// Every event kind that can spill to the overflow journal (§4.A),
/// matching `Event::is_critical`. Callers sweeping the journal for
/// redelivery iterate this list rather than tracking kinds separately.
pub const CRITICAL_EVENT_KINDS: [&str; 3] = ["path_deleted", "analysis_failed", "config_reload_failed"];

use memo_core::Event;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("event bus is closed")]
    Closed,
    #[error("overflow journal error: {0}")]
    Overflow(#[from] overflow::OverflowError),
}

impl memo_core::Classify for BusError {
    fn severity(&self) -> memo_core::Severity {
        match self {
            BusError::Closed => memo_core::Severity::Fatal,
            BusError::Overflow(_) => memo_core::Severity::Transient,
        }
    }
}

struct Subscriber {
    id: u64,
    name: String,
    tx: mpsc::Sender<Event>,
}

/// Bus configuration. `channel_capacity` bounds each per-kind subscriber
/// channel; `critical_queue_capacity` bounds the overflow journal.
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub channel_capacity: usize,
    pub critical_queue_capacity: usize,
    pub overflow_path: PathBuf,
}

pub struct EventBus {
    config: BusConfig,
    subscribers: Mutex<HashMap<&'static str, Vec<Subscriber>>>,
    next_subscriber_id: AtomicU64,
    dropped: Mutex<HashMap<String, u64>>,
    overflow: OverflowJournal,
    closed: AtomicBool,
}

impl EventBus {
    pub fn new(config: BusConfig) -> Self {
        let overflow = OverflowJournal::new(config.overflow_path.clone(), config.critical_queue_capacity);
        Self {
            config,
            subscribers: Mutex::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(1),
            dropped: Mutex::new(HashMap::new()),
            overflow,
            closed: AtomicBool::new(false),
        }
    }

    /// Registers a new subscriber for `kind`. Returns a handle used to
    /// unsubscribe and the receiving end of its channel.
    pub fn subscribe(&self, kind: &'static str, name: impl Into<String>) -> (SubscriptionHandle, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let name = name.into();
        self.subscribers
            .lock()
            .entry(kind)
            .or_default()
            .push(Subscriber { id, name, tx });
        (SubscriptionHandle { kind, id }, rx)
    }

    /// Idempotent: unsubscribing an already-removed handle is a no-op.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) {
        if let Some(subs) = self.subscribers.lock().get_mut(handle.kind) {
            subs.retain(|s| s.id != handle.id);
        }
    }

    /// Publishes `event` to every current subscriber of its kind, in
    /// registration order. Non-critical events are dropped (and counted)
    /// on a full channel; critical events spill to the overflow journal.
    pub fn publish(&self, event: Event) -> Result<(), BusError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BusError::Closed);
        }
        let kind = event.kind();
        let subs = self.subscribers.lock();
        if let Some(list) = subs.get(kind) {
            for sub in list {
                if let Err(mpsc::error::TrySendError::Full(event)) = sub.tx.try_send(event.clone()) {
                    if event.is_critical() {
                        self.overflow.spill(&event)?;
                    } else {
                        *self.dropped.lock().entry(format!("{kind}:{}", sub.name)).or_insert(0) += 1;
                        tracing::warn!(kind, subscriber = %sub.name, "dropped non-critical event on full channel");
                    }
                }
            }
        }
        Ok(())
    }

    pub fn dropped_count(&self, kind: &str, subscriber: &str) -> u64 {
        *self.dropped.lock().get(&format!("{kind}:{subscriber}")).unwrap_or(&0)
    }

    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    /// Re-delivers spilled critical events to `kind`'s current subscribers,
    /// draining the overflow journal as deliveries succeed.
    pub fn redeliver_overflow(&self, kind: &'static str) -> Result<usize, BusError> {
        let mut delivered = 0;
        while let Some(record) = self.overflow.peek_front_for_kind(kind)? {
            let subs = self.subscribers.lock();
            let Some(list) = subs.get(kind) else { break };
            let all_sent = list.iter().all(|s| s.tx.try_send(record.event.clone()).is_ok());
            drop(subs);
            if !all_sent {
                break;
            }
            self.overflow.pop_front_for_kind(kind)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Stops accepting new publishes. A real drain-with-timeout would race
    /// outstanding sends against a deadline; since publish is synchronous
    /// here there is nothing in flight to drain once this returns.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

pub struct SubscriptionHandle {
    kind: &'static str,
    id: u64,
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
