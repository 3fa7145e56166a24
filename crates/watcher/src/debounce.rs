// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Per-path debounce buffer implementing the
//! `idle -> pending(kind, earliest_emit_time) -> emitted -> idle` state
//! machine (§4.C). A path absent from `entries` is idle; inserting an
//! entry moves it to pending; [`Debouncer::drain_ready`] removing it past
//! its `earliest_emit_time` is the pending->emitted->idle transition.

use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Changed,
    Deleted,
}

struct Entry {
    kind: PendingKind,
    earliest_emit_at_ms: u64,
}

pub struct Debouncer {
    debounce_window_ms: u64,
    delete_grace_period_ms: u64,
    entries: HashMap<PathBuf, Entry>,
}

impl Debouncer {
    pub fn new(debounce_window_ms: u64, delete_grace_period_ms: u64) -> Self {
        Self { debounce_window_ms, delete_grace_period_ms, entries: HashMap::new() }
    }

    /// Records a create or modify observation for `path`. Resurrects a
    /// path currently in the delete grace period instead of letting the
    /// delete fire, merging rapid delete-create (editor atomic saves)
    /// into a single eventual `path_changed`.
    pub fn record_changed(&mut self, path: PathBuf, now_ms: u64) {
        self.entries.insert(
            path,
            Entry { kind: PendingKind::Changed, earliest_emit_at_ms: now_ms + self.debounce_window_ms },
        );
    }

    /// Records a delete observation for `path`. Carries an extended grace
    /// period so a delete immediately followed by a recreate (same path)
    /// collapses into one `path_changed` via `record_changed` resurrecting
    /// the entry before the grace period elapses.
    pub fn record_deleted(&mut self, path: PathBuf, now_ms: u64) {
        self.entries.insert(
            path,
            Entry { kind: PendingKind::Deleted, earliest_emit_at_ms: now_ms + self.delete_grace_period_ms },
        );
    }

    /// Pops every entry whose `earliest_emit_at_ms` has passed, returning
    /// to idle.
    pub fn drain_ready(&mut self, now_ms: u64) -> Vec<(PathBuf, PendingKind)> {
        let ready: Vec<PathBuf> =
            self.entries.iter().filter(|(_, e)| e.earliest_emit_at_ms <= now_ms).map(|(p, _)| p.clone()).collect();
        ready.into_iter().filter_map(|path| self.entries.remove(&path).map(|entry| (path, entry.kind))).collect()
    }

    /// Earliest deadline across all pending entries, used to size the
    /// next tick wait; `None` when idle (nothing pending).
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.entries.values().map(|e| e.earliest_emit_at_ms).min()
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
