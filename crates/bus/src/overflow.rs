// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! The durable overflow journal for critical events (§4.A). An
//! append-only NDJSON file, capped at `critical_queue_capacity` records;
//! once full the oldest record is evicted and a counter increments. This
//! is the one place a bus event can be truly lost.

use memo_core::Event;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OverflowError {
    #[error("failed to write overflow journal {path}: {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CriticalEventRecord {
    pub seq: u64,
    pub queued_at_ms: u64,
    pub event: Event,
}

pub struct OverflowJournal {
    path: PathBuf,
    capacity: usize,
    records: Mutex<VecDeque<CriticalEventRecord>>,
    next_seq: Mutex<u64>,
    evicted: Mutex<u64>,
}

impl OverflowJournal {
    pub fn new(path: PathBuf, capacity: usize) -> Self {
        Self {
            path,
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::new()),
            next_seq: Mutex::new(0),
            evicted: Mutex::new(0),
        }
    }

    pub fn spill(&self, event: &Event) -> Result<(), OverflowError> {
        let mut seq_guard = self.next_seq.lock();
        let seq = *seq_guard;
        *seq_guard += 1;
        drop(seq_guard);

        let record = CriticalEventRecord {
            seq,
            queued_at_ms: 0,
            event: event.clone(),
        };
        self.append_line(&record)?;

        let mut records = self.records.lock();
        records.push_back(record);
        if records.len() > self.capacity {
            records.pop_front();
            *self.evicted.lock() += 1;
            tracing::error!(path = %self.path.display(), "overflow journal at capacity, evicted oldest record");
        }
        Ok(())
    }

    fn append_line(&self, record: &CriticalEventRecord) -> Result<(), OverflowError> {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| OverflowError::Write { path: self.path.clone(), source })?;
        let line = serde_json::to_string(record).unwrap_or_default();
        writeln!(file, "{line}").map_err(|source| OverflowError::Write { path: self.path.clone(), source })
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn evicted_count(&self) -> u64 {
        *self.evicted.lock()
    }

    pub fn peek_front_for_kind(&self, kind: &str) -> Result<Option<CriticalEventRecord>, OverflowError> {
        Ok(self.records.lock().iter().find(|r| r.event.kind() == kind).cloned())
    }

    pub fn pop_front(&self) -> Result<Option<CriticalEventRecord>, OverflowError> {
        Ok(self.records.lock().pop_front())
    }

    /// Removes and returns the oldest record of `kind`, leaving records of
    /// other kinds in place. The journal interleaves all critical kinds in
    /// one queue, so draining one kind must not disturb the others.
    pub fn pop_front_for_kind(&self, kind: &str) -> Result<Option<CriticalEventRecord>, OverflowError> {
        let mut records = self.records.lock();
        let pos = records.iter().position(|r| r.event.kind() == kind);
        Ok(pos.map(|i| records.remove(i).expect("position came from this deque")))
    }
}
