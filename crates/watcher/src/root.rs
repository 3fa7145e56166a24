// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! One OS-level recursive watch per remembered root, each feeding a
//! dedicated debounce task over a bounded channel (§4.C). The debounce
//! task is a `tokio::select!` loop racing raw OS events, a periodic tick
//! that expires entries past their `earliest_emit_time`, and shutdown —
//! no polling sleep loop of its own.

use crate::debounce::{Debouncer, PendingKind};
use memo_bus::EventBus;
use memo_core::{Clock, Event, PathConfig};
use memo_storage::Registry;
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error("failed to create OS watcher: {0}")]
    WatcherInit(#[source] notify::Error),
    #[error("failed to start watching: {0}")]
    WatchStart(#[source] notify::Error),
}

impl memo_core::Classify for WatcherError {
    fn severity(&self) -> memo_core::Severity {
        memo_core::Severity::Fatal
    }
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub debounce_window_ms: u64,
    pub delete_grace_period_ms: u64,
    pub raw_queue_capacity: usize,
    pub tick_interval_ms: u64,
    pub default_path_config: PathConfig,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_window_ms: 500,
            delete_grace_period_ms: 1_500,
            raw_queue_capacity: 1_024,
            tick_interval_ms: 100,
            default_path_config: PathConfig::default(),
        }
    }
}

#[derive(Debug)]
enum RawEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
    WatchLost,
}

fn classify(event: &notify::Event) -> Vec<RawEvent> {
    match &event.kind {
        EventKind::Create(_) => event.paths.iter().cloned().map(RawEvent::Created).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            vec![RawEvent::Renamed { from: event.paths[0].clone(), to: event.paths[1].clone() }]
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            event.paths.iter().cloned().map(RawEvent::Removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.iter().cloned().map(RawEvent::Created).collect()
        }
        EventKind::Modify(_) => event.paths.iter().cloned().map(RawEvent::Modified).collect(),
        EventKind::Remove(_) => event.paths.iter().cloned().map(RawEvent::Removed).collect(),
        _ => Vec::new(),
    }
}

/// Owns the OS watch handle and its debounce task for one remembered root.
/// Dropping it cancels the task; callers that want a graceful drain call
/// [`RootWatcher::shutdown`] instead.
pub struct RootWatcher {
    _watcher: RecommendedWatcher,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl RootWatcher {
    pub fn spawn<C: Clock + 'static>(
        root: PathBuf,
        registry: Arc<Registry>,
        bus: Arc<EventBus>,
        clock: C,
        config: WatcherConfig,
    ) -> Result<Self, WatcherError> {
        let (raw_tx, raw_rx) = mpsc::channel(config.raw_queue_capacity.max(1));

        let cb_tx = raw_tx.clone();
        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(_) => {
                    let _ = cb_tx.try_send(RawEvent::WatchLost);
                    return;
                }
            };
            for item in classify(&event) {
                let _ = cb_tx.try_send(item);
            }
        })
        .map_err(WatcherError::WatcherInit)?;
        watcher.watch(&root, RecursiveMode::Recursive).map_err(WatcherError::WatchStart)?;

        let cancel = CancellationToken::new();
        let handle =
            tokio::spawn(run_debounce_loop(root, raw_rx, registry, bus, clock, config, cancel.clone()));

        Ok(Self { _watcher: watcher, cancel, handle })
    }

    /// Signals the debounce task to stop and waits for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

impl Drop for RootWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_debounce_loop<C: Clock>(
    root: PathBuf,
    mut raw_rx: mpsc::Receiver<RawEvent>,
    registry: Arc<Registry>,
    bus: Arc<EventBus>,
    clock: C,
    config: WatcherConfig,
    cancel: CancellationToken,
) {
    let mut debouncer = Debouncer::new(config.debounce_window_ms, config.delete_grace_period_ms);
    let mut tick = tokio::time::interval(Duration::from_millis(config.tick_interval_ms.max(1)));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                let now = clock.epoch_ms();
                for (path, kind) in debouncer.drain_ready(now) {
                    emit(&registry, &bus, &config.default_path_config, path, kind, now);
                }
            }
            maybe = raw_rx.recv() => {
                let Some(raw) = maybe else { break };
                let now = clock.epoch_ms();
                match raw {
                    RawEvent::Created(path) | RawEvent::Modified(path) => {
                        debouncer.record_changed(path, now);
                    }
                    RawEvent::Removed(path) => {
                        debouncer.record_deleted(path, now);
                    }
                    RawEvent::Renamed { from, to } => {
                        let same_root = registry.find_containing_path(&from) == registry.find_containing_path(&to);
                        if !same_root {
                            debouncer.record_deleted(from, now);
                        }
                        debouncer.record_changed(to, now);
                    }
                    RawEvent::WatchLost => {
                        tracing::warn!(root = %root.display(), "watch handle lost, falling back to full rescan");
                        let _ = bus.publish(Event::WalkStarted { root: root.clone(), at_ms: now });
                        break;
                    }
                }
            }
        }
    }
}

fn emit(registry: &Registry, bus: &EventBus, defaults: &PathConfig, path: PathBuf, kind: PendingKind, now_ms: u64) {
    let Some(parent) = registry.find_containing_path(&path) else { return };
    let effective = registry.get_effective_config(&path, defaults);
    let name = file_name_str(&path);
    if effective.excludes_name(name, false) {
        return;
    }
    let event = match kind {
        PendingKind::Changed => Event::PathChanged { path, parent, at_ms: now_ms },
        PendingKind::Deleted => Event::PathDeleted { path, parent, at_ms: now_ms },
    };
    if let Err(err) = bus.publish(event) {
        tracing::warn!(%err, "failed to publish watcher event");
    }
}

fn file_name_str(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

#[cfg(test)]
#[path = "root_tests.rs"]
mod tests;
