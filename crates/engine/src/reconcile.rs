// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Cleaner/Reconciler (§4.H): cascade-deletes registry and graph state
//! for `path_deleted`/`path_forgotten` events, and sweeps stale
//! `FileState`s left behind after a walk. Subscribing to the bus and
//! racing it against shutdown mirrors the watcher's debounce task.

use crate::error::ReconcileError;
use memo_bus::EventBus;
use memo_core::Event;
use memo_storage::Registry;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of [`reconcile_after_walk`] for one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// `deleted` stale file paths were cascade-removed.
    Reconciled { deleted: Vec<PathBuf> },
    /// `discovered` was empty while the registry still held state for
    /// this root; reconciliation was skipped to avoid a mass deletion.
    Skipped,
}

/// Owns the subscriber task reacting to delete-shaped events. Dropping
/// it cancels the task; callers wanting a clean drain call
/// [`Cleaner::shutdown`].
pub struct Cleaner {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl Cleaner {
    pub fn spawn(registry: Arc<Registry>, graph: Arc<dyn memo_adapters::GraphAdapter>, bus: Arc<EventBus>) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_cleaner_loop(registry, graph, bus, cancel.clone()));
        Self { cancel, handle }
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

impl Drop for Cleaner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_cleaner_loop(registry: Arc<Registry>, graph: Arc<dyn memo_adapters::GraphAdapter>, bus: Arc<EventBus>, cancel: CancellationToken) {
    let (_deleted_handle, mut deleted_rx) = bus.subscribe("path_deleted", "cleaner");
    let (_forgotten_handle, mut forgotten_rx) = bus.subscribe("path_forgotten", "cleaner");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            maybe = deleted_rx.recv() => {
                let Some(Event::PathDeleted { path, .. }) = maybe else { break };
                if let Err(err) = cascade_delete(&registry, &graph, &path).await {
                    tracing::warn!(path = %path.display(), %err, "cascade delete on path_deleted failed");
                }
            }
            maybe = forgotten_rx.recv() => {
                let Some(Event::PathForgotten { path, keep_data, .. }) = maybe else { break };
                if keep_data {
                    continue;
                }
                if let Err(err) = cascade_delete(&registry, &graph, &path).await {
                    tracing::warn!(path = %path.display(), %err, "cascade delete on path_forgotten failed");
                }
            }
        }
    }
}

/// Removes `path`'s own node/FileState plus anything filed under it as a
/// prefix, in both the graph and the registry. Used both for a single
/// deleted file and for a forgotten root's bulk cleanup.
async fn cascade_delete(registry: &Registry, graph: &Arc<dyn memo_adapters::GraphAdapter>, path: &Path) -> Result<(), ReconcileError> {
    graph.delete_file(path).await?;
    graph.delete_directory(path).await?;
    graph.delete_files_under_path(path).await?;
    graph.delete_directories_under_path(path).await?;
    registry.delete_file_state(path)?;
    registry.delete_file_states_for_path(path)?;
    Ok(())
}

/// Runs after a completed walk of `root`: any `FileState` filed under
/// `root` whose path is not in `discovered` is stale and cascade-deleted.
/// If `discovered` is empty while the registry still holds state for
/// this root, skips entirely (§4.H safeguard) rather than deleting
/// everything because of a misconfigured filter or a transient
/// permission failure.
pub async fn reconcile_after_walk(
    registry: &Registry,
    graph: &Arc<dyn memo_adapters::GraphAdapter>,
    root: &Path,
    discovered: &HashSet<PathBuf>,
) -> Result<ReconcileOutcome, ReconcileError> {
    let existing = registry.list_file_states(root);
    if discovered.is_empty() && !existing.is_empty() {
        tracing::warn!(root = %root.display(), "empty discovered set with existing file state, skipping reconciliation");
        return Ok(ReconcileOutcome::Skipped);
    }

    let mut deleted = Vec::new();
    for state in existing {
        if !discovered.contains(&state.path) {
            cascade_delete(registry, graph, &state.path).await?;
            deleted.push(state.path);
        }
    }
    Ok(ReconcileOutcome::Reconciled { deleted })
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
