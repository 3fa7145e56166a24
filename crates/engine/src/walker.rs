// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Walks a remembered root's directory tree, diffing each file against
//! its [`FileState`] and enqueuing work (§4.D). Content hashing streams
//! through SHA-256 in fixed-size chunks so memory use is bounded
//! regardless of file size.

use crate::error::WalkError;
use crate::queue::WorkQueue;
use memo_core::{Clock, FileState, Job, JobReason, PathConfig, PipelineStage, Priority};
use memo_storage::Registry;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const HASH_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub max_retries: u32,
    pub enqueue_timeout: Duration,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self { max_retries: 5, enqueue_timeout: Duration::from_secs(5) }
    }
}

/// Result of a completed (non-cancelled) walk, handed to the Reconciler.
pub struct WalkOutcome {
    pub discovered: HashSet<PathBuf>,
}

/// Walks `root` per §4.D: skip rules first, include rules override, a
/// changed or absent `FileState` enqueues work, identical-and-current
/// files are discovery-only, and a cancelled walk does not report a
/// completed outcome (so `last_walk_at` is left untouched by the caller).
pub async fn walk_root<C: Clock>(
    root: &Path,
    registry: &Registry,
    queue: &WorkQueue,
    defaults: &PathConfig,
    config: &WalkConfig,
    clock: &C,
    cancel: &CancellationToken,
) -> Result<WalkOutcome, WalkError> {
    let effective = registry.get_effective_config(root, defaults);
    let mut discovered = HashSet::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if cancel.is_cancelled() {
            return Err(WalkError::Cancelled);
        }
        let entries = std::fs::read_dir(&dir).map_err(|source| WalkError::ReadDir { path: dir.clone(), source })?;
        for entry in entries {
            if cancel.is_cancelled() {
                return Err(WalkError::Cancelled);
            }
            let entry = entry.map_err(|source| WalkError::ReadDir { path: dir.clone(), source })?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            if effective.excludes_name(&name, is_dir) {
                continue;
            }
            if is_dir {
                stack.push(path);
                continue;
            }

            discovered.insert(path.clone());
            visit_file(&path, &root.to_path_buf(), registry, queue, config, clock).await?;
        }
    }

    Ok(WalkOutcome { discovered })
}

async fn visit_file<C: Clock>(
    path: &Path,
    parent: &PathBuf,
    registry: &Registry,
    queue: &WorkQueue,
    config: &WalkConfig,
    clock: &C,
) -> Result<(), WalkError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return Ok(()), // vanished between readdir and stat; next walk will reconcile
    };
    let size = metadata.len();
    let mtime_ms = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let content_hash = hash_file(path)?;
    let existing = registry.get_file_state(path);
    let now = clock.epoch_ms();

    match &existing {
        None => {
            let state = FileState::new(path.to_path_buf(), parent.clone(), content_hash, size, mtime_ms);
            registry.update_file_state(state)?;
            enqueue_all_stages(path, parent, JobReason::Created, queue, config, now).await;
        }
        Some(prev) if prev.content_hash != content_hash => {
            let state = FileState::new(path.to_path_buf(), parent.clone(), content_hash, size, mtime_ms);
            registry.update_file_state(state)?;
            enqueue_all_stages(path, parent, JobReason::Modified, queue, config, now).await;
        }
        Some(prev) => {
            let needing = prev.stages_needing(config.max_retries);
            let requestable: Vec<PipelineStage> =
                needing.into_iter().filter(|s| *s != PipelineStage::Persist).collect();
            if !requestable.is_empty() {
                let job = Job::new(
                    path.to_path_buf(),
                    parent.clone(),
                    JobReason::Reconcile,
                    requestable,
                    now,
                    Priority::Background,
                );
                if let Err(err) = queue.enqueue(job, config.enqueue_timeout).await {
                    tracing::warn!(path = %path.display(), %err, "failed to enqueue retry job");
                }
            }
        }
    }
    Ok(())
}

async fn enqueue_all_stages(
    path: &Path,
    parent: &Path,
    reason: JobReason,
    queue: &WorkQueue,
    config: &WalkConfig,
    now_ms: u64,
) {
    let stages = vec![PipelineStage::Metadata, PipelineStage::Semantic, PipelineStage::Embeddings];
    let job = Job::new(path.to_path_buf(), parent.to_path_buf(), reason, stages, now_ms, Priority::Normal);
    if let Err(err) = queue.enqueue(job, config.enqueue_timeout).await {
        tracing::warn!(path = %path.display(), %err, "failed to enqueue job");
    }
}

fn hash_file(path: &Path) -> Result<String, WalkError> {
    let mut file =
        std::fs::File::open(path).map_err(|source| WalkError::Hash { path: path.to_path_buf(), source })?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|source| WalkError::Hash { path: path.to_path_buf(), source })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
