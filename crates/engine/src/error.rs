// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Component error enums for the Walker, Work queue, Worker pool,
//! Analysis pipeline, and Cleaner (§7).

use memo_core::{Classify, Severity};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("failed to read directory {path}: {source}")]
    ReadDir { path: PathBuf, source: std::io::Error },
    #[error("failed to hash file {path}: {source}")]
    Hash { path: PathBuf, source: std::io::Error },
    #[error("registry error during walk: {0}")]
    Registry(#[from] memo_storage::RegistryError),
    #[error("walk was cancelled")]
    Cancelled,
}

impl Classify for WalkError {
    fn severity(&self) -> Severity {
        match self {
            WalkError::ReadDir { .. } | WalkError::Hash { .. } => Severity::Transient,
            WalkError::Registry(e) => e.severity(),
            WalkError::Cancelled => Severity::Transient,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("work queue is full")]
    QueueFull,
    #[error("work queue is closed")]
    Closed,
}

impl Classify for QueueError {
    fn severity(&self) -> Severity {
        match self {
            QueueError::QueueFull => Severity::Transient,
            QueueError::Closed => Severity::Fatal,
        }
    }
}

/// Failure taxonomy for a single pipeline stage invocation (§4.G, §7).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("transient failure in stage: {0}")]
    Transient(String),
    #[error("permanent input failure in stage: {0}")]
    PermanentInput(String),
    #[error("stage deferred by policy: {0}")]
    Policy(String),
    #[error("fatal dependency failure in stage: {0}")]
    Fatal(String),
    #[error("stage panicked: {0}")]
    Panic(String),
}

impl PipelineError {
    pub fn category(&self) -> memo_core::FailureCategory {
        use memo_core::FailureCategory;
        match self {
            PipelineError::Transient(_) => FailureCategory::Transient,
            PipelineError::PermanentInput(_) => FailureCategory::PermanentInput,
            PipelineError::Policy(_) => FailureCategory::Policy,
            PipelineError::Fatal(_) => FailureCategory::Fatal,
            PipelineError::Panic(_) => FailureCategory::Panic,
        }
    }
}

impl Classify for PipelineError {
    fn severity(&self) -> Severity {
        match self {
            PipelineError::Transient(_) => Severity::Transient,
            PipelineError::PermanentInput(_) => Severity::Validation,
            PipelineError::Policy(_) => Severity::Transient,
            PipelineError::Fatal(_) => Severity::Degraded,
            PipelineError::Panic(_) => Severity::Fatal,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("registry error during reconciliation: {0}")]
    Registry(#[from] memo_storage::RegistryError),
    #[error("graph error during reconciliation: {0}")]
    Graph(#[from] memo_adapters::GraphError),
}

impl Classify for ReconcileError {
    fn severity(&self) -> Severity {
        match self {
            ReconcileError::Registry(e) => e.severity(),
            ReconcileError::Graph(e) => e.severity(),
        }
    }
}
