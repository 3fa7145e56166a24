// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Shared error-classification vocabulary (§7). Each component defines its
//! own `thiserror` error enum and implements [`Severity`] on it so the
//! Orchestrator can route failures without string matching.

/// Where a failure lands in the error-handling taxonomy (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Bad input from a caller; surfaced as HTTP 4xx, never enqueued.
    Validation,
    /// Referenced entity does not exist; HTTP 4xx.
    NotFound,
    /// Disk/network hiccup; retried internally with backoff.
    Transient,
    /// An external dependency (graph store) is down; component degrades
    /// but keeps accepting work where it can.
    Degraded,
    /// Unrecoverable; Orchestrator stops accepting new work.
    Fatal,
}

/// Implemented by every component-level error enum.
pub trait Classify {
    fn severity(&self) -> Severity;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum ExampleError {
        #[error("bad path")]
        BadPath,
        #[error("unreachable")]
        GraphDown,
    }

    impl Classify for ExampleError {
        fn severity(&self) -> Severity {
            match self {
                ExampleError::BadPath => Severity::Validation,
                ExampleError::GraphDown => Severity::Degraded,
            }
        }
    }

    #[test]
    fn severity_dispatch_without_string_matching() {
        assert_eq!(ExampleError::BadPath.severity(), Severity::Validation);
        assert_eq!(ExampleError::GraphDown.severity(), Severity::Degraded);
    }
}
