// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

#[tokio::test]
async fn succeeds_after_transient_failures_within_budget() {
    let calls = AtomicU32::new(0);
    let result = with_backoff(3, || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(PipelineError::Transient("not yet".into()))
            } else {
                Ok(42)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let calls = AtomicU32::new(0);
    let result: Result<(), PipelineError> = with_backoff(2, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(PipelineError::Transient("still failing".into())) }
    })
    .await;
    assert!(matches!(result, Err(PipelineError::Transient(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 3); // initial attempt + 2 retries
}

#[tokio::test]
async fn non_transient_errors_are_not_retried() {
    let calls = AtomicU32::new(0);
    let result: Result<(), PipelineError> = with_backoff(5, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(PipelineError::PermanentInput("bad file".into())) }
    })
    .await;
    assert!(matches!(result, Err(PipelineError::PermanentInput(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
