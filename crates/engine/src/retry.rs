// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Bounded exponential backoff for `Transient` stage failures (§7):
//! network hiccups and provider 5xx are retried inside the pipeline
//! before `FileState` ever sees them; only a `Transient` error that
//! survives `max_retries` attempts is surfaced to the caller.

use crate::error::PipelineError;
use std::future::Future;
use std::time::Duration;

const BASE_DELAY: Duration = Duration::from_millis(100);
const MAX_DELAY: Duration = Duration::from_secs(5);

pub async fn with_backoff<T, F, Fut>(max_retries: u32, mut attempt: F) -> Result<T, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let mut delay = BASE_DELAY;
    let mut tries = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(PipelineError::Transient(message)) if tries < max_retries => {
                tries += 1;
                tracing::warn!(attempt = tries, max_retries, %message, "retrying after transient failure");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
