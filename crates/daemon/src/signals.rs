// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! SIGTERM/SIGHUP handling (§4.I). SIGTERM requests graceful shutdown;
//! SIGHUP requests a configuration reload. Both race against each other
//! so either can wake the caller first.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Terminate,
    ReloadRequested,
}

/// Waits for SIGTERM or SIGHUP (Unix) or Ctrl+C (other platforms, for
/// local development). Returns which one fired.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> ShutdownReason {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(%err, "failed to install SIGTERM handler, falling back to ctrl_c");
            let _ = tokio::signal::ctrl_c().await;
            return ShutdownReason::Terminate;
        }
    };
    let mut hup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(%err, "failed to install SIGHUP handler");
            let _ = term.recv().await;
            return ShutdownReason::Terminate;
        }
    };

    tokio::select! {
        _ = term.recv() => ShutdownReason::Terminate,
        _ = hup.recv() => ShutdownReason::ReloadRequested,
    }
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> ShutdownReason {
    let _ = tokio::signal::ctrl_c().await;
    ShutdownReason::Terminate
}
