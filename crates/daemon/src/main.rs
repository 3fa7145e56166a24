// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! `memod`: the daemon binary. Loads config, brings up the
//! [`Orchestrator`], and serves the HTTP control plane until SIGTERM.

use memo_adapters::{
    ChunkerRegistry, EmbeddingsProviderRegistry, GraphAdapter, HttpGraphAdapter, HttpGraphAdapterConfig, LineChunker,
    SemanticProviderRegistry,
};
use memo_core::Config;
use memo_daemon::{build_router, wait_for_shutdown_signal, write_pid_file, AppState, Orchestrator, ShutdownReason};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    let _pid_file = write_pid_file(&config.pid_path())?;

    let graph: Arc<dyn GraphAdapter> = Arc::new(HttpGraphAdapter::new(HttpGraphAdapterConfig {
        base_url: config.graph_base_url.clone(),
        request_timeout: config.graph_request_timeout(),
    })?);

    let chunkers = {
        let mut registry = ChunkerRegistry::new();
        registry.register(Arc::new(LineChunker::default()));
        registry
    };

    // Concrete semantic/embeddings provider adapters are out of scope here
    // (pluggable, described only by the interface the pipeline consumes);
    // jobs that reach those stages fall back to `Policy` until an operator
    // wires in a provider via these registries.
    let semantic_providers = SemanticProviderRegistry::new();
    let embeddings_providers = EmbeddingsProviderRegistry::new();

    let orchestrator =
        Arc::new(Orchestrator::start(config.clone(), graph, chunkers, semantic_providers, embeddings_providers).await?);

    let listener = tokio::net::TcpListener::bind(config.http_socket_addr()).await?;
    tracing::info!(addr = %config.http_socket_addr(), "listening");

    let router = build_router(AppState { orchestrator: orchestrator.clone() }, &config);
    if let Err(err) = axum::serve(listener, router).with_graceful_shutdown(shutdown_on_terminate()).await {
        tracing::error!(%err, "http server error");
    }

    let orchestrator = Arc::into_inner(orchestrator).expect("no other references survive server shutdown");
    orchestrator.shutdown().await;
    std::fs::remove_file(config.pid_path()).ok();
    Ok(())
}

async fn shutdown_on_terminate() {
    loop {
        match wait_for_shutdown_signal().await {
            ShutdownReason::Terminate => return,
            ShutdownReason::ReloadRequested => {
                tracing::info!("SIGHUP received; config reload on a running daemon is not yet wired up, ignoring");
            }
        }
    }
}
