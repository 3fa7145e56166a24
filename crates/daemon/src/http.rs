// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! The HTTP control plane (§4.I, §6): seven loopback JSON endpoints
//! wired directly onto [`Orchestrator`] methods. Every non-2xx response
//! carries the standard `{"error": "<message>"}` envelope.

use crate::orchestrator::{Orchestrator, OrchestratorError};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use memo_core::Config;
use memo_storage::RegistryError;
use memo_wire::{
    ErrorResponse, ForgetRequest, ForgetResponse, HealthzResponse, ListResponse, ReadRequest, ReadResponse,
    RebuildQuery, RebuildResponse, RememberRequest, RememberResponse,
};
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Builds the daemon's router with per-endpoint timeouts taken from
/// `config` (§5: 30s default, 5min for `/rebuild` and `/read`).
pub fn build_router(state: AppState, config: &Config) -> Router {
    let default_routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/remember", post(remember))
        .route("/forget", post(forget))
        .route("/list", get(list))
        .layer(TimeoutLayer::new(config.request_deadline()));

    let rebuild_routes =
        Router::new().route("/rebuild", post(rebuild)).layer(TimeoutLayer::new(config.rebuild_deadline()));

    let read_routes = Router::new().route("/read", post(read)).layer(TimeoutLayer::new(config.read_deadline()));

    default_routes
        .merge(rebuild_routes)
        .merge(read_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wraps [`OrchestratorError`] for the one place it needs an HTTP status:
/// client errors (unknown root, bad input) map to 4xx, everything else
/// to 500 per §6.
struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match self.0 {
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::BAD_REQUEST => "invalid_input",
            _ => "internal",
        };
        (self.0, Json(ErrorResponse { message: self.1, code: code.to_string() })).into_response()
    }
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        match &err {
            OrchestratorError::NotRemembered(_) => AppError(StatusCode::NOT_FOUND, err.to_string()),
            OrchestratorError::Registry(RegistryError::PathExists(_))
            | OrchestratorError::Registry(RegistryError::PathNotFound(_))
            | OrchestratorError::Registry(RegistryError::FileStateNotFound(_)) => {
                AppError(StatusCode::BAD_REQUEST, err.to_string())
            }
            _ => AppError(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        }
    }
}

async fn healthz() -> Json<HealthzResponse> {
    Json(HealthzResponse::default())
}

async fn readyz(State(state): State<AppState>) -> Response {
    let status = state.orchestrator.health_snapshot();
    let code = if status.ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status)).into_response()
}

async fn remember(
    State(state): State<AppState>,
    Json(request): Json<RememberRequest>,
) -> Result<Json<RememberResponse>, AppError> {
    let already_remembered = state.orchestrator.list_paths().iter().any(|p| p.path == request.path);
    state.orchestrator.remember(&request.path, request.patch).await?;
    Ok(Json(RememberResponse { path: request.path, created: !already_remembered }))
}

async fn forget(
    State(state): State<AppState>,
    Json(request): Json<ForgetRequest>,
) -> Result<Json<ForgetResponse>, AppError> {
    let deleted_files = if request.keep_data {
        0
    } else {
        state
            .orchestrator
            .list_paths()
            .iter()
            .find(|p| p.path == request.path)
            .map(|p| p.file_count)
            .unwrap_or(0)
    };
    state.orchestrator.forget(&request.path, request.keep_data).await?;
    Ok(Json(ForgetResponse { path: request.path, deleted_files }))
}

async fn list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse { paths: state.orchestrator.list_paths() })
}

async fn rebuild(
    State(state): State<AppState>,
    Query(query): Query<RebuildQuery>,
) -> Result<Json<RebuildResponse>, AppError> {
    let outcome = state.orchestrator.rebuild(query.full).await?;
    Ok(Json(RebuildResponse {
        roots_walked: outcome.roots_walked,
        jobs_enqueued: outcome.jobs_enqueued,
        duration_ms: outcome.duration_ms,
    }))
}

async fn read(State(state): State<AppState>, Json(request): Json<ReadRequest>) -> Json<ReadResponse> {
    let (files, truncated) = state.orchestrator.read(request.max_files);
    Json(ReadResponse { files, truncated })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
