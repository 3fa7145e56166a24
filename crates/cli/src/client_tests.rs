// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use axum::extract::Json;
use axum::http::StatusCode as HttpStatusCode;
use axum::routing::{get, post};
use axum::Router;
use memo_wire::{ForgetRequest, RememberRequest};
use std::net::SocketAddr;

async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn remember_parses_success_response() {
    let router = Router::new().route(
        "/remember",
        post(|Json(body): Json<RememberRequest>| async move {
            Json(RememberResponse { path: body.path, created: true })
        }),
    );
    let addr = spawn_server(router).await;
    let client = DaemonClient::new(format!("http://{addr}")).unwrap();

    let response =
        client.remember(&RememberRequest { path: "/tmp/a".into(), patch: None }).await.unwrap();
    assert!(response.created);
}

#[tokio::test]
async fn forget_maps_404_to_invalid_input() {
    let router = Router::new().route(
        "/forget",
        post(|| async { (HttpStatusCode::NOT_FOUND, Json(ErrorResponse { message: "not remembered".into(), code: "not_found".into() })) }),
    );
    let addr = spawn_server(router).await;
    let client = DaemonClient::new(format!("http://{addr}")).unwrap();

    let err = client.forget(&ForgetRequest { path: "/tmp/a".into(), keep_data: false }).await.unwrap_err();
    let exit_error = err.downcast_ref::<ExitError>().unwrap();
    assert_eq!(exit_error.code, 2);
    assert!(exit_error.message.contains("not remembered"));
}

#[tokio::test]
async fn list_maps_500_to_generic_failure() {
    let router = Router::new().route(
        "/list",
        get(|| async { (HttpStatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { message: "registry down".into(), code: "internal".into() })) }),
    );
    let addr = spawn_server(router).await;
    let client = DaemonClient::new(format!("http://{addr}")).unwrap();

    let err = client.list().await.unwrap_err();
    let exit_error = err.downcast_ref::<ExitError>().unwrap();
    assert_eq!(exit_error.code, 1);
}

#[tokio::test]
async fn connection_refused_maps_to_daemon_unreachable() {
    let client = DaemonClient::new("http://127.0.0.1:1".to_string()).unwrap();

    let err = client.list().await.unwrap_err();
    let exit_error = err.downcast_ref::<ExitError>().unwrap();
    assert_eq!(exit_error.code, 3);
}

#[tokio::test]
async fn readyz_accepts_503_as_a_valid_status_body() {
    let router = Router::new().route(
        "/readyz",
        get(|| async {
            (HttpStatusCode::SERVICE_UNAVAILABLE, Json(HealthStatus { ready: false, components: Default::default() }))
        }),
    );
    let addr = spawn_server(router).await;
    let client = DaemonClient::new(format!("http://{addr}")).unwrap();

    let status = client.readyz().await.unwrap();
    assert!(!status.ready);
}
