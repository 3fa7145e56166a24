// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Thin HTTP client for the daemon's control plane (§4.I, §6). Every
//! method maps transport/status failures onto the CLI's exit-code
//! convention via [`crate::exit_error::ExitError`].

use crate::exit_error::ExitError;
use memo_core::HealthStatus;
use memo_wire::{
    ErrorResponse, ForgetRequest, ForgetResponse, HealthzResponse, ListResponse, ReadRequest, ReadResponse,
    RebuildResponse, RememberRequest, RememberResponse,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Clone)]
pub struct DaemonClient {
    http: Client,
    base_url: String,
}

impl DaemonClient {
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> anyhow::Result<T> {
        let response = request.send().await.map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                anyhow::Error::new(ExitError::unreachable(format!("daemon unreachable: {err}")))
            } else {
                anyhow::Error::new(ExitError::new(1, format!("request failed: {err}")))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|err| {
                anyhow::Error::new(ExitError::new(1, format!("malformed response body: {err}")))
            });
        }

        let body: Option<ErrorResponse> = response.json().await.ok();
        let message = body.map(|b| b.message).unwrap_or_else(|| status.to_string());
        if status.is_client_error() {
            Err(anyhow::Error::new(ExitError::invalid_input(message)))
        } else {
            Err(anyhow::Error::new(ExitError::new(1, message)))
        }
    }

    pub async fn healthz(&self) -> anyhow::Result<HealthzResponse> {
        self.send(self.http.get(self.url("/healthz"))).await
    }

    pub async fn readyz(&self) -> anyhow::Result<HealthStatus> {
        // `/readyz` returns 503 when not ready, which `send` would treat as
        // a server error — the body is still the status we want to show.
        let response = self
            .http
            .get(self.url("/readyz"))
            .send()
            .await
            .map_err(|err| anyhow::Error::new(ExitError::unreachable(format!("daemon unreachable: {err}"))))?;
        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .json()
                .await
                .map_err(|err| anyhow::Error::new(ExitError::new(1, format!("malformed response body: {err}"))))
        } else {
            Err(anyhow::Error::new(ExitError::new(1, format!("unexpected status {status}"))))
        }
    }

    pub async fn remember(&self, request: &RememberRequest) -> anyhow::Result<RememberResponse> {
        self.send(self.http.post(self.url("/remember")).json(request)).await
    }

    pub async fn forget(&self, request: &ForgetRequest) -> anyhow::Result<ForgetResponse> {
        self.send(self.http.post(self.url("/forget")).json(request)).await
    }

    pub async fn list(&self) -> anyhow::Result<ListResponse> {
        self.send(self.http.get(self.url("/list"))).await
    }

    pub async fn rebuild(&self, full: bool) -> anyhow::Result<RebuildResponse> {
        self.send(self.http.post(self.url("/rebuild")).query(&[("full", full)])).await
    }

    pub async fn read(&self, request: &ReadRequest) -> anyhow::Result<ReadResponse> {
        self.send(self.http.post(self.url("/read")).json(request)).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
