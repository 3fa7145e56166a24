// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};
use memo_core::PathConfig;
use memo_wire::RememberRequest;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct RememberArgs {
    /// Directory to register as a remembered root.
    pub path: PathBuf,

    /// Per-root config patch as a JSON object, e.g. '{"skip_hidden":true}'.
    #[arg(long)]
    pub patch: Option<String>,
}

pub async fn handle(args: RememberArgs, client: &DaemonClient, format: OutputFormat) -> anyhow::Result<()> {
    let patch = args
        .patch
        .as_deref()
        .map(|raw| serde_json::from_str::<PathConfig>(raw))
        .transpose()
        .map_err(|err| ExitError::invalid_input(format!("invalid --patch JSON: {err}")))?;

    let response = client.remember(&RememberRequest { path: args.path, patch }).await?;

    format_or_json(format, &response, || {
        let verb = if response.created { "Remembered" } else { "Updated" };
        println!("{} {}", verb, response.path.display());
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_patch_json_is_rejected_before_any_request() {
        let client = DaemonClient::new("http://127.0.0.1:1".to_string()).unwrap();
        let args = RememberArgs { path: "/tmp/a".into(), patch: Some("not json".to_string()) };

        let err = handle(args, &client, OutputFormat::Text).await.unwrap_err();
        let exit_error = err.downcast_ref::<ExitError>().unwrap();
        assert_eq!(exit_error.code, 2);
    }
}
