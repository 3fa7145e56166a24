// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(clap::Args)]
pub struct RebuildArgs {
    /// Clear analysis state before re-walking, instead of an incremental rebuild.
    #[arg(long)]
    pub full: bool,
}

pub async fn handle(args: RebuildArgs, client: &DaemonClient, format: OutputFormat) -> anyhow::Result<()> {
    let response = client.rebuild(args.full).await?;

    format_or_json(format, &response, || {
        println!(
            "Walked {} root(s), enqueued {} job(s) in {}ms",
            response.roots_walked, response.jobs_enqueued, response.duration_ms
        );
    })
}
