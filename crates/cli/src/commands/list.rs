// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(clap::Args)]
pub struct ListArgs;

pub async fn handle(_args: ListArgs, client: &DaemonClient, format: OutputFormat) -> anyhow::Result<()> {
    let response = client.list().await?;

    format_or_json(format, &response.paths, || {
        if response.paths.is_empty() {
            println!("No remembered paths");
            return;
        }
        for entry in &response.paths {
            println!(
                "{}  files={} pending={} failed={}",
                entry.path.display(),
                entry.file_count,
                entry.pending_count,
                entry.failed_count
            );
        }
    })
}
