// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use memo_wire::ForgetRequest;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct ForgetArgs {
    /// Remembered root to remove.
    pub path: PathBuf,

    /// Keep graph/registry state instead of cascading the delete.
    #[arg(long)]
    pub keep_data: bool,
}

pub async fn handle(args: ForgetArgs, client: &DaemonClient, format: OutputFormat) -> anyhow::Result<()> {
    let response = client.forget(&ForgetRequest { path: args.path, keep_data: args.keep_data }).await?;

    format_or_json(format, &response, || {
        println!("Forgot {} ({} files deleted)", response.path.display(), response.deleted_files);
    })
}
