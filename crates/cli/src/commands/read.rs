// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use memo_wire::{ReadEnvelope, ReadFormat, ReadRequest};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum Envelope {
    #[default]
    Summary,
    Full,
}

impl From<Envelope> for ReadEnvelope {
    fn from(value: Envelope) -> Self {
        match value {
            Envelope::Summary => ReadEnvelope::Summary,
            Envelope::Full => ReadEnvelope::Full,
        }
    }
}

#[derive(clap::Args)]
pub struct ReadArgs {
    /// How much detail to include per file.
    #[arg(long, value_enum, default_value_t)]
    pub envelope: Envelope,

    /// Cap the number of files returned.
    #[arg(long)]
    pub max_files: Option<u64>,
}

pub async fn handle(args: ReadArgs, client: &DaemonClient, format: OutputFormat) -> anyhow::Result<()> {
    let response = client
        .read(&ReadRequest { format: ReadFormat::Json, envelope: args.envelope.into(), max_files: args.max_files })
        .await?;

    format_or_json(format, &response, || {
        for file in &response.files {
            println!("{}  {} bytes  hash={}", file.path.display(), file.size, file.content_hash);
        }
        if response.truncated {
            println!("\n(truncated by --max-files)");
        }
    })
}
