// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(clap::Args)]
pub struct StatusArgs;

pub async fn handle(_args: StatusArgs, client: &DaemonClient, format: OutputFormat) -> anyhow::Result<()> {
    let status = client.readyz().await?;

    format_or_json(format, &status, || {
        println!("ready: {}", status.ready);
        let mut names: Vec<_> = status.components.keys().collect();
        names.sort();
        for name in names {
            let component = &status.components[name];
            match &component.error {
                Some(error) => println!("  {name}: {:?} ({error})", component.status),
                None => println!("  {name}: {:?}", component.status),
            }
        }
    })
}
