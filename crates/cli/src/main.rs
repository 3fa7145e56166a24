// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! `memo`: a thin HTTP client for the `memod` control plane (§4.I, §6).

mod client;
mod commands;
mod exit_error;
mod output;

use client::DaemonClient;
use clap::{Parser, Subcommand};
use commands::{forget, list, read, rebuild, remember, status};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "memo", version, about = "Client for the memod knowledge-graph daemon")]
struct Cli {
    /// Base URL of the daemon's HTTP control plane.
    #[arg(long, global = true, default_value = "http://127.0.0.1:7600")]
    daemon_url: String,

    /// Output format.
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register or update a remembered root
    Remember(remember::RememberArgs),
    /// Remove a remembered root
    Forget(forget::ForgetArgs),
    /// List remembered roots
    List(list::ListArgs),
    /// Trigger a rebuild of one or all roots
    Rebuild(rebuild::RebuildArgs),
    /// Export a graph snapshot
    Read(read::ReadArgs),
    /// Show daemon readiness
    Status(status::StatusArgs),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        let code = err.downcast_ref::<exit_error::ExitError>().map_or(1, |e| e.code);
        eprintln!("Error: {err}");
        std::process::exit(code);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(cli.daemon_url)?;

    match cli.command {
        Commands::Remember(args) => remember::handle(args, &client, cli.output).await,
        Commands::Forget(args) => forget::handle(args, &client, cli.output).await,
        Commands::List(args) => list::handle(args, &client, cli.output).await,
        Commands::Rebuild(args) => rebuild::handle(args, &client, cli.output).await,
        Commands::Read(args) => read::handle(args, &client, cli.output).await,
        Commands::Status(args) => status::handle(args, &client, cli.output).await,
    }
}
