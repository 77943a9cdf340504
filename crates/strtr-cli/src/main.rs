// Copyright (c) 2023-2025 Strtr Developers
// Distributed under the MIT software license

use std::net::IpAddr;

use anyhow::Result;
use clap::{ArgAction, Parser};
use strtr_relay::{Relay, RelayBuilder, DEFAULT_PORT};
use tracing_subscriber::EnvFilter;

/// A minimal in-memory nostr relay
#[derive(Debug, Parser)]
#[command(name = "strtr", version, disable_help_flag = true)]
struct Cli {
    /// Address to listen on
    #[arg(short = 'h', long, env = "STRTR_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short = 'p', long, env = "STRTR_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("strtr_cli=info,strtr_relay=info")),
        )
        .init();

    let relay = Relay::run(RelayBuilder::new().addr(args.host).port(args.port)).await?;
    tracing::info!("listening on {}", relay.url());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    relay.shutdown();

    Ok(())
}
