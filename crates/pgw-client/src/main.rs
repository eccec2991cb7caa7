//! PGW emulator client
//!
//! Sends a single IMSI to the gateway and prints its reply.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pgw_client::UdpClient;
use pgw_core::logging::{setup_logging, LoggingConfig};
use pgw_core::ClientConfig;

#[derive(Debug, Parser)]
#[command(name = "pgw-client", version, about = "Send an IMSI to the PGW emulator")]
struct Args {
    /// Path to the client JSON configuration
    config: PathBuf,
    /// Subscriber IMSI to send
    imsi: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let _log_guard = setup_logging(
        LoggingConfig::from_level_str(&config.log_level, "pgw_client").with_file(&config.log_file),
    )?;
    info!("Starting client with IMSI={}", args.imsi);

    let client = UdpClient::from_config(&config).await?;
    info!("Sending IMSI to {}", client.server());
    let response = client
        .send_request(&args.imsi)
        .await
        .context("request failed")?;

    println!("Server response: {}", response);
    Ok(())
}
