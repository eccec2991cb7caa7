//! PGW emulator server
//!
//! Loads the JSON configuration, starts the UDP request server, the
//! control-plane HTTP API and the expiry reaper, then runs until a
//! termination signal or a completed `/stop` drain.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pgw_core::logging::{log_welcome, setup_logging, LoggingConfig};
use pgw_core::{Gateway, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "pgw-server", version, about = "PGW emulator server")]
struct Args {
    /// Path to the server JSON configuration
    config: PathBuf,
    /// Include source file and line in log output
    #[arg(long)]
    file_info: bool,
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
    let config = ServerConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // Held until exit so buffered log lines reach the file
    let mut logging =
        LoggingConfig::from_level_str(&config.log_level, "pgw_server").with_file(&config.log_file);
    if args.file_info {
        logging = logging.with_file_info();
    }
    let _log_guard = setup_logging(logging)?;

    log_welcome("pgw-server", env!("CARGO_PKG_VERSION"));
    info!("Server configuration loaded successfully");
    info!(
        "UDP: {}:{}, HTTP: {}:{}, max sessions: {}, session timeout: {}s, drain rate: {}",
        config.udp_ip,
        config.udp_port,
        config.http_ip,
        config.http_port,
        config.max_sessions,
        config.session_timeout_sec,
        config.graceful_shutdown_rate
    );
    info!("Blacklisted IMSIs:");
    for imsi in &config.blacklist {
        info!("- {}", imsi);
    }

    let gateway = Gateway::start(&config).await?;
    info!(
        "Gateway ready: UDP {}, HTTP {}",
        gateway.udp_addr(),
        gateway.http_addr()
    );

    let cause = gateway.run().await?;
    info!("Gateway exited ({:?})", cause);
    Ok(())
}
