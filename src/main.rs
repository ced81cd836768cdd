//! GitHub download proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http::server ──▶ http::pipeline ──▶ routing::classifier
//!                                       │
//!                                       ├──▶ security (access lists, size cap)
//!                                       ├──▶ routing::rewrite (blob → raw)
//!                                       ▼
//!     Client ◀── http::response ◀── http::forward ◀──────────────── Upstream
//!
//!     config::provider (ArcSwap snapshot) ◀── refresher / file watcher
//! ```

use std::path::PathBuf;

use clap::Parser;

use github_proxy::config::load_or_default;
use github_proxy::lifecycle;
use github_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "github-proxy")]
#[command(about = "Streaming proxy for GitHub downloads", long_about = None)]
struct Args {
    /// Configuration file (TOML; JSON or YAML by .json/.yml/.yaml extension)
    #[arg(short, long, default_value = "config/proxy.toml")]
    config: PathBuf,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(&args.config)?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
    }

    logging::init(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        "github-proxy starting"
    );

    lifecycle::run(args.config, config).await?;
    Ok(())
}
