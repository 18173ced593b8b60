//! livedash: monitoring dashboard for the live trading agent.
//!
//! Usage:
//!   livedash                          # serve the dashboard
//!   livedash --once                   # print a single snapshot and exit
//!   livedash --config path/to.toml    # explicit config file

use anyhow::bail;
use livedash::config::Config;
use livedash::dashboard::{self, Dashboard};
use livedash::render::TextSink;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_CONFIG: &str = "livedash.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let once = args.iter().any(|a| a == "--once");
    let config_path = config_arg(&args)?;

    // Load config
    let config = match config_path {
        Some(path) => Config::load(&path)?,
        None if PathBuf::from(DEFAULT_CONFIG).exists() => {
            Config::load(&PathBuf::from(DEFAULT_CONFIG))?
        }
        None => Config::from_env(),
    };

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    // Snapshot output owns stdout, so logs go to stderr.
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("livedash v{} starting", env!("CARGO_PKG_VERSION"));
    match &config.data.base_url {
        Some(url) => info!(url = %url, "reading logs over HTTP"),
        None => info!(dir = %config.data.dir.display(), "reading logs from data directory"),
    }

    if once {
        let mut sink = TextSink::new();
        Dashboard::from_config(&config).refresh(&mut sink).await;
        print!("{}", sink);
        return Ok(());
    }

    dashboard::serve(&config).await
}

/// Value of `--config`, which must be followed by a path.
fn config_arg(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let Some(i) = args.iter().position(|a| a == "--config") else {
        return Ok(None);
    };
    match args.get(i + 1) {
        Some(path) if !path.starts_with("--") => Ok(Some(PathBuf::from(path))),
        _ => bail!("--config requires a path argument"),
    }
}
