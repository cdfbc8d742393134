use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use signaldesk_runner::{init_logging, AppConfig};

#[derive(Parser)]
#[command(
    name = "signaldesk-server",
    version,
    about = "SignalDesk backtest and performance API"
)]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, env = "SIGNALDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.bind`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    init_logging(&config.logging);

    signaldesk_server::serve(&config).await
}
