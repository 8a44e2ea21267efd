//! Scale polling daemon

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scalepoll::{Config, JsonLinesSink, Poller};

/// Poll a networked weighing scale and append its readings to a file
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (defaults to $SCALEPOLL_CONFIG or ./scalepoll.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Override the discovery target or scale host
    #[arg(long)]
    host: Option<String>,

    /// Override the scale port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(host) = args.host {
        config.device.host = host;
    }
    if let Some(port) = args.port {
        config.device.port = port;
    }
    config.validate().context("validating configuration")?;

    let sink = JsonLinesSink::new(&config.sink.path);
    let mut poller = Poller::from_config(&config, sink)?;

    if args.once {
        let record = poller.poll_once().await;
        println!("{}", serde_json::to_string(&record)?);
        return Ok(());
    }

    info!(
        "Polling {}:{}, writing to {}",
        config.device.host,
        config.device.port,
        config.sink.path.display()
    );

    poller
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    Ok(())
}
