use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use eth_block_monitor::cli::Cli;
use eth_block_monitor::config::Config;
use eth_block_monitor::eth::EthClient;
use eth_block_monitor::poller::BlockPoller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()
        .and_then(|config| config.merge_cli(&cli))
        .context("failed to load configuration")?;

    let client = EthClient::new(&config.eth_rpc_url)
        .context("Failed to connect to the Ethereum client")?;
    let poller = BlockPoller::new(client, config.poller_settings());
    let state = poller.start(config.strategy.into()).await?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received, stopping");
                signal.cancel();
            }
            Err(e) => tracing::warn!("cannot listen for interrupt: {}", e),
        }
    });

    let state = poller.run(state, &mut std::io::stdout(), shutdown).await?;

    let stats = poller.stats().snapshot();
    tracing::info!(
        "stopped before block {}: {}",
        state.height,
        serde_json::to_string(&stats)?
    );
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
