use clap::Parser;

use crate::pending::PendingStrategy;

#[derive(Parser, Debug)]
#[command(name = "eth-block-monitor", version, about = "Per-block stats from an Ethereum JSON-RPC node")]
pub struct Cli {
    /// RPC url of the chain [env: ETH_RPC_URL] [default: http://127.0.0.1:8545]
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Accepted for compatibility; must not exceed 1000000
    #[arg(long, default_value_t = 10_000, allow_negative_numbers = true)]
    pub count: i64,

    /// Where the pending transaction count comes from [env: PENDING_STRATEGY] [default: direct]
    #[arg(long, value_enum)]
    pub strategy: Option<PendingStrategy>,
}
