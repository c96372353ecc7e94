use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ethers_core::types::{Block, BlockNumber, H256, U64};
use ethers_providers::{Http, Middleware, Provider};
use url::Url;

use crate::models::{BlockSnapshot, PoolStatus};

/// The chain capabilities the poller depends on.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current head of the chain.
    async fn latest_block(&self) -> Result<BlockSnapshot>;

    /// `Ok(None)` when the node has no block at `number` yet.
    async fn block_by_number(&self, number: U64) -> Result<Option<BlockSnapshot>>;

    async fn pending_tx_count(&self) -> Result<u64>;

    /// Raw `txpool_status` call, not supported by every node.
    async fn txpool_status(&self) -> Result<PoolStatus>;
}

#[derive(Clone)]
pub struct EthClient {
    provider: Provider<Http>,
}

impl EthClient {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .context("failed to build reqwest client")?;
        let url = Url::parse(rpc_url).context("invalid ETH_RPC_URL")?;
        let transport = Http::new_with_client(url, client);
        let provider = Provider::new(transport);
        Ok(Self { provider })
    }
}

#[async_trait]
impl ChainClient for EthClient {
    async fn latest_block(&self) -> Result<BlockSnapshot> {
        let block = self
            .provider
            .get_block(BlockNumber::Latest)
            .await
            .context("failed to fetch latest block")?
            .ok_or_else(|| anyhow!("node returned no latest block"))?;
        snapshot(block)
    }

    async fn block_by_number(&self, number: U64) -> Result<Option<BlockSnapshot>> {
        let maybe_block = self
            .provider
            .get_block(BlockNumber::Number(number))
            .await
            .with_context(|| format!("failed to fetch block {}", number))?;
        maybe_block.map(snapshot).transpose()
    }

    async fn pending_tx_count(&self) -> Result<u64> {
        let count: Option<U64> = self
            .provider
            .request("eth_getBlockTransactionCountByNumber", ["pending"])
            .await
            .context("failed to fetch pending transaction count")?;
        Ok(count_or_zero(count))
    }

    async fn txpool_status(&self) -> Result<PoolStatus> {
        self.provider
            .request("txpool_status", ())
            .await
            .context("txpool_status call failed")
    }
}

/// Some nodes answer `null` when there is no pending block.
fn count_or_zero(count: Option<U64>) -> u64 {
    count.map_or(0, |count| count.as_u64())
}

fn snapshot(block: Block<H256>) -> Result<BlockSnapshot> {
    let number = block
        .number
        .ok_or_else(|| anyhow!("block {:?} has no number", block.hash))?;
    Ok(BlockSnapshot {
        number,
        tx_count: block.transactions.len(),
        timestamp: block.timestamp,
        gas_limit: block.gas_limit,
        gas_used: block.gas_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::U256;

    #[test]
    fn snapshot_counts_transactions() {
        let mut block: Block<H256> = Block::default();
        block.number = Some(U64::from(42u64));
        block.timestamp = U256::from(1_700_000_000u64);
        block.gas_limit = U256::from(30_000_000u64);
        block.gas_used = U256::from(63_000u64);
        block.transactions = vec![
            H256::from_low_u64_be(1),
            H256::from_low_u64_be(2),
            H256::from_low_u64_be(3),
        ];

        let snap = snapshot(block).unwrap();
        assert_eq!(snap.number, U64::from(42u64));
        assert_eq!(snap.tx_count, 3);
        assert_eq!(snap.gas_used, U256::from(63_000u64));
    }

    #[test]
    fn snapshot_rejects_pending_block_without_number() {
        let block: Block<H256> = Block::default();
        assert!(snapshot(block).is_err());
    }

    #[test]
    fn null_pending_count_reads_as_zero() {
        let null: Option<U64> = serde_json::from_str("null").unwrap();
        assert_eq!(count_or_zero(null), 0);

        let some: Option<U64> = serde_json::from_str(r#""0x1a""#).unwrap();
        assert_eq!(count_or_zero(some), 26);
    }

    #[test]
    fn new_rejects_malformed_url() {
        assert!(EthClient::new("not a url").is_err());
        assert!(EthClient::new("http://127.0.0.1:8545").is_ok());
    }
}
