use std::fmt;

use ethers_core::types::{U256, U64};
use serde::{Deserialize, Serialize};

/// The parts of a fetched block the monitor reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSnapshot {
    pub number: U64,
    pub tx_count: usize,
    pub timestamp: U256,
    pub gas_limit: U256,
    pub gas_used: U256,
}

/// Raw `txpool_status` response. Both fields are hex quantities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    pub pending: String,
    #[serde(default)]
    pub queued: String,
}

/// One emitted line of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub pending_label: &'static str,
    pub height: U64,
    pub tx_count: usize,
    pub pending: u64,
    pub timestamp: U256,
    pub gas_limit: U256,
    pub gas_used: U256,
}

impl StatusLine {
    pub fn new(block: &BlockSnapshot, pending_label: &'static str, pending: u64) -> Self {
        Self {
            pending_label,
            height: block.number,
            tx_count: block.tx_count,
            pending,
            timestamp: block.timestamp,
            gas_limit: block.gas_limit,
            gas_used: block.gas_used,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Height: {}\tTxCount: {}\t{}: {}\tBlockTime: {}\tGasLimit: {}\tGasUsed: {}",
            self.height,
            self.tx_count,
            self.pending_label,
            self.pending,
            self.timestamp,
            self.gas_limit,
            self.gas_used
        )
    }
}
