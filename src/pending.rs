use std::num::ParseIntError;

use clap::ValueEnum;
use tracing::warn;

use crate::eth::ChainClient;

#[derive(thiserror::Error, Debug)]
pub enum HexQuantityError {
    #[error("hex quantity {0:?} does not start with 0x")]
    MissingPrefix(String),
    #[error("hex quantity {0:?} contains no hex digits after 0x")]
    NotHex(String),
    #[error("hex quantity {value:?} does not fit in u64: {source}")]
    OutOfRange {
        value: String,
        source: ParseIntError,
    },
}

/// Decodes a `0x`-prefixed base-16 quantity.
pub fn parse_hex_quantity(raw: &str) -> Result<u64, HexQuantityError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| HexQuantityError::MissingPrefix(raw.to_string()))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexQuantityError::NotHex(raw.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|source| HexQuantityError::OutOfRange {
        value: raw.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PendingStrategy {
    /// Ask the node for the pending block's transaction count.
    Direct,
    /// Read `pending` from `txpool_status`, falling back to 0 if unsupported.
    Txpool,
}

impl std::str::FromStr for PendingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PendingError {
    #[error("failed to fetch pending transaction count: {0:#}")]
    Direct(anyhow::Error),
    #[error("failed to parse hex string: {0}")]
    Decode(#[from] HexQuantityError),
}

/// Where the pending count comes from, plus whatever state that source carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingSource {
    Direct,
    Txpool { enabled: bool },
}

impl From<PendingStrategy> for PendingSource {
    fn from(strategy: PendingStrategy) -> Self {
        match strategy {
            PendingStrategy::Direct => PendingSource::Direct,
            PendingStrategy::Txpool => PendingSource::Txpool { enabled: true },
        }
    }
}

impl PendingSource {
    pub fn label(&self) -> &'static str {
        match self {
            PendingSource::Direct => "PendingTx",
            PendingSource::Txpool { .. } => "MemPoolTx",
        }
    }

    /// Samples the pending count.
    ///
    /// A failed `txpool_status` call disables the txpool source for good and
    /// yields 0; a successful call with an undecodable `pending` is an error.
    pub async fn sample<C>(&mut self, client: &C) -> Result<u64, PendingError>
    where
        C: ChainClient + ?Sized,
    {
        match self {
            PendingSource::Direct => client.pending_tx_count().await.map_err(PendingError::Direct),
            PendingSource::Txpool { enabled: false } => Ok(0),
            PendingSource::Txpool { enabled } => match client.txpool_status().await {
                Ok(status) => Ok(parse_hex_quantity(&status.pending)?),
                Err(e) => {
                    warn!("txpool_status unavailable, reporting 0 from now on: {:#}", e);
                    *enabled = false;
                    Ok(0)
                }
            },
        }
    }
}
