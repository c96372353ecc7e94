use std::env;
use std::time::Duration;

use crate::cli::Cli;
use crate::pending::PendingStrategy;
use crate::poller::PollerSettings;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const MAX_COUNT: i64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub eth_rpc_url: String,
    pub strategy: PendingStrategy,
    pub poll_interval: Duration,
    pub retry_backoff: Duration,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name} value {value:?}")]
    InvalidVar { name: &'static str, value: String },
    #[error("Too many transactions to be generated and sent (count {count} exceeds 1000000)")]
    CountTooLarge { count: i64 },
}

impl Default for Config {
    fn default() -> Self {
        let settings = PollerSettings::default();
        Self {
            eth_rpc_url: DEFAULT_RPC_URL.to_string(),
            strategy: PendingStrategy::Direct,
            poll_interval: settings.poll_interval,
            retry_backoff: settings.retry_backoff,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let eth_rpc_url = lookup("ETH_RPC_URL").unwrap_or(defaults.eth_rpc_url);
        let strategy = match lookup("PENDING_STRATEGY") {
            Some(raw) => raw.parse::<PendingStrategy>().map_err(|_| ConfigError::InvalidVar {
                name: "PENDING_STRATEGY",
                value: raw,
            })?,
            None => defaults.strategy,
        };
        let poll_interval = millis_var(&lookup, "POLL_INTERVAL_MS")?.unwrap_or(defaults.poll_interval);
        let retry_backoff = millis_var(&lookup, "RETRY_BACKOFF_MS")?.unwrap_or(defaults.retry_backoff);

        Ok(Self {
            eth_rpc_url,
            strategy,
            poll_interval,
            retry_backoff,
        })
    }

    /// Applies command-line overrides. Fails on an out-of-range `--count`.
    pub fn merge_cli(mut self, cli: &Cli) -> Result<Self, ConfigError> {
        validate_count(cli.count)?;
        if let Some(url) = &cli.rpc_url {
            self.eth_rpc_url = url.clone();
        }
        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
        Ok(self)
    }

    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            poll_interval: self.poll_interval,
            retry_backoff: self.retry_backoff,
        }
    }
}

/// `--count` is accepted for compatibility and bounds-checked, nothing more.
pub fn validate_count(count: i64) -> Result<(), ConfigError> {
    if count > MAX_COUNT {
        return Err(ConfigError::CountTooLarge { count });
    }
    Ok(())
}

fn millis_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidVar { name, value: raw })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_env_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.eth_rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.strategy, PendingStrategy::Direct);
        assert_eq!(config.poll_interval, Duration::from_millis(200));
        assert_eq!(config.retry_backoff, Duration::from_millis(800));
    }

    #[test]
    fn reads_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("ETH_RPC_URL", "http://node:8545"),
            ("PENDING_STRATEGY", "txpool"),
            ("POLL_INTERVAL_MS", "50"),
            ("RETRY_BACKOFF_MS", "1000"),
        ]))
        .unwrap();
        assert_eq!(config.eth_rpc_url, "http://node:8545");
        assert_eq!(config.strategy, PendingStrategy::Txpool);
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.retry_backoff, Duration::from_millis(1000));
    }

    #[test]
    fn rejects_malformed_env_values() {
        let err = Config::from_lookup(lookup_from(&[("POLL_INTERVAL_MS", "fast")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidVar {
                name: "POLL_INTERVAL_MS",
                value: "fast".to_string()
            }
        );
        assert!(Config::from_lookup(lookup_from(&[("PENDING_STRATEGY", "mempool")])).is_err());
    }

    #[test]
    fn cli_overrides_env() {
        let cli = Cli::parse_from(["eth-block-monitor", "--rpc-url", "http://cli:8545", "--strategy", "txpool"]);
        let config = Config::from_lookup(lookup_from(&[("ETH_RPC_URL", "http://env:8545")]))
            .unwrap()
            .merge_cli(&cli)
            .unwrap();
        assert_eq!(config.eth_rpc_url, "http://cli:8545");
        assert_eq!(config.strategy, PendingStrategy::Txpool);
    }

    #[test]
    fn count_bound_is_inclusive() {
        assert!(validate_count(1_000_000).is_ok());
        assert!(validate_count(-5).is_ok());
        assert_eq!(
            validate_count(1_000_001),
            Err(ConfigError::CountTooLarge { count: 1_000_001 })
        );
    }

    #[test]
    fn merge_rejects_oversized_count() {
        let cli = Cli::parse_from(["eth-block-monitor", "--count", "1000001"]);
        assert!(Config::default().merge_cli(&cli).is_err());

        let cli = Cli::parse_from(["eth-block-monitor", "--count", "1000000"]);
        assert!(Config::default().merge_cli(&cli).is_ok());
    }
}
