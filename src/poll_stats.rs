use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PollStats {
    blocks: AtomicU64,
    transactions: AtomicU64,
    fetch_retries: AtomicU64,
    pending_samples: AtomicU64,
}

impl PollStats {
    pub const fn new() -> Self {
        Self {
            blocks: AtomicU64::new(0),
            transactions: AtomicU64::new(0),
            fetch_retries: AtomicU64::new(0),
            pending_samples: AtomicU64::new(0),
        }
    }

    pub fn record_block(&self, tx_count: u64) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
        self.transactions.fetch_add(tx_count, Ordering::Relaxed);
    }

    pub fn inc_fetch_retries(&self) {
        self.fetch_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_pending_samples(&self) {
        self.pending_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PollSnapshot {
        PollSnapshot {
            blocks: self.blocks.load(Ordering::Relaxed),
            transactions: self.transactions.load(Ordering::Relaxed),
            fetch_retries: self.fetch_retries.load(Ordering::Relaxed),
            pending_samples: self.pending_samples.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PollSnapshot {
    pub blocks: u64,
    pub transactions: u64,
    pub fetch_retries: u64,
    pub pending_samples: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = PollStats::new();
        stats.record_block(5);
        stats.record_block(2);
        stats.inc_fetch_retries();
        stats.inc_pending_samples();
        assert_eq!(
            stats.snapshot(),
            PollSnapshot {
                blocks: 2,
                transactions: 7,
                fetch_retries: 1,
                pending_samples: 1,
            }
        );
    }

    #[test]
    fn snapshot_serializes_field_names() {
        let json = serde_json::to_value(PollStats::default().snapshot()).unwrap();
        assert_eq!(json["blocks"], 0);
        assert_eq!(json["fetch_retries"], 0);
        assert_eq!(json["pending_samples"], 0);
    }
}
