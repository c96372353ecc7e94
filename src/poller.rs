use std::io::Write;
use std::time::Duration;

use ethers_core::types::U64;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::eth::ChainClient;
use crate::models::StatusLine;
use crate::pending::{PendingError, PendingSource};
use crate::poll_stats::PollStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    /// Pause after a reported block.
    pub poll_interval: Duration,
    /// Pause before retrying a height that could not be fetched.
    pub retry_backoff: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            retry_backoff: Duration::from_millis(800),
        }
    }
}

/// Everything that carries over from one iteration to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollState {
    /// Next height to fetch.
    pub height: U64,
    pub pending: PendingSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Reported(StatusLine),
    /// The block at the current height could not be fetched; height unchanged.
    NotReady,
}

#[derive(thiserror::Error, Debug)]
pub enum PollError {
    #[error("failed to get the start block: {0:#}")]
    StartBlock(anyhow::Error),
    #[error(transparent)]
    Pending(#[from] PendingError),
    #[error("block height {0} cannot be advanced")]
    HeightOverflow(U64),
    #[error("failed to write status line: {0}")]
    Output(#[from] std::io::Error),
}

pub struct BlockPoller<C> {
    client: C,
    settings: PollerSettings,
    stats: PollStats,
}

impl<C: ChainClient> BlockPoller<C> {
    pub fn new(client: C, settings: PollerSettings) -> Self {
        Self {
            client,
            settings,
            stats: PollStats::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Anchors the poller at the chain head. Not retried.
    pub async fn start(&self, pending: PendingSource) -> Result<PollState, PollError> {
        let head = self
            .client
            .latest_block()
            .await
            .map_err(PollError::StartBlock)?;
        info!("starting at block {}", head.number);
        Ok(PollState {
            height: head.number,
            pending,
        })
    }

    /// Runs one iteration against `state.height`.
    pub async fn tick(&self, mut state: PollState) -> Result<(PollState, Tick), PollError> {
        let block = match self.client.block_by_number(state.height).await {
            Ok(Some(block)) => block,
            Ok(None) => {
                debug!("block {} not available yet", state.height);
                self.stats.inc_fetch_retries();
                return Ok((state, Tick::NotReady));
            }
            Err(e) => {
                debug!("fetching block {} failed: {:#}", state.height, e);
                self.stats.inc_fetch_retries();
                return Ok((state, Tick::NotReady));
            }
        };

        let pending = state.pending.sample(&self.client).await?;
        self.stats.inc_pending_samples();
        let line = StatusLine::new(&block, state.pending.label(), pending);
        self.stats.record_block(block.tx_count as u64);

        state.height = state
            .height
            .checked_add(U64::one())
            .ok_or(PollError::HeightOverflow(state.height))?;
        Ok((state, Tick::Reported(line)))
    }

    /// Polls until `shutdown` fires, writing one line per block to `out`.
    ///
    /// Cancellation also interrupts an in-flight iteration, in which case the
    /// state from before that iteration is returned.
    pub async fn run<W: Write>(
        &self,
        mut state: PollState,
        out: &mut W,
        shutdown: CancellationToken,
    ) -> Result<PollState, PollError> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(state);
            }

            let (next, tick) = tokio::select! {
                _ = shutdown.cancelled() => return Ok(state),
                result = self.tick(state) => result?,
            };
            state = next;

            let pause = match tick {
                Tick::Reported(line) => {
                    writeln!(out, "{}", line)?;
                    out.flush()?;
                    self.settings.poll_interval
                }
                Tick::NotReady => self.settings.retry_backoff,
            };

            tokio::select! {
                _ = shutdown.cancelled() => return Ok(state),
                _ = sleep(pause) => {}
            }
        }
    }
}
