//! Run lifecycle: channel and histogram setup, worker pool startup, the
//! duration timer, and the drain that freezes the final report.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::args::BenchArgs;
use crate::cancel::CancelSender;
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{self, WorkerPool};
use crate::metrics::{self, RunHistograms};
use crate::report::RunReport;

/// Capacity of the sample and error channels. Workers block on send beyond
/// this, which is the backpressure bound when the aggregator falls behind.
pub(crate) const RESULT_CHANNEL_CAPACITY: usize = 10_000;
const CANCEL_CHANNEL_CAPACITY: usize = 1;
/// Slack added to the per-request timeout for the drain phase, so results
/// still in flight at cancellation can land on the channels.
const DRAIN_SLACK: Duration = Duration::from_millis(250);

/// Lifecycle phases of one run. Transitions never reverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Draining,
    Stopped,
}

/// Drives one run from start to the frozen report.
pub struct RunController {
    args: BenchArgs,
    url: Url,
    phase: RunPhase,
    cancel_tx: CancelSender,
    cancelled: bool,
}

impl RunController {
    #[must_use]
    pub fn new(args: BenchArgs, url: Url) -> Self {
        let (cancel_tx, _) = broadcast::channel(CANCEL_CHANNEL_CAPACITY);
        Self {
            args,
            url,
            phase: RunPhase::Idle,
            cancel_tx,
            cancelled: false,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Broadcasts the cancellation signal to every worker and the
    /// aggregator. Repeated calls are no-ops and return `false`.
    pub fn cancel(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        self.cancelled = true;
        drop(self.cancel_tx.send(()));
        true
    }

    /// Runs the full lifecycle and returns the frozen report.
    ///
    /// # Errors
    ///
    /// Returns an error when the run was already started or the HTTP client,
    /// request template, or histograms cannot be built. Individual request
    /// failures never surface here; they are counted in the report.
    pub async fn run(&mut self) -> AppResult<RunReport> {
        if self.phase != RunPhase::Idle {
            return Err(AppError::validation(ValidationError::RunAlreadyStarted));
        }

        let client = http::build_client(&self.args)?;
        let template = Arc::new(http::build_request(&client, &self.args, &self.url)?);
        let histograms = RunHistograms::new()?;
        let (sample_tx, sample_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        let (error_tx, error_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);

        let run_start = Instant::now();
        let aggregator = metrics::setup_aggregator(
            &self.cancel_tx,
            run_start,
            self.drain_grace(),
            self.args.debug,
            histograms,
            sample_rx,
            error_rx,
        );
        let pool = WorkerPool::spawn(
            self.args.worker_count(),
            &client,
            &template,
            &self.cancel_tx,
            &sample_tx,
            &error_tx,
        );
        // Workers hold the only remaining senders; the channels close when
        // the last worker exits.
        drop(sample_tx);
        drop(error_tx);
        self.phase = RunPhase::Running;
        debug!("Started {} workers.", pool.len());

        tokio::time::sleep(self.args.run_duration()).await;
        self.cancel();
        self.phase = RunPhase::Draining;

        let outcome = aggregator.await?;
        pool.join().await;
        self.phase = RunPhase::Stopped;

        Ok(RunReport::new(&self.args, &outcome))
    }

    fn drain_grace(&self) -> Duration {
        self.args.timeout_duration().saturating_add(DRAIN_SLACK)
    }
}
