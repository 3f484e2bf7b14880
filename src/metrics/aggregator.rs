use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cancel::CancelSender;

use super::histogram::RunHistograms;
use super::types::{ErrorEvent, RunTotals, Sample, WindowCounters};
use super::window::WindowSampler;

/// Frozen result of one run: totals plus the three histograms. Produced
/// once the aggregator has drained and stopped.
#[derive(Debug)]
pub(crate) struct AggregateOutcome {
    pub(crate) totals: RunTotals,
    pub(crate) histograms: RunHistograms,
}

/// Spawns the single-consumer aggregation loop.
///
/// The task drains the sample and error channels, commits window counters
/// into the windowed histograms on each sampler tick, and stops when the
/// cancellation signal arrives. After cancellation it keeps absorbing
/// in-flight results for at most `grace` (no further windows are committed),
/// ending early once every worker has hung up.
pub(crate) fn setup_aggregator(
    cancel_tx: &CancelSender,
    run_start: Instant,
    grace: Duration,
    debug_errors: bool,
    histograms: RunHistograms,
    mut sample_rx: mpsc::Receiver<Sample>,
    mut error_rx: mpsc::Receiver<ErrorEvent>,
) -> JoinHandle<AggregateOutcome> {
    let mut cancel_rx = cancel_tx.subscribe();

    tokio::spawn(async move {
        let mut histograms = histograms;
        let mut totals = RunTotals::default();
        let mut window = WindowCounters::default();
        let mut sampler = WindowSampler::start(run_start);
        let mut samples_open = true;
        let mut errors_open = true;

        loop {
            // Biased so a due tick commits its window before a simultaneous
            // cancellation is observed: ticks precede expiry.
            tokio::select! {
                biased;
                _ = sampler.tick() => commit_window(&mut window, &mut histograms),
                _ = cancel_rx.recv() => break,
                maybe_sample = sample_rx.recv(), if samples_open => match maybe_sample {
                    Some(sample) => {
                        record_sample(&mut totals, &mut window, &mut histograms, &sample);
                    }
                    None => samples_open = false,
                },
                maybe_event = error_rx.recv(), if errors_open => match maybe_event {
                    Some(event) => record_error(&mut totals, &event, debug_errors),
                    None => errors_open = false,
                },
            }
        }

        let drain_deadline = Instant::now().checked_add(grace).unwrap_or_else(Instant::now);
        let drain = tokio::time::sleep_until(drain_deadline);
        tokio::pin!(drain);
        while samples_open || errors_open {
            tokio::select! {
                () = &mut drain => break,
                maybe_sample = sample_rx.recv(), if samples_open => match maybe_sample {
                    Some(sample) => {
                        record_sample(&mut totals, &mut window, &mut histograms, &sample);
                    }
                    None => samples_open = false,
                },
                maybe_event = error_rx.recv(), if errors_open => match maybe_event {
                    Some(event) => record_error(&mut totals, &event, debug_errors),
                    None => errors_open = false,
                },
            }
        }

        AggregateOutcome { totals, histograms }
    })
}

fn record_sample(
    totals: &mut RunTotals,
    window: &mut WindowCounters,
    histograms: &mut RunHistograms,
    sample: &Sample,
) {
    totals.total_requests = totals.total_requests.saturating_add(1);
    totals.total_bytes = totals.total_bytes.saturating_add(sample.size_bytes);
    window.record(sample.size_bytes);

    if sample.is_2xx() {
        totals.status_2xx = totals.status_2xx.saturating_add(1);
        if let Err(err) = histograms.latency.record(sample.latency_ms) {
            warn!("Failed to record latency: {}", err);
        }
    } else {
        totals.status_non_2xx = totals.status_non_2xx.saturating_add(1);
    }
}

fn record_error(totals: &mut RunTotals, event: &ErrorEvent, debug_errors: bool) {
    totals.errors = totals.errors.saturating_add(1);
    if event.is_timeout() {
        totals.timeouts = totals.timeouts.saturating_add(1);
    }
    if debug_errors {
        debug!("request error: {}", event);
    }
}

fn commit_window(window: &mut WindowCounters, histograms: &mut RunHistograms) {
    let counters = window.take();
    if let Err(err) = histograms.request_rate.record(counters.requests_completed) {
        warn!("Failed to record request rate: {}", err);
    }
    if let Err(err) = histograms.throughput.record(counters.bytes_transferred) {
        warn!("Failed to record throughput: {}", err);
    }
}
