use hdrhistogram::Histogram;

use crate::error::MetricsError;

/// Latency histogram range, in milliseconds.
const LATENCY_LOW_MS: u64 = 1;
const LATENCY_HIGH_MS: u64 = 10_000;
/// Requests completed per window.
const REQUEST_RATE_LOW: u64 = 1;
const REQUEST_RATE_HIGH: u64 = 1_000_000;
/// Bytes transferred per window.
const THROUGHPUT_LOW: u64 = 1;
const THROUGHPUT_HIGH: u64 = 100_000_000_000;
/// Significant figures kept by every histogram.
const SIGNIFICANT_FIGURES: u8 = 5;

/// A streaming histogram with a fixed value range.
///
/// Values above the range top are clamped to it and counted in
/// [`RangedHistogram::clamped`], so nothing is ever dropped silently.
/// Queries on an empty histogram return 0.
#[derive(Debug)]
pub struct RangedHistogram {
    hist: Histogram<u64>,
    high: u64,
    clamped: u64,
}

impl RangedHistogram {
    /// Create a histogram covering `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns an error when the bounds are rejected by the underlying
    /// histogram.
    pub fn new(low: u64, high: u64) -> Result<Self, MetricsError> {
        let hist =
            Histogram::<u64>::new_with_bounds(low, high, SIGNIFICANT_FIGURES).map_err(|err| {
                MetricsError::Histogram {
                    context: "create",
                    source: Box::new(err),
                }
            })?;
        Ok(Self {
            hist,
            high,
            clamped: 0,
        })
    }

    /// Record a value, clamping anything above the range top.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying histogram rejects the value.
    pub fn record(&mut self, value: u64) -> Result<(), MetricsError> {
        let capped = value.min(self.high);
        if capped != value {
            self.clamped = self.clamped.saturating_add(1);
        }
        self.hist.record(capped).map_err(|err| MetricsError::Histogram {
            context: "record",
            source: Box::new(err),
        })
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hist.is_empty()
    }

    /// Value at `quantile` in `0.0..=1.0`; 0 when nothing was recorded.
    #[must_use]
    pub fn value_at_quantile(&self, quantile: f64) -> u64 {
        if self.is_empty() {
            return 0;
        }
        self.hist.value_at_quantile(quantile)
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.hist.mean() }
    }

    #[must_use]
    pub fn stdev(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.hist.stdev() }
    }

    #[must_use]
    pub fn min(&self) -> u64 {
        if self.is_empty() { 0 } else { self.hist.min() }
    }

    #[must_use]
    pub fn max(&self) -> u64 {
        if self.is_empty() { 0 } else { self.hist.max() }
    }

    /// Number of recorded values that fell outside the range and were
    /// clamped to its top.
    #[must_use]
    pub const fn clamped(&self) -> u64 {
        self.clamped
    }
}

/// The three run histograms, created together when a run starts.
#[derive(Debug)]
pub(crate) struct RunHistograms {
    pub(crate) latency: RangedHistogram,
    pub(crate) request_rate: RangedHistogram,
    pub(crate) throughput: RangedHistogram,
}

impl RunHistograms {
    /// # Errors
    ///
    /// Returns an error when a histogram cannot be created.
    pub(crate) fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            latency: RangedHistogram::new(LATENCY_LOW_MS, LATENCY_HIGH_MS)?,
            request_rate: RangedHistogram::new(REQUEST_RATE_LOW, REQUEST_RATE_HIGH)?,
            throughput: RangedHistogram::new(THROUGHPUT_LOW, THROUGHPUT_HIGH)?,
        })
    }
}
