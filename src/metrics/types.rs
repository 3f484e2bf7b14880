use serde::Serialize;

/// Outcome of one completed request/response exchange. Produced by a worker,
/// consumed exactly once by the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub status: u16,
    pub latency_ms: u64,
    pub size_bytes: u64,
}

impl Sample {
    #[must_use]
    pub const fn is_2xx(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// A failed exchange, classified so timeouts can be tallied separately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorEvent {
    Timeout,
    Other(String),
}

impl ErrorEvent {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, ErrorEvent::Timeout)
    }
}

impl std::fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorEvent::Timeout => f.write_str("request timed out"),
            ErrorEvent::Other(message) => f.write_str(message),
        }
    }
}

/// Counters accumulated within one sampling window, committed into the
/// request-rate and throughput histograms on every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowCounters {
    pub requests_completed: u64,
    pub bytes_transferred: u64,
}

impl WindowCounters {
    pub fn record(&mut self, size_bytes: u64) {
        self.requests_completed = self.requests_completed.saturating_add(1);
        self.bytes_transferred = self.bytes_transferred.saturating_add(size_bytes);
    }

    /// Returns the current counters and resets them for the next window.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// Cumulative counters for one run. Single writer (the aggregator), read
/// only after the run has stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub total_requests: u64,
    pub total_bytes: u64,
    pub status_2xx: u64,
    pub status_non_2xx: u64,
    pub errors: u64,
    pub timeouts: u64,
}
