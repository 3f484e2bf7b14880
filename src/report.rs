//! Final report assembly and plain-text summary output.
use std::path::Path;

use serde::Serialize;
use url::Url;

use crate::args::BenchArgs;
use crate::error::AppResult;
use crate::metrics::{AggregateOutcome, RangedHistogram, RunTotals};

/// Latency distribution of the 2xx responses, in milliseconds.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LatencyStats {
    pub p2_5: u64,
    pub p50: u64,
    pub p97_5: u64,
    pub p99: u64,
    pub mean: f64,
    pub stdev: f64,
    pub max: u64,
}

/// Distribution of one per-window metric (request rate or throughput).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct WindowStats {
    pub p1: u64,
    pub p2_5: u64,
    pub p50: u64,
    pub p97_5: u64,
    pub mean: f64,
    pub stdev: f64,
    pub min: u64,
}

/// Frozen statistics of one run, read only after the run has stopped.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub url: String,
    pub duration_secs: u64,
    pub connections: usize,
    pub pipelining: usize,
    pub latency_ms: LatencyStats,
    pub requests_per_sec: WindowStats,
    pub bytes_per_sec: WindowStats,
    pub totals: RunTotals,
}

impl RunReport {
    pub(crate) fn new(args: &BenchArgs, outcome: &AggregateOutcome) -> Self {
        Self {
            url: args.url.clone().unwrap_or_default(),
            duration_secs: args.duration.get(),
            connections: args.connections.get(),
            pipelining: args.pipelining.get(),
            latency_ms: latency_stats(&outcome.histograms.latency),
            requests_per_sec: window_stats(&outcome.histograms.request_rate),
            bytes_per_sec: window_stats(&outcome.histograms.throughput),
            totals: outcome.totals,
        }
    }

    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let latency = &self.latency_ms;
        let rate = &self.requests_per_sec;
        let bytes = &self.bytes_per_sec;
        let totals = &self.totals;

        lines.push(format!(
            "Latency (2.5%/50%/97.5%/99%): {}ms / {}ms / {}ms / {}ms",
            latency.p2_5, latency.p50, latency.p97_5, latency.p99
        ));
        lines.push(format!(
            "Latency avg/stdev/max: {:.2}ms / {:.2} / {}ms",
            latency.mean, latency.stdev, latency.max
        ));
        lines.push(format!(
            "Req/Sec (1%/2.5%/50%/97.5%): {} / {} / {} / {}",
            rate.p1, rate.p2_5, rate.p50, rate.p97_5
        ));
        lines.push(format!(
            "Req/Sec avg/stdev/min: {:.2} / {:.2} / {}",
            rate.mean, rate.stdev, rate.min
        ));
        lines.push(format!(
            "Bytes/Sec (1%/2.5%/50%/97.5%): {} / {} / {} / {}",
            format_bytes_compact(u128::from(bytes.p1)),
            format_bytes_compact(u128::from(bytes.p2_5)),
            format_bytes_compact(u128::from(bytes.p50)),
            format_bytes_compact(u128::from(bytes.p97_5))
        ));
        lines.push(format!(
            "Bytes/Sec avg/stdev/min: {} / {} / {}",
            format_bytes_compact(bytes.mean as u128),
            format_bytes_compact(bytes.stdev as u128),
            format_bytes_compact(u128::from(bytes.min))
        ));
        lines.push(format!(
            "{} 2xx responses, {} non-2xx responses.",
            totals.status_2xx, totals.status_non_2xx
        ));
        lines.push(format!(
            "{} total requests in {}s, {} read.",
            format_count_compact(totals.total_requests),
            self.duration_secs,
            format_bytes_compact(u128::from(totals.total_bytes))
        ));
        if totals.errors > 0 {
            lines.push(format!(
                "{} total errors ({} timeouts).",
                format_count_compact(totals.errors),
                format_count_compact(totals.timeouts)
            ));
        }
        lines
    }

    pub fn print(&self) {
        for line in self.summary_lines() {
            println!("{line}");
        }
    }
}

/// Preamble printed before the run starts.
#[must_use]
pub fn banner_lines(args: &BenchArgs, url: &Url) -> Vec<String> {
    vec![
        format!("running {}s test @ {}", args.duration.get(), url),
        format!(
            "{} connections with {} pipelining factor.",
            args.connections.get(),
            args.pipelining.get()
        ),
    ]
}

/// Write the report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error when serialization or the file write fails.
pub fn write_json(report: &RunReport, path: &Path) -> AppResult<()> {
    let payload = serde_json::to_string_pretty(report)?;
    std::fs::write(path, payload)?;
    Ok(())
}

fn latency_stats(hist: &RangedHistogram) -> LatencyStats {
    LatencyStats {
        p2_5: hist.value_at_quantile(0.025),
        p50: hist.value_at_quantile(0.5),
        p97_5: hist.value_at_quantile(0.975),
        p99: hist.value_at_quantile(0.99),
        mean: hist.mean(),
        stdev: hist.stdev(),
        max: hist.max(),
    }
}

fn window_stats(hist: &RangedHistogram) -> WindowStats {
    WindowStats {
        p1: hist.value_at_quantile(0.01),
        p2_5: hist.value_at_quantile(0.025),
        p50: hist.value_at_quantile(0.5),
        p97_5: hist.value_at_quantile(0.975),
        mean: hist.mean(),
        stdev: hist.stdev(),
        min: hist.min(),
    }
}

const KB: u128 = 1_000;
const MB: u128 = 1_000_000;
const GB: u128 = 1_000_000_000;
const TB: u128 = 1_000_000_000_000;

fn format_bytes_compact(bytes: u128) -> String {
    let scales: [(u128, &str); 4] = [(TB, "TB"), (GB, "GB"), (MB, "MB"), (KB, "KB")];
    for (scale, suffix) in scales {
        if bytes >= scale {
            let whole = bytes.checked_div(scale).unwrap_or(0);
            let frac = bytes
                .checked_rem(scale)
                .unwrap_or(0)
                .saturating_mul(100)
                .checked_div(scale)
                .unwrap_or(0);
            return format!("{whole}.{frac:02}{suffix}");
        }
    }
    format!("{bytes}B")
}

fn format_count_compact(value: u64) -> String {
    let scales: [(u64, &str); 3] = [(1_000_000_000, "g"), (1_000_000, "m"), (1_000, "k")];
    for (scale, suffix) in scales {
        if value >= scale {
            let whole = value.checked_div(scale).unwrap_or(0);
            let tenths = value
                .checked_rem(scale)
                .unwrap_or(0)
                .saturating_mul(10)
                .checked_div(scale)
                .unwrap_or(0);
            if tenths == 0 {
                return format!("{whole}{suffix}");
            }
            return format!("{whole}.{tenths}{suffix}");
        }
    }
    value.to_string()
}
