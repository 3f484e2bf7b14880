use clap::Parser;
use std::time::Duration;
use url::Url;

use crate::error::{AppError, AppResult, ValidationError};

use super::parsers::{parse_header, parse_positive_u64, parse_positive_usize};
use super::types::{HttpMethod, PositiveU64, PositiveUsize};

/// Request body sent when `--data` is not given.
pub const DEFAULT_BODY: &str = "hello, world!";

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load generator - pipelined connections, per-second sampling, and streaming latency/throughput histograms."
)]
pub struct BenchArgs {
    /// Target URL to load (http or https)
    #[arg(long, short)]
    pub url: Option<String>,

    /// Number of connections to keep open
    #[arg(long, short, default_value = "10", value_parser = parse_positive_usize)]
    pub connections: PositiveUsize,

    /// Requests in flight per connection
    #[arg(long, short, default_value = "1", value_parser = parse_positive_usize)]
    pub pipelining: PositiveUsize,

    /// Duration of the run (seconds)
    #[arg(long, short, default_value = "10", value_parser = parse_positive_u64)]
    pub duration: PositiveU64,

    /// Per-request timeout (seconds)
    #[arg(long, short, default_value = "10", value_parser = parse_positive_u64)]
    pub timeout: PositiveU64,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "post", ignore_case = true)]
    pub method: HttpMethod,

    /// Request body data
    #[arg(long, default_value = DEFAULT_BODY)]
    pub data: String,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Verify TLS certificates (verification is skipped by default)
    #[arg(long = "verify-tls")]
    pub verify_tls: bool,

    /// Surface each request error as it occurs
    #[arg(long)]
    pub debug: bool,

    /// TOML run configuration; explicit flags win over file values
    #[arg(long)]
    pub config: Option<String>,

    /// Write the final report as JSON to this path
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl BenchArgs {
    /// Validated absolute target URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is missing, unparsable, uses a scheme
    /// other than http/https, or has no host.
    pub fn target_url(&self) -> AppResult<Url> {
        let Some(raw) = self.url.as_deref() else {
            return Err(AppError::validation(ValidationError::MissingUrl));
        };
        let url = Url::parse(raw).map_err(|err| {
            AppError::validation(ValidationError::InvalidUrl {
                url: raw.to_owned(),
                source: err,
            })
        })?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::validation(ValidationError::UnsupportedScheme {
                    url: raw.to_owned(),
                    scheme: scheme.to_owned(),
                }));
            }
        }
        if url.host_str().is_none() {
            return Err(AppError::validation(ValidationError::MissingHost {
                url: raw.to_owned(),
            }));
        }
        Ok(url)
    }

    #[must_use]
    pub const fn run_duration(&self) -> Duration {
        Duration::from_secs(self.duration.get())
    }

    #[must_use]
    pub const fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout.get())
    }

    /// Worker tasks spawned for the run: one per connection, multiplied by
    /// the pipelining factor.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.connections.get().saturating_mul(self.pipelining.get())
    }
}
