use std::time::Duration;

use reqwest::{Client, Request};
use url::Url;

use crate::args::{BenchArgs, HttpMethod};
use crate::error::{AppError, AppResult, HttpError};

/// Idle connections are kept warm this long between iterations.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the shared client for a run. The pool is sized to the worker
/// count so connections are reused across loop iterations; the request
/// timeout is the only preemption of an in-flight exchange.
pub(crate) fn build_client(args: &BenchArgs) -> AppResult<Client> {
    build_client_with(args.timeout_duration(), args.worker_count(), args.verify_tls)
}

pub(crate) fn build_client_with(
    timeout: Duration,
    pool_size: usize,
    verify_tls: bool,
) -> AppResult<Client> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(pool_size)
        .pool_idle_timeout(Some(POOL_IDLE_TIMEOUT));

    if !verify_tls {
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    builder
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

/// Builds the request template cloned by every worker iteration.
///
/// # Errors
///
/// Returns an error when the request cannot be assembled.
pub(crate) fn build_request(client: &Client, args: &BenchArgs, url: &Url) -> AppResult<Request> {
    let mut request_builder = match args.method {
        HttpMethod::Get => client.get(url.clone()),
        HttpMethod::Post => client.post(url.clone()),
        HttpMethod::Patch => client.patch(url.clone()),
        HttpMethod::Put => client.put(url.clone()),
        HttpMethod::Delete => client.delete(url.clone()),
    };

    for (key, value) in &args.headers {
        request_builder = request_builder.header(key, value);
    }

    request_builder
        .body(args.data.clone())
        .build()
        .map_err(|err| AppError::http(HttpError::BuildRequestFailed { source: err }))
}
