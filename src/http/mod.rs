//! HTTP client construction and the worker pool that drives the target.
mod client;
mod pool;
mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub(crate) use client::{build_client, build_request};
pub(crate) use pool::WorkerPool;

#[cfg(test)]
pub(crate) use client::build_client_with;
