//! Core library for the `barrage` CLI.
//!
//! This crate provides the internal building blocks used by the binary: CLI
//! argument types, configuration parsing, the worker pool that drives the
//! target, metrics aggregation, and report output. The primary user-facing
//! interface is the `barrage` command-line application; library APIs may
//! evolve as the CLI grows.
pub mod args;
pub mod cancel;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod report;
pub mod run;
