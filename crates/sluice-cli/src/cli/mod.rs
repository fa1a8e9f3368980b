//! Reference workload and process plumbing for the `sluice` binary.
//!
//! ## Structure
//!
//! - [`config`] - CLI/env arguments and their validation into [`RunConfig`].
//! - [`squares`] - squaring transform with simulated latency and an
//!   injectable failure.
//! - [`printer`] - sink writing each result to stdout.
//! - [`telemetry`] - log subscriber and optional OpenTelemetry metrics.
//!
//! [`RunConfig`]: config::RunConfig

pub mod config;
pub mod printer;
pub mod squares;
pub mod telemetry;
