#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::config::{CliArgs, RunConfig};
use cli::printer::Printer;
use cli::squares::{SquareError, Squarer};
use cli::telemetry::{init_telemetry, record_run_duration, shutdown_telemetry};
use sluice::{Pipeline, source};
use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let providers = init_telemetry()?;
    let config = RunConfig::try_from(args)?;

    log_startup_info(&config);

    let start = Instant::now();
    let res = run(&config, std::io::stdout()).await;
    record_run_duration(start.elapsed().as_millis() as f64);

    let code = match res {
        Ok(()) => {
            tracing::info!("Completed {} items in {:?}", config.item_count, start.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Pipeline aborted after {:?}: {e}", start.elapsed());
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    };

    shutdown_telemetry(providers);
    Ok(code)
}

/// Squares `1..=item_count` through the worker pool, printing each result to
/// `out`.
async fn run<W: Write>(config: &RunConfig, out: W) -> Result<(), SquareError> {
    let pipeline = Pipeline::new(config.pipeline, Squarer::new(config.latency, config.fail_on));
    let source = source::spawn_producer(
        source::counter(config.item_count),
        config.pipeline.item_count(),
    );

    pipeline.run(source, Printer::new(out)).await
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting pipeline with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting pipeline: {} items over {} workers",
            config.item_count,
            config.pipeline.concurrency_size()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use sluice::PipelineConfig;

    fn config(item_count: u64, concurrency_size: usize, fail_on: Option<u64>) -> RunConfig {
        RunConfig {
            pipeline: PipelineConfig::new(item_count as usize, concurrency_size).unwrap(),
            item_count,
            latency: Duration::from_millis(1),
            fail_on,
        }
    }

    fn printed(out: &[u8]) -> Vec<u64> {
        let mut values: Vec<u64> = String::from_utf8_lossy(out)
            .lines()
            .map(|line| line.trim_start_matches("[sink] value = ").parse().unwrap())
            .collect();
        values.sort_unstable();
        values
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn prints_every_square() {
        let mut out = Vec::new();
        run(&config(10, 5, None), &mut out).await.unwrap();

        assert_eq!(printed(&out), (1..=10).map(|i| i * i).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn reference_scenario_reports_the_injected_failure() {
        let mut out = Vec::new();
        let err = run(&config(10, 5, Some(10)), &mut out).await.unwrap_err();

        assert_eq!(err, SquareError::Rejected { value: 10 });
        let values = printed(&out);
        assert!(values.len() <= 9);
        assert!(!values.contains(&100));
    }
}
