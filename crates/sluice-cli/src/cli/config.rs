use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use sluice::{MAX_CONCURRENCY, MAX_QUEUE_CAPACITY, PipelineConfig};

/// Runtime configuration for the `sluice` binary.
///
/// These settings size the pipeline and shape the reference workload: a
/// counting source, a squaring transform with simulated I/O latency, and a
/// printing sink. All values are parsed from CLI arguments or environment
/// variables (a `.env` file is loaded first), with defaults matching the
/// reference scenario of ten items over five workers.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sluice",
    version,
    about = "Squares a counting sequence through a bounded worker pool"
)]
pub struct CliArgs {
    /// Number of items emitted by the counting source (`1..=ITEM_COUNT`).
    ///
    /// Also sizes the output queue, so workers never wait on the sink for a
    /// run of this length.
    ///
    /// Environment variable: `ITEM_COUNT`
    #[arg(long, env = "ITEM_COUNT", default_value_t = 10)]
    pub item_count: u64,

    /// Number of worker tasks transforming items concurrently.
    ///
    /// This is both the degree of parallelism and the capacity of the work
    /// queue. It is fixed for the whole run.
    ///
    /// Environment variable: `CONCURRENCY_SIZE`
    #[arg(long, env = "CONCURRENCY_SIZE", default_value_t = 5)]
    pub concurrency_size: usize,

    /// Simulated latency of every transform call, in milliseconds.
    ///
    /// Environment variable: `LATENCY_MS`
    #[arg(long, env = "LATENCY_MS", default_value_t = 5000)]
    pub latency_ms: u64,

    /// Item value whose transform fails, aborting the run.
    ///
    /// Unset by default, in which case every item succeeds.
    ///
    /// Environment variable: `FAIL_ON`
    #[arg(long, env = "FAIL_ON")]
    pub fail_on: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pipeline: PipelineConfig,
    pub item_count: u64,
    pub latency: Duration,
    pub fail_on: Option<u64>,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.concurrency_size == 0 {
            bail!("CONCURRENCY_SIZE must be greater than 0");
        }

        let item_count = match usize::try_from(args.item_count) {
            Ok(count) if count <= MAX_QUEUE_CAPACITY => count,
            _ => bail!(
                "ITEM_COUNT ({}) exceeds the maximum queue capacity (max = {})",
                args.item_count,
                MAX_QUEUE_CAPACITY
            ),
        };

        if args.concurrency_size > MAX_CONCURRENCY {
            bail!(
                "CONCURRENCY_SIZE ({}) exceeds the maximum worker count (max = {})",
                args.concurrency_size,
                MAX_CONCURRENCY
            );
        }

        if let Some(fail_on) = args.fail_on.filter(|v| *v == 0 || *v > args.item_count) {
            tracing::warn!(
                "FAIL_ON ({fail_on}) is outside 1..={}, no item will fail",
                args.item_count
            );
        }

        let pipeline = PipelineConfig::new(item_count, args.concurrency_size)?;

        Ok(Self {
            pipeline,
            item_count: args.item_count,
            latency: Duration::from_millis(args.latency_ms),
            fail_on: args.fail_on,
        })
    }
}
