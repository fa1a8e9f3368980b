use crate::cli::telemetry::increment_results_printed;
use sluice::Sink;
use std::io::Write;

/// Reference sink: writes one line per result.
///
/// Display failures are logged and otherwise ignored. The sink has no
/// channel back into the pipeline.
pub struct Printer<W> {
    out: W,
}

impl<W: Write> Printer<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink<u64> for Printer<W> {
    fn consume(&mut self, result: u64) {
        if let Err(e) = writeln!(self.out, "[sink] value = {result}") {
            tracing::warn!("Failed to print result {result}: {e}");
            return;
        }
        increment_results_printed();
    }
}
