use crate::cli::telemetry::{increment_items_transformed, increment_transform_errors};
use core::time::Duration;
use sluice::Transform;

/// Failure produced by [`Squarer`].
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum SquareError {
    /// The configured failing value was reached.
    #[error("Rejected value {value}")]
    Rejected { value: u64 },

    /// The square does not fit in a `u64`.
    #[error("Square of {value} overflows u64")]
    Overflow { value: u64 },
}

/// Reference transform: squares each item after a simulated I/O delay.
///
/// The failure check happens before the delay, so a rejected item fails
/// immediately while its siblings are still sleeping.
#[derive(Debug, Clone)]
pub struct Squarer {
    latency: Duration,
    fail_on: Option<u64>,
}

impl Squarer {
    pub const fn new(latency: Duration, fail_on: Option<u64>) -> Self {
        Self { latency, fail_on }
    }
}

impl Transform<u64> for Squarer {
    type Output = u64;
    type Error = SquareError;

    async fn apply(&self, item: u64) -> Result<u64, SquareError> {
        tracing::debug!("Processing value {item}");

        if self.fail_on == Some(item) {
            increment_transform_errors();
            return Err(SquareError::Rejected { value: item });
        }

        tokio::time::sleep(self.latency).await;

        let Some(square) = item.checked_mul(item) else {
            increment_transform_errors();
            return Err(SquareError::Overflow { value: item });
        };

        increment_items_transformed();
        Ok(square)
    }
}
