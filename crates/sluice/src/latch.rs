//! First-error-wins latch shared by the workers and the dispatcher.
//!
//! Any number of workers may race to record a failure; only the first value
//! is kept. The dispatcher waits on [`ErrorLatch::tripped`] alongside the
//! source and reads the value once with [`ErrorLatch::take`] during
//! shutdown.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Single-assignment cell holding the first error observed by any worker.
///
/// Writes never wait on the reader: the lock is only held to swap an
/// `Option`, and the wake-up is delivered through a [`CancellationToken`].
#[derive(Debug)]
pub struct ErrorLatch<E> {
    slot: Mutex<Option<E>>,
    token: CancellationToken,
}

impl<E> ErrorLatch<E> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            token: CancellationToken::new(),
        }
    }

    /// Records `err` if the latch is still empty.
    ///
    /// Returns `true` if this call won the race. A losing value is dropped.
    pub fn try_set(&self, err: E) -> bool {
        {
            let mut slot = self.slot.lock();
            if slot.is_some() || self.token.is_cancelled() {
                #[cfg(feature = "tracing")]
                tracing::debug!("Error latch already tripped, discarding error");
                return false;
            }
            *slot = Some(err);
        }

        // Cancel outside the lock so woken waiters never contend on it.
        self.token.cancel();
        true
    }

    /// Returns `true` once an error has been latched.
    pub fn is_tripped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once an error has been latched.
    ///
    /// Cancel safe: dropping the future before completion loses nothing.
    pub async fn tripped(&self) {
        self.token.cancelled().await;
    }

    /// Removes the latched error, if any.
    ///
    /// The latch stays tripped afterwards, so late writers are still
    /// discarded.
    pub fn take(&self) -> Option<E> {
        self.slot.lock().take()
    }
}

impl<E> Default for ErrorLatch<E> {
    fn default() -> Self {
        Self::new()
    }
}
