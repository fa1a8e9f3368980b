use core::future::Future;

/// A user-supplied, possibly slow, fallible mapping from an item to a result.
///
/// One instance is shared by every worker in the pool, so `apply` takes
/// `&self` and must be safe to call concurrently. Implementations should not
/// rely on shared mutable state between calls.
///
/// Any `Fn(I) -> impl Future<Output = Result<O, E>>` closure is a
/// `Transform`:
///
/// ```
/// use sluice::Transform;
///
/// fn assert_transform<T: Transform<u64>>(_: &T) {}
///
/// let square = |i: u64| async move { Ok::<_, String>(i * i) };
/// assert_transform(&square);
/// ```
pub trait Transform<I>: Send + Sync + 'static {
    /// Value produced for a successfully transformed item.
    type Output: Send + 'static;
    /// Failure value; the first one observed aborts the pipeline.
    type Error: Send + 'static;

    /// Transforms a single item.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the item cannot be transformed. The pipeline
    /// never retries a failed item.
    fn apply(&self, item: I) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

impl<I, O, E, F, Fut> Transform<I> for F
where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send,
    O: Send + 'static,
    E: Send + 'static,
{
    type Output = O;
    type Error = E;

    fn apply(&self, item: I) -> impl Future<Output = Result<O, E>> + Send {
        self(item)
    }
}
