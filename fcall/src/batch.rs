//! Sequential batches of concurrent calls, exposed as a lazy stream.
//!
//! ```rust
//! use futures_util::StreamExt;
//!
//! use fcall::{CallError, CallFn, RetryPolicy, bcall};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let double = CallFn::from_async(|value: u32| async move { Ok::<_, CallError>(value * 2) });
//! let mut batches = bcall(vec![1, 2, 3, 4, 5], &double, 2, RetryPolicy::default())
//!     .expect("batch size is valid");
//!
//! let mut collected = Vec::new();
//! while let Some(batch) = batches.next().await {
//!     collected.push(batch.expect("batch should succeed"));
//! }
//! assert_eq!(collected, vec![vec![2, 4], vec![6, 8], vec![10]]);
//! # });
//! ```

use std::pin::Pin;

use async_stream::stream;
use futures_core::Stream;

use crate::{CallError, CallFn, RetryPolicy, lcall};

pub type BatchStream<T> = Pin<Box<dyn Stream<Item = Result<Vec<T>, CallError>> + Send>>;

/// Splits `inputs` into chunks of `batch_size` and runs each chunk through
/// [`lcall`] with `func` retried under `policy`.
///
/// Chunks run one after another as the stream is polled, so at most
/// `batch_size` calls are in flight at once.
pub fn bcall<A, T, I>(
    inputs: I,
    func: &CallFn<A, T>,
    batch_size: usize,
    policy: RetryPolicy,
) -> Result<BatchStream<T>, CallError>
where
    I: IntoIterator<Item = A>,
    I::IntoIter: Send + 'static,
    A: Clone + Send + 'static,
    T: Send + 'static,
{
    if batch_size == 0 {
        return Err(CallError::invalid_config("batch_size must be at least 1"));
    }

    let func = func.retrying(policy);
    let mut inputs = inputs.into_iter();

    Ok(Box::pin(stream! {
        loop {
            let chunk = inputs.by_ref().take(batch_size).collect::<Vec<_>>();
            if chunk.is_empty() {
                break;
            }
            yield lcall(chunk, &func).await;
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures_util::StreamExt;

    use super::*;
    use crate::CallErrorKind;

    #[test]
    fn zero_batch_size_is_rejected() {
        let func = CallFn::from_async(|value: u32| async move { Ok::<_, CallError>(value) });
        let error = bcall(vec![1], &func, 0, RetryPolicy::default())
            .err()
            .expect("batch size 0 should be rejected");
        assert_eq!(error.kind, CallErrorKind::InvalidConfig);
    }

    #[tokio::test(start_paused = true)]
    async fn peak_concurrency_is_bounded_by_batch_size() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let func = {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            CallFn::from_async(move |value: u32| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, CallError>(value)
                }
            })
        };

        let batches = bcall(0..7_u32, &func, 3, RetryPolicy::default())
            .expect("valid batch size")
            .collect::<Vec<_>>()
            .await;

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].as_ref().expect("last batch"), &vec![6]);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_batch_is_retried_then_reported() {
        let func = CallFn::from_async(|value: u32| async move {
            if value == 2 {
                Err(CallError::execution("two is unlucky"))
            } else {
                Ok(value)
            }
        });
        let policy = RetryPolicy::new(1).with_delay(Duration::from_millis(5));

        let batches = bcall(vec![1, 2, 3], &func, 2, policy)
            .expect("valid batch size")
            .collect::<Vec<_>>()
            .await;

        let error = batches[0].as_ref().expect_err("first batch contains the failure");
        assert_eq!(error.kind, CallErrorKind::RetriesExhausted);
        assert_eq!(batches[1].as_ref().expect("second batch"), &vec![3]);
    }
}
