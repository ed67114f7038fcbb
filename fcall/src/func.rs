//! Uniform async handle over synchronous and asynchronous callables.
//!
//! ```rust
//! use fcall::{CallError, CallFn};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let double = CallFn::from_async(|value: u32| async move { Ok::<_, CallError>(value * 2) });
//! let shout = CallFn::from_sync(|text: String| Ok::<_, CallError>(text.to_uppercase()));
//!
//! assert_eq!(double.call(21).await.expect("async call"), 42);
//! assert_eq!(shout.call("hi".to_string()).await.expect("sync call"), "HI");
//! # });
//! ```

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use fcommon::BoxFuture;
use tokio::sync::Semaphore;

use crate::{CallError, CallHooks, RetryPolicy, TimedOptions, rcall, rcall_observed, tcall};

type Handler<A, T> = dyn Fn(A) -> BoxFuture<'static, Result<T, CallError>> + Send + Sync;

/// Bounded pool for synchronous callables.
///
/// Jobs run on tokio's blocking threads; at most `size` of them run at once
/// for the callables sharing this pool. A permit stays held until the job
/// returns, even when the awaiting side was cancelled.
#[derive(Debug, Clone)]
pub struct BlockingPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl Default for BlockingPool {
    fn default() -> Self {
        let size = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4);
        Self::new(size)
    }
}

impl BlockingPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn run<R, F>(&self, job: F) -> Result<R, CallError>
    where
        F: FnOnce() -> Result<R, CallError> + Send + 'static,
        R: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| CallError::join("blocking pool is closed"))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|err| CallError::join(format!("blocking call failed: {err}")))?
    }
}

pub struct CallFn<A, T> {
    handler: Arc<Handler<A, T>>,
}

impl<A, T> Clone for CallFn<A, T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<A, T> Debug for CallFn<A, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CallFn")
    }
}

impl<A, T> CallFn<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    fn from_handler<H>(handler: H) -> Self
    where
        H: Fn(A) -> BoxFuture<'static, Result<T, CallError>> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn from_async<F, Fut, E>(func: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<CallError>,
    {
        Self::from_handler(move |args| {
            let future = func(args);
            Box::pin(async move { future.await.map_err(Into::into) })
        })
    }

    /// Wraps a blocking callable with its own [`BlockingPool`].
    pub fn from_sync<F, E>(func: F) -> Self
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        E: Into<CallError>,
    {
        Self::from_sync_in(BlockingPool::default(), func)
    }

    pub fn from_sync_in<F, E>(pool: BlockingPool, func: F) -> Self
    where
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
        E: Into<CallError>,
    {
        let func = Arc::new(func);
        Self::from_handler(move |args| {
            let func = Arc::clone(&func);
            let pool = pool.clone();
            Box::pin(async move { pool.run(move || func(args).map_err(Into::into)).await })
        })
    }

    pub fn call(&self, args: A) -> BoxFuture<'static, Result<T, CallError>> {
        (self.handler)(args)
    }

    /// Every invocation of the returned handle goes through [`rcall`].
    pub fn retrying(&self, policy: RetryPolicy) -> Self
    where
        A: Clone,
    {
        let inner = self.clone();
        let policy = Arc::new(policy);
        Self::from_handler(move |args| {
            let inner = inner.clone();
            let policy = Arc::clone(&policy);
            Box::pin(async move { rcall(&inner, args, &policy, None).await })
        })
    }

    /// Like [`CallFn::retrying`], returning `default` once retries run out.
    pub fn retrying_or(&self, policy: RetryPolicy, default: T) -> Self
    where
        A: Clone,
        T: Clone + Sync,
    {
        let inner = self.clone();
        let policy = Arc::new(policy);
        let default = Arc::new(default);
        Self::from_handler(move |args| {
            let inner = inner.clone();
            let policy = Arc::clone(&policy);
            let default = T::clone(&default);
            Box::pin(async move { rcall(&inner, args, &policy, Some(default)).await })
        })
    }

    pub fn observed(
        &self,
        operation: impl Into<String>,
        policy: RetryPolicy,
        hooks: Arc<dyn CallHooks>,
    ) -> Self
    where
        A: Clone,
    {
        let inner = self.clone();
        let operation: Arc<str> = Arc::from(operation.into());
        let policy = Arc::new(policy);
        Self::from_handler(move |args| {
            let inner = inner.clone();
            let operation = Arc::clone(&operation);
            let policy = Arc::clone(&policy);
            let hooks = Arc::clone(&hooks);
            Box::pin(async move {
                rcall_observed(&operation, &inner, args, &policy, None, hooks.as_ref()).await
            })
        })
    }

    /// Bounds every invocation by `timeout` through [`tcall`].
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let inner = self.clone();
        Self::from_handler(move |args| {
            let inner = inner.clone();
            Box::pin(async move {
                tcall(&inner, args, TimedOptions::default().with_timeout(timeout)).await
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;
    use crate::CallErrorKind;

    #[tokio::test]
    async fn async_callable_passes_through() {
        let func = CallFn::from_async(|value: u32| async move { Ok::<_, CallError>(value + 1) });
        assert_eq!(func.call(1).await.expect("call should succeed"), 2);
    }

    #[tokio::test]
    async fn sync_callable_runs_off_the_scheduler_thread() {
        let caller = thread::current().id();
        let func = CallFn::from_sync(move |_: ()| Ok::<_, CallError>(thread::current().id() != caller));

        assert!(func.call(()).await.expect("call should succeed"));
    }

    #[tokio::test]
    async fn sync_callable_errors_propagate_unchanged() {
        let func = CallFn::<(), u32>::from_sync(|_| Err(CallError::execution("nope")));
        let error = func.call(()).await.expect_err("call should fail");

        assert_eq!(error.kind, CallErrorKind::Execution);
        assert_eq!(error.message, "nope");
    }

    #[tokio::test]
    async fn sync_panic_surfaces_as_join_error() {
        let func = CallFn::<(), u32>::from_sync(|_| -> Result<u32, CallError> {
            panic!("worker exploded")
        });
        let error = func.call(()).await.expect_err("call should fail");
        assert_eq!(error.kind, CallErrorKind::Join);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_pool_bounds_concurrent_sync_calls() {
        let pool = BlockingPool::new(1);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let func = {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            CallFn::from_sync_in(pool.clone(), move |_: u32| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                active.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, CallError>(())
            })
        };

        let calls = (0..4).map(|value| func.call(value)).collect::<Vec<_>>();
        for call in futures_util::future::join_all(calls).await {
            call.expect("call should succeed");
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(pool.available(), 1);
    }
}
