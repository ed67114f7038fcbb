//! Call execution primitives: normalized callables, timeouts, retries with
//! backoff, and order-preserving concurrent mapping.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use fcall::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let lookup = CallFn::from_async(|id: u32| async move { Ok::<_, CallError>(format!("user-{id}")) })
//!     .retrying(RetryPolicy::new(2).with_delay(Duration::from_millis(10)));
//!
//! let users = lcall(vec![3, 1, 2], &lookup).await.expect("lookup should succeed");
//! assert_eq!(users, vec!["user-3", "user-1", "user-2"]);
//! # });
//! ```

mod batch;
mod error;
mod func;
mod hooks;
mod map;
mod retry;
mod scope;
mod timed;

pub mod prelude {
    pub use crate::{
        BatchStream, BlockingPool, CallError, CallErrorKind, CallFn, CallHooks, RetryPolicy,
        TaskScope, TimedOptions, bcall, lcall, lcall_flat, lcall_settled, mcall, mcall_explode, pcall, rcall,
        tcall,
    };
}

pub use batch::{BatchStream, bcall};
pub use error::{CallError, CallErrorKind};
pub use func::{BlockingPool, CallFn};
pub use hooks::{CallHooks, NoopCallHooks};
pub use map::{lcall, lcall_flat, lcall_settled, mcall, mcall_explode, pcall};
pub use retry::{RetryPolicy, execute_with_retry, rcall, rcall_observed, rcall_timed};
pub use scope::TaskScope;
pub use timed::{TimedOptions, tcall, tcall_timed};
