//! Lifecycle hooks for retried calls.
//!
//! ```rust
//! use fcall::{CallHooks, NoopCallHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn CallHooks) {}
//!
//! let hooks = NoopCallHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use crate::CallError;

pub trait CallHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &CallError,
    ) {
    }

    fn on_success(&self, _operation: &str, _attempts: u32) {}

    fn on_failure(&self, _operation: &str, _attempts: u32, _error: &CallError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallHooks;

impl CallHooks for NoopCallHooks {}
