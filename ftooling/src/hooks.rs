//! Runtime hooks for tool invocation lifecycle events.
//!
//! ```rust
//! use ftooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = NoopToolRuntimeHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use serde_json::Value;

use crate::{ToolArguments, ToolError};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_invocation_start(&self, _tool_name: &str, _arguments: &ToolArguments) {}

    fn on_invocation_success(&self, _tool_name: &str, _output: &Value, _elapsed: Duration) {}

    fn on_invocation_failure(&self, _tool_name: &str, _error: &ToolError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
