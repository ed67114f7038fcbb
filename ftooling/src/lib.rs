//! Dynamic tool registry and invoker: resolves symbolic function calls to
//! registered handlers and runs them singly or as concurrent batches.

mod args;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        CallDescriptor, ConflictPolicy, ToolArguments, ToolEntry, ToolError, ToolErrorKind,
        ToolInvocation, ToolInvoker, ToolRegistry, ToolRuntimeHooks,
    };
}

pub use args::{
    arguments_from_value, optional_string, parse_json_object, parse_json_value, required_i64,
    required_string,
};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::{ConflictPolicy, ToolRegistry};
pub use runtime::ToolInvoker;
pub use tool::{ToolArguments, ToolEntry, ToolHandler, ToolParser};
pub use types::{CallDescriptor, ToolInvocation};
