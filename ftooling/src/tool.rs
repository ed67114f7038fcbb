//! Registered tool entries: a normalized handler plus an optional output parser.
//!
//! ```rust
//! use fcall::CallFn;
//! use ftooling::{ToolEntry, ToolError, required_string};
//! use serde_json::{Map, Value, json};
//!
//! let entry = ToolEntry::new(
//!     "shout",
//!     CallFn::from_async(|args: Map<String, Value>| async move {
//!         let text = required_string(&args, "text")?;
//!         Ok::<_, ToolError>(json!(text.to_uppercase()))
//!     }),
//! );
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let args = json!({"text": "hi"}).as_object().cloned().expect("object");
//! assert_eq!(entry.invoke(args).await.expect("invoke"), json!("HI"));
//! # });
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use fcall::CallFn;
use serde_json::{Map, Value};

use crate::ToolError;

pub type ToolArguments = Map<String, Value>;

pub type ToolHandler = CallFn<ToolArguments, Value>;

/// Post-processes a handler's raw output.
pub type ToolParser = Arc<dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync>;

#[derive(Clone)]
pub struct ToolEntry {
    name: String,
    handler: ToolHandler,
    parser: Option<ToolParser>,
}

impl ToolEntry {
    pub fn new(name: impl Into<String>, handler: ToolHandler) -> Self {
        Self {
            name: name.into(),
            handler,
            parser: None,
        }
    }

    pub fn with_parser(mut self, parser: ToolParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub(crate) fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &ToolHandler {
        &self.handler
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    /// Runs the handler, then the parser if one is set. Errors are not yet
    /// annotated with the tool name.
    pub async fn invoke(&self, arguments: ToolArguments) -> Result<Value, ToolError> {
        let output = self.handler.call(arguments).await?;
        self.parse_output(output)
    }

    pub(crate) fn parse_output(&self, output: Value) -> Result<Value, ToolError> {
        match &self.parser {
            Some(parser) => parser(output),
            None => Ok(output),
        }
    }
}

impl Debug for ToolEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.name)
            .field("has_parser", &self.has_parser())
            .finish()
    }
}
