//! Registry-backed tool invoker for single calls and concurrent batches.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ftooling::prelude::*;
//! use serde_json::json;
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register_fn("add", |args| async move {
//!         let a = ftooling::required_i64(&args, "a")?;
//!         let b = ftooling::required_i64(&args, "b")?;
//!         Ok::<_, ToolError>(json!(a + b))
//!     })
//!     .expect("registration");
//! let invoker = ToolInvoker::new(Arc::new(registry));
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let calls = vec![
//!     CallDescriptor::parse(&json!({"function": "add", "arguments": {"a": 1, "b": 2}})).expect("parse"),
//!     CallDescriptor::parse(&json!({"action": "action_add", "arguments": "{\"a\": 5, \"b\": 5}"})).expect("parse"),
//! ];
//! let results = invoker.invoke_batch(calls).await.expect("batch");
//! assert_eq!(results[0].output, json!(3));
//! assert_eq!(results[1].output, json!(10));
//! # });
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use fcall::{CallError, CallFn, TaskScope, TimedOptions, mcall, tcall};
use serde_json::Value;
use tokio::time::Instant;

use crate::{
    CallDescriptor, NoopToolRuntimeHooks, ToolArguments, ToolEntry, ToolError, ToolInvocation,
    ToolRegistry, ToolRuntimeHooks,
};

type BatchOutput = Result<Value, ToolError>;

#[derive(Clone)]
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl Debug for ToolInvoker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolInvoker")
            .field("tools", &self.registry.names())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ToolInvoker {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bounds every single invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub async fn invoke(&self, name: &str, arguments: ToolArguments) -> Result<Value, ToolError> {
        let entry = self
            .registry
            .resolve(name)
            .map_err(|err| err.with_arguments(&arguments))?;
        execute(entry, arguments, Arc::clone(&self.hooks), self.timeout).await
    }

    pub async fn invoke_descriptor(
        &self,
        descriptor: CallDescriptor,
    ) -> Result<ToolInvocation, ToolError> {
        let output = self
            .invoke(&descriptor.function, descriptor.arguments.clone())
            .await?;
        Ok(ToolInvocation::new(descriptor, output))
    }

    /// Runs every descriptor concurrently, pairing outputs with their
    /// descriptors in input order.
    ///
    /// All names are resolved before anything runs. When invocations fail,
    /// the error of the first failing descriptor is returned.
    pub async fn invoke_batch(
        &self,
        descriptors: Vec<CallDescriptor>,
    ) -> Result<Vec<ToolInvocation>, ToolError> {
        let entries = descriptors
            .iter()
            .map(|descriptor| {
                self.registry
                    .resolve(&descriptor.function)
                    .map_err(|err| err.with_arguments(&descriptor.arguments))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let funcs = entries
            .into_iter()
            .map(|entry| self.batch_fn(entry))
            .collect::<Vec<_>>();
        let inputs = descriptors
            .iter()
            .map(|descriptor| descriptor.arguments.clone())
            .collect::<Vec<_>>();

        let outputs = mcall(inputs, &funcs).await?;

        descriptors
            .into_iter()
            .zip(outputs)
            .map(|(descriptor, output)| output.map(|output| ToolInvocation::new(descriptor, output)))
            .collect()
    }

    /// Like [`ToolInvoker::invoke_batch`], keeping one outcome per
    /// descriptor. Unknown tools fail only their own slot.
    pub async fn invoke_batch_settled(
        &self,
        descriptors: Vec<CallDescriptor>,
    ) -> Vec<Result<ToolInvocation, ToolError>> {
        let mut scope = TaskScope::new();
        for descriptor in &descriptors {
            let arguments = descriptor.arguments.clone();
            match self.registry.resolve(&descriptor.function) {
                Ok(entry) => {
                    let hooks = Arc::clone(&self.hooks);
                    let timeout = self.timeout;
                    scope.spawn(async move {
                        Ok::<_, CallError>(execute(entry, arguments, hooks, timeout).await)
                    });
                }
                Err(error) => {
                    let error = error.with_arguments(&arguments);
                    scope.spawn(async move { Ok::<BatchOutput, CallError>(Err(error)) });
                }
            }
        }

        descriptors
            .into_iter()
            .zip(scope.join_settled().await)
            .map(|(descriptor, outcome)| {
                let output = outcome.map_err(|err| {
                    ToolError::from(err)
                        .with_tool_name(descriptor.function.clone())
                        .with_arguments(&descriptor.arguments)
                })??;
                Ok(ToolInvocation::new(descriptor, output))
            })
            .collect()
    }

    fn batch_fn(&self, entry: Arc<ToolEntry>) -> CallFn<ToolArguments, BatchOutput> {
        let hooks = Arc::clone(&self.hooks);
        let timeout = self.timeout;
        CallFn::from_async(move |arguments: ToolArguments| {
            let entry = Arc::clone(&entry);
            let hooks = Arc::clone(&hooks);
            async move { Ok::<_, CallError>(execute(entry, arguments, hooks, timeout).await) }
        })
    }
}

async fn execute(
    entry: Arc<ToolEntry>,
    arguments: ToolArguments,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
) -> Result<Value, ToolError> {
    let started = Instant::now();
    hooks.on_invocation_start(entry.name(), &arguments);

    let rendered = arguments.clone();
    let options = TimedOptions::default().with_optional_timeout(timeout);
    let result = tcall(entry.handler(), arguments, options)
        .await
        .map_err(ToolError::from)
        .and_then(|output| entry.parse_output(output))
        .map_err(|err| {
            let err = if err.tool_name.is_none() {
                err.with_tool_name(entry.name())
            } else {
                err
            };
            err.with_arguments(&rendered)
        });

    match &result {
        Ok(output) => hooks.on_invocation_success(entry.name(), output, started.elapsed()),
        Err(error) => hooks.on_invocation_failure(entry.name(), error, started.elapsed()),
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::{ConflictPolicy, ToolErrorKind};

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_invocation_start(&self, tool_name: &str, _arguments: &ToolArguments) {
            self.events.lock().expect("events lock").push(format!("start:{tool_name}"));
        }

        fn on_invocation_success(&self, tool_name: &str, _output: &Value, _elapsed: Duration) {
            self.events.lock().expect("events lock").push(format!("ok:{tool_name}"));
        }

        fn on_invocation_failure(&self, tool_name: &str, error: &ToolError, _elapsed: Duration) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("err:{tool_name}:{:?}", error.kind));
        }
    }

    fn args(value: Value) -> ToolArguments {
        value.as_object().cloned().expect("object arguments")
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn("echo", |args| async move { Ok::<_, ToolError>(Value::Object(args)) })
            .expect("echo");
        registry
            .register_fn("fail", |_args| async move {
                Err::<Value, _>(ToolError::execution("tool exploded"))
            })
            .expect("fail");
        registry
            .register_fn("slow", |_args| async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ToolError>(json!("late"))
            })
            .expect("slow");
        registry
    }

    #[tokio::test]
    async fn invoke_runs_handler_with_keyword_arguments() {
        let invoker = ToolInvoker::new(Arc::new(registry()));
        let output = invoker
            .invoke("echo", args(json!({"text": "hi"})))
            .await
            .expect("invoke");
        assert_eq!(output, json!({"text": "hi"}));
    }

    #[tokio::test]
    async fn failures_carry_tool_name_and_arguments() {
        let hooks = Arc::new(RecordingHooks::default());
        let invoker = ToolInvoker::new(Arc::new(registry())).with_hooks(hooks.clone());

        let error = invoker
            .invoke("fail", args(json!({"id": 7})))
            .await
            .expect_err("handler fails");

        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert_eq!(error.tool_name.as_deref(), Some("fail"));
        assert_eq!(error.arguments.as_deref(), Some(r#"{"id":7}"#));
        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec!["start:fail".to_string(), "err:fail:Execution".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let invoker = ToolInvoker::new(Arc::new(registry()));
        let error = invoker
            .invoke("missing", ToolArguments::new())
            .await
            .expect_err("not registered");
        assert_eq!(error.kind, ToolErrorKind::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_bounds_each_invocation() {
        let invoker =
            ToolInvoker::new(Arc::new(registry())).with_timeout(Duration::from_millis(100));
        let error = invoker
            .invoke("slow", ToolArguments::new())
            .await
            .expect_err("times out");
        assert_eq!(error.kind, ToolErrorKind::Timeout);
        assert!(error.message.contains("100 ms"));
    }

    #[tokio::test]
    async fn parser_is_applied_to_output() {
        let mut registry = registry();
        registry
            .register(
                "upper",
                CallFn::from_async(|args: ToolArguments| async move {
                    Ok::<_, ToolError>(args.get("text").cloned().unwrap_or(Value::Null))
                }),
                Some(Arc::new(|output: Value| -> Result<Value, ToolError> {
                    Ok(json!(output.as_str().unwrap_or_default().to_uppercase()))
                })),
                ConflictPolicy::Reject,
            )
            .expect("upper");

        let invoker = ToolInvoker::new(Arc::new(registry));
        let output = invoker
            .invoke("upper", args(json!({"text": "quiet"})))
            .await
            .expect("invoke");
        assert_eq!(output, json!("QUIET"));
    }

    #[tokio::test]
    async fn batch_with_unknown_tool_runs_nothing() {
        let hooks = Arc::new(RecordingHooks::default());
        let invoker = ToolInvoker::new(Arc::new(registry())).with_hooks(hooks.clone());

        let error = invoker
            .invoke_batch(vec![
                CallDescriptor::new("echo", ToolArguments::new()),
                CallDescriptor::new("missing", ToolArguments::new()),
            ])
            .await
            .expect_err("unknown tool");

        assert_eq!(error.kind, ToolErrorKind::NotFound);
        assert!(hooks.events.lock().expect("events lock").is_empty());
    }

    #[tokio::test]
    async fn batch_returns_first_failure_in_descriptor_order() {
        let invoker = ToolInvoker::new(Arc::new(registry()));
        let error = invoker
            .invoke_batch(vec![
                CallDescriptor::new("echo", ToolArguments::new()),
                CallDescriptor::new("fail", args(json!({"n": 1}))),
                CallDescriptor::new("fail", args(json!({"n": 2}))),
            ])
            .await
            .expect_err("batch fails");

        assert_eq!(error.arguments.as_deref(), Some(r#"{"n":1}"#));
    }

    #[tokio::test]
    async fn settled_batch_keeps_each_outcome() {
        let invoker = ToolInvoker::new(Arc::new(registry()));
        let outcomes = invoker
            .invoke_batch_settled(vec![
                CallDescriptor::new("echo", args(json!({"n": 1}))),
                CallDescriptor::new("missing", ToolArguments::new()),
                CallDescriptor::new("fail", ToolArguments::new()),
            ])
            .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].as_ref().expect("echo").output, json!({"n": 1}));
        assert_eq!(
            outcomes[1].as_ref().expect_err("missing").kind,
            ToolErrorKind::NotFound
        );
        assert_eq!(
            outcomes[2].as_ref().expect_err("fail").kind,
            ToolErrorKind::Execution
        );
    }
}
