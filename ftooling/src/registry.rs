//! Tool registry keyed by tool name, with explicit conflict handling.

use std::future::Future;
use std::sync::Arc;

use fcall::CallFn;
use fcommon::Registry;
use serde_json::Value;

use crate::{ToolArguments, ToolEntry, ToolError, ToolHandler, ToolParser};

/// What `register` does when the name is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Replace the existing entry.
    Overwrite,
    /// Fail with [`crate::ToolErrorKind::Conflict`].
    #[default]
    Reject,
    /// Store under the first free name of `name1`, `name2`, ...
    Disambiguate,
}

impl ConflictPolicy {
    /// Maps an `(update, new)` flag pair: `update` overwrites, `new`
    /// disambiguates, neither rejects. Setting both is contradictory.
    pub fn from_flags(update: bool, new: bool) -> Result<Self, ToolError> {
        match (update, new) {
            (true, true) => Err(ToolError::conflict(
                "update and new cannot both be requested",
            )),
            (true, false) => Ok(Self::Overwrite),
            (false, true) => Ok(Self::Disambiguate),
            (false, false) => Ok(Self::Reject),
        }
    }
}

#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Registry<Arc<ToolEntry>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` and returns the name it was stored under.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: ToolHandler,
        parser: Option<ToolParser>,
        policy: ConflictPolicy,
    ) -> Result<String, ToolError> {
        let mut entry = ToolEntry::new(name, handler);
        if let Some(parser) = parser {
            entry = entry.with_parser(parser);
        }
        self.register_entry(entry, policy)
    }

    pub fn register_entry(
        &mut self,
        entry: ToolEntry,
        policy: ConflictPolicy,
    ) -> Result<String, ToolError> {
        let requested = entry.name().to_string();
        if requested.trim().is_empty() {
            return Err(ToolError::invalid_arguments("tool name must not be empty"));
        }

        let stored = match (self.tools.contains(requested.as_str()), policy) {
            (false, _) | (true, ConflictPolicy::Overwrite) => requested,
            (true, ConflictPolicy::Reject) => {
                return Err(ToolError::conflict(format!(
                    "tool '{requested}' is already registered"
                ))
                .with_tool_name(requested));
            }
            (true, ConflictPolicy::Disambiguate) => self.tools.vacant_name(&requested),
        };

        self.tools
            .insert(stored.clone(), Arc::new(entry.renamed(stored.clone())));
        Ok(stored)
    }

    pub fn register_fn<F, Fut>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> Result<String, ToolError>
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(name, CallFn::from_async(handler), None, ConflictPolicy::Reject)
    }

    /// Blocking handlers run on the runtime's blocking pool.
    pub fn register_sync_fn<F>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> Result<String, ToolError>
    where
        F: Fn(ToolArguments) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register(name, CallFn::from_sync(handler), None, ConflictPolicy::Reject)
    }

    /// Attaches `parser` to an already registered tool.
    pub fn with_parser(&mut self, name: &str, parser: ToolParser) -> Result<(), ToolError> {
        let entry = self.resolve(name)?;
        let updated = ToolEntry::clone(&entry).with_parser(parser);
        self.tools.insert(name.to_string(), Arc::new(updated));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<ToolEntry>, ToolError> {
        self.tools.get(name).cloned().ok_or_else(|| {
            ToolError::not_found(format!("function {name} is not registered")).with_tool_name(name)
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<ToolEntry>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<ToolEntry>> {
        self.tools.remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.names()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
