//! Call execution errors and classifications.
//!
//! ```rust
//! use fcall::{CallError, CallErrorKind};
//!
//! let last = CallError::timeout("slow upstream");
//! let exhausted = CallError::exhausted(3, last);
//!
//! assert_eq!(exhausted.kind, CallErrorKind::RetriesExhausted);
//! assert_eq!(exhausted.attempts, Some(3));
//! assert_eq!(exhausted.last_error().map(|e| e.kind), Some(CallErrorKind::Timeout));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    Execution,
    Timeout,
    RetriesExhausted,
    LengthMismatch,
    InvalidConfig,
    Join,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError {
    pub kind: CallErrorKind,
    pub message: String,
    pub attempts: Option<u32>,
    /// Classification assigned by the layer that produced the error, kept
    /// so it can be restored after passing through a [`CallFn`](crate::CallFn).
    pub origin: Option<&'static str>,
    cause: Option<Box<CallError>>,
}

impl CallError {
    pub fn new(kind: CallErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            attempts: None,
            origin: None,
            cause: None,
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(CallErrorKind::Execution, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(CallErrorKind::Timeout, message)
    }

    pub fn length_mismatch(message: impl Into<String>) -> Self {
        Self::new(CallErrorKind::LengthMismatch, message)
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(CallErrorKind::InvalidConfig, message)
    }

    pub fn join(message: impl Into<String>) -> Self {
        Self::new(CallErrorKind::Join, message)
    }

    /// Aggregate failure after `attempts` tries; `last` stays reachable
    /// through [`CallError::last_error`] and [`Error::source`].
    pub fn exhausted(attempts: u32, last: CallError) -> Self {
        Self {
            kind: CallErrorKind::RetriesExhausted,
            message: format!("operation failed after {attempts} attempts: {last}"),
            attempts: Some(attempts),
            origin: None,
            cause: Some(Box::new(last)),
        }
    }

    pub fn with_context(mut self, context: impl AsRef<str>) -> Self {
        self.message = format!("{}: {}", context.as_ref(), self.message);
        self
    }

    pub fn with_origin(mut self, origin: &'static str) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn last_error(&self) -> Option<&CallError> {
        self.cause.as_deref()
    }

    /// Configuration failures are raised immediately and never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            CallErrorKind::Execution | CallErrorKind::Timeout | CallErrorKind::Join
        )
    }
}

impl Display for CallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for CallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

impl From<String> for CallError {
    fn from(value: String) -> Self {
        CallError::execution(value)
    }
}

impl From<&str> for CallError {
    fn from(value: &str) -> Self {
        CallError::execution(value)
    }
}
