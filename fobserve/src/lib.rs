//! Production-friendly observability hooks for call, service, and tool lifecycles.
//!
//! ```rust
//! use fobserve::{MetricsObservabilityHooks, SafeServiceHooks, TracingObservabilityHooks};
//!
//! let _service_hooks = SafeServiceHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeCallHooks, SafeServiceHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeCallHooks, SafeServiceHooks, SafeToolHooks,
        TracingObservabilityHooks,
    };
}
