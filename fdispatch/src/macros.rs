/// Builds [`ToolArguments`](crate::ToolArguments) from key/value pairs.
///
/// Values go through `serde_json::json!`, so any serializable expression works.
///
/// ```rust
/// use fdispatch::fd_args;
///
/// let arguments = fd_args! { "query" => "rust", "limit" => 5 };
/// assert_eq!(arguments["query"], "rust");
/// assert_eq!(arguments["limit"], 5);
/// ```
#[macro_export]
macro_rules! fd_args {
    () => {
        $crate::ToolArguments::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut arguments = $crate::ToolArguments::new();
        $(
            arguments.insert(
                ::std::string::String::from($key),
                $crate::__private::serde_json::json!($value),
            );
        )+
        arguments
    }};
}

/// Creates a [`CallDescriptor`](crate::CallDescriptor) for a tool name and
/// optional keyword arguments.
///
/// ```rust
/// use fdispatch::fd_call;
///
/// let call = fd_call!("weather", "city" => "Oslo", "days" => 2);
/// assert_eq!(call.function, "weather");
/// assert_eq!(call.arguments["days"], 2);
/// ```
#[macro_export]
macro_rules! fd_call {
    ($function:expr $(,)?) => {
        $crate::CallDescriptor::new($function, $crate::ToolArguments::new())
    };
    ($function:expr, $($key:expr => $value:expr),+ $(,)?) => {
        $crate::CallDescriptor::new($function, $crate::fd_args!($($key => $value),+))
    };
}

/// Builds the endpoint table of a [`ServiceConfig`](crate::ServiceConfig)
/// from `name => (max_requests, max_tokens, interval_seconds)` entries.
///
/// A fourth element selects the cost model: `payload_size` or `fixed <n>`.
///
/// ```rust
/// use fdispatch::{TokenCostModel, fd_endpoints};
///
/// let endpoints = fd_endpoints! {
///     "chat/completions" => (1_000, 100_000, 60),
///     "moderations" => (100, 0, 60, fixed 0),
/// };
/// assert_eq!(endpoints["chat/completions"].interval_seconds, 60);
/// assert_eq!(endpoints["moderations"].token_cost_model, TokenCostModel::Fixed(0));
/// ```
#[macro_export]
macro_rules! fd_endpoints {
    (@model payload_size) => {
        $crate::TokenCostModel::PayloadSize
    };
    (@model fixed $cost:expr) => {
        $crate::TokenCostModel::Fixed($cost)
    };
    (@entry ($requests:expr, $tokens:expr, $interval:expr)) => {
        $crate::EndpointConfig::new($requests, $tokens, $interval)
    };
    (@entry ($requests:expr, $tokens:expr, $interval:expr, $($model:tt)+)) => {
        $crate::EndpointConfig::new($requests, $tokens, $interval)
            .with_token_cost_model($crate::fd_endpoints!(@model $($model)+))
    };
    ($($name:expr => $entry:tt),* $(,)?) => {{
        let mut endpoints = ::std::collections::BTreeMap::<
            ::std::string::String,
            $crate::EndpointConfig,
        >::new();
        $(
            endpoints.insert(
                ::std::string::String::from($name),
                $crate::fd_endpoints!(@entry $entry),
            );
        )*
        endpoints
    }};
}
