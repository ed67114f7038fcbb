//! Concurrent mapping of callables over inputs.
//!
//! ```rust
//! use fcall::{CallError, CallFn, lcall, mcall};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let square = CallFn::from_async(|value: u64| async move { Ok::<_, CallError>(value * value) });
//! assert_eq!(lcall(vec![1, 2, 3], &square).await.expect("lcall"), vec![1, 4, 9]);
//!
//! let negate = CallFn::from_async(|value: u64| async move { Ok::<_, CallError>(0 - value as i64) });
//! let widen = CallFn::from_async(|value: u64| async move { Ok::<_, CallError>(value as i64) });
//! let paired = mcall(vec![5, 6], &[negate, widen]).await.expect("mcall");
//! assert_eq!(paired, vec![-5, 6]);
//! # });
//! ```

use crate::{CallError, CallFn, TaskScope};

/// Runs `func` once per input concurrently, failing fast on the first error.
pub async fn lcall<A, T, I>(inputs: I, func: &CallFn<A, T>) -> Result<Vec<T>, CallError>
where
    I: IntoIterator<Item = A>,
    A: Send + 'static,
    T: Send + 'static,
{
    let mut scope = TaskScope::new();
    for input in inputs {
        scope.spawn(func.call(input));
    }
    scope.join_all().await
}

/// Like [`lcall`], concatenating each output's items in input order.
///
/// Returning `Option<T>` drops the `None` outputs; returning `Vec<T>`
/// flattens one level.
pub async fn lcall_flat<A, C, I>(inputs: I, func: &CallFn<A, C>) -> Result<Vec<C::Item>, CallError>
where
    I: IntoIterator<Item = A>,
    A: Send + 'static,
    C: IntoIterator + Send + 'static,
{
    Ok(lcall(inputs, func).await?.into_iter().flatten().collect())
}

/// Runs `func` once per input concurrently and keeps every outcome.
pub async fn lcall_settled<A, T, I>(inputs: I, func: &CallFn<A, T>) -> Vec<Result<T, CallError>>
where
    I: IntoIterator<Item = A>,
    A: Send + 'static,
    T: Send + 'static,
{
    let mut scope = TaskScope::new();
    for input in inputs {
        scope.spawn(func.call(input));
    }
    scope.join_settled().await
}

/// Maps `funcs` onto `inputs`.
///
/// A single function is broadcast over every input; otherwise the two lists
/// are paired positionally and must have equal length. The length check
/// happens before anything runs.
pub async fn mcall<A, T>(inputs: Vec<A>, funcs: &[CallFn<A, T>]) -> Result<Vec<T>, CallError>
where
    A: Send + 'static,
    T: Send + 'static,
{
    if let [func] = funcs {
        return lcall(inputs, func).await;
    }

    if inputs.len() != funcs.len() {
        return Err(CallError::length_mismatch(format!(
            "{} inputs cannot be paired with {} functions",
            inputs.len(),
            funcs.len()
        )));
    }

    let mut scope = TaskScope::new();
    for (input, func) in inputs.into_iter().zip(funcs) {
        scope.spawn(func.call(input));
    }
    scope.join_all().await
}

/// Runs every function over every input; `grid[f][i]` is `funcs[f](inputs[i])`.
pub async fn mcall_explode<A, T>(
    inputs: Vec<A>,
    funcs: &[CallFn<A, T>],
) -> Result<Vec<Vec<T>>, CallError>
where
    A: Clone + Send + 'static,
    T: Send + 'static,
{
    let width = inputs.len();
    let mut scope = TaskScope::new();
    for func in funcs {
        for input in &inputs {
            scope.spawn(func.call(input.clone()));
        }
    }

    let flat = scope.join_all().await?;
    if width == 0 {
        return Ok(funcs.iter().map(|_| Vec::new()).collect());
    }

    let mut grid = Vec::with_capacity(funcs.len());
    let mut values = flat.into_iter();
    for _ in funcs {
        grid.push(values.by_ref().take(width).collect());
    }
    Ok(grid)
}

/// Runs zero-argument callables concurrently, results in list order.
pub async fn pcall<T>(funcs: &[CallFn<(), T>]) -> Result<Vec<T>, CallError>
where
    T: Send + 'static,
{
    let mut scope = TaskScope::new();
    for func in funcs {
        scope.spawn(func.call(()));
    }
    scope.join_all().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::CallErrorKind;

    fn add(offset: i32) -> CallFn<i32, i32> {
        CallFn::from_async(move |value: i32| async move { Ok::<_, CallError>(value + offset) })
    }

    #[tokio::test]
    async fn lcall_flat_concatenates_and_drops_missing_values() {
        let pairs = CallFn::from_async(|value: i32| async move {
            Ok::<_, CallError>(vec![value; value as usize])
        });
        let flat = lcall_flat(vec![2, 0, 1], &pairs).await.expect("flatten");
        assert_eq!(flat, vec![2, 2, 1]);

        let evens = CallFn::from_async(|value: i32| async move {
            Ok::<_, CallError>((value % 2 == 0).then_some(value))
        });
        let kept = lcall_flat(1..=6, &evens).await.expect("dropna");
        assert_eq!(kept, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn mcall_broadcasts_single_function() {
        let result = mcall(vec![1, 2, 3], &[add(10)]).await.expect("broadcast");
        assert_eq!(result, vec![11, 12, 13]);
    }

    #[tokio::test]
    async fn mcall_pairs_positionally() {
        let result = mcall(vec![1, 2], &[add(10), add(20)]).await.expect("pairing");
        assert_eq!(result, vec![11, 22]);
    }

    #[tokio::test]
    async fn mcall_rejects_mismatched_lengths_before_running() {
        let error = mcall(vec![1, 2, 3], &[add(1), add(2)])
            .await
            .expect_err("lengths differ");
        assert_eq!(error.kind, CallErrorKind::LengthMismatch);
    }

    #[tokio::test]
    async fn mcall_with_no_inputs_or_functions_is_empty() {
        let result = mcall::<i32, i32>(Vec::new(), &[]).await.expect("empty");
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn mcall_explode_builds_function_major_grid() {
        let grid = mcall_explode(vec![1, 2, 3], &[add(0), add(100)])
            .await
            .expect("explode");
        assert_eq!(grid, vec![vec![1, 2, 3], vec![101, 102, 103]]);
    }

    #[tokio::test]
    async fn mcall_explode_without_inputs_keeps_one_row_per_function() {
        let grid = mcall_explode(Vec::new(), &[add(0), add(1)]).await.expect("explode");
        assert_eq!(grid, vec![Vec::<i32>::new(), Vec::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn lcall_settled_keeps_failures_in_place() {
        let func = CallFn::from_async(|value: u32| async move {
            tokio::time::sleep(Duration::from_millis(u64::from(10 - value))).await;
            if value % 2 == 0 {
                Ok(value)
            } else {
                Err(CallError::execution(format!("odd {value}")))
            }
        });

        let outcomes = lcall_settled(0..4, &func).await;
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0].as_ref().ok(), Some(&0));
        assert!(outcomes[1].is_err());
        assert_eq!(outcomes[2].as_ref().ok(), Some(&2));
        assert!(outcomes[3].is_err());
    }

    #[tokio::test]
    async fn pcall_keeps_list_order() {
        let first = CallFn::from_async(|_: ()| async { Ok::<_, CallError>("first") });
        let second = CallFn::from_async(|_: ()| async { Ok::<_, CallError>("second") });

        assert_eq!(
            pcall(&[first, second]).await.expect("pcall"),
            vec!["first", "second"]
        );
    }
}
