//! Structured task ownership for concurrent fan-out.
//!
//! Every task spawned into a [`TaskScope`] is owned by it: dropping the scope,
//! or a fail-fast collection hitting an error, aborts whatever is still running.

use std::collections::HashMap;
use std::future::Future;

use tokio::task::{Id, JoinSet};

use crate::CallError;

pub struct TaskScope<T> {
    tasks: JoinSet<(usize, Result<T, CallError>)>,
    indices: HashMap<Id, usize>,
    next_index: usize,
}

impl<T> Default for TaskScope<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskScope<T>
where
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            indices: HashMap::new(),
            next_index: 0,
        }
    }

    /// Spawns `future` and returns its position in the scope.
    pub fn spawn<F>(&mut self, future: F) -> usize
    where
        F: Future<Output = Result<T, CallError>> + Send + 'static,
    {
        let index = self.next_index;
        self.next_index += 1;

        let handle = self.tasks.spawn(async move { (index, future.await) });
        self.indices.insert(handle.id(), index);
        index
    }

    pub fn len(&self) -> usize {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    /// Collects every result in spawn order, stopping at the first failure to
    /// complete and aborting the remaining tasks.
    pub async fn join_all(mut self) -> Result<Vec<T>, CallError> {
        let mut slots = (0..self.next_index).map(|_| None).collect::<Vec<Option<T>>>();

        while let Some((index, result)) = self.next_outcome().await {
            match result {
                Ok(value) => slots[index] = Some(value),
                Err(error) => {
                    self.tasks.abort_all();
                    return Err(error);
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| CallError::join(format!("task {index} produced no result")))
            })
            .collect()
    }

    /// Collects every outcome in spawn order; failures do not affect siblings.
    pub async fn join_settled(mut self) -> Vec<Result<T, CallError>> {
        let mut slots = (0..self.next_index)
            .map(|_| None)
            .collect::<Vec<Option<Result<T, CallError>>>>();

        while let Some((index, result)) = self.next_outcome().await {
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| Err(CallError::join(format!("task {index} produced no result"))))
            })
            .collect()
    }

    async fn next_outcome(&mut self) -> Option<(usize, Result<T, CallError>)> {
        let joined = self.tasks.join_next_with_id().await?;
        Some(match joined {
            Ok((id, outcome)) => {
                self.indices.remove(&id);
                outcome
            }
            Err(error) => {
                let id = error.id();
                let index = self.indices.remove(&id).unwrap_or_default();
                let message = if error.is_panic() {
                    format!("task {index} panicked")
                } else {
                    format!("task {index} was cancelled")
                };
                (index, Err(CallError::join(message)))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::CallErrorKind;

    #[tokio::test(start_paused = true)]
    async fn join_all_keeps_spawn_order() {
        let mut scope = TaskScope::new();
        for (index, delay) in [30_u64, 10, 20].into_iter().enumerate() {
            scope.spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(index)
            });
        }

        assert_eq!(scope.join_all().await.expect("all succeed"), vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn join_all_aborts_siblings_on_failure() {
        let finished = Arc::new(AtomicBool::new(false));
        let mut scope = TaskScope::new();

        {
            let finished = Arc::clone(&finished);
            scope.spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                finished.store(true, Ordering::SeqCst);
                Ok(1_u32)
            });
        }
        scope.spawn(async { Err(CallError::execution("fail fast")) });

        let error = scope.join_all().await.expect_err("scope should fail");
        assert_eq!(error.message, "fail fast");

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    async fn explode() -> Result<u32, CallError> {
        panic!("task blew up")
    }

    #[tokio::test]
    async fn panics_map_back_to_their_slot() {
        let mut scope = TaskScope::new();
        scope.spawn(async { Ok(1_u32) });
        scope.spawn(explode());

        let outcomes = scope.join_settled().await;
        assert_eq!(outcomes[0].as_ref().ok(), Some(&1));
        let error = outcomes[1].as_ref().expect_err("second task panicked");
        assert_eq!(error.kind, CallErrorKind::Join);
        assert!(error.message.contains("task 1"));
    }
}
