use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use fcall::prelude::*;
use fcall::{NoopCallHooks, execute_with_retry, rcall_observed};

fn flaky(failures: u32, calls: Arc<AtomicU32>) -> CallFn<(), &'static str> {
    CallFn::from_async(move |_: ()| {
        let calls = Arc::clone(&calls);
        async move {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= failures {
                Err(CallError::execution(format!("attempt {attempt} failed")))
            } else {
                Ok("recovered")
            }
        }
    })
}

#[tokio::test(start_paused = true)]
async fn lcall_preserves_input_order_when_completion_order_differs() {
    let func = CallFn::from_async(|value: u64| async move {
        tokio::time::sleep(Duration::from_millis(100 - value * 10)).await;
        Ok::<_, CallError>(value * 3)
    });

    let results = lcall(vec![1, 2, 3, 4, 5], &func).await.expect("lcall should succeed");
    assert_eq!(results, vec![3, 6, 9, 12, 15]);
}

#[tokio::test(start_paused = true)]
async fn rcall_succeeds_on_third_attempt_with_three_retries() {
    let calls = Arc::new(AtomicU32::new(0));
    let func = flaky(2, Arc::clone(&calls));
    let policy = RetryPolicy::new(3).with_delay(Duration::from_millis(50));

    let value = rcall(&func, (), &policy, None).await.expect("third attempt succeeds");

    assert_eq!(value, "recovered");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn rcall_makes_exactly_retries_plus_one_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let func = flaky(u32::MAX, Arc::clone(&calls));
    let policy = RetryPolicy::new(4);

    let error = rcall(&func, (), &policy, None).await.expect_err("always fails");

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(error.kind, CallErrorKind::RetriesExhausted);
    assert_eq!(error.attempts, Some(5));
    assert!(
        error
            .last_error()
            .expect("last error kept")
            .message
            .contains("attempt 5 failed")
    );
}

#[tokio::test(start_paused = true)]
async fn backoff_delay_grows_geometrically_between_attempts() {
    let policy = RetryPolicy::new(3)
        .with_delay(Duration::from_millis(100))
        .with_backoff_factor(2.0);
    let sleeps = Arc::new(Mutex::new(Vec::new()));

    let _ = execute_with_retry::<(), _, _, _, _>(
        "backoff",
        &policy,
        &NoopCallHooks,
        |_| async { Err(CallError::execution("still failing")) },
        {
            let sleeps = Arc::clone(&sleeps);
            move |delay| {
                let sleeps = Arc::clone(&sleeps);
                async move {
                    sleeps.lock().expect("sleep lock").push(delay);
                }
            }
        },
    )
    .await;

    assert_eq!(
        *sleeps.lock().expect("sleep lock"),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn rcall_sleeps_observed_on_the_paused_clock() {
    let calls = Arc::new(AtomicU32::new(0));
    let func = flaky(2, Arc::clone(&calls));
    let policy = RetryPolicy::new(2)
        .with_initial_delay(Duration::from_millis(10))
        .with_delay(Duration::from_millis(100))
        .with_backoff_factor(3.0);

    let started = tokio::time::Instant::now();
    rcall(&func, (), &policy, None).await.expect("recovers");

    assert_eq!(started.elapsed(), Duration::from_millis(10 + 100 + 300));
}

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl CallHooks for RecordingHooks {
    fn on_retry_scheduled(&self, operation: &str, attempt: u32, delay: Duration, _error: &CallError) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("retry:{operation}:{attempt}:{}", delay.as_millis()));
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &CallError) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("failure:{operation}:{attempts}:{:?}", error.kind));
    }
}

#[tokio::test(start_paused = true)]
async fn rcall_observed_reports_retry_lifecycle() {
    let hooks = RecordingHooks::default();
    let calls = Arc::new(AtomicU32::new(0));
    let func = flaky(u32::MAX, calls);
    let policy = RetryPolicy::new(1).with_delay(Duration::from_millis(25));

    let value = rcall_observed("lookup", &func, (), &policy, Some("fallback"), &hooks)
        .await
        .expect("default replaces the failure");

    assert_eq!(value, "fallback");
    assert_eq!(
        *hooks.events.lock().expect("events lock"),
        vec!["retry:lookup:1:25", "failure:lookup:2:RetriesExhausted"]
    );
}

#[tokio::test]
async fn mcall_broadcasts_and_rejects_mismatched_pairing() {
    let f = CallFn::from_async(|value: i32| async move { Ok::<_, CallError>(value * 10) });
    let g = CallFn::from_async(|value: i32| async move { Ok::<_, CallError>(value + 1) });
    let h = CallFn::from_async(|value: i32| async move { Ok::<_, CallError>(value - 1) });

    let broadcast = mcall(vec![1, 2], &[f.clone()]).await.expect("broadcast");
    assert_eq!(broadcast, vec![10, 20]);

    let error = mcall(vec![1, 2], &[f, g, h]).await.expect_err("mismatch");
    assert_eq!(error.kind, CallErrorKind::LengthMismatch);
}

#[tokio::test(start_paused = true)]
async fn retrying_handle_applies_policy_per_invocation() {
    let calls = Arc::new(AtomicU32::new(0));
    let func = flaky(1, Arc::clone(&calls)).retrying(RetryPolicy::new(1));

    assert_eq!(func.call(()).await.expect("second attempt succeeds"), "recovered");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn with_timeout_bounds_each_invocation() {
    let func = CallFn::from_async(|_: ()| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok::<_, CallError>(())
    })
    .with_timeout(Duration::from_secs(1));

    let error = func.call(()).await.expect_err("deadline expires");
    assert_eq!(error.kind, CallErrorKind::Timeout);
}
