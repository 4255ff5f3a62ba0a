//! Small async test helpers.

use anyhow::Result;
use std::time::Duration;
use tokio::time::timeout;

/// Default timeout applied to the end-to-end scenario tests.
pub fn test_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Run `future` with `duration`, turning an elapsed timeout into an error.
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    timeout(duration, future)
        .await
        .map_err(|_| anyhow::anyhow!("operation timed out after {duration:?}"))?
}

/// A fresh session-correlation id, for tests that need one per run.
pub fn test_session_id() -> String {
    format!("test-session-{}", uuid::Uuid::new_v4())
}

/// Poll `condition` until it is true or `timeout_duration` elapses.
pub async fn wait_for_condition<F, Fut>(
    condition: F,
    timeout_duration: Duration,
    check_interval: Duration,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();

    while start.elapsed() < timeout_duration {
        if condition().await {
            return Ok(());
        }
        tokio::time::sleep(check_interval).await;
    }

    Err(anyhow::anyhow!("condition not met within timeout"))
}
