use std::future::Future;
use std::time::Duration;

/// Runs `op` until it succeeds or `max_attempts` calls have failed, sleeping
/// `base_delay * 2^(n-1)` after the n-th failure. Returns the last error.
pub async fn retry_with_backoff<T, E, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                let delay = base_delay * (1 << (attempt - 1));
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn stops_at_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let result: Result<u32, String> =
            retry_with_backoff(3, Duration::from_millis(500), move |attempt| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err("flaky".to_string())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_cap_with_exponential_delays() {
        let start = tokio::time::Instant::now();
        let result: Result<(), String> =
            retry_with_backoff(3, Duration::from_millis(500), |attempt| async move {
                Err(format!("failure {}", attempt))
            })
            .await;
        assert_eq!(result, Err("failure 3".to_string()));
        // 500ms + 1000ms between the three attempts
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(1500));
        assert!(waited < Duration::from_millis(1600));
    }
}
