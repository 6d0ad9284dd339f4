use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use log::warn;
use rand::Rng;

/// Retry an async operation with exponential backoff. A small random jitter
/// is added to each sleep so concurrent image tasks do not retry in
/// lockstep against the provider.
pub async fn with_retry<T, F, Fut>(
    max_retries: u32,
    backoff_seconds: f64,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt > max_retries {
                    return Err(err).context("exceeded max retries");
                }

                let backoff = backoff_seconds * 2f64.powi(attempt as i32 - 1);
                let jitter = rand::thread_rng().gen_range(0.0..=backoff * 0.25);
                let sleep_time = backoff + jitter;
                warn!("Retrying after error: {err:#} (sleep {sleep_time:.2}s)");
                tokio::time::sleep(Duration::from_secs_f64(sleep_time)).await;
            }
        }
    }
}
