use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Minimum-interval rate limiter shared by all in-flight classifier calls.
/// The lock is held across the sleep so waiters are released one interval
/// apart rather than in a burst.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let requests_per_minute = requests_per_minute.max(1);
        Self {
            min_interval: Duration::from_secs_f64(60.0 / requests_per_minute as f64),
            last_request: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}
