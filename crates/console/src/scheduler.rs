//! Client-side request scheduler.
//!
//! Every backend call made by a fan-out goes through `RequestScheduler::run`,
//! which bounds the number of requests in flight and paces request starts
//! with a token bucket. Callers never depend on completion order.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tracing::trace;

use common::SchedulerConfig;

/// Token bucket refilled one token per `interval`, capped at `capacity`.
#[derive(Debug)]
struct TokenBucket {
    capacity: u32,
    tokens: u32,
    interval: Duration,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, interval: Duration, now: Instant) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            tokens: capacity,
            interval,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        if self.interval.is_zero() {
            self.tokens = self.capacity;
            self.last_refill = now;
            return;
        }
        let elapsed = now.saturating_duration_since(self.last_refill);
        let earned = (elapsed.as_nanos() / self.interval.as_nanos()) as u32;
        if earned == 0 {
            return;
        }
        self.tokens = self.tokens.saturating_add(earned).min(self.capacity);
        self.last_refill = if self.tokens == self.capacity {
            now
        } else {
            self.last_refill + self.interval * earned
        };
    }

    /// Take a token, or report how long until the next one.
    fn try_take(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);
        if self.tokens > 0 {
            self.tokens -= 1;
            Ok(())
        } else {
            let since = now.saturating_duration_since(self.last_refill);
            Err(self.interval.saturating_sub(since).max(Duration::from_millis(1)))
        }
    }
}

/// Concurrency-limited, rate-paced executor for backend calls.
pub struct RequestScheduler {
    permits: Semaphore,
    max_concurrent: usize,
    bucket: Mutex<TokenBucket>,
}

impl RequestScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        Self {
            permits: Semaphore::new(max_concurrent),
            max_concurrent,
            bucket: Mutex::new(TokenBucket::new(
                config.burst,
                config.refill_interval(),
                Instant::now(),
            )),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run `task` once a concurrency slot and a rate token are available.
    pub async fn run<F, T>(&self, label: &str, task: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquire cannot fail.
        let _permit = self.permits.acquire().await.ok();
        self.take_token(label).await;
        trace!(label, "Dispatching request");
        task.await
    }

    async fn take_token(&self, label: &str) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                match bucket.try_take(Instant::now()) {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };
            trace!(label, ?wait, "Throttling request");
            tokio::time::sleep(wait).await;
        }
    }
}
