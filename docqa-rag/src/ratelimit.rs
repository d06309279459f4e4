//! Pacing for calls to rate-limited embedding APIs.
//!
//! Ingestion awaits [`RateLimiter::acquire`] before every store call. All
//! waiting goes through [`tokio::time`], so tests running on a paused clock
//! observe the pauses without sleeping for real.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Gate awaited before each unit of rate-limited work.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until `permits` units of work may proceed.
    async fn acquire(&self, permits: u32);
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn acquire(&self, _permits: u32) {}
}

/// A fixed pause between consecutive acquisitions.
///
/// The first acquisition returns immediately; every later one sleeps for the
/// full delay, regardless of how long the caller spent in between.
#[derive(Debug)]
pub struct FixedDelay {
    delay: Duration,
    started: Mutex<bool>,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay, started: Mutex::new(false) }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn acquire(&self, _permits: u32) {
        let mut started = self.started.lock().await;
        if *started {
            debug!(delay_secs = self.delay.as_secs_f64(), "fixed delay");
            sleep(self.delay).await;
        }
        *started = true;
    }
}

/// A token bucket holding up to `capacity` permits, refilled continuously at
/// `capacity / period`. It starts full.
///
/// Requests for more than `capacity` permits are clamped to `capacity`, so
/// they wait for a full bucket instead of forever.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    period: Duration,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// `capacity` permits per `period`. A zero capacity or period never waits.
    pub fn new(capacity: u32, period: Duration) -> Self {
        Self {
            capacity: f64::from(capacity),
            period,
            state: Mutex::new(BucketState { tokens: f64::from(capacity), last_refill: Instant::now() }),
        }
    }

    fn refill_rate(&self) -> f64 {
        self.capacity / self.period.as_secs_f64()
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn acquire(&self, permits: u32) {
        if self.capacity == 0.0 || self.period.is_zero() {
            return;
        }
        let needed = f64::from(permits).min(self.capacity);
        let rate = self.refill_rate();

        // Holding the lock across the wait serves callers in arrival order.
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * rate).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= needed {
            state.tokens -= needed;
            return;
        }

        let wait = Duration::from_secs_f64((needed - state.tokens) / rate);
        debug!(permits, wait_secs = wait.as_secs_f64(), "token bucket empty, waiting");
        sleep(wait).await;
        // The wait covered exactly the deficit.
        state.tokens = 0.0;
        state.last_refill = Instant::now();
    }
}
