//! Per-route token bucket rate limiting.

use parking_lot::Mutex;
use std::time::Instant;

/// A simple token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self, capacity: f64, refill_rate: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        self.refill(capacity, refill_rate);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token bucket limiter shared by every request on a route.
///
/// Starts full, refills continuously at `rate` tokens per second and holds at
/// most `burst` tokens. Safe to call from many tasks at once.
#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    burst: u32,
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    pub fn new(rate: f64, burst: u32) -> Self {
        Self {
            rate,
            burst,
            bucket: Mutex::new(TokenBucket::new(f64::from(burst))),
        }
    }

    /// Limiter for a requests-per-second quota. Returns `None` unless the
    /// quota is positive.
    pub fn per_second(qps: i64) -> Option<Self> {
        if qps <= 0 {
            return None;
        }
        let burst = u32::try_from(qps).unwrap_or(u32::MAX);
        Some(Self::new(f64::from(burst), burst))
    }

    /// Refill rate in tokens per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Bucket capacity.
    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Take one token if available.
    pub fn try_acquire(&self) -> bool {
        self.bucket.lock().try_acquire(f64::from(self.burst), self.rate)
    }

    /// Tokens currently available.
    pub fn available(&self) -> f64 {
        let mut bucket = self.bucket.lock();
        bucket.refill(f64::from(self.burst), self.rate);
        bucket.tokens
    }
}
