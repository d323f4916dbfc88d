//! Reconnect policies
//!
//! When the feed connection drops unexpectedly, the policy decides how
//! long to wait before the next attempt and when to give up. Policies are
//! stateful: they carry the attempt counter across failures and reset it
//! when a connection succeeds.
//!
//! # Built-in Policies
//!
//! - **ExponentialBackoff**: doubling delays with a cap (the default)
//! - **FixedDelay**: constant delay between attempts
//! - **NoReconnect**: give up immediately
//!
//! # Examples
//!
//! ```rust
//! use astra_feed_client::ExponentialBackoff;
//! use std::time::Duration;
//!
//! // Feed defaults: 1s base, 30s cap, 5 attempts
//! let feed_default = ExponentialBackoff::default();
//!
//! // Custom: 100ms base, 10s cap, 3 attempts
//! let custom = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(10))
//!     .with_max_attempts(3);
//! ```

use astra_feed_core::FeedConfig;
use std::time::Duration;

/// Decides the delay before each reconnect attempt
///
/// `next_delay` is consulted once per failed connection. It advances the
/// internal attempt counter and returns `None` once the budget is spent,
/// at which point the client stays down until a fresh `connect()` call.
/// `reset` is invoked on every successful open so a later outage starts
/// from the base delay again.
pub trait ReconnectPolicy: Send {
    /// Advance the attempt counter and return the delay before the next
    /// attempt, or `None` to give up
    fn next_delay(&mut self) -> Option<Duration>;

    /// Clear accumulated state after a successful connection
    fn reset(&mut self);

    /// The number of attempts consumed since the last reset
    fn attempts(&self) -> u32;
}

/// Exponential backoff with a delay cap and bounded attempt budget
///
/// The delay before attempt `k` (1-indexed) is `min(base * 2^k, cap)`:
/// the counter is incremented before the delay is computed, so the first
/// retry already waits twice the base delay.
pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
    max_attempts: u32,
    jitter: bool,
    attempts: u32,
}

impl ExponentialBackoff {
    /// Create a policy with the given base delay and cap
    ///
    /// The attempt budget defaults to 5; override with
    /// [`with_max_attempts`](Self::with_max_attempts).
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            max_attempts: 5,
            jitter: false,
            attempts: 0,
        }
    }

    /// Build a policy from a feed configuration
    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.base_delay, config.max_delay)
            .with_max_attempts(config.max_reconnect_attempts)
    }

    /// Set the number of attempts before giving up
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Add random jitter (0-25% of the delay) to spread reconnect storms
    ///
    /// Off by default so delays stay exact for deterministic tests.
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default())
    }
}

impl ReconnectPolicy for ExponentialBackoff {
    fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;

        let factor = 2u32.saturating_pow(self.attempts);
        let mut delay = self.base.saturating_mul(factor).min(self.cap);

        if self.jitter {
            use rand::Rng;
            let millis = delay.as_millis() as u64;
            let jitter_ms = rand::thread_rng().gen_range(0..=millis / 4);
            delay += Duration::from_millis(jitter_ms);
        }

        Some(delay)
    }

    fn reset(&mut self) {
        self.attempts = 0;
    }

    fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Fixed delay between attempts, optionally bounded
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<u32>,
    attempts: u32,
}

impl FixedDelay {
    /// Create a fixed-delay policy with an unbounded attempt budget
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
            attempts: 0,
        }
    }

    /// Set the number of attempts before giving up
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

impl ReconnectPolicy for FixedDelay {
    fn next_delay(&mut self) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if self.attempts >= max {
                return None;
            }
        }
        self.attempts += 1;
        Some(self.delay)
    }

    fn reset(&mut self) {
        self.attempts = 0;
    }

    fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Policy that never reconnects
pub struct NoReconnect;

impl ReconnectPolicy for NoReconnect {
    fn next_delay(&mut self) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {}

    fn attempts(&self) -> u32 {
        0
    }
}
