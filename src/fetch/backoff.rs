//! Shared rate-limit backoff state
//!
//! One `RateLimiter` is constructed per run and consulted before every
//! request. When any fetch to a host hits HTTP 429, the host is gated until
//! the backoff deadline passes, so later fetches (or concurrent ones, if a
//! caller adds them) do not independently retry against an already-throttled
//! server.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-host backoff tracker shared by all fetches in a run
#[derive(Debug)]
pub struct RateLimiter {
    /// Initial delay used when the server does not supply one
    base_delay: Duration,

    /// Upper bound on any single delay
    max_delay: Duration,

    hosts: Mutex<HashMap<String, HostBackoff>>,
}

#[derive(Debug, Clone, Copy)]
struct HostBackoff {
    /// Number of 429 responses seen from this host since the last success
    strikes: u32,

    /// No request to this host may start before this instant
    next_allowed: Instant,
}

impl RateLimiter {
    /// Creates a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `base_delay` - Starting backoff delay; doubles on each strike
    /// * `max_delay` - Cap applied to every delay, including server-supplied
    ///   ones
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the remaining wait before a request to `host` may start
    ///
    /// `None` means the host is not currently throttled.
    pub fn delay_before_start(&self, host: &str) -> Option<Duration> {
        let hosts = self.hosts.lock().unwrap();
        let backoff = hosts.get(host)?;
        let now = Instant::now();
        if backoff.next_allowed > now {
            Some(backoff.next_allowed - now)
        } else {
            None
        }
    }

    /// Records a 429 from `host` and returns the delay before the next attempt
    ///
    /// A server-supplied Retry-After value takes precedence; otherwise the
    /// delay doubles per strike from the base, capped at the maximum.
    pub fn record_throttle(&self, host: &str, retry_after: Option<Duration>) -> Duration {
        let mut hosts = self.hosts.lock().unwrap();
        let backoff = hosts.entry(host.to_string()).or_insert(HostBackoff {
            strikes: 0,
            next_allowed: Instant::now(),
        });

        let delay = match retry_after {
            Some(requested) => requested.min(self.max_delay),
            None => {
                let doubled = self
                    .base_delay
                    .saturating_mul(2u32.saturating_pow(backoff.strikes));
                doubled.min(self.max_delay)
            }
        };

        backoff.strikes += 1;
        backoff.next_allowed = Instant::now() + delay;
        delay
    }

    /// Clears the backoff state for a host after a successful response
    pub fn record_success(&self, host: &str) {
        self.hosts.lock().unwrap().remove(host);
    }
}
