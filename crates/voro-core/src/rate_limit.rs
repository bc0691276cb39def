//! Fixed-window request counter keyed by source identifier.
//!
//! Each source gets a counter and the instant its window opened. Once the
//! window has elapsed the next request opens a fresh one. Entries are only
//! reset on rollover, never evicted, and live in process memory: the limiter
//! is advisory, not a distributed or durable control.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default number of requests allowed per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 12;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Process-local fixed-window limiter.
///
/// Updates for a single key happen under that key's shard lock, so
/// concurrent requests from one source are counted exactly.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    /// Create a limiter allowing `max_requests` per `window` per key.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    /// Record a request from `key` now. Returns `true` if it is allowed.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Record a request from `key` at `now`. Returns `true` if it is allowed.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                count: 0,
                started: now,
            };
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= self.max_requests
    }

    /// Number of sources currently tracked.
    #[must_use]
    pub fn tracked_sources(&self) -> usize {
        self.windows.len()
    }

    /// Requests allowed per window.
    #[must_use]
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}
