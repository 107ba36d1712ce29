//! Client cache configuration, statistics and clock.

// Author: kelexine (https://github.com/kelexine)

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Configuration for the validated client handle cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a validated handle is reused. An entry is stale once
    /// `now - created_at >= ttl`.
    pub ttl: chrono::Duration,
    /// Model addressed by the construction probe.
    pub probe_model: String,
}

impl Default for CacheConfig {
    /// Provides default values for cache configuration.
    ///
    /// - `ttl`: 3600 seconds
    /// - `probe_model`: `gemini-2.0-flash-exp`
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::seconds(3600),
            probe_model: "gemini-2.0-flash-exp".to_string(),
        }
    }
}

/// Largest TTL representable as a `chrono::Duration`.
const MAX_TTL_SECONDS: u64 = (i64::MAX / 1000) as u64;

impl CacheConfig {
    pub fn new(ttl_seconds: u64, probe_model: impl Into<String>) -> Self {
        Self {
            ttl: chrono::Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64),
            probe_model: probe_model.into(),
        }
    }
}

/// Statistics for cache operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from a live entry without a remote call.
    pub hits: u64,
    /// Lookups that found no entry or a stale one.
    pub misses: u64,
    /// Entries installed after a successful probe.
    pub creates: u64,
    /// Construction probes that failed; nothing was cached.
    pub probe_failures: u64,
}

/// Source of the current time for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
