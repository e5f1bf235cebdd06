//! Fixed-window rate limiting for sensitive account actions.
//!
//! State is process-local and advisory: losing it on restart only loosens limiting.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, Utc};

use crate::utils::clock::Clock;

/// Above this many tracked keys, expired windows are dropped during a check.
const PURGE_THRESHOLD: usize = 1024;

/// Minimum spacing between purges triggered from `check`.
const PURGE_INTERVAL_SECS: i64 = 60;

/// How many attempts a key may make per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
        }
    }

    /// Forgot-password requests: 3 per 10 minutes.
    pub fn password_reset() -> Self {
        Self::new(3, Duration::minutes(10))
    }

    /// Resend-verification requests: 3 per 10 minutes.
    pub fn verification_resend() -> Self {
        Self::new(3, Duration::minutes(10))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Zero when allowed.
    pub retry_after_seconds: u64,
}

impl RateLimitDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_seconds: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    window_start: DateTime<Utc>,
    count: u32,
    window: Duration,
}

impl RateLimitWindow {
    fn ends_at(&self) -> DateTime<Utc> {
        self.window_start + self.window
    }
}

struct LimiterState {
    windows: HashMap<String, RateLimitWindow>,
    last_purge: Option<DateTime<Utc>>,
}

impl LimiterState {
    fn purge(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, entry| now < entry.ends_at());
        self.last_purge = Some(now);
        before - self.windows.len()
    }
}

pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_purge: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records an attempt for `key` and reports whether it fits in the current window.
    ///
    /// Check and increment happen under one lock, so concurrent callers cannot both take
    /// the last slot.
    pub fn check(&self, key: &str, max_count: u32, window: Duration) -> RateLimitDecision {
        let now = self.clock.now();
        let mut state = self.lock();

        let purge_due = state
            .last_purge
            .map_or(true, |at| now - at >= Duration::seconds(PURGE_INTERVAL_SECS));

        if state.windows.len() > PURGE_THRESHOLD && purge_due {
            state.purge(now);
        }

        match state.windows.get_mut(key) {
            Some(entry) if now < entry.ends_at() => {
                if entry.count < max_count {
                    entry.count += 1;
                    return RateLimitDecision::allowed();
                }

                let remaining_ms = (entry.ends_at() - now).num_milliseconds().max(0) as u64;

                RateLimitDecision {
                    allowed: false,
                    retry_after_seconds: remaining_ms.div_ceil(1000).max(1),
                }
            }
            _ => {
                state.windows.insert(
                    key.to_owned(),
                    RateLimitWindow {
                        window_start: now,
                        count: 1,
                        window,
                    },
                );

                RateLimitDecision::allowed()
            }
        }
    }

    pub fn check_policy(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        self.check(key, policy.max_attempts, policy.window)
    }

    /// Drops every window that has already elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.lock().purge(now)
    }

    pub fn tracked_keys(&self) -> usize {
        self.lock().windows.len()
    }
}
