// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for write endpoints.
//!
//! Each limiter counts accepted requests per client token inside a window of
//! `interval` length. A window starts on the first check for a token and is
//! replaced by a fresh one on the first check after it ends. The per-call
//! `limit` lets call sites share one interval with different budgets.
//!
//! State lives in this process only. Several service instances behind a load
//! balancer each enforce their own budget, so a client can get up to
//! `instances × limit` requests through per window.

use crate::clock::{Clock, SystemClock};
use crate::config::LimiterConfig;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Outcome of a single [`RateLimiter::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    /// Whether the request was counted and may proceed
    pub success: bool,
    /// Limit the check was made against
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// End of the current window
    pub reset: DateTime<Utc>,
    /// Time left until `reset`
    #[serde(serialize_with = "serialize_millis")]
    pub reset_after: Duration,
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        self.success
    }

    /// Whole seconds a throttled client should wait, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis().min(u64::MAX as u128) as u64)
}

/// Counter state for one token.
#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
}

impl WindowState {
    fn open(now: DateTime<Utc>, interval: TimeDelta) -> Self {
        Self {
            count: 0,
            window_start: now,
            window_end: now.checked_add_signed(interval).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.window_end
    }
}

/// Thread-safe per-token request limiter.
///
/// Cloning is cheap and clones share state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    name: String,
    interval: TimeDelta,
    unique_token_per_interval: usize,
    clock: Arc<dyn Clock>,
    windows: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    /// Create a limiter driven by the system clock.
    pub fn new(config: &LimiterConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a limiter driven by `clock`.
    pub fn with_clock(config: &LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: config.name.clone(),
            interval: TimeDelta::from_std(config.interval()).unwrap_or(TimeDelta::MAX),
            unique_token_per_interval: config.unique_token_per_interval,
            clock,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Count a request for `token` against `limit`.
    ///
    /// A `limit` of zero rejects every request.
    pub fn check(&self, limit: u32, token: &str) -> RateLimitResult {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        let state = windows
            .entry(token.to_string())
            .or_insert_with(|| WindowState::open(now, self.interval));

        if state.is_expired(now) {
            *state = WindowState::open(now, self.interval);
        }

        let success = state.count < limit;
        if success {
            state.count += 1;
        }

        let result = RateLimitResult {
            success,
            limit,
            remaining: limit.saturating_sub(state.count),
            reset: state.window_end,
            reset_after: (state.window_end - now).to_std().unwrap_or(Duration::ZERO),
        };

        if !success {
            debug!(
                limiter = %self.name,
                token = %token,
                window_start = %state.window_start,
                retry_after_ms = result.reset_after.as_millis() as u64,
                "Rate limit exhausted"
            );
        }

        if windows.len() > self.unique_token_per_interval {
            self.prune(&mut windows, now);
        }

        result
    }

    /// Number of tokens currently tracked.
    pub fn tracked_tokens(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop entries whose window ended more than two intervals before `now`.
    fn prune(&self, windows: &mut HashMap<String, WindowState>, now: DateTime<Utc>) {
        let grace = self.interval.checked_mul(2).unwrap_or(TimeDelta::MAX);
        let before = windows.len();
        windows.retain(|_, state| match state.window_end.checked_add_signed(grace) {
            Some(stale_at) => now <= stale_at,
            None => true,
        });

        let removed = before - windows.len();
        if removed > 0 {
            debug!(
                limiter = %self.name,
                removed,
                remaining = windows.len(),
                "Pruned stale rate limit windows"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    fn limiter(interval_ms: u64, ceiling: usize) -> (RateLimiter, MockClock) {
        let clock = MockClock::default();
        let config = LimiterConfig {
            name: "test".to_string(),
            interval_ms,
            unique_token_per_interval: ceiling,
            limit: 3,
        };
        (RateLimiter::with_clock(&config, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_window_exhaustion_and_reset() {
        let (limiter, clock) = limiter(60_000, 500);

        for _ in 0..3 {
            assert!(limiter.check(3, "10.0.0.1").success);
        }
        let denied = limiter.check(3, "10.0.0.1");
        assert!(!denied.success);
        assert_eq!(denied.remaining, 0);

        clock.advance(Duration::from_millis(60_001));
        let fresh = limiter.check(3, "10.0.0.1");
        assert!(fresh.success);
        assert_eq!(fresh.remaining, 2);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let (limiter, clock) = limiter(1_000, 500);
        for _ in 0..3 {
            limiter.check(3, "t");
        }

        // now == window_end still belongs to the old window
        clock.advance(Duration::from_millis(1_000));
        assert!(!limiter.check(3, "t").success);

        clock.advance(Duration::from_millis(1));
        assert!(limiter.check(3, "t").success);
    }

    #[test]
    fn test_denied_check_does_not_consume() {
        let (limiter, clock) = limiter(1_000, 500);
        let first = limiter.check(1, "t");
        assert!(first.success);
        for _ in 0..5 {
            assert!(!limiter.check(1, "t").success);
        }
        // Reset keeps the original window end despite the rejected checks
        let denied = limiter.check(1, "t");
        assert_eq!(denied.reset, first.reset);

        clock.advance(Duration::from_millis(1_001));
        assert!(limiter.check(1, "t").success);
    }

    #[test]
    fn test_reset_fields() {
        let (limiter, clock) = limiter(60_000, 500);
        let start = clock.now();

        let first = limiter.check(3, "t");
        assert_eq!(first.limit, 3);
        assert_eq!(first.reset, start + TimeDelta::seconds(60));
        assert_eq!(first.reset_after, Duration::from_secs(60));
        assert_eq!(first.retry_after_secs(), 60);

        clock.advance(Duration::from_millis(20_500));
        let second = limiter.check(3, "t");
        assert_eq!(second.reset, first.reset);
        assert_eq!(second.reset_after, Duration::from_millis(39_500));
        assert_eq!(second.retry_after_secs(), 40);
    }

    #[test]
    fn test_zero_limit_always_fails() {
        let (limiter, _clock) = limiter(60_000, 500);
        for _ in 0..3 {
            let result = limiter.check(0, "t");
            assert!(!result.success);
            assert_eq!(result.remaining, 0);
        }
    }

    #[test]
    fn test_per_call_limits_share_window() {
        let (limiter, _clock) = limiter(60_000, 500);
        assert!(limiter.check(1, "t").success);
        assert!(!limiter.check(1, "t").success);
        // A more generous call site still sees the count so far
        let generous = limiter.check(5, "t");
        assert!(generous.success);
        assert_eq!(generous.remaining, 3);
    }

    #[test]
    fn test_prune_only_removes_long_expired_windows() {
        let (limiter, clock) = limiter(1_000, 2);
        limiter.check(3, "old-1");
        limiter.check(3, "old-2");

        // Ended 1ms ago: inside the two-interval grace period
        clock.advance(Duration::from_millis(1_001));
        limiter.check(3, "new-1");
        assert_eq!(limiter.tracked_tokens(), 3);

        // old-* ended more than 2 intervals ago, new-1 has not
        clock.advance(Duration::from_millis(2_500));
        limiter.check(3, "new-2");
        assert_eq!(limiter.tracked_tokens(), 2);
    }

    #[test]
    fn test_prune_not_triggered_below_ceiling() {
        let (limiter, clock) = limiter(1_000, 10);
        for i in 0..5 {
            limiter.check(3, &format!("10.0.0.{i}"));
        }
        clock.advance(Duration::from_secs(60));
        limiter.check(3, "10.0.1.1");
        assert_eq!(limiter.tracked_tokens(), 6);
    }

    #[test]
    fn test_clones_share_state() {
        let (limiter, _clock) = limiter(60_000, 500);
        let other = limiter.clone();
        limiter.check(1, "t");
        assert!(!other.check(1, "t").success);
    }
}
