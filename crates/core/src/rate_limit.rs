//! Fixed-window attempt counter for form submissions.
//!
//! The counter is a small value stored next to the client (in its session),
//! so it is advisory: it slows down a single browser, not a determined
//! attacker. Per-IP limits at the HTTP layer cover the rest.
//!
//! Semantics:
//! - The first attempt opens a window of `window` length with count 1.
//! - An attempt after the window has closed opens a fresh window.
//! - Inside the window, attempts are counted until `max_attempts` is
//!   reached; further attempts are refused until the window closes.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Limit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_attempts: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Three attempts per five minutes.
    pub const WAITLIST: Self = Self {
        max_attempts: 3,
        window: Duration::from_secs(5 * 60),
    };

    fn window_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.window).unwrap_or(TimeDelta::MAX)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::WAITLIST
    }
}

/// Returned when an attempt is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("too many attempts, retry in {} seconds", .retry_after.as_secs())]
pub struct RateLimited {
    /// Time until the current window closes.
    pub retry_after: Duration,
}

impl RateLimited {
    /// Whole minutes until retry, rounded up, never less than one.
    #[must_use]
    pub const fn retry_after_minutes(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        let mins = secs.div_ceil(60);
        if mins == 0 { 1 } else { mins }
    }
}

/// Persisted counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptWindow {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

impl AttemptWindow {
    fn open(now: DateTime<Utc>, policy: &RateLimitPolicy) -> Self {
        Self {
            count: 1,
            reset_at: now
                .checked_add_signed(policy.window_delta())
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Record an attempt against an optional existing window.
    ///
    /// On success returns the window to persist. On refusal the stored
    /// window is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] when the window is already full.
    pub fn register(
        current: Option<Self>,
        now: DateTime<Utc>,
        policy: &RateLimitPolicy,
    ) -> Result<Self, RateLimited> {
        let Some(window) = current else {
            return Ok(Self::open(now, policy));
        };

        if now > window.reset_at {
            return Ok(Self::open(now, policy));
        }

        if window.count >= policy.max_attempts {
            return Err(RateLimited {
                retry_after: (window.reset_at - now).to_std().unwrap_or_default(),
            });
        }

        Ok(Self {
            count: window.count + 1,
            reset_at: window.reset_at,
        })
    }

    /// Attempts left in this window as of `now`.
    #[must_use]
    pub fn remaining(current: Option<&Self>, now: DateTime<Utc>, policy: &RateLimitPolicy) -> u32 {
        match current {
            Some(window) if now <= window.reset_at => {
                policy.max_attempts.saturating_sub(window.count)
            }
            _ => policy.max_attempts,
        }
    }

    /// Time until the window closes, zero if it already has.
    #[must_use]
    pub fn time_until_reset(&self, now: DateTime<Utc>) -> Duration {
        (self.reset_at - now).to_std().unwrap_or_default()
    }
}
