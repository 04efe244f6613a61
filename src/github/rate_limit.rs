//! Rate limit bookkeeping for GitHub API calls.
//!
//! GitHub reports quota usage in `X-RateLimit-*` headers. The fetcher only
//! reads them for diagnostics; pacing is a fixed delay between requests
//! provided by [`Throttle`].

use std::cell::Cell;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Delay inserted between successive API requests.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Rate limit information extracted from GitHub API response headers.
///
/// # Example
///
/// ```
/// use merge_audit::github::rate_limit::RateLimitInfo;
///
/// let info = RateLimitInfo::new(5000, 4999, 1700000000);
/// assert!(!info.is_exhausted());
/// assert_eq!(info.remaining(), 4999);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window.
    limit: u32,
    /// Remaining requests in the current window.
    remaining: u32,
    /// Unix timestamp when the rate limit resets.
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit info instance.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Builds rate limit info from the raw `X-RateLimit-Limit`,
    /// `X-RateLimit-Remaining`, and `X-RateLimit-Reset` header values.
    ///
    /// Returns `None` unless all three are present and numeric.
    #[must_use]
    pub fn from_header_values(
        limit: Option<&str>,
        remaining: Option<&str>,
        reset_at: Option<&str>,
    ) -> Option<Self> {
        let parsed_limit = limit?.trim().parse().ok()?;
        let parsed_remaining = remaining?.trim().parse().ok()?;
        let parsed_reset = reset_at?.trim().parse().ok()?;
        Some(Self::new(parsed_limit, parsed_remaining, parsed_reset))
    }

    /// Returns the maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns the Unix timestamp when the rate limit resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Returns true if the rate limit has been exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Calculates seconds until the rate limit resets.
    ///
    /// Returns 0 if the reset time has already passed or if the system time
    /// cannot be determined.
    #[must_use]
    pub fn seconds_until_reset(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);

        self.reset_at.saturating_sub(now)
    }
}

/// Static pacing between consecutive requests.
///
/// The first call to [`Throttle::pause`] returns immediately; every later
/// call sleeps for the configured delay. Not `Sync`: one fetch run owns it.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    primed: Cell<bool>,
}

impl Throttle {
    /// Creates a throttle with the given inter-request delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            primed: Cell::new(false),
        }
    }

    /// Returns the configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits before a request unless this is the first one.
    pub fn pause(&self) {
        if self.primed.replace(true) && !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_DELAY)
    }
}
