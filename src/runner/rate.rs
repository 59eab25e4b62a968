// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Global rate limiter shared by all workers

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Highest rate with a non-zero tick period
pub const MAX_RATE_LIMIT: u32 = 1_000_000_000;

/// Tick period for `per_second`; `None` when unlimited
pub fn tick_period(per_second: u32) -> Result<Option<Duration>> {
    match per_second {
        0 => Ok(None),
        n if n > MAX_RATE_LIMIT => Err(Error::config(format!(
            "rate limit {} exceeds {} per second",
            n, MAX_RATE_LIMIT
        ))),
        n => Ok(Some(Duration::from_secs(1) / n)),
    }
}

/// Hands out at most `per_second` ticks per second across all callers
///
/// Missed ticks are delayed rather than bursted. Must be created inside a
/// tokio runtime.
#[derive(Debug)]
pub struct RateLimiter {
    ticker: Option<Mutex<Interval>>,
}

impl RateLimiter {
    /// Create a limiter; `0` means unlimited
    pub fn new(per_second: u32) -> Result<Self> {
        Ok(Self::with_period(tick_period(per_second)?))
    }

    /// Create a limiter from a period checked by [`tick_period`]
    pub(crate) fn with_period(period: Option<Duration>) -> Self {
        let Some(period) = period.filter(|p| !p.is_zero()) else {
            return Self::unlimited();
        };

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker: Some(Mutex::new(ticker)),
        }
    }

    /// Limiter that never waits
    pub fn unlimited() -> Self {
        Self { ticker: None }
    }

    /// Check if this limiter ever waits
    pub fn is_limited(&self) -> bool {
        self.ticker.is_some()
    }

    /// Wait for the next tick
    ///
    /// Returns `false` if `cancel` fired first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> bool {
        let Some(ref ticker) = self.ticker else {
            return !cancel.is_cancelled();
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = async { ticker.lock().await.tick().await } => true,
        }
    }
}
