// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Concurrent execution of traces under a global rate limit

mod pool;
mod rate;

pub use pool::{RunStats, Runner, RunnerConfig, CANCELLED_BEFORE_DISPATCH};
pub use rate::{tick_period, RateLimiter, MAX_RATE_LIMIT};
