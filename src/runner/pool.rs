// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Worker pool for parallel tracing
//!
//! One producer feeds `(index, target)` jobs into a bounded queue; `threads`
//! workers pull from it, wait on the shared rate limiter and trace. Results
//! land in an index-addressed slot vector so output order matches input order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::rate::{tick_period, RateLimiter};
use crate::chain::{TraceResult, Tracer};
use crate::error::{Error, Result};
use crate::targets::Target;

/// Error recorded for targets that never reached a worker
pub const CANCELLED_BEFORE_DISPATCH: &str = "cancelled before dispatch";

type Job = (usize, Target);

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of worker tasks
    pub threads: usize,
    /// Traces started per second, 0 = unlimited
    pub rate_limit: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            threads: 10,
            rate_limit: 0,
        }
    }
}

impl RunnerConfig {
    /// Set worker count
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set rate limit
    pub fn rate_limit(mut self, per_second: u32) -> Self {
        self.rate_limit = per_second;
        self
    }
}

/// Runner statistics
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Targets handed to the last run
    pub targets: u64,
    /// Traces that completed
    pub completed: u64,
    /// Targets never dispatched
    pub skipped: u64,
    /// Sum of trace durations (ms)
    pub total_trace_ms: u64,
    /// Wall-clock duration of the last run (ms)
    pub elapsed_ms: u64,
}

/// Concurrent trace runner
pub struct Runner {
    config: RunnerConfig,
    period: Option<Duration>,
    tracer: Arc<Tracer>,
    cancel: Mutex<CancellationToken>,
    stats: Arc<RwLock<RunStats>>,
}

impl Runner {
    /// Create a runner; `threads` must be at least one
    pub fn new(config: RunnerConfig, tracer: Tracer) -> Result<Self> {
        if config.threads == 0 {
            return Err(Error::config("threads must be greater than zero"));
        }
        let period = tick_period(config.rate_limit)?;

        Ok(Self {
            config,
            period,
            tracer: Arc::new(tracer),
            cancel: Mutex::new(CancellationToken::new()),
            stats: Arc::new(RwLock::new(RunStats::default())),
        })
    }

    /// Token that stops dispatching when cancelled
    ///
    /// A cancelled run swaps in a fresh token when it returns, so fetch the
    /// token again before the next run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.lock().clone()
    }

    /// Runner configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Statistics of the last run
    pub fn stats(&self) -> RunStats {
        self.stats.read().clone()
    }

    /// Trace every target, returning results in input order
    pub async fn run(&self, targets: &[Target]) -> Vec<TraceResult> {
        let start = Instant::now();
        let cancel = self.cancellation_token();
        let total = targets.len();
        *self.stats.write() = RunStats {
            targets: total as u64,
            ..RunStats::default()
        };

        let slots: Arc<Mutex<Vec<Option<TraceResult>>>> =
            Arc::new(Mutex::new((0..total).map(|_| None).collect()));
        let limiter = Arc::new(RateLimiter::with_period(self.period));
        let (tx, rx) = mpsc::channel::<Job>(self.config.threads);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let jobs: Vec<Job> = targets.iter().cloned().enumerate().collect();
        let producer_cancel = cancel.clone();
        let producer = tokio::spawn(async move {
            for job in jobs {
                tokio::select! {
                    biased;
                    _ = producer_cancel.cancelled() => break,
                    sent = tx.send(job) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let mut workers = Vec::with_capacity(self.config.threads);
        for worker in 0..self.config.threads {
            let rx = Arc::clone(&rx);
            let limiter = Arc::clone(&limiter);
            let tracer = Arc::clone(&self.tracer);
            let slots = Arc::clone(&slots);
            let stats = Arc::clone(&self.stats);
            let cancel = cancel.clone();

            workers.push(tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }

                    let job = {
                        let mut rx = rx.lock().await;
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => None,
                            job = rx.recv() => job,
                        }
                    };
                    let Some((index, target)) = job else {
                        break;
                    };

                    if !limiter.acquire(&cancel).await {
                        break;
                    }

                    debug!(worker, index, url = %target.url, "Dispatching");
                    let mut result = tracer.trace(&target.url, &cancel).await;
                    result.payload = target.payload;

                    {
                        let mut stats = stats.write();
                        stats.completed += 1;
                        stats.total_trace_ms += result.duration_ms;
                    }
                    slots.lock()[index] = Some(result);
                }
            }));
        }
        // Workers own the receiver; the producer sees a closed queue if they all stop
        drop(rx);

        if let Err(e) = producer.await {
            warn!(error = %e, "Producer task failed");
        }
        for joined in join_all(workers).await {
            if let Err(e) = joined {
                warn!(error = %e, "Worker task failed");
            }
        }

        let cancelled = cancel.is_cancelled();
        if cancelled {
            warn!("Run cancelled");
            *self.cancel.lock() = CancellationToken::new();
        }

        let filled = std::mem::take(&mut *slots.lock());
        let mut skipped = 0u64;
        let results: Vec<TraceResult> = filled
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| {
                    skipped += 1;
                    let reason = if cancelled {
                        CANCELLED_BEFORE_DISPATCH
                    } else {
                        "worker stopped before completing"
                    };
                    let mut result = TraceResult::failed(target.url.clone(), reason);
                    result.payload = target.payload.clone();
                    result
                })
            })
            .collect();

        let elapsed_ms = start.elapsed().as_millis() as u64;
        {
            let mut stats = self.stats.write();
            stats.skipped = skipped;
            stats.elapsed_ms = elapsed_ms;
        }
        info!(targets = total, skipped, elapsed_ms, "Run finished");

        results
    }
}
