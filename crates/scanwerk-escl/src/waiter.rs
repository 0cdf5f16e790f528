// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Poll pacing for scan jobs.
//
// Scanners take a few seconds to tens of seconds to produce a page, and
// answer `NextDocument` with a non-200 status until then. Polls are spaced
// by a fixed interval (no backoff) and capped at a fixed count. The waiting
// itself sits behind `Waiter` so the job flow runs against a fake clock in
// tests.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scanwerk_core::config::ScanConfig;

/// Fixed-interval poll schedule with an attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSchedule {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
        }
    }

    /// Delay before poll `attempt` (1-based), or `None` once the cap has
    /// been used up.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            None
        } else {
            Some(self.interval)
        }
    }
}

/// What to do after waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Go ahead with the poll.
    Poll,
    /// The attempt budget is spent.
    Exhausted,
    /// Polling was interrupted from outside.
    Cancelled,
}

/// Paces result polls, and says when the run has been called off.
pub trait Waiter {
    /// Wait before poll `attempt` (1-based) and say whether to make it.
    fn wait(&mut self, attempt: u32) -> impl Future<Output = WaitOutcome> + Send;

    /// Whether the run has been cancelled.
    fn is_cancelled(&self) -> bool;

    /// Resolves once the run is cancelled; never resolves otherwise.
    fn cancelled(&self) -> impl Future<Output = ()> + Send;
}

/// Waiter that sleeps on the Tokio timer and stops early when its
/// cancellation token fires.
#[derive(Debug, Clone)]
pub struct TokioWaiter {
    schedule: PollSchedule,
    cancel: CancellationToken,
}

impl TokioWaiter {
    pub fn new(schedule: PollSchedule, cancel: CancellationToken) -> Self {
        Self { schedule, cancel }
    }
}

impl Waiter for TokioWaiter {
    async fn wait(&mut self, attempt: u32) -> WaitOutcome {
        let Some(delay) = self.schedule.next_delay(attempt) else {
            warn!(
                max_attempts = self.schedule.max_attempts,
                "poll attempts exhausted"
            );
            return WaitOutcome::Exhausted;
        };

        debug!(attempt, delay_ms = delay.as_millis() as u64, "waiting before poll");
        tokio::select! {
            _ = self.cancel.cancelled() => {
                info!(attempt, "polling cancelled");
                WaitOutcome::Cancelled
            }
            _ = tokio::time::sleep(delay) => WaitOutcome::Poll,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}
