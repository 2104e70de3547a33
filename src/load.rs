//! Growth loop that keeps loading content until the page stops growing.
//!
//! After every growth action the controller waits a fixed interval and reads
//! the extent signal. Two consecutive equal readings mean the listing is
//! exhausted. A stall that later recovers looks exactly like exhaustion and
//! ends the loop early; there is no retry on stall.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::source::{DocumentSource, ExtentSignal};
use crate::status::Reporter;
use crate::{Error, Result, RunConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The extent didn't change after a growth action.
    Exhausted,
    /// The attempt bound was hit while the page was still growing.
    BoundReached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Growth actions performed.
    pub attempts: u32,
    /// Growth actions that made the page grow.
    pub loads: u32,
    pub outcome: LoadOutcome,
    /// Whether an explicit "load more" control was activated first.
    pub primed: bool,
    pub final_signal: ExtentSignal,
}

/// Loop state for one run. Never outlives `LoadController::run`.
#[derive(Debug)]
struct LoadSession {
    attempt_count: u32,
    last_signal: ExtentSignal,
    bound: u32,
}

#[derive(Debug, Clone)]
pub struct LoadController {
    wait_interval: Duration,
    bound: u32,
    discovery_timeout: Duration,
}

impl LoadController {
    pub fn new(wait_interval: Duration, bound: u32, discovery_timeout: Duration) -> Result<Self> {
        if wait_interval.is_zero() {
            return Err(Error::Validation("the wait interval must be positive".into()));
        }
        if bound == 0 {
            return Err(Error::Validation("the load limit must be at least 1".into()));
        }
        Ok(Self {
            wait_interval,
            bound,
            discovery_timeout,
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Self::new(config.wait_interval(), config.max_loads, config.discovery_timeout)
    }

    /// Drives `source` until its extent stops changing or the bound is hit.
    ///
    /// Any source failure inside the loop is fatal and carries the attempt
    /// number it happened at.
    pub async fn run<S>(&self, source: &mut S, status: &Reporter) -> Result<LoadReport>
    where
        S: DocumentSource + ?Sized,
    {
        status.emit("--- loading content ---");
        let primed = self.prime(source, status).await;

        status.emit("loading more content by scrolling...");
        let first = source
            .extent_signal()
            .await
            .map_err(|e| Error::at_attempt(0, e))?;
        let mut session = LoadSession {
            attempt_count: 0,
            last_signal: first,
            bound: self.bound,
        };

        let mut attempts = 0;
        let outcome = loop {
            attempts += 1;
            source
                .trigger_growth()
                .await
                .map_err(|e| Error::at_attempt(attempts, e))?;
            sleep(self.wait_interval).await;
            let signal = source
                .extent_signal()
                .await
                .map_err(|e| Error::at_attempt(attempts, e))?;
            debug!(attempt = attempts, %signal, last = %session.last_signal, "extent read");

            if signal == session.last_signal {
                break LoadOutcome::Exhausted;
            }
            if session.attempt_count + 1 >= session.bound {
                session.last_signal = signal;
                break LoadOutcome::BoundReached;
            }
            session.attempt_count += 1;
            session.last_signal = signal;
            status.emit(format!("loaded {}/{}", session.attempt_count, session.bound));
        };

        let report = LoadReport {
            attempts,
            loads: session.attempt_count,
            outcome,
            primed,
            final_signal: session.last_signal,
        };
        match outcome {
            LoadOutcome::Exhausted => status.emit(format!(
                "scrolling finished: no new content after {} attempts ({} loads)",
                report.attempts, report.loads
            )),
            LoadOutcome::BoundReached => status.emit(format!(
                "scrolling stopped: reached the limit of {} attempts, more content may exist",
                report.attempts
            )),
        }
        Ok(report)
    }

    /// Activates an explicit "load more" control if one shows up in time.
    /// Not finding one, or failing to click it, is only informational.
    async fn prime<S>(&self, source: &mut S, status: &Reporter) -> bool
    where
        S: DocumentSource + ?Sized,
    {
        status.emit("looking for a 'Load more' button...");
        match source.prime(self.discovery_timeout).await {
            Ok(true) => {
                status.emit("clicked the 'Load more' button");
                sleep(self.wait_interval).await;
                true
            }
            Ok(false) => {
                status.emit("no 'Load more' button found, continuing with scrolling");
                false
            }
            Err(e) => {
                status.emit(format!(
                    "couldn't click the 'Load more' button ({e}), continuing with scrolling"
                ));
                false
            }
        }
    }
}
