// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan job orchestration.
//
// One run moves strictly forward through:
//
//   idle check -> submit -> poll(1..=N) -> document | give up
//
// Nothing is retried except the result poll, and only on a non-200 status;
// a transport failure while polling ends the run like any other.
//
// Cancellation is honoured at every step. Before submission it abandons the
// request in flight and no job is created; after submission it stops
// polling and reports where the result can still be fetched.

use std::future::Future;

use tracing::{debug, info, instrument, warn};
use url::Url;

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::ScanParameters;

use crate::client::{EsclClient, NextDocument};
use crate::negotiate::negotiate;
use crate::settings::ScanRequest;
use crate::transport::ScannerTransport;
use crate::waiter::{WaitOutcome, Waiter};

/// A submitted job being polled for its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanJob {
    /// `<Location>/NextDocument` for this job.
    pub result_url: Url,
    /// Polls made so far.
    pub attempts: u32,
}

impl ScanJob {
    pub fn new(result_url: Url) -> Self {
        Self {
            result_url,
            attempts: 0,
        }
    }
}

/// A finished scan.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// The negotiated request that was submitted.
    pub request: ScanRequest,
    pub result_url: Url,
    /// Polls it took to get the document.
    pub attempts: u32,
    pub document: Vec<u8>,
}

/// Drives a scan job on one scanner from idle check to document.
pub struct JobOrchestrator<'a, T, W> {
    client: &'a EsclClient<T>,
    waiter: W,
}

impl<'a, T: ScannerTransport, W: Waiter> JobOrchestrator<'a, T, W> {
    pub fn new(client: &'a EsclClient<T>, waiter: W) -> Self {
        Self { client, waiter }
    }

    pub fn waiter(&self) -> &W {
        &self.waiter
    }

    /// Query capabilities, negotiate `params`, then run the job.
    ///
    /// A capability mismatch fails before the scanner's status is even
    /// looked at, let alone a job submitted.
    pub async fn scan(&mut self, params: &ScanParameters, config: &ScanConfig) -> Result<ScanOutput> {
        let caps = self
            .before_submission(self.client.capabilities(config))
            .await?;
        let request = negotiate(params, &caps)?;
        self.run(request).await
    }

    /// Run an already negotiated request.
    #[instrument(skip(self, request), fields(base = %self.client.base()))]
    pub async fn run(&mut self, request: ScanRequest) -> Result<ScanOutput> {
        self.before_submission(self.ensure_idle()).await?;
        if self.waiter.is_cancelled() {
            info!("scan cancelled before submission");
            return Err(ScanwerkError::Cancelled);
        }

        let result_url = self.client.submit(&request).await?;
        let mut job = ScanJob::new(result_url);
        let document = self.poll(&mut job).await?;

        Ok(ScanOutput {
            request,
            result_url: job.result_url,
            attempts: job.attempts,
            document,
        })
    }

    /// Run a pre-submission step, abandoning it as soon as the run is
    /// cancelled.
    async fn before_submission<R>(&self, step: impl Future<Output = Result<R>>) -> Result<R> {
        if self.waiter.is_cancelled() {
            info!("scan cancelled before submission");
            return Err(ScanwerkError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.waiter.cancelled() => {
                info!("scan cancelled before submission");
                Err(ScanwerkError::Cancelled)
            }
            result = step => result,
        }
    }

    async fn ensure_idle(&self) -> Result<()> {
        let state = self.client.status().await?.state()?;
        if !state.accepts_jobs() {
            warn!(%state, "scanner is not idle");
            return Err(ScanwerkError::ScannerNotIdle(state));
        }
        Ok(())
    }

    async fn poll(&mut self, job: &mut ScanJob) -> Result<Vec<u8>> {
        loop {
            let attempt = job.attempts + 1;
            match self.waiter.wait(attempt).await {
                WaitOutcome::Poll => {}
                WaitOutcome::Exhausted => {
                    return Err(ScanwerkError::PollExhausted {
                        attempts: job.attempts,
                        url: job.result_url.to_string(),
                    });
                }
                WaitOutcome::Cancelled => {
                    return Err(ScanwerkError::PollCancelled {
                        attempts: job.attempts,
                        url: job.result_url.to_string(),
                    });
                }
            }

            job.attempts = attempt;
            debug!(attempt, url = %job.result_url, "polling");
            match self.client.fetch_next_document(&job.result_url).await? {
                NextDocument::Ready(document) => {
                    info!(attempt, bytes = document.len(), "received result");
                    return Ok(document);
                }
                NextDocument::Pending(status) => {
                    debug!(attempt, status, "result not ready");
                }
            }
        }
    }
}
