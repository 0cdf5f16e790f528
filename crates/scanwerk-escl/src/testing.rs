// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted scanner and fake clock shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use url::Url;

use scanwerk_core::error::{Result, ScanwerkError};

use crate::transport::{HttpResponse, ScannerTransport};
use crate::waiter::{PollSchedule, WaitOutcome, Waiter};

pub(crate) fn base_url() -> Url {
    Url::parse("http://scanner.test:8080/").unwrap()
}

/// A request seen by the fake scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Get(String),
    Post(String, String),
}

/// Scripted reply to one `NextDocument` poll.
#[derive(Debug, Clone)]
pub(crate) enum PollReply {
    Status(u16),
    Document(Vec<u8>),
    Unreachable,
}

/// In-memory scanner that answers from canned documents and records every
/// request it receives.
pub(crate) struct FakeScanner {
    capabilities: String,
    capabilities_status: u16,
    status: String,
    submit_status: u16,
    submit_location: Option<String>,
    stall_status: bool,
    polls: Mutex<VecDeque<PollReply>>,
    requests: Mutex<Vec<Request>>,
}

impl FakeScanner {
    pub(crate) fn new(capabilities: &str, status: &str) -> Self {
        Self {
            capabilities: capabilities.to_string(),
            capabilities_status: 200,
            status: status.to_string(),
            submit_status: 201,
            submit_location: Some("/eSCL/ScanJobs/1".into()),
            stall_status: false,
            polls: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_capabilities_status(mut self, status: u16) -> Self {
        self.capabilities_status = status;
        self
    }

    pub(crate) fn with_submit(mut self, status: u16, location: Option<&str>) -> Self {
        self.submit_status = status;
        self.submit_location = location.map(str::to_owned);
        self
    }

    /// Never answer `eSCL/ScannerStatus`, like a scanner that hangs.
    pub(crate) fn with_stalled_status(mut self) -> Self {
        self.stall_status = true;
        self
    }

    pub(crate) fn with_polls(self, replies: impl IntoIterator<Item = PollReply>) -> Self {
        self.polls.lock().unwrap().extend(replies);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn posts(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, Request::Post(..)))
            .count()
    }

    pub(crate) fn polls_made(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| matches!(r, Request::Get(url) if url.ends_with("/NextDocument")))
            .count()
    }

    fn reply(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            location: None,
            body: body.as_bytes().to_vec(),
        }
    }
}

impl ScannerTransport for FakeScanner {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(Request::Get(url.to_string()));
        let path = url.path();

        if path.ends_with("/eSCL/ScannerCapabilities") {
            return Ok(Self::reply(self.capabilities_status, &self.capabilities));
        }
        if path.ends_with("/eSCL/ScannerStatus") {
            if self.stall_status {
                std::future::pending::<()>().await;
            }
            return Ok(Self::reply(200, &self.status));
        }
        if path.ends_with("/NextDocument") {
            let next = self.polls.lock().unwrap().pop_front();
            return match next.unwrap_or(PollReply::Status(503)) {
                PollReply::Status(status) => Ok(Self::reply(status, "")),
                PollReply::Document(body) => Ok(HttpResponse {
                    status: 200,
                    location: None,
                    body,
                }),
                PollReply::Unreachable => Err(ScanwerkError::Transport {
                    url: url.to_string(),
                    detail: "cannot connect: connection refused".into(),
                }),
            };
        }
        Ok(Self::reply(404, ""))
    }

    async fn post_xml(&self, url: &Url, body: String) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap()
            .push(Request::Post(url.to_string(), body));
        Ok(HttpResponse {
            status: self.submit_status,
            location: self.submit_location.clone(),
            body: Vec::new(),
        })
    }
}

/// Waiter that follows a schedule without sleeping and records the delays
/// it would have slept for.
pub(crate) struct FakeClock {
    schedule: PollSchedule,
    cancel_before_attempt: Option<u32>,
    pub(crate) waited: Vec<Duration>,
}

impl FakeClock {
    pub(crate) fn new(schedule: PollSchedule) -> Self {
        Self {
            schedule,
            cancel_before_attempt: None,
            waited: Vec::new(),
        }
    }

    /// Cancel instead of making poll `attempt`; `0` means cancelled from
    /// the start.
    pub(crate) fn cancel_before(mut self, attempt: u32) -> Self {
        self.cancel_before_attempt = Some(attempt);
        self
    }
}

impl Waiter for FakeClock {
    async fn wait(&mut self, attempt: u32) -> WaitOutcome {
        if self.cancel_before_attempt == Some(attempt) {
            return WaitOutcome::Cancelled;
        }
        match self.schedule.next_delay(attempt) {
            Some(delay) => {
                self.waited.push(delay);
                WaitOutcome::Poll
            }
            None => WaitOutcome::Exhausted,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_before_attempt == Some(0)
    }

    async fn cancelled(&self) {
        if !self.is_cancelled() {
            std::future::pending::<()>().await;
        }
    }
}
