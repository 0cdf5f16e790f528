// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP transport used by the eSCL client.
//
// The client only ever needs two operations: GET a resource and POST an XML
// document. Keeping them behind a trait lets the job flow be exercised
// against a scripted scanner in tests.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, LOCATION};
use tracing::debug;
use url::Url;

use scanwerk_core::error::{Result, ScanwerkError};

/// The parts of an HTTP response the eSCL flow looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Value of the `Location` header, if present.
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP surface needed to talk to a scanner.
///
/// Implementations return `Err` only when no response was received at all
/// (unreachable host, timeout, broken connection). Any HTTP status, success
/// or not, is an `Ok` response for the caller to judge.
pub trait ScannerTransport {
    fn get(&self, url: &Url) -> impl Future<Output = Result<HttpResponse>> + Send;

    /// POST `body` with `Content-Type: text/xml`.
    fn post_xml(&self, url: &Url, body: String) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// `reqwest`-backed transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("scanwerk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScanwerkError::Transport {
                url: String::new(),
                detail: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    async fn read(url: &Url, response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?
            .to_vec();
        debug!(%url, status, bytes = body.len(), "HTTP response");
        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}

impl ScannerTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;
        Self::read(url, response).await
    }

    async fn post_xml(&self, url: &Url, body: String) -> Result<HttpResponse> {
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;
        Self::read(url, response).await
    }
}

fn transport_error(url: &Url, err: &reqwest::Error) -> ScanwerkError {
    let detail = if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("cannot connect: {err}")
    } else {
        err.to_string()
    };
    ScanwerkError::Transport {
        url: url.to_string(),
        detail,
    }
}
