// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// eSCL client for a single scanner.
//
// Wraps the four requests the protocol needs:
//   - GET  eSCL/ScannerCapabilities
//   - GET  eSCL/ScannerStatus
//   - POST eSCL/ScanJobs
//   - GET  <job>/NextDocument

use tracing::{debug, info, instrument, trace, warn};
use url::Url;

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};

use crate::capabilities::ScannerCapabilities;
use crate::settings::ScanRequest;
use crate::status::ScannerStatus;
use crate::transport::{HttpResponse, HttpTransport, ScannerTransport};

const CAPABILITIES_PATH: &str = "eSCL/ScannerCapabilities";
const STATUS_PATH: &str = "eSCL/ScannerStatus";
const SCAN_JOBS_PATH: &str = "eSCL/ScanJobs";
const NEXT_DOCUMENT: &str = "NextDocument";

/// Outcome of one poll of a job's result URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextDocument {
    /// HTTP 200: the scanned document.
    Ready(Vec<u8>),
    /// Any other status: the document is not available yet.
    Pending(u16),
}

/// Client bound to one scanner base URL.
pub struct EsclClient<T = HttpTransport> {
    base: Url,
    transport: T,
}

impl EsclClient<HttpTransport> {
    /// Create an HTTP client for the scanner at `base_url`.
    pub fn new(base_url: &str, config: &ScanConfig) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(base, transport))
    }
}

impl<T: ScannerTransport> EsclClient<T> {
    pub fn with_transport(base: Url, transport: T) -> Self {
        Self { base, transport }
    }

    /// The scanner base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| ScanwerkError::InvalidUrl(format!("{}{path}: {e}", self.base)))
    }

    /// GET `path` and require a 2xx status.
    async fn get_document(&self, path: &str) -> Result<HttpResponse> {
        let url = self.endpoint(path)?;
        debug!(%url, "querying");
        let response = self.transport.get(&url).await?;
        if !response.is_success() {
            return Err(ScanwerkError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        trace!(
            document = %String::from_utf8_lossy(&response.body),
            "{path}"
        );
        Ok(response)
    }

    /// Fetch and parse the scanner's capabilities.
    #[instrument(skip(self, config), fields(base = %self.base))]
    pub async fn capabilities(&self, config: &ScanConfig) -> Result<ScannerCapabilities> {
        let response = self.get_document(CAPABILITIES_PATH).await?;
        ScannerCapabilities::from_xml(&response.body, config)
    }

    /// Fetch and parse the scanner's current status.
    #[instrument(skip(self), fields(base = %self.base))]
    pub async fn status(&self) -> Result<ScannerStatus> {
        let response = self.get_document(STATUS_PATH).await?;
        let status = ScannerStatus::from_xml(&response.body)?;
        debug!(state = status.raw_state.as_deref().unwrap_or("-"), "scanner status");
        Ok(status)
    }

    /// Submit a scan job and return the URL its document will appear at.
    ///
    /// The scanner answers with `201 Created` and a `Location` header naming
    /// the job; the document is fetched from `<Location>/NextDocument`.
    #[instrument(skip(self, request), fields(base = %self.base))]
    pub async fn submit(&self, request: &ScanRequest) -> Result<Url> {
        let url = self.endpoint(SCAN_JOBS_PATH)?;
        let body = request.to_xml();
        debug!(%url, "sending scan request");
        trace!(document = %body, "scan settings");

        let response = self.transport.post_xml(&url, body).await?;
        if !response.is_success() {
            return Err(ScanwerkError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        if response.status != 201 {
            warn!(status = response.status, "scan job accepted without 201 Created");
        }

        let location = response
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or(ScanwerkError::MissingLocation)?;
        let result_url = next_document_url(&self.base, location)?;
        info!(job = location, result = %result_url, "scan job created");
        Ok(result_url)
    }

    /// Poll a job's result URL once.
    pub async fn fetch_next_document(&self, result_url: &Url) -> Result<NextDocument> {
        let response = self.transport.get(result_url).await?;
        if response.status == 200 {
            Ok(NextDocument::Ready(response.body))
        } else {
            Ok(NextDocument::Pending(response.status))
        }
    }
}

/// Parse and check a scanner base URL. Only `http` and `https` are accepted.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let lower = raw.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(ScanwerkError::InvalidUrl(raw.to_string()));
    }
    Url::parse(raw).map_err(|e| ScanwerkError::InvalidUrl(format!("{raw}: {e}")))
}

/// Build the result URL for a job from its `Location` header.
///
/// `location` may be absolute or relative to the scanner. The job URL is
/// treated as a directory so `NextDocument` is appended to it rather than
/// replacing its last segment.
pub fn next_document_url(base: &Url, location: &str) -> Result<Url> {
    let mut job = base
        .join(location)
        .map_err(|e| ScanwerkError::InvalidUrl(format!("job location '{location}': {e}")))?;
    if !job.path().ends_with('/') {
        let path = format!("{}/", job.path());
        job.set_path(&path);
    }
    job.join(NEXT_DOCUMENT)
        .map_err(|e| ScanwerkError::InvalidUrl(format!("job location '{location}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::tests::HP_CAPABILITIES;
    use crate::status::tests::status_document;
    use crate::testing::{FakeScanner, Request, base_url};
    use scanwerk_core::types::{ColorMode, DocumentFormat};

    fn request() -> ScanRequest {
        ScanRequest {
            version: "2.63".into(),
            format: DocumentFormat::Jpeg,
            color_mode: ColorMode::Rgb24,
            resolution: 300,
            width: 2550,
            height: 3508,
        }
    }

    #[test]
    fn base_url_scheme_checked() {
        assert!(parse_base_url("http://192.168.1.20:8080").is_ok());
        assert!(parse_base_url("HTTPS://scanner.local/").is_ok());
        assert!(matches!(
            parse_base_url("ftp://scanner.local/"),
            Err(ScanwerkError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_base_url("scanner.local"),
            Err(ScanwerkError::InvalidUrl(_))
        ));
    }

    #[test]
    fn relative_location_joins_onto_base() {
        let base = Url::parse("http://scanner.local:8080").unwrap();
        let url = next_document_url(&base, "/jobs/17").unwrap();
        assert_eq!(url.as_str(), "http://scanner.local:8080/jobs/17/NextDocument");
    }

    #[test]
    fn trailing_slash_location_has_no_double_slash() {
        let base = Url::parse("http://scanner.local:8080/").unwrap();
        let url = next_document_url(&base, "/eSCL/ScanJobs/abc/").unwrap();
        assert_eq!(
            url.as_str(),
            "http://scanner.local:8080/eSCL/ScanJobs/abc/NextDocument"
        );
    }

    #[test]
    fn absolute_location_wins_over_base() {
        let base = Url::parse("http://scanner.local:8080/").unwrap();
        let url = next_document_url(&base, "https://10.0.0.5/eSCL/ScanJobs/42").unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.5/eSCL/ScanJobs/42/NextDocument");
    }

    #[tokio::test]
    async fn endpoints_resolve_against_base() {
        let scanner = FakeScanner::new(HP_CAPABILITIES, &status_document("Idle"));
        let client = EsclClient::with_transport(base_url(), scanner);

        client.capabilities(&ScanConfig::default()).await.unwrap();
        client.status().await.unwrap();

        assert_eq!(
            client.transport.requests(),
            vec![
                Request::Get("http://scanner.test:8080/eSCL/ScannerCapabilities".into()),
                Request::Get("http://scanner.test:8080/eSCL/ScannerStatus".into()),
            ]
        );
    }

    #[tokio::test]
    async fn capability_http_error_is_fatal() {
        let scanner = FakeScanner::new(HP_CAPABILITIES, &status_document("Idle"))
            .with_capabilities_status(404);
        let client = EsclClient::with_transport(base_url(), scanner);
        let err = client.capabilities(&ScanConfig::default()).await.unwrap_err();
        assert!(matches!(err, ScanwerkError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn submit_posts_settings_and_builds_result_url() {
        let scanner = FakeScanner::new(HP_CAPABILITIES, &status_document("Idle"))
            .with_submit(201, Some("/jobs/17"));
        let client = EsclClient::with_transport(base_url(), scanner);

        let url = client.submit(&request()).await.unwrap();
        assert_eq!(url.as_str(), "http://scanner.test:8080/jobs/17/NextDocument");

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 1);
        match &requests[0] {
            Request::Post(url, body) => {
                assert_eq!(url, "http://scanner.test:8080/eSCL/ScanJobs");
                assert!(body.contains("<scan:XResolution>300</scan:XResolution>"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_without_location_is_protocol_error() {
        let scanner =
            FakeScanner::new(HP_CAPABILITIES, &status_document("Idle")).with_submit(201, None);
        let client = EsclClient::with_transport(base_url(), scanner);
        assert!(matches!(
            client.submit(&request()).await,
            Err(ScanwerkError::MissingLocation)
        ));
    }

    #[tokio::test]
    async fn submit_rejected_by_scanner() {
        let scanner = FakeScanner::new(HP_CAPABILITIES, &status_document("Idle"))
            .with_submit(409, Some("/jobs/1"));
        let client = EsclClient::with_transport(base_url(), scanner);
        assert!(matches!(
            client.submit(&request()).await,
            Err(ScanwerkError::HttpStatus { status: 409, .. })
        ));
    }
}
