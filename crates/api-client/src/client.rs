//! HTTP client for the directory analysis endpoint.
//!
//! `analyze` normalizes the transport layer into the error taxonomy the
//! navigator consumes: a transport failure, an unparseable body, or a parsed
//! [`AnalysisReport`] (which itself may carry a server-reported error).

use std::time::Duration;

use tracing::debug;

use dirscope_core::AnalysisReport;

/// How much raw body text a malformed-response error carries. Enough for
/// operator diagnosis, small enough to display.
const BODY_EXCERPT_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No usable response at all.
    #[error("network error or server unreachable")]
    Transport(#[source] reqwest::Error),

    /// A response arrived but its body is not the expected JSON shape.
    /// Carries the status and a truncated body excerpt for diagnosis.
    #[error("server error {status}: response was not valid JSON. Body: {excerpt}")]
    Malformed { status: u16, excerpt: String },
}

/// A parsed response: the report plus the transport status it arrived with.
/// A server-reported error can arrive with a 2xx or non-2xx status; both
/// parse into the same shape.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub status: u16,
    pub report: AnalysisReport,
}

impl AnalyzeOutcome {
    pub fn transport_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Typed HTTP client for the analysis endpoint.
pub struct AnalyzeClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnalyzeClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path_param: &str) -> String {
        format!(
            "{}/analyze?path={}",
            self.base_url,
            urlencoding::encode(path_param)
        )
    }

    /// Request a listing for `path`.
    pub async fn analyze(&self, path: &str) -> Result<AnalyzeOutcome, FetchError> {
        let url = self.url(path);
        debug!("fetching {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Transport)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(FetchError::Transport)?;
        match serde_json::from_str::<AnalysisReport>(&body) {
            Ok(report) => Ok(AnalyzeOutcome { status, report }),
            Err(_) => Err(FetchError::Malformed {
                status,
                excerpt: excerpt(&body),
            }),
        }
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        return body.to_string();
    }
    let truncated: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    format!("{truncated}…")
}
