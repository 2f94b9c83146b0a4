//! Analysis service client.
//!
//! [`AnalysisBackend`] is the seam between the Analyze session and the
//! network. [`HttpAnalysisClient`] implements it over HTTP with `reqwest`;
//! tests substitute their own implementations.
//!
//! # Endpoints
//!
//! - `POST {base}/analyze/text` - JSON `{ "text": … }`
//! - `POST {base}/analyze/image` - multipart, file field `image`
//! - `POST {base}/analyze/url` - JSON `{ "url": … }`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::analysis::{parse_response_body, AnalysisRequest, AnalysisResult, ImageUpload};
use crate::config::Config;
use crate::error::{FactlensError, Result};

/// The three operations offered by the analysis service.
///
/// Each call is a single request with no retry.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Analyzes a trimmed free-text claim.
    async fn analyze_text(&self, text: &str) -> Result<AnalysisResult>;

    /// Analyzes an uploaded image.
    async fn analyze_image(&self, image: &ImageUpload) -> Result<AnalysisResult>;

    /// Analyzes the content behind a URL.
    async fn analyze_url(&self, url: &str) -> Result<AnalysisResult>;

    /// Invokes exactly one operation, chosen by the request variant.
    async fn dispatch(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        match request {
            AnalysisRequest::Text { text } => self.analyze_text(text).await,
            AnalysisRequest::Image(image) => self.analyze_image(image).await,
            AnalysisRequest::Url { url } => self.analyze_url(url).await,
        }
    }
}

/// HTTP client for the analysis service.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    http: Client,
    base_url: String,
    timeout: Option<Duration>,
}

/// Error body shapes the service is known to send.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpAnalysisClient {
    /// Creates a client for the given base URL (e.g. `http://localhost:5000/api`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Creates a client from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut client = Self::new(&config.api_base_url);
        client.timeout = config.request_timeout();
        client
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/analyze/{operation}", self.base_url)
    }

    /// Sends a prepared request and normalizes the response or failure.
    async fn send(&self, request: RequestBuilder) -> Result<AnalysisResult> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            let message = error_message_from_body(&body)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "Analysis service returned an error");
            return Err(FactlensError::backend(status.as_u16(), message));
        }

        debug!(bytes = body.len(), "Analysis response received");
        parse_response_body(&body)
    }

    /// Maps a reqwest failure to a transport error.
    ///
    /// Anything that never produced a response is reported as
    /// "Network Error", the same message browsers surface.
    fn transport_error(&self, err: &reqwest::Error) -> FactlensError {
        warn!(error = %err, "Analysis request failed");
        if err.is_timeout() {
            let ms = self.timeout.map_or(0, |t| t.as_millis());
            return FactlensError::transport(format!("timeout of {ms}ms exceeded"));
        }
        if err.is_decode() {
            return FactlensError::transport(format!("Invalid response body: {err}"));
        }
        FactlensError::transport("Network Error")
    }
}

/// Extracts `error` or `message` from a JSON error body.
fn error_message_from_body(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisClient {
    async fn analyze_text(&self, text: &str) -> Result<AnalysisResult> {
        let request = self
            .http
            .post(self.endpoint("text"))
            .json(&serde_json::json!({ "text": text }));
        self.send(request).await
    }

    async fn analyze_image(&self, image: &ImageUpload) -> Result<AnalysisResult> {
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.filename.clone())
            .mime_str(&image.content_type)
            .map_err(|_| FactlensError::unsupported_image(&image.filename))?;
        let form = multipart::Form::new().part("image", part);
        let request = self.http.post(self.endpoint("image")).multipart(form);
        self.send(request).await
    }

    async fn analyze_url(&self, url: &str) -> Result<AnalysisResult> {
        let request = self
            .http
            .post(self.endpoint("url"))
            .json(&serde_json::json!({ "url": url }));
        self.send(request).await
    }
}
