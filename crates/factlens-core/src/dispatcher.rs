//! Submission dispatching for the Analyze flow.
//!
//! [`select_request`] decides which backend operation a submission maps to.
//! [`AnalyzeSession`] owns the page state around it: the current input,
//! the busy flag, the last result, and the inline error.
//!
//! A submission is split into [`AnalyzeSession::begin`] and
//! [`AnalyzeSession::finish`] so that a caller holding the session behind a
//! lock can release it while the network call is pending.
//! [`AnalyzeSession::submit`] does all three steps for single-owner callers.

use tracing::{debug, info, warn};

use crate::analysis::{AnalysisRequest, AnalysisResult, ImageUpload};
use crate::client::AnalysisBackend;
use crate::error::{FactlensError, Result};
use crate::notify::Notifier;

/// Chooses the analysis operation for the given input.
///
/// In priority order: an attached image always wins; otherwise text whose
/// trimmed, lower-cased form starts with `"http"` is sent as a URL; anything
/// else is sent as trimmed text. This is a prefix check, not URL validation,
/// so `"HTTP is a protocol"` is also treated as a URL.
///
/// # Errors
///
/// Returns `FactlensError::EmptyInput` when the text is blank and no image
/// is attached.
///
/// # Examples
///
/// ```
/// use factlens_core::{select_request, AnalysisRequest};
///
/// let req = select_request("  https://example.com/x ", None).unwrap();
/// assert_eq!(req, AnalysisRequest::Url { url: "https://example.com/x".into() });
///
/// let req = select_request("The moon is made of cheese", None).unwrap();
/// assert!(matches!(req, AnalysisRequest::Text { .. }));
///
/// assert!(select_request("   ", None).is_err());
/// ```
pub fn select_request(text: &str, image: Option<&ImageUpload>) -> Result<AnalysisRequest> {
    let trimmed = text.trim();

    if let Some(image) = image {
        return Ok(AnalysisRequest::Image(image.clone()));
    }

    if trimmed.is_empty() {
        return Err(FactlensError::EmptyInput);
    }

    if trimmed.to_lowercase().starts_with("http") {
        Ok(AnalysisRequest::Url {
            url: trimmed.to_string(),
        })
    } else {
        Ok(AnalysisRequest::Text {
            text: trimmed.to_string(),
        })
    }
}

/// State of the Analyze page for one mounted session.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeSession {
    input_text: String,
    image: Option<ImageUpload>,
    busy: bool,
    result: Option<AnalysisResult>,
    error: Option<String>,
}

impl AnalyzeSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the free-text input.
    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    /// Returns the free-text input as typed.
    #[must_use]
    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    /// Attaches an image, replacing any previous one.
    pub fn attach_image(&mut self, image: ImageUpload) {
        debug!(filename = %image.filename, size = image.bytes.len(), "Image attached");
        self.image = Some(image);
    }

    /// Removes the attached image, if any.
    pub fn clear_image(&mut self) -> Option<ImageUpload> {
        self.image.take()
    }

    /// Returns the attached image.
    #[must_use]
    pub const fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    /// Returns `true` while a submission is pending.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Returns the last successful result.
    #[must_use]
    pub const fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Returns the inline error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` when the analyze trigger should be disabled.
    #[must_use]
    pub fn is_submit_disabled(&self) -> bool {
        self.busy || (self.input_text.trim().is_empty() && self.image.is_none())
    }

    /// Validates the input and marks the session busy.
    ///
    /// On success the inline error and the previous result are cleared and
    /// the selected request is returned for the caller to send.
    ///
    /// # Errors
    ///
    /// - `FactlensError::AnalysisInFlight` if a submission is pending. The
    ///   session is left untouched.
    /// - `FactlensError::EmptyInput` if there is nothing to analyze. The
    ///   message is stored inline and the previous result is kept.
    pub fn begin(&mut self) -> Result<AnalysisRequest> {
        if self.busy {
            return Err(FactlensError::AnalysisInFlight);
        }

        let request = match select_request(&self.input_text, self.image.as_ref()) {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        self.busy = true;
        self.error = None;
        self.result = None;

        info!(
            has_image = self.image.is_some(),
            raw_input = %self.input_text,
            kind = request.kind(),
            "Starting analysis"
        );

        Ok(request)
    }

    /// Records the outcome of the backend call and clears the busy flag.
    ///
    /// A failure is normalized, stored inline, and passed to `notifier`.
    /// The busy flag is cleared on every path.
    pub fn finish(
        &mut self,
        outcome: Result<AnalysisResult>,
        notifier: &dyn Notifier,
    ) -> Result<&AnalysisResult> {
        self.busy = false;

        match outcome {
            Ok(result) => {
                info!(
                    credibility_score = result.credibility_score,
                    risk_level = ?result.risk_level,
                    "Analysis response received"
                );
                debug!(response = ?result, "Raw analysis response");
                self.error = None;
                Ok(&*self.result.insert(result))
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, shown = %message, "Analysis failed");
                notifier.show_error(&message);
                self.error = Some(message);
                Err(e)
            }
        }
    }

    /// Runs a full submission against `backend`.
    ///
    /// Exactly one backend operation is awaited, or none when validation
    /// fails.
    pub async fn submit(
        &mut self,
        backend: &dyn AnalysisBackend,
        notifier: &dyn Notifier,
    ) -> Result<&AnalysisResult> {
        let request = self.begin()?;
        let outcome = backend.dispatch(&request).await;
        self.finish(outcome, notifier)
    }
}
