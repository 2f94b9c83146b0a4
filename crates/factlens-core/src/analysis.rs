//! Analysis request and result types.
//!
//! [`RawAnalysisResponse`] mirrors what the analysis service sends, with
//! every field optional. [`RawAnalysisResponse::into_result`] applies the
//! defaults exactly once, producing the [`AnalysisResult`] the rest of the
//! crate works with.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FactlensError, Result};

/// Highest possible credibility score.
pub const MAX_SCORE: u8 = 100;

// ============================================================================
// Requests
// ============================================================================

/// An image attached for analysis.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name, forwarded to the service.
    pub filename: String,
    /// MIME type, always `image/*`.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Creates an upload from bytes and an explicit MIME type.
    ///
    /// # Errors
    ///
    /// Returns `FactlensError::UnsupportedImage` if the content type is not
    /// an `image/*` type.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let filename = filename.into();
        let content_type = content_type.into().trim().to_lowercase();
        if !content_type.starts_with("image/") {
            return Err(FactlensError::unsupported_image(filename));
        }
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    /// Reads an image from disk, inferring its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns `FactlensError::UnsupportedImage` for non-image extensions and
    /// `FactlensError::Io` if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(image_mime_for_extension)
            .ok_or_else(|| FactlensError::unsupported_image(&filename))?;
        let bytes = std::fs::read(path)?;
        Self::new(filename, content_type, bytes)
    }
}

/// Maps a file extension to an image MIME type.
#[must_use]
pub fn image_mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// A single call to the analysis service. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    /// Free text claim, already trimmed.
    Text {
        /// The claim.
        text: String,
    },
    /// An uploaded image.
    Image(ImageUpload),
    /// A link, already trimmed.
    Url {
        /// The link as typed.
        url: String,
    },
}

impl AnalysisRequest {
    /// Short name of the operation this request maps to.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image(_) => "image",
            Self::Url { .. } => "url",
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Structured explanation attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    /// Why the content was flagged, if the service said.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_flagged: Option<String>,
    /// Evidence items in the order the service returned them.
    #[serde(default)]
    pub supporting_evidence: Vec<String>,
}

/// Normalized result of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Credibility score in `[0, 100]`.
    pub credibility_score: u8,
    /// Risk level label, if provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    /// Explanation payload, if provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

/// Explanation as received, with nullable evidence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExplanation {
    /// Why the content was flagged.
    #[serde(default)]
    pub why_flagged: Option<String>,
    /// Evidence items; `null` and absent both mean none.
    #[serde(default)]
    pub supporting_evidence: Option<Vec<String>>,
}

/// Analysis response as received from the service.
///
/// Unknown fields are ignored. The score is kept as a float because the
/// service is free to send `73.5`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysisResponse {
    /// Credibility score, possibly missing or out of range.
    #[serde(default)]
    pub credibility_score: Option<f64>,
    /// Risk level label.
    #[serde(default)]
    pub risk_level: Option<String>,
    /// Explanation payload.
    #[serde(default)]
    pub explanation: Option<RawExplanation>,
}

impl RawAnalysisResponse {
    /// Applies field defaults and produces a normalized result.
    ///
    /// A missing score and an explicit 0 are treated the same. Scores are
    /// rounded and clamped into `[0, 100]`. Empty strings count as absent.
    #[must_use]
    pub fn into_result(self) -> AnalysisResult {
        let credibility_score = self.credibility_score.map_or(0, clamp_score);
        let risk_level = self.risk_level.filter(|r| !r.trim().is_empty());
        let explanation = self.explanation.map(|e| Explanation {
            why_flagged: e.why_flagged.filter(|w| !w.trim().is_empty()),
            supporting_evidence: e.supporting_evidence.unwrap_or_default(),
        });

        AnalysisResult {
            credibility_score,
            risk_level,
            explanation,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// Top-level keys that mark a body as a bare result.
const RESULT_FIELDS: [&str; 3] = ["credibilityScore", "riskLevel", "explanation"];

/// Unwraps a `{ "data": { … } }` envelope.
///
/// A body is only treated as an envelope when it carries none of the
/// result fields itself, so an unrelated `data` key next to a real score
/// is ignored like any other unknown field.
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut object)
            if !RESULT_FIELDS.iter().any(|field| object.contains_key(*field))
                && object.get("data").is_some_and(Value::is_object) =>
        {
            object.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

/// Parses a response body into a normalized result.
///
/// Both a bare result object and a `{ "data": … }` envelope are accepted.
///
/// # Errors
///
/// Returns `FactlensError::Json` if the body is not a JSON object.
pub fn parse_response_body(body: &[u8]) -> Result<AnalysisResult> {
    let body: Value = serde_json::from_slice(body)?;
    let raw: RawAnalysisResponse = serde_json::from_value(unwrap_envelope(body))?;
    Ok(raw.into_result())
}
