//! Error types for FactLens.
//!
//! This module defines the error hierarchy for the Analyze pipeline, the
//! Fact-or-Fake game, and configuration loading.

use std::path::PathBuf;

/// A specialized `Result` type for FactLens operations.
pub type Result<T> = std::result::Result<T, FactlensError>;

/// Message shown when the user submits without text or an image.
pub const EMPTY_INPUT_MESSAGE: &str = "Please paste a claim or upload an image.";

/// Message shown in place of any network-level failure.
pub const UNREACHABLE_MESSAGE: &str = "Could not reach the analysis service. Please check that the backend is running and your network connection is stable.";

/// Fallback when a failure carries no message at all.
pub const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed. Please try again.";

/// Errors that can occur in FactLens.
///
/// Variants fall into three groups: validation errors detected locally
/// before any network call, transport/backend errors from the analysis
/// service, and configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum FactlensError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Neither text nor an image was provided.
    #[error("{}", EMPTY_INPUT_MESSAGE)]
    EmptyInput,

    /// The attached file is not an image.
    #[error("Unsupported file '{filename}': only image files can be analyzed\n\nSuggestion: Attach a PNG, JPEG, GIF, or WebP image")]
    UnsupportedImage {
        /// Name of the rejected file.
        filename: String,
    },

    /// A submission was attempted while another one is still pending.
    #[error("An analysis is already in progress")]
    AnalysisInFlight,

    /// An operation was attempted in a state that does not allow it.
    #[error("Invalid state transition: cannot {action} while {from}")]
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The rejected operation.
        action: String,
    },

    // ========================================================================
    // Transport / Backend Errors
    // ========================================================================
    /// The request never produced an HTTP response (connection refused,
    /// DNS failure, timeout).
    #[error("{message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The analysis service answered with a non-success status.
    #[error("{message}")]
    Backend {
        /// HTTP status code returned by the service.
        status: u16,
        /// Message extracted from the response body, or a generic one.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your factlens.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// The question bank file could not be loaded.
    #[error("Invalid question bank '{path}': {message}\n\nSuggestion: Provide a non-empty JSON array of {{\"text\", \"answer\"}} objects")]
    QuestionBankError {
        /// Path to the question file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FactlensError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `QuestionBankError`.
    #[must_use]
    pub fn question_bank(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::QuestionBankError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedImage` error.
    #[must_use]
    pub fn unsupported_image(filename: impl Into<String>) -> Self {
        Self::UnsupportedImage {
            filename: filename.into(),
        }
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `InvalidStateTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, action: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            action: action.into(),
        }
    }

    /// Returns `true` for errors detected locally before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::UnsupportedImage { .. } | Self::InvalidStateTransition { .. }
        )
    }

    /// Returns `true` for failures of a backend call.
    ///
    /// These are shown inline and through the notification channel, and
    /// can be recovered from by submitting again.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Backend { .. })
    }

    /// Returns the message to show the user, after network-error rewriting.
    #[must_use]
    pub fn user_message(&self) -> String {
        normalize_error_message(&self.to_string())
    }
}

/// Rewrites a raw failure message into the one shown to the user.
///
/// Any message mentioning "network error" (in any case) becomes
/// [`UNREACHABLE_MESSAGE`]. Everything else passes through unchanged,
/// except an empty message which becomes [`GENERIC_FAILURE_MESSAGE`].
///
/// # Examples
///
/// ```
/// use factlens_core::error::{normalize_error_message, UNREACHABLE_MESSAGE};
///
/// assert_eq!(normalize_error_message("Network Error"), UNREACHABLE_MESSAGE);
/// assert_eq!(normalize_error_message("Quota exceeded"), "Quota exceeded");
/// ```
#[must_use]
pub fn normalize_error_message(message: &str) -> String {
    if message.trim().is_empty() {
        return GENERIC_FAILURE_MESSAGE.to_string();
    }
    if message.to_lowercase().contains("network error") {
        return UNREACHABLE_MESSAGE.to_string();
    }
    message.to_string()
}
