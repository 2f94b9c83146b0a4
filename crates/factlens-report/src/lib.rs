//! FactLens Report Generation
//!
//! Builds shareable reports from an analysis result and/or a finished game.
//! Reports serialize to JSON for programmatic use and render to Markdown for
//! people.
//!
//! # Types
//!
//! - [`Report`] - One report, with an optional analysis and game section
//! - [`AnalysisReport`] - What was submitted and what came back
//! - [`ReportBuilder`] - Builder for [`Report`]
//!
//! # Generators
//!
//! - [`json::JsonGenerator`] - Compact or pretty JSON
//! - [`MarkdownGenerator`] - Human-readable Markdown
//!
//! # Example
//!
//! ```rust
//! use factlens_core::{AnalysisRequest, AnalysisResult};
//! use factlens_report::{AnalysisReport, MarkdownGenerator, Report};
//!
//! let request = AnalysisRequest::Text { text: "The moon is hollow".into() };
//! let result = AnalysisResult { credibility_score: 8, ..Default::default() };
//!
//! let report = Report::builder()
//!     .analysis(AnalysisReport::new(&request, result))
//!     .build();
//!
//! let markdown = MarkdownGenerator::new(&report).generate();
//! assert!(markdown.contains("| Verdict | Fake |"));
//! ```

pub mod json;
mod markdown;

pub use markdown::MarkdownGenerator;

use chrono::{DateTime, Utc};
use factlens_core::{AnalysisRequest, AnalysisResult, GameSummary, ResultView};
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write report files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The report has nothing to show.
    #[error("invalid report data: {0}")]
    InvalidData(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// AnalysisReport
// ============================================================================

/// The analysis section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Operation used: `text`, `image`, or `url`.
    pub kind: String,
    /// The claim, link, or image file name that was submitted.
    pub subject: String,
    /// Normalized result from the service.
    pub result: AnalysisResult,
    /// Rendered view of the result.
    pub view: ResultView,
}

impl AnalysisReport {
    /// Creates the section for a completed request.
    #[must_use]
    pub fn new(request: &AnalysisRequest, result: AnalysisResult) -> Self {
        let subject = match request {
            AnalysisRequest::Text { text } => text.clone(),
            AnalysisRequest::Url { url } => url.clone(),
            AnalysisRequest::Image(image) => image.filename.clone(),
        };
        Self {
            kind: request.kind().to_string(),
            subject,
            view: ResultView::from_result(&result),
            result,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// A FactLens report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,

    /// Analysis section, if an analysis was run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport>,

    /// Game section, if a game was played.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameSummary>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            generated_at: Utc::now(),
            analysis: None,
            game: None,
        }
    }
}

impl Report {
    /// Creates a new report builder.
    #[must_use]
    pub fn builder() -> ReportBuilder {
        ReportBuilder::default()
    }

    /// Returns `true` if neither section is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.analysis.is_none() && self.game.is_none()
    }

    /// Share of correct answers in the game section, rounded to a whole
    /// percent. `None` without a game or before the first answer.
    #[must_use]
    pub fn accuracy_percent(&self) -> Option<u32> {
        let game = self.game.as_ref()?;
        if game.answered == 0 {
            return None;
        }
        Some((game.correct * 100 + game.answered / 2) / game.answered)
    }
}

// ============================================================================
// ReportBuilder
// ============================================================================

/// Builder for constructing [`Report`] instances.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    generated_at: Option<DateTime<Utc>>,
    analysis: Option<AnalysisReport>,
    game: Option<GameSummary>,
}

impl ReportBuilder {
    /// Sets the generation time. Defaults to now.
    #[must_use]
    pub const fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Sets the analysis section.
    #[must_use]
    pub fn analysis(mut self, analysis: AnalysisReport) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Sets the game section.
    #[must_use]
    pub fn game(mut self, game: GameSummary) -> Self {
        self.game = Some(game);
        self
    }

    /// Builds the report.
    #[must_use]
    pub fn build(self) -> Report {
        Report {
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
            analysis: self.analysis,
            game: self.game,
        }
    }

    /// Builds the report, rejecting one with no sections.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidData` if no section was set.
    pub fn try_build(self) -> Result<Report> {
        let report = self.build();
        if report.is_empty() {
            return Err(ReportError::InvalidData(
                "a report needs an analysis or a game section".to_string(),
            ));
        }
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================
