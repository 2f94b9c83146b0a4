//! JSON report generation.
//!
//! [`JsonGenerator`] serializes a [`Report`] as compact or pretty-printed
//! JSON, with camelCase keys matching the session server's API.
//!
//! # Example
//!
//! ```rust
//! use factlens_core::{AnalysisRequest, AnalysisResult};
//! use factlens_report::{json::JsonGenerator, AnalysisReport, Report};
//!
//! let request = AnalysisRequest::Url { url: "https://example.com/story".into() };
//! let result = AnalysisResult { credibility_score: 91, ..Default::default() };
//! let report = Report::builder()
//!     .analysis(AnalysisReport::new(&request, result))
//!     .build();
//!
//! let json = JsonGenerator::new(&report).generate().unwrap();
//! assert!(json.contains(r#""credibilityScore":91"#));
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{Report, ReportError, Result};

/// JSON report generator.
pub struct JsonGenerator<'a> {
    report: &'a Report,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given report.
    #[must_use]
    pub const fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Generates compact JSON output (single line).
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(self.report).map_err(ReportError::from)
    }

    /// Generates pretty-printed JSON output with indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self.report).map_err(ReportError::from)
    }

    /// Writes the JSON report to a file, creating or overwriting it.
    ///
    /// Parent directories must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    /// Returns [`ReportError::Io`] if file creation or writing fails.
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.generate_pretty()?
        } else {
            self.generate()?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
