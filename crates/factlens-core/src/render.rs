//! Result rendering.
//!
//! Turns an [`AnalysisResult`] into what the result panel shows: a verdict
//! with its badge variant, a list of summary lines, and at most
//! [`MAX_EVIDENCE_ITEMS`] evidence items. Everything here is a pure function
//! of the result and is recomputed on every call.

use std::fmt;

use serde::Serialize;

use crate::analysis::{AnalysisResult, MAX_SCORE};

/// Most evidence items shown for one result.
pub const MAX_EVIDENCE_ITEMS: usize = 5;

// ============================================================================
// Verdict
// ============================================================================

/// Verdict derived from a credibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// Score 80 and above.
    #[serde(rename = "True")]
    True,
    /// Score 60 to 79.
    #[serde(rename = "Mostly True")]
    MostlyTrue,
    /// Score 40 to 59.
    #[serde(rename = "Mostly Fake")]
    MostlyFake,
    /// Score below 40.
    #[serde(rename = "Fake")]
    Fake,
}

impl Verdict {
    /// Derives the verdict from a score. Lower bounds are inclusive.
    ///
    /// # Examples
    ///
    /// ```
    /// use factlens_core::Verdict;
    ///
    /// assert_eq!(Verdict::from_score(80), Verdict::True);
    /// assert_eq!(Verdict::from_score(79), Verdict::MostlyTrue);
    /// assert_eq!(Verdict::from_score(40), Verdict::MostlyFake);
    /// assert_eq!(Verdict::from_score(0), Verdict::Fake);
    /// ```
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::True,
            60..=79 => Self::MostlyTrue,
            40..=59 => Self::MostlyFake,
            _ => Self::Fake,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::True => "True",
            Self::MostlyTrue => "Mostly True",
            Self::MostlyFake => "Mostly Fake",
            Self::Fake => "Fake",
        }
    }

    /// Badge variant used when displaying this verdict.
    #[must_use]
    pub const fn variant(self) -> VerdictVariant {
        match self {
            Self::True => VerdictVariant::Success,
            Self::MostlyTrue => VerdictVariant::Secondary,
            Self::MostlyFake => VerdictVariant::Warning,
            Self::Fake => VerdictVariant::Danger,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Visual style of the verdict badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictVariant {
    /// Green.
    Success,
    /// Neutral.
    Secondary,
    /// Amber.
    Warning,
    /// Red.
    Danger,
}

impl VerdictVariant {
    /// Lowercase name of the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Secondary => "secondary",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for VerdictVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ResultView
// ============================================================================

/// Display model for one analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    /// Verdict for the score.
    pub verdict: Verdict,
    /// Badge variant for the verdict.
    pub variant: VerdictVariant,
    /// Credibility score in `[0, 100]`.
    pub score: u8,
    /// Summary lines, in display order.
    pub summary_points: Vec<String>,
    /// Up to [`MAX_EVIDENCE_ITEMS`] evidence items.
    pub evidence: Vec<String>,
}

impl ResultView {
    /// Builds the view for a result.
    ///
    /// Summary lines are the verdict, the score, then the risk level and the
    /// flag reason when present. Evidence beyond the first
    /// [`MAX_EVIDENCE_ITEMS`] is dropped.
    #[must_use]
    pub fn from_result(result: &AnalysisResult) -> Self {
        let verdict = Verdict::from_score(result.credibility_score);
        let explanation = result.explanation.as_ref();

        let mut summary_points = vec![
            format!("Verdict: {verdict}"),
            format!(
                "Credibility score: {}/{MAX_SCORE}",
                result.credibility_score
            ),
        ];
        if let Some(risk) = &result.risk_level {
            summary_points.push(format!("Risk level: {risk}"));
        }
        if let Some(why) = explanation.and_then(|e| e.why_flagged.as_ref()) {
            summary_points.push(format!("Why: {why}"));
        }

        let evidence = explanation
            .map(|e| {
                e.supporting_evidence
                    .iter()
                    .take(MAX_EVIDENCE_ITEMS)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            verdict,
            variant: verdict.variant(),
            score: result.credibility_score,
            summary_points,
            evidence,
        }
    }

    /// Returns `true` when there is evidence to list.
    #[must_use]
    pub fn has_evidence(&self) -> bool {
        !self.evidence.is_empty()
    }
}

impl From<&AnalysisResult> for ResultView {
    fn from(result: &AnalysisResult) -> Self {
        Self::from_result(result)
    }
}
