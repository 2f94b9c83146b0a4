//! Markdown report generation.
//!
//! [`MarkdownGenerator`] renders a [`Report`] as a Markdown document with:
//!
//! - An analysis table, the summary lines, and numbered evidence
//! - A game table with accuracy and league
//! - A footer with the generation timestamp

use std::fmt::Write;

use chrono::{DateTime, Utc};
use factlens_core::GameSummary;

use crate::{AnalysisReport, Report};

/// Generates Markdown reports.
pub struct MarkdownGenerator<'a> {
    report: &'a Report,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a new Markdown generator for the given report.
    #[must_use]
    pub const fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Generates the complete Markdown report.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "# FactLens Report\n");
        if let Some(analysis) = &self.report.analysis {
            Self::write_analysis(&mut output, analysis);
        }
        if let Some(game) = &self.report.game {
            self.write_game(&mut output, game);
        }
        if self.report.is_empty() {
            let _ = writeln!(output, "*Nothing to report.*\n");
        }
        self.write_footer(&mut output);

        output
    }

    /// Writes the analysis section.
    fn write_analysis(output: &mut String, analysis: &AnalysisReport) {
        let view = &analysis.view;

        let _ = writeln!(output, "## Analysis\n");
        let _ = writeln!(output, "| Field | Value |");
        let _ = writeln!(output, "|-------|-------|");
        let _ = writeln!(output, "| Input | {} |", input_label(&analysis.kind));
        let _ = writeln!(
            output,
            "| Submitted | {} |",
            escape_markdown(&analysis.subject)
        );
        let _ = writeln!(output, "| Verdict | {} |", view.verdict);
        let _ = writeln!(output, "| Credibility Score | {}/100 |", view.score);
        if let Some(risk) = &analysis.result.risk_level {
            let _ = writeln!(output, "| Risk Level | {} |", escape_markdown(risk));
        }
        let _ = writeln!(output);

        let _ = writeln!(output, "### Summary\n");
        for point in &view.summary_points {
            let _ = writeln!(output, "- {}", escape_markdown(point));
        }
        let _ = writeln!(output);

        let _ = writeln!(output, "### Supporting Evidence\n");
        if view.evidence.is_empty() {
            let _ = writeln!(output, "*No supporting evidence provided.*\n");
            return;
        }
        for (i, item) in view.evidence.iter().enumerate() {
            let _ = writeln!(output, "{}. {}", i + 1, escape_markdown(item));
        }
        let _ = writeln!(output);
    }

    /// Writes the game section.
    fn write_game(&self, output: &mut String, game: &GameSummary) {
        let _ = writeln!(output, "## Fact or Fake\n");
        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(output, "| Answered | {} |", game.answered);
        match self.report.accuracy_percent() {
            Some(pct) => {
                let _ = writeln!(output, "| Correct | {} ({pct}%) |", game.correct);
            }
            None => {
                let _ = writeln!(output, "| Correct | {} |", game.correct);
            }
        }
        let _ = writeln!(output, "| XP | {} |", game.xp);
        let _ = writeln!(output, "| Best Streak | {} |", game.best_streak);
        let _ = writeln!(output, "| League | {} |", game.league);
        let _ = writeln!(output);
    }

    /// Writes the footer with the generation timestamp.
    fn write_footer(&self, output: &mut String) {
        let _ = writeln!(output, "---\n");
        let _ = writeln!(
            output,
            "*Generated by FactLens on {}*",
            format_timestamp(&self.report.generated_at)
        );
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn input_label(kind: &str) -> &str {
    match kind {
        "text" => "Text",
        "image" => "Image",
        "url" => "URL",
        other => other,
    }
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Escapes special Markdown characters in text.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '!' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            '\n' => result.push_str("<br>"),
            _ => result.push(ch),
        }
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
