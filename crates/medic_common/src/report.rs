//! Probe findings and the aggregate diagnostic report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::EventSink;
use crate::issue::Issue;

/// Manual actions recommended whenever any issue was detected
pub const RECOMMENDED_ACTIONS: &[&str] = &[
    "Restart VS Code",
    "Check your network configuration",
    "Flush the DNS cache",
    "Reinstall the extension",
    "Restart the CodeGPT extension",
];

/// Findings of a single probe run: narrative lines plus structured issues.
///
/// Append-only during a run; merged across probes by concatenation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub lines: Vec<String>,
    pub issues: Vec<Issue>,
}

impl ProbeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a narrative line and emit it as a progress event
    pub fn record(&mut self, sink: &dyn EventSink, line: String) {
        sink.progress(&line);
        self.lines.push(line);
    }

    /// Append a narrative line representing a failure needing attention
    pub fn record_error(&mut self, sink: &dyn EventSink, line: String) {
        sink.error(&line);
        self.lines.push(line);
    }

    pub fn issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Concatenate another probe's findings, preserving order
    pub fn merge(&mut self, other: ProbeReport) {
        self.lines.extend(other.lines);
        self.issues.extend(other.issues);
    }

    pub fn narrative(&self) -> String {
        self.lines.join("\n")
    }
}

/// Aggregate result of a diagnostic run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub report_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub issues: Vec<Issue>,
    /// Manual follow-ups; empty when no issues were detected
    pub recommended_actions: Vec<String>,
}

impl DiagnosticReport {
    pub fn new(issues: Vec<Issue>, started_at: DateTime<Utc>) -> Self {
        let recommended_actions = if issues.is_empty() {
            Vec::new()
        } else {
            RECOMMENDED_ACTIONS.iter().map(|a| a.to_string()).collect()
        };

        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            started_at,
            completed_at: Utc::now(),
            issues,
            recommended_actions,
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Render the human-readable report section
    pub fn render(&self) -> String {
        let mut lines = vec!["CodeGPT Diagnostic Report".to_string()];

        if self.issues.is_empty() {
            lines.push("No problems detected.".to_string());
        } else {
            lines.push("Problems detected:".to_string());
            for issue in &self.issues {
                lines.push(format!("  - {}", issue.describe()));
            }
            lines.push(String::new());
            lines.push("Recommended actions:".to_string());
            for (i, action) in self.recommended_actions.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, action));
            }
        }

        lines.join("\n")
    }
}
