//! Diagnostic reporter: ordering, pass/fail and rendering.
//!
//! Everything here is pure. Renderers return strings; printing is left to
//! the host.

use serde::Serialize;
use std::fmt::Write;

use crate::engine::EngineWarning;
use crate::types::{Diagnostic, Severity};

/// Final result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Whether no diagnostic has Error severity.
    pub passed: bool,
    /// All diagnostics, sorted by (file, line, column, rule).
    pub diagnostics: Vec<Diagnostic>,
    /// Rules that could not evaluate.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub engine_warnings: Vec<EngineWarning>,
    /// Number of files discovered.
    pub files_checked: usize,
    /// Number of rules evaluated.
    pub rules_run: usize,
}

impl AnalysisReport {
    /// Builds a report from the unordered union of all diagnostics.
    #[must_use]
    pub fn new(
        mut diagnostics: Vec<Diagnostic>,
        engine_warnings: Vec<EngineWarning>,
        files_checked: usize,
        rules_run: usize,
    ) -> Self {
        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let passed = !diagnostics.iter().any(|d| d.severity == Severity::Error);
        Self {
            passed,
            diagnostics,
            engine_warnings,
            files_checked,
            rules_run,
        }
    }

    /// Process exit code: 0 when passed, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.passed)
    }

    /// Counts diagnostics as `(errors, warnings)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let errors = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        (errors, self.diagnostics.len() - errors)
    }

    /// Diagnostics produced by one rule.
    #[must_use]
    pub fn by_rule(&self, rule: &str) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.rule == rule).collect()
    }

    /// One-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let (errors, warnings) = self.count_by_severity();
        format!(
            "Found {} error(s), {} warning(s) in {} file(s) with {} rule(s): {}",
            errors,
            warnings,
            self.files_checked,
            self.rules_run,
            if self.passed { "passed" } else { "failed" }
        )
    }

    /// Human-readable listing.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            let _ = writeln!(out, "{}", diagnostic.format());
        }
        for warning in &self.engine_warnings {
            let _ = writeln!(out, "engine warning: {warning}");
        }
        if !self.engine_warnings.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.summary());
        out.push('\n');
        out
    }

    /// One line per diagnostic: `file:line:col: severity [code] message`.
    #[must_use]
    pub fn render_compact(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            let _ = writeln!(out, "{diagnostic}");
        }
        out
    }

    /// Structured document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    fn diag(file: &str, line: usize, rule: &str, severity: Severity) -> Diagnostic {
        Diagnostic::new(
            "ARC000",
            rule,
            severity,
            Location::new(file, line, 1),
            format!("{rule} finding"),
        )
    }

    #[test]
    fn sorts_by_file_line_column_rule() {
        let report = AnalysisReport::new(
            vec![
                diag("b.go", 1, "x", Severity::Warning),
                diag("a.go", 9, "x", Severity::Warning),
                diag("a.go", 2, "z", Severity::Warning),
                diag("a.go", 2, "y", Severity::Warning),
            ],
            Vec::new(),
            2,
            1,
        );
        let order: Vec<_> = report
            .diagnostics
            .iter()
            .map(|d| format!("{}:{}", d.location, d.rule))
            .collect();
        assert_eq!(order, vec!["a.go:2:1:y", "a.go:2:1:z", "a.go:9:1:x", "b.go:1:1:x"]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = vec![
            diag("a.go", 1, "x", Severity::Error),
            diag("b.go", 1, "y", Severity::Warning),
        ];
        let mut b = a.clone();
        b.reverse();
        let ra = AnalysisReport::new(a, Vec::new(), 2, 2).render_json().expect("json");
        let rb = AnalysisReport::new(b, Vec::new(), 2, 2).render_json().expect("json");
        assert_eq!(ra, rb);
    }

    #[test]
    fn warnings_do_not_fail() {
        let report = AnalysisReport::new(
            vec![diag("a.go", 1, "x", Severity::Warning)],
            Vec::new(),
            1,
            1,
        );
        assert!(report.passed);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn errors_fail() {
        let report = AnalysisReport::new(
            vec![
                diag("a.go", 1, "x", Severity::Warning),
                diag("a.go", 2, "x", Severity::Error),
            ],
            Vec::new(),
            1,
            1,
        );
        assert!(!report.passed);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.count_by_severity(), (1, 1));
    }

    #[test]
    fn empty_report_passes() {
        let report = AnalysisReport::new(Vec::new(), Vec::new(), 0, 0);
        assert!(report.passed);
        assert_eq!(report.render_compact(), "");
    }

    #[test]
    fn text_lists_position_message_and_help() {
        let report = AnalysisReport::new(
            vec![diag("cmd/a/main.go", 3, "single-entry-point", Severity::Error)
                .with_remediation("keep one main")],
            vec![EngineWarning {
                rule: "layer-direction".into(),
                message: "missing configuration: layer_order is empty".into(),
            }],
            1,
            3,
        );
        let text = report.render_text();
        assert!(text.contains("ARC000 single-entry-point at cmd/a/main.go:3:1"));
        assert!(text.contains("error: single-entry-point finding"));
        assert!(text.contains("= help: keep one main"));
        assert!(text.contains("engine warning: layer-direction: missing configuration"));
        assert!(text.ends_with("Found 1 error(s), 0 warning(s) in 1 file(s) with 3 rule(s): failed\n"));
    }

    #[test]
    fn json_exposes_passed_and_positions() {
        let report = AnalysisReport::new(
            vec![diag("a.go", 4, "x", Severity::Warning)],
            Vec::new(),
            1,
            1,
        );
        let value: serde_json::Value =
            serde_json::from_str(&report.render_json().expect("json")).expect("valid json");
        assert_eq!(value["passed"], true);
        assert_eq!(value["diagnostics"][0]["location"]["line"], 4);
        assert_eq!(value["diagnostics"][0]["severity"], "warning");
        assert_eq!(value["diagnostics"][0]["kind"], "rule-violation");
        assert!(value.get("engine_warnings").is_none());
    }
}
