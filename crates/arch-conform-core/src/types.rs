//! Core types for diagnostics.

use miette::SourceSpan;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, but never fails the run.
    Warning,
    /// Fails the run.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A source file could not be read.
    LoadError,
    /// A source file could not be parsed.
    ParseError,
    /// Structural information for a file is missing or ambiguous.
    ModelExtraction,
    /// A rule found a violation.
    RuleViolation,
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the analysis root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters).
    pub column: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location pointing at the start of a file.
    #[must_use]
    pub fn file_start(file: &Path) -> Self {
        Self::new(file, 1, 1)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A single finding: loader failure, extraction warning or rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule code (e.g., "ARC001").
    pub code: String,
    /// Rule ID (e.g., "single-entry-point").
    pub rule: String,
    /// Origin of this diagnostic.
    pub kind: DiagnosticKind,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Primary location.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// How to fix it. Empty when there is nothing useful to say.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remediation: String,
}

impl Diagnostic {
    /// Creates a new rule violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            kind: DiagnosticKind::RuleViolation,
            severity,
            location,
            message: message.into(),
            remediation: String::new(),
        }
    }

    /// Diagnostic for a file that failed to parse.
    #[must_use]
    pub fn parse_error(location: Location, message: impl Into<String>) -> Self {
        Self::new(
            PARSE_ERROR_CODE,
            PARSE_ERROR_RULE,
            Severity::Error,
            location,
            message,
        )
        .with_kind(DiagnosticKind::ParseError)
        .with_remediation("fix the syntax error; the file was skipped for every rule")
    }

    /// Diagnostic for a file that could not be read.
    #[must_use]
    pub fn load_error(file: &Path, message: impl Into<String>) -> Self {
        Self::new(
            LOAD_ERROR_CODE,
            LOAD_ERROR_RULE,
            Severity::Error,
            Location::file_start(file),
            message,
        )
        .with_kind(DiagnosticKind::LoadError)
    }

    /// Warning for structural information that could not be extracted.
    #[must_use]
    pub fn extraction_warning(location: Location, message: impl Into<String>) -> Self {
        Self::new(
            EXTRACTION_CODE,
            EXTRACTION_RULE,
            Severity::Warning,
            location,
            message,
        )
        .with_kind(DiagnosticKind::ModelExtraction)
    }

    /// Sets the diagnostic kind.
    #[must_use]
    pub fn with_kind(mut self, kind: DiagnosticKind) -> Self {
        self.kind = kind;
        self
    }

    /// Adds a remediation hint.
    #[must_use]
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    /// Formats the diagnostic for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} at {}\n", self.code, self.rule, self.location);
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if !self.remediation.is_empty() {
            let _ = writeln!(output, "  = help: {}", self.remediation);
        }
        output
    }

    /// Ordering key used by the reporter.
    pub(crate) fn sort_key(&self) -> (&Path, usize, usize, &str, &str) {
        (
            self.location.file.as_path(),
            self.location.line,
            self.location.column,
            self.rule.as_str(),
            self.message.as_str(),
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location, self.severity, self.code, self.message
        )
    }
}

/// Rule ID used for parse failures.
pub const PARSE_ERROR_RULE: &str = "parse-error";
/// Code used for parse failures.
pub const PARSE_ERROR_CODE: &str = "ARC900";
/// Rule ID used for read failures.
pub const LOAD_ERROR_RULE: &str = "load-error";
/// Code used for read failures.
pub const LOAD_ERROR_CODE: &str = "ARC901";
/// Rule ID used for extraction warnings.
pub const EXTRACTION_RULE: &str = "model-extraction";
/// Code used for extraction warnings.
pub const EXTRACTION_CODE: &str = "ARC902";

/// A diagnostic rendered with source context by miette.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("[{code}] {message}")]
pub struct SourceDiagnostic {
    code: String,
    message: String,
    #[help]
    help: Option<String>,
    #[source_code]
    source_code: miette::NamedSource<String>,
    #[label("{rule}")]
    span: SourceSpan,
    rule: String,
}

impl SourceDiagnostic {
    /// Attaches source text to a diagnostic so it can be shown with a snippet.
    #[must_use]
    pub fn new(diagnostic: &Diagnostic, source: &str) -> Self {
        let offset = byte_offset(source, diagnostic.location.line, diagnostic.location.column);
        Self {
            code: diagnostic.code.clone(),
            message: diagnostic.message.clone(),
            help: (!diagnostic.remediation.is_empty()).then(|| diagnostic.remediation.clone()),
            source_code: miette::NamedSource::new(
                diagnostic.location.file.display().to_string(),
                source.to_owned(),
            ),
            span: SourceSpan::from((offset, 0)),
            rule: diagnostic.rule.clone(),
        }
    }
}

/// Byte offset of a 1-indexed line and character column, or 0 if the line
/// is out of bounds.
#[must_use]
pub fn byte_offset(content: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }

    let mut offset = 0;
    for (i, line_content) in content.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let within = line_content
                .char_indices()
                .nth(column.saturating_sub(1))
                .map_or(line_content.len(), |(byte, _)| byte);
            return offset + within;
        }
        offset += line_content.len();
    }

    0
}
