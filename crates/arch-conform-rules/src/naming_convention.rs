//! Rule checking declaration names against per-kind patterns.
//!
//! # Configuration
//!
//! ```toml
//! [rules.naming_patterns]
//! struct = "[A-Z][A-Za-z0-9]*"
//! interface = "[A-Z][A-Za-z0-9]*(er|Repository|Service)"
//! ```
//!
//! Patterns must match the whole name. Kinds without a pattern are not
//! checked.

use std::collections::HashMap;

use regex::Regex;

use arch_conform_core::{
    whole_name_regex, DeclKind, Diagnostic, Rule, RuleConfig, RuleError, Severity,
    StructuralModel,
};

/// Rule code for naming-convention.
pub const CODE: &str = "ARC003";

/// Rule name for naming-convention.
pub const NAME: &str = "naming-convention";

/// Reports declarations whose names do not match the configured pattern.
#[derive(Debug, Clone)]
pub struct NamingConvention {
    severity: Severity,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingConvention {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn compile(config: &RuleConfig) -> Result<HashMap<DeclKind, (&str, Regex)>, RuleError> {
        config
            .naming_patterns
            .iter()
            .map(|(kind, pattern)| {
                let kind = DeclKind::from_name(kind)
                    .ok_or_else(|| RuleError::Failed(format!("unknown declaration kind '{kind}'")))?;
                let regex = whole_name_regex(pattern)
                    .map_err(|e| RuleError::Failed(format!("invalid pattern for {kind}: {e}")))?;
                Ok::<_, RuleError>((kind, (pattern.as_str(), regex)))
            })
            .collect()
    }
}

impl Rule for NamingConvention {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Checks declaration names against per-kind naming patterns"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(
        &self,
        model: &StructuralModel,
        config: &RuleConfig,
    ) -> Result<Vec<Diagnostic>, RuleError> {
        if config.naming_patterns.is_empty() {
            return Err(RuleError::MissingConfig("naming_patterns is empty".into()));
        }
        let patterns = Self::compile(config)?;

        let diagnostics = model
            .declarations()
            .iter()
            .filter_map(|decl| {
                let (pattern, regex) = patterns.get(&decl.kind)?;
                if regex.is_match(&decl.name) {
                    return None;
                }
                Some(
                    Diagnostic::new(
                        CODE,
                        NAME,
                        self.severity,
                        decl.location.clone(),
                        format!(
                            "{} name '{}' does not match pattern '{pattern}'",
                            decl.kind, decl.name
                        ),
                    )
                    .with_remediation(format!("rename the {} to match '{pattern}'", decl.kind)),
                )
            })
            .collect();

        Ok(diagnostics)
    }
}
