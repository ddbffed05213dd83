//! Rule trait for defining conformance rules.

use crate::config::RuleConfig;
use crate::model::StructuralModel;
use crate::types::{Diagnostic, Severity};

/// Why a rule produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// An optional setting the rule depends on is not configured.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// The rule could not finish.
    #[error("evaluation failed: {0}")]
    Failed(String),
}

/// A conformance rule evaluated over the whole structural model.
///
/// Rules are pure: they read the model and the configuration and return
/// the diagnostics they found. They must not depend on other rules or on
/// the order rules run in.
///
/// # Example
///
/// ```ignore
/// use arch_conform_core::{Diagnostic, Location, Rule, RuleConfig, RuleError, StructuralModel};
///
/// pub struct RequireGoFiles;
///
/// impl Rule for RequireGoFiles {
///     fn name(&self) -> &'static str { "require-go-files" }
///     fn code(&self) -> &'static str { "ARC100" }
///
///     fn evaluate(
///         &self,
///         model: &StructuralModel,
///         _config: &RuleConfig,
///     ) -> Result<Vec<Diagnostic>, RuleError> {
///         if model.files().is_empty() {
///             return Ok(vec![Diagnostic::new(
///                 self.code(),
///                 self.name(),
///                 self.default_severity(),
///                 Location::new(".", 1, 1),
///                 "no Go files found",
///             )]);
///         }
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case rule ID (e.g., "single-entry-point").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "ARC001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Evaluates the rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the rule cannot evaluate; the engine records
    /// it as a warning and carries on with the other rules.
    fn evaluate(
        &self,
        model: &StructuralModel,
        config: &RuleConfig,
    ) -> Result<Vec<Diagnostic>, RuleError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }

        fn evaluate(
            &self,
            model: &StructuralModel,
            _config: &RuleConfig,
        ) -> Result<Vec<Diagnostic>, RuleError> {
            let file = model
                .first_file()
                .ok_or_else(|| RuleError::Failed("no files".into()))?;
            Ok(vec![Diagnostic::new(
                self.code(),
                self.name(),
                self.default_severity(),
                Location::file_start(file),
                "Test violation",
            )])
        }
    }

    #[test]
    fn test_rule_trait() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.default_severity(), Severity::Error);
    }

    #[test]
    fn test_rule_reports_failure_on_empty_model() {
        let model = StructuralModel::default();
        let err = TestRule
            .evaluate(&model, &RuleConfig::default())
            .unwrap_err();
        assert_eq!(err, RuleError::Failed("no files".into()));
    }
}
