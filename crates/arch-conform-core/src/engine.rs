//! Rule engine: runs the enabled rules against a frozen model.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cancel::{CancelToken, Cancelled};
use crate::config::{ConfigError, RuleConfig};
use crate::model::StructuralModel;
use crate::rule::{Rule, RuleBox, RuleError};
use crate::types::Diagnostic;

/// A rule that could not evaluate. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineWarning {
    /// Rule ID.
    pub rule: String,
    /// Why the rule produced nothing.
    pub message: String,
}

impl std::fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

/// Merged output of one engine run.
#[derive(Debug, Default)]
pub struct EngineOutput {
    /// Diagnostics from every rule, in rule registration order.
    pub diagnostics: Vec<Diagnostic>,
    /// Rules that could not evaluate.
    pub warnings: Vec<EngineWarning>,
    /// Number of rules that were evaluated.
    pub rules_run: usize,
}

/// Errors that stop an engine run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration is invalid; no rule ran.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run was cancelled before every rule was evaluated.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Runs a catalog of rules.
pub struct RuleEngine {
    rules: Vec<RuleBox>,
}

impl RuleEngine {
    /// Creates an engine over the given rules.
    #[must_use]
    pub fn new(rules: Vec<RuleBox>) -> Self {
        Self { rules }
    }

    /// Returns the registered rules.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Checks the configuration against this engine's catalog.
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found, including rule IDs in
    /// `enabled_rules` that match no registered rule.
    pub fn validate(&self, config: &RuleConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(ids) = &config.enabled_rules {
            for id in ids {
                let known = self
                    .rules
                    .iter()
                    .any(|r| r.name() == id.as_str() || r.code() == id.as_str());
                if !known {
                    return Err(ConfigError::UnknownRule(id.clone()));
                }
            }
        }

        Ok(())
    }

    /// Rules selected by `enabled_rules`, in registration order.
    #[must_use]
    pub fn enabled<'a>(&'a self, config: &RuleConfig) -> Vec<&'a dyn Rule> {
        self.rules
            .iter()
            .map(|r| &**r)
            .filter(|r| config.is_rule_enabled(r.name(), r.code()))
            .collect()
    }

    /// Evaluates every enabled rule against the model.
    ///
    /// Rules run in parallel, each into its own result vector; results are
    /// merged in registration order once all of them have finished.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if validation fails, and
    /// [`EngineError::Cancelled`] if the token fired before every rule ran.
    pub fn run(
        &self,
        model: &StructuralModel,
        config: &RuleConfig,
        cancel: &CancelToken,
    ) -> Result<EngineOutput, EngineError> {
        self.validate(config)?;

        let enabled = self.enabled(config);
        info!("Evaluating {} rule(s)", enabled.len());

        let results: Vec<Option<Result<Vec<Diagnostic>, RuleError>>> = enabled
            .par_iter()
            .map(|rule| {
                if cancel.is_cancelled() {
                    return None;
                }
                debug!("Running rule: {}", rule.name());
                Some(rule.evaluate(model, config))
            })
            .collect();

        let mut output = EngineOutput::default();
        for (rule, result) in enabled.iter().zip(results) {
            match result {
                None => return Err(Cancelled.into()),
                Some(Ok(diagnostics)) => {
                    debug!("{}: {} diagnostic(s)", rule.name(), diagnostics.len());
                    output.diagnostics.extend(diagnostics);
                }
                Some(Err(e)) => {
                    warn!("Rule {} did not run: {}", rule.name(), e);
                    output.warnings.push(EngineWarning {
                        rule: rule.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
            output.rules_run += 1;
        }

        Ok(output)
    }
}
