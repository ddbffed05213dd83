//! Rule forbidding imports from a lower layer into a higher one.
//!
//! Layers are listed in `layer_order` from lowest to highest. A package may
//! import packages in its own layer or in any layer below it; importing a
//! layer above is reported. Packages that match no layer prefix are not
//! checked.
//!
//! # Configuration
//!
//! ```toml
//! [[rules.layer_order]]
//! name = "domain"
//! prefixes = ["internal/domain"]
//!
//! [[rules.layer_order]]
//! name = "app"
//! prefixes = ["internal/app"]
//!
//! [[rules.layer_order]]
//! name = "cmd"
//! prefixes = ["cmd"]
//! ```

use tracing::debug;

use arch_conform_core::{Diagnostic, Rule, RuleConfig, RuleError, Severity, StructuralModel};

use crate::layer::LayerResolver;

/// Rule code for layer-direction.
pub const CODE: &str = "ARC002";

/// Rule name for layer-direction.
pub const NAME: &str = "layer-direction";

/// Forbids imports that point against the configured layer order.
#[derive(Debug, Clone)]
pub struct LayerDirection {
    severity: Severity,
}

impl Default for LayerDirection {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerDirection {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for LayerDirection {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids imports from a lower layer into a higher layer"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(
        &self,
        model: &StructuralModel,
        config: &RuleConfig,
    ) -> Result<Vec<Diagnostic>, RuleError> {
        if config.layer_order.is_empty() {
            return Err(RuleError::MissingConfig("layer_order is empty".into()));
        }

        let resolver = LayerResolver::new(config);
        let ranks = config.layer_ranks();
        let mut diagnostics = Vec::new();

        for edge in model.imports() {
            let Some(from_layer) = resolver.resolve_in(model, &edge.from_package) else {
                continue;
            };
            let Some(to_layer) = resolver.resolve_in(model, &edge.imported) else {
                continue;
            };
            if from_layer == to_layer {
                continue;
            }

            let (Some(&from_rank), Some(&to_rank)) = (ranks.get(from_layer), ranks.get(to_layer))
            else {
                return Err(RuleError::Failed(format!(
                    "layer '{from_layer}' or '{to_layer}' has no rank"
                )));
            };

            if from_rank < to_rank {
                debug!("{from_layer} -> {to_layer} at {}", edge.location);
                diagnostics.push(
                    Diagnostic::new(
                        CODE,
                        NAME,
                        self.severity,
                        edge.location.clone(),
                        format!(
                            "layer '{from_layer}' must not import '{}' from higher layer '{to_layer}'",
                            edge.imported
                        ),
                    )
                    .with_remediation(format!(
                        "invert the dependency: define an interface in '{from_layer}' and implement it in '{to_layer}'"
                    )),
                );
            }
        }

        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_model, build_module};
    use arch_conform_core::{LayerDef, Location};

    fn layered() -> RuleConfig {
        RuleConfig {
            layer_order: vec![
                LayerDef::new("domain", ["internal/domain"]),
                LayerDef::new("app", ["internal/app"]),
                LayerDef::new("cmd", ["cmd"]),
            ],
            ..RuleConfig::default()
        }
    }

    fn check(module: &str, files: &[(&str, &str)]) -> Vec<Diagnostic> {
        let config = layered();
        let model = build_module(module, files, &config);
        LayerDirection::new()
            .evaluate(&model, &config)
            .expect("rule evaluates")
    }

    #[test]
    fn lower_importing_higher_is_an_error() {
        let diags = check(
            "example.com/shop",
            &[(
                "internal/domain/order.go",
                "package domain\n\nimport \"example.com/shop/internal/app\"\n",
            )],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(
            diags[0].location,
            Location::new("internal/domain/order.go", 3, 8)
        );
        assert!(diags[0].message.contains("'domain'"));
        assert!(diags[0].message.contains("'app'"));
    }

    #[test]
    fn higher_importing_lower_is_allowed() {
        let diags = check(
            "example.com/shop",
            &[
                (
                    "internal/app/service.go",
                    "package app\n\nimport \"example.com/shop/internal/domain\"\n",
                ),
                (
                    "cmd/shop/main.go",
                    "package main\n\nimport \"example.com/shop/internal/app\"\n",
                ),
            ],
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn same_layer_and_unclassified_edges_are_ignored() {
        let diags = check(
            "example.com/shop",
            &[
                (
                    "internal/domain/order.go",
                    "package domain\n\nimport (\n\t\"fmt\"\n\t\"example.com/shop/internal/domain/money\"\n\t\"example.com/shop/pkg/util\"\n)\n",
                ),
                (
                    "pkg/util/util.go",
                    "package util\n\nimport \"example.com/shop/internal/app\"\n",
                ),
            ],
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn every_offending_edge_is_reported() {
        let diags = check(
            "example.com/shop",
            &[(
                "internal/domain/order.go",
                "package domain\n\nimport (\n\t\"example.com/shop/internal/app\"\n\t\"example.com/shop/cmd/shop\"\n)\n",
            )],
        );
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].location.line, 4);
        assert_eq!(diags[1].location.line, 5);
    }

    #[test]
    fn works_without_module_path() {
        let config = layered();
        let model = build_model(
            &[(
                "internal/domain/order.go",
                "package domain\n\nimport \"internal/app\"\n",
            )],
            &config,
        );
        let diags = LayerDirection::new()
            .evaluate(&model, &config)
            .expect("rule evaluates");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn empty_layer_order_is_missing_config() {
        let config = RuleConfig::default();
        let model = build_model(&[], &config);
        let err = LayerDirection::new().evaluate(&model, &config).unwrap_err();
        assert!(matches!(err, RuleError::MissingConfig(_)));
    }
}
