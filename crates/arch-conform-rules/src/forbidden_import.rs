//! Rule forbidding specific imports, optionally only inside some layers.
//!
//! # Configuration
//!
//! ```toml
//! [[rules.forbidden_imports]]
//! pattern = "database/sql"
//! in_layers = ["domain"]
//! message = "domain code must not talk to the database"
//!
//! [[rules.forbidden_imports]]
//! pattern = "github.com/*/legacy/**"
//! severity = "warning"
//! ```
//!
//! A pattern matches an import path segment by segment: `*` matches one
//! segment and `**` any number. A pattern without wildcards also matches
//! every package below it.

use arch_conform_core::utils::{is_under, path_matches};
use arch_conform_core::{
    Diagnostic, ForbiddenImport, Rule, RuleConfig, RuleError, StructuralModel,
};

use crate::layer::LayerResolver;

/// Rule code for forbidden-import.
pub const CODE: &str = "ARC004";

/// Rule name for forbidden-import.
pub const NAME: &str = "forbidden-import";

/// Reports imports matching a configured restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForbiddenImports;

impl ForbiddenImports {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn matches_import(restriction: &ForbiddenImport, import: &str) -> bool {
    let pattern = restriction.pattern.trim_end_matches('/');
    path_matches(import, pattern) || is_under(import, pattern)
}

impl Rule for ForbiddenImports {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids configured imports, optionally per layer"
    }

    fn evaluate(
        &self,
        model: &StructuralModel,
        config: &RuleConfig,
    ) -> Result<Vec<Diagnostic>, RuleError> {
        if config.forbidden_imports.is_empty() {
            return Err(RuleError::MissingConfig("forbidden_imports is empty".into()));
        }

        let resolver = LayerResolver::new(config);
        let mut diagnostics = Vec::new();

        for edge in model.imports() {
            let layer = resolver.resolve_in(model, &edge.from_package);

            for restriction in &config.forbidden_imports {
                let in_scope = restriction.in_layers.is_empty()
                    || layer.is_some_and(|l| restriction.in_layers.iter().any(|x| x == l));
                if !in_scope || !matches_import(restriction, &edge.imported) {
                    continue;
                }

                let message = if restriction.message.is_empty() {
                    format!(
                        "import '{}' is forbidden by pattern '{}'",
                        edge.imported, restriction.pattern
                    )
                } else {
                    restriction.message.clone()
                };
                diagnostics.push(
                    Diagnostic::new(
                        CODE,
                        NAME,
                        restriction.severity,
                        edge.location.clone(),
                        message,
                    )
                    .with_remediation(format!("remove the import of '{}'", edge.imported)),
                );
            }
        }

        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_module;
    use arch_conform_core::{LayerDef, Severity};

    fn restriction(pattern: &str, in_layers: &[&str]) -> ForbiddenImport {
        ForbiddenImport {
            pattern: pattern.into(),
            in_layers: in_layers.iter().map(|s| (*s).to_string()).collect(),
            severity: Severity::Error,
            message: String::new(),
        }
    }

    fn check(restrictions: Vec<ForbiddenImport>, files: &[(&str, &str)]) -> Vec<Diagnostic> {
        let config = RuleConfig {
            layer_order: vec![
                LayerDef::new("domain", ["internal/domain"]),
                LayerDef::new("infra", ["internal/infra"]),
            ],
            forbidden_imports: restrictions,
            ..RuleConfig::default()
        };
        let model = build_module("example.com/shop", files, &config);
        ForbiddenImports::new()
            .evaluate(&model, &config)
            .expect("rule evaluates")
    }

    const DOMAIN_SQL: (&str, &str) = (
        "internal/domain/repo.go",
        "package domain\n\nimport \"database/sql\"\n",
    );
    const INFRA_SQL: (&str, &str) = (
        "internal/infra/db.go",
        "package infra\n\nimport \"database/sql/driver\"\n",
    );

    #[test]
    fn restriction_applies_only_to_listed_layers() {
        let diags = check(
            vec![restriction("database/sql", &["domain"])],
            &[DOMAIN_SQL, INFRA_SQL],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].location.file,
            std::path::PathBuf::from("internal/domain/repo.go")
        );
    }

    #[test]
    fn no_layers_means_everywhere_and_prefix_matches_subpackages() {
        let diags = check(vec![restriction("database/sql", &[])], &[DOMAIN_SQL, INFRA_SQL]);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn wildcards_match_segments() {
        let diags = check(
            vec![restriction("github.com/*/legacy/**", &[])],
            &[(
                "internal/infra/a.go",
                "package infra\n\nimport (\n\t\"github.com/acme/legacy/db\"\n\t\"github.com/acme/modern/db\"\n)\n",
            )],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].location.line, 4);
    }

    #[test]
    fn no_partial_segment_match() {
        let diags = check(
            vec![restriction("database/sql", &[])],
            &[(
                "internal/infra/a.go",
                "package infra\n\nimport \"database/sqlx\"\n",
            )],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn custom_message_and_severity() {
        let mut r = restriction("database/sql", &["domain"]);
        r.severity = Severity::Warning;
        r.message = "domain must stay pure".into();
        let diags = check(vec![r], &[DOMAIN_SQL]);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].message, "domain must stay pure");
    }

    #[test]
    fn no_restrictions_is_missing_config() {
        let config = RuleConfig::default();
        let model = build_module("example.com/shop", &[], &config);
        let err = ForbiddenImports::new().evaluate(&model, &config).unwrap_err();
        assert!(matches!(err, RuleError::MissingConfig(_)));
    }
}
