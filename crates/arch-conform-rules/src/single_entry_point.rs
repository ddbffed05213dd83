//! Rule requiring exactly one process entry point.
//!
//! # Rationale
//!
//! A service with several `main` functions under `cmd/` tends to duplicate
//! wiring and configuration. One binary that dispatches subcommands keeps
//! start-up logic in one place.
//!
//! # Detected Patterns
//!
//! - No entry function under the configured entry-point directory
//! - More than one entry function (every one after the first is reported)
//! - Entry functions that take parameters or return values
//! - Entry functions declared outside the required package

use arch_conform_core::{
    Declaration, Diagnostic, Location, Rule, RuleConfig, RuleError, Severity, StructuralModel,
};

/// Rule code for single-entry-point.
pub const CODE: &str = "ARC001";

/// Rule name for single-entry-point.
pub const NAME: &str = "single-entry-point";

/// Requires exactly one well-formed entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleEntryPoint;

impl SingleEntryPoint {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn diagnostic(
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic::new(CODE, NAME, severity, location, message)
    }

    fn check_shape(
        model: &StructuralModel,
        config: &RuleConfig,
        entry: &Declaration,
        out: &mut Vec<Diagnostic>,
    ) {
        if entry.param_count > 0 {
            out.push(
                Self::diagnostic(
                    Severity::Warning,
                    entry.location.clone(),
                    "entry function should take no parameters",
                )
                .with_remediation("read arguments from os.Args or a flag set instead"),
            );
        }
        if entry.result_count > 0 {
            out.push(
                Self::diagnostic(
                    Severity::Warning,
                    entry.location.clone(),
                    "entry function should not return values",
                )
                .with_remediation("report failures with os.Exit instead of returning them"),
            );
        }

        let required = &config.required_package_name;
        let message = match &model.file(entry.file).package {
            Some(package) if package == required => return,
            Some(package) => {
                format!("entry function is declared in package `{package}`, expected `{required}`")
            }
            None => format!("entry function has no package clause, expected package `{required}`"),
        };
        out.push(
            Self::diagnostic(Severity::Error, entry.location.clone(), message)
                .with_remediation(format!("declare the file as `package {required}`")),
        );
    }
}

impl Rule for SingleEntryPoint {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires exactly one entry function under the entry-point directory"
    }

    fn evaluate(
        &self,
        model: &StructuralModel,
        config: &RuleConfig,
    ) -> Result<Vec<Diagnostic>, RuleError> {
        let dir = &config.entry_point_dir;
        let func = &config.entry_point_func_name;
        let entries: Vec<&Declaration> = model.entry_points().collect();

        let Some((first, rest)) = entries.split_first() else {
            let anchor = model
                .first_file()
                .map_or_else(|| Location::new(".", 1, 1), Location::file_start);
            return Ok(vec![Self::diagnostic(
                Severity::Error,
                anchor,
                format!("no entry point found: no `func {func}()` under a `{dir}/` directory"),
            )
            .with_remediation(format!(
                "add `{dir}/<name>/{func}.go` declaring `package {}` with `func {func}()`",
                config.required_package_name
            ))]);
        };

        let mut diagnostics = Vec::new();
        for extra in rest {
            diagnostics.push(
                Self::diagnostic(
                    Severity::Error,
                    extra.location.clone(),
                    format!(
                        "additional entry point; the first one is at {}",
                        first.location
                    ),
                )
                .with_remediation(
                    "consolidate into a single entry point that dispatches subcommands",
                ),
            );
        }

        for entry in &entries {
            Self::check_shape(model, config, entry, &mut diagnostics);
        }

        Ok(diagnostics)
    }
}
