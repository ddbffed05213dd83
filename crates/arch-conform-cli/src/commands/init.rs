//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "arch-conform.toml";

const DEFAULT_CONFIG: &str = r#"# arch-conform configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "."

# Glob patterns (relative to root) a file must match
include = ["**/*.go"]

# Glob patterns to exclude from analysis
exclude = [
    "**/vendor/**",
    "**/testdata/**",
    "**/*_test.go",
]

# Respect .gitignore files
respect_gitignore = true

# Abandon the run after this many seconds
# timeout_secs = 60

[rules]
# Only run these rules (IDs or codes). All rules run when unset.
# enabled_rules = ["single-entry-point", "layer-direction"]

# single-entry-point (ARC001)
entry_point_dir = "cmd"
entry_point_func_name = "main"
required_package_name = "main"

# layer-direction (ARC002)
# Layers from lowest to highest. A layer must not import a layer listed after it.
[[rules.layer_order]]
name = "domain"
prefixes = ["internal/domain"]

[[rules.layer_order]]
name = "application"
prefixes = ["internal/application"]

[[rules.layer_order]]
name = "infrastructure"
prefixes = ["internal/infrastructure"]

[[rules.layer_order]]
name = "cmd"
prefixes = ["cmd"]

# naming-convention (ARC003)
# Keys: function, method, struct, interface, type. Patterns match the whole name.
# [rules.naming_patterns]
# struct = "[A-Z][A-Za-z0-9]*"
# interface = "[A-Z][A-Za-z0-9]*"

# forbidden-import (ARC004)
# [[rules.forbidden_imports]]
# pattern = "database/sql"
# in_layers = ["domain"]
# severity = "error"
# message = "domain code must not depend on the database"
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to match your package layout");
    println!("  2. Run: arch-conform check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch_conform::Config;
    use tempfile::TempDir;

    #[test]
    fn template_is_a_valid_config() {
        let config = Config::parse(DEFAULT_CONFIG).expect("template parses");
        config.rules.validate().expect("template validates");
        assert_eq!(config.rules.layer_order.len(), 4);
        assert_eq!(config.analyzer.include, vec!["**/*.go".to_string()]);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "# mine").expect("write");

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# mine");

        write_config(&path, true).expect("force overwrites");
        assert!(std::fs::read_to_string(&path)
            .expect("read")
            .contains("[[rules.layer_order]]"));
    }
}
