//! Configuration types for arch-conform.
//!
//! A config file has two sections:
//!
//! ```toml
//! [analyzer]
//! root = "."
//! exclude = ["**/vendor/**"]
//!
//! [rules]
//! entry_point_dir = "cmd"
//!
//! [[rules.layer_order]]
//! name = "domain"
//! prefixes = ["internal/domain"]
//!
//! [rules.naming_patterns]
//! interface = "^[A-Z][A-Za-z0-9]*$"
//! ```
//!
//! Rule options also accept the camelCase spelling (`entryPointDir`,
//! `layerOrder`, ...).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::model::DeclKind;
use crate::types::Severity;

/// Top-level configuration for arch-conform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Options passed to every rule.
    #[serde(default)]
    pub rules: RuleConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    pub root: PathBuf,

    /// Glob patterns (relative to root) a file must match to be analyzed.
    pub include: Vec<String>,

    /// Glob patterns (relative to root) to exclude from analysis.
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    pub respect_gitignore: bool,

    /// How many times a transiently failing read is retried.
    pub read_retries: u32,

    /// Abandon the run after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include: vec!["**/*.go".to_string()],
            exclude: vec![
                "**/vendor/**".to_string(),
                "**/testdata/**".to_string(),
                "**/*_test.go".to_string(),
            ],
            respect_gitignore: true,
            read_retries: 1,
            timeout_secs: None,
        }
    }
}

/// Options shared by all rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Directory segment an entry point must live under.
    #[serde(alias = "entryPointDir")]
    pub entry_point_dir: String,

    /// Name of the entry function.
    #[serde(alias = "entryPointFuncName")]
    pub entry_point_func_name: String,

    /// Package name the entry function must be declared in.
    #[serde(alias = "requiredPackageName")]
    pub required_package_name: String,

    /// Layers, lowest first. A layer may not import a layer listed after it.
    #[serde(alias = "layerOrder")]
    pub layer_order: Vec<LayerDef>,

    /// Declaration kind -> regular expression its names must match.
    #[serde(alias = "namingPatterns")]
    pub naming_patterns: BTreeMap<String, String>,

    /// Rule IDs or codes to run. `None` runs every registered rule.
    #[serde(alias = "enabledRules")]
    pub enabled_rules: Option<Vec<String>>,

    /// Import restrictions checked by `forbidden-import`.
    #[serde(alias = "forbiddenImports")]
    pub forbidden_imports: Vec<ForbiddenImport>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            entry_point_dir: "cmd".to_string(),
            entry_point_func_name: "main".to_string(),
            required_package_name: "main".to_string(),
            layer_order: Vec::new(),
            naming_patterns: BTreeMap::new(),
            enabled_rules: None,
            forbidden_imports: Vec::new(),
        }
    }
}

/// A named architecture layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDef {
    /// Layer name (e.g., `"domain"`).
    pub name: String,
    /// Package path prefixes belonging to this layer.
    #[serde(alias = "packages")]
    pub prefixes: Vec<String>,
}

impl LayerDef {
    /// Creates a layer from a name and its prefixes.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

/// An import restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenImport {
    /// Import path pattern; `*` matches one segment, `**` any number.
    pub pattern: String,

    /// Layers this restriction applies to. Empty means every package.
    #[serde(default)]
    pub in_layers: Vec<String>,

    /// Severity for violations of this restriction.
    #[serde(default = "default_severity")]
    pub severity: Severity,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

fn default_severity() -> Severity {
    Severity::Error
}

impl RuleConfig {
    /// Checks whether a rule is enabled by ID or code.
    #[must_use]
    pub fn is_rule_enabled(&self, name: &str, code: &str) -> bool {
        self.enabled_rules
            .as_ref()
            .map_or(true, |ids| ids.iter().any(|id| id == name || id == code))
    }

    /// Rank of every layer name: its position in `layer_order`.
    #[must_use]
    pub fn layer_ranks(&self) -> HashMap<&str, usize> {
        self.layer_order
            .iter()
            .enumerate()
            .map(|(rank, layer)| (layer.name.as_str(), rank))
            .collect()
    }

    /// Validates option consistency before any rule runs.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("entry_point_dir", &self.entry_point_dir),
            ("entry_point_func_name", &self.entry_point_func_name),
            ("required_package_name", &self.required_package_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.entry_point_dir.contains('/') {
            return Err(ConfigError::Validation(format!(
                "entry_point_dir must be a single path segment, got '{}'",
                self.entry_point_dir
            )));
        }

        self.validate_layers()?;

        for (kind, pattern) in &self.naming_patterns {
            if DeclKind::from_name(kind).is_none() {
                return Err(ConfigError::UnknownDeclKind { kind: kind.clone() });
            }
            whole_name_regex(pattern).map_err(|e| ConfigError::InvalidPattern {
                kind: kind.clone(),
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }

        let layer_names: std::collections::HashSet<&str> =
            self.layer_order.iter().map(|l| l.name.as_str()).collect();
        for (i, f) in self.forbidden_imports.iter().enumerate() {
            if f.pattern.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "forbidden_imports[{i}]: pattern must not be empty"
                )));
            }
            for l in &f.in_layers {
                if !layer_names.contains(l.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "forbidden_imports[{i}]: unknown layer '{l}'"
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_layers(&self) -> Result<(), ConfigError> {
        let mut names = std::collections::HashSet::new();
        let mut owners: HashMap<&str, &str> = HashMap::new();

        for layer in &self.layer_order {
            if layer.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "layer_order: layer name must not be empty".to_string(),
                ));
            }
            if !names.insert(layer.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "layer_order: duplicate layer '{}'",
                    layer.name
                )));
            }
            if layer.prefixes.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "layer_order.{}: at least one prefix is required",
                    layer.name
                )));
            }
            for prefix in &layer.prefixes {
                let normalized = prefix.trim_end_matches('/');
                if normalized.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "layer_order.{}: empty prefix",
                        layer.name
                    )));
                }
                if let Some(other) = owners.insert(normalized, &layer.name) {
                    return Err(ConfigError::Validation(format!(
                        "layer_order: prefix '{normalized}' claimed by both '{other}' and '{}'",
                        layer.name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Compiles a naming pattern so that it must match the whole name.
///
/// # Errors
///
/// Returns the compiler error for the anchored form of `pattern`.
pub fn whole_name_regex(pattern: &str) -> Result<regex::Regex, regex::Error> {
    regex::Regex::new(&format!("^(?:{pattern})$"))
}

/// Configuration errors. These are the only errors that abort a run.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(arch_conform::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(arch_conform::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Config is structurally invalid.
    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(arch_conform::config::validation))]
    Validation(String),

    /// A naming pattern is keyed by an unknown declaration kind.
    #[error("naming_patterns: unknown declaration kind '{kind}'")]
    #[diagnostic(
        code(arch_conform::config::decl_kind),
        help("valid kinds are: function, method, struct, interface, type")
    )]
    UnknownDeclKind {
        /// The offending key.
        kind: String,
    },

    /// A naming pattern is not a valid regular expression.
    #[error("naming_patterns.{kind}: invalid pattern '{pattern}': {message}")]
    #[diagnostic(code(arch_conform::config::regex))]
    InvalidPattern {
        /// Declaration kind the pattern is keyed by.
        kind: String,
        /// The pattern as written.
        pattern: String,
        /// Regex compiler message.
        message: String,
    },

    /// `enabled_rules` names a rule that is not registered.
    #[error("enabled_rules: unknown rule '{0}'")]
    #[diagnostic(
        code(arch_conform::config::unknown_rule),
        help("run `arch-conform list-rules` to see the registered rules")
    )]
    UnknownRule(String),
}
