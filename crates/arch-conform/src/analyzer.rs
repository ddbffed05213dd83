//! Analyzer: wires the Go loader, model builder, rule engine and reporter.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use arch_conform_core::{
    AnalysisReport, CancelToken, Cancelled, Config, ConfigError, Diagnostic, EngineError,
    Location, Rule, RuleBox, RuleEngine, StructuralModel,
};
use arch_conform_go::{LoadError, LoadOutcome, LoadedFile, SourceLoader};
use arch_conform_rules::all_rules;

/// Errors that abort an analysis run.
///
/// Everything else (unreadable files, syntax errors, rules that could not
/// evaluate) ends up in the report.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// IO error resolving the analysis root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Source discovery failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The run was cancelled or timed out.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl From<EngineError> for AnalysisError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Config(e) => Self::Config(e),
            EngineError::Cancelled(c) => Self::Cancelled(c),
        }
    }
}

impl AnalysisError {
    /// Process exit code for a fatal error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    module_path: Option<String>,
    timeout: Option<Duration>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule. Without any, every built-in rule is registered.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules(mut self, rules: Vec<RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern. Replaces the configured includes.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the module path instead of reading it from `go.mod`.
    #[must_use]
    pub fn module_path(mut self, module_path: impl Into<String>) -> Self {
        self.module_path = Some(module_path.into());
        self
    }

    /// Abandons [`Analyzer::analyze`] and [`Analyzer::analyze_sources`]
    /// after `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the analyzer.
    ///
    /// The configuration is validated here, so an analyzer that builds never
    /// fails on configuration later.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a glob pattern does
    /// not compile, or the working directory cannot be read.
    pub fn build(self) -> Result<Analyzer, AnalysisError> {
        let mut config = self.config.unwrap_or_default();

        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        config.analyzer.root.clone_from(&root);

        config.analyzer.exclude.extend(self.exclude_patterns);
        if !self.include_patterns.is_empty() {
            config.analyzer.include = self.include_patterns;
        }

        let rules = if self.rules.is_empty() {
            all_rules()
        } else {
            self.rules
        };
        let engine = RuleEngine::new(rules);
        engine.validate(&config.rules)?;

        let loader = SourceLoader::from_config(&config.analyzer)?;
        let timeout = self
            .timeout
            .or_else(|| config.analyzer.timeout_secs.map(Duration::from_secs));

        Ok(Analyzer {
            root,
            config,
            engine,
            loader,
            module_path: self.module_path,
            timeout,
        })
    }
}

/// Runs a full analysis: discover, load, build the model, evaluate, report.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    config: Config,
    engine: RuleEngine,
    loader: SourceLoader,
    module_path: Option<String>,
    timeout: Option<Duration>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.engine.rules().len()
    }

    /// Analyzes the tree under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the configured timeout expires.
    pub fn analyze(&self) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_with_cancel(&self.cancel_token())
    }

    /// Analyzes the tree under the root, stopping when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the run is cancelled.
    pub fn analyze_with_cancel(&self, cancel: &CancelToken) -> Result<AnalysisReport, AnalysisError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.loader.discover()?;
        let loaded = self.loader.load(&files, cancel)?;
        let module_path = self
            .module_path
            .clone()
            .or_else(|| self.loader.module_path());

        self.evaluate(loaded, module_path, cancel)
    }

    /// Analyzes in-memory sources given as `(relative path, text)` pairs.
    ///
    /// Nothing is read from disk; the module path comes from the builder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured timeout expires.
    pub fn analyze_sources(
        &self,
        sources: Vec<(PathBuf, String)>,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.analyze_sources_with_cancel(sources, &self.cancel_token())
    }

    /// Analyzes in-memory sources, stopping when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is cancelled.
    pub fn analyze_sources_with_cancel(
        &self,
        sources: Vec<(PathBuf, String)>,
        cancel: &CancelToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        let loaded = self.loader.load_sources(sources, cancel)?;
        self.evaluate(loaded, self.module_path.clone(), cancel)
    }

    fn cancel_token(&self) -> CancelToken {
        self.timeout
            .map_or_else(CancelToken::new, CancelToken::with_timeout)
    }

    fn evaluate(
        &self,
        loaded: Vec<LoadedFile>,
        module_path: Option<String>,
        cancel: &CancelToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        let files_checked = loaded.len();
        let (model, mut diagnostics) = self.build_model(loaded, module_path);

        let output = self.engine.run(&model, &self.config.rules, cancel)?;
        diagnostics.extend(output.diagnostics);

        let report = AnalysisReport::new(
            diagnostics,
            output.warnings,
            files_checked,
            output.rules_run,
        );
        info!("{}", report.summary());
        Ok(report)
    }

    /// Freezes loaded files into a model; returns loader-level diagnostics too.
    fn build_model(
        &self,
        loaded: Vec<LoadedFile>,
        module_path: Option<String>,
    ) -> (StructuralModel, Vec<Diagnostic>) {
        let mut builder = StructuralModel::builder().module_path(module_path);
        let mut diagnostics = Vec::new();

        for file in loaded {
            match file.outcome {
                LoadOutcome::Parsed(facts) => {
                    if facts.package.is_none() {
                        debug!("No package clause in {}", file.path.display());
                        diagnostics.push(Diagnostic::extraction_warning(
                            Location::file_start(&file.path),
                            "file has no package clause; package checks skip it",
                        ));
                    }
                    builder.add_parsed(file.path, facts);
                }
                LoadOutcome::Failed(diagnostic) => {
                    warn!("{}", diagnostic);
                    builder.add_failed(file.path, diagnostic.message.clone());
                    diagnostics.push(diagnostic);
                }
            }
        }

        (builder.build(&self.config.rules), diagnostics)
    }
}
