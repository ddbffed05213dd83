//! Check command implementation.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use arch_conform::{AnalysisError, Analyzer};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Exit code for fatal errors: invalid configuration, failed walk, timeout.
const FATAL_EXIT: i32 = 2;

/// Command-line options of `check`.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Report format.
    pub format: OutputFormat,
    /// Comma-separated rule IDs or codes to run instead of `enabled_rules`.
    pub rules: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Timeout in seconds.
    pub timeout: Option<u64>,
}

/// Runs the check command and returns the process exit code.
///
/// # Errors
///
/// Returns an error only if the report cannot be written.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<i32> {
    let mut config = match source.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            return Ok(FATAL_EXIT);
        }
    };

    if let Some(filter) = &options.rules {
        let ids: Vec<String> = filter
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        config.rules.enabled_rules = Some(ids);
    }

    let mut builder = Analyzer::builder()
        .root(path)
        .config(config)
        .excludes(options.exclude.iter().cloned());
    if let Some(secs) = options.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    let report = match builder.build().and_then(|analyzer| {
        tracing::info!(
            "Analyzing {} with {} rule(s)",
            analyzer.root().display(),
            analyzer.rule_count()
        );
        analyzer.analyze()
    }) {
        Ok(report) => report,
        Err(e) => return Ok(report_fatal(e)),
    };

    super::output::print(&report, options.format, path)?;
    Ok(report.exit_code())
}

fn report_fatal(err: AnalysisError) -> i32 {
    let code = err.exit_code();
    match err {
        AnalysisError::Config(e) => eprintln!("{:?}", miette::Report::new(e)),
        AnalysisError::Cancelled(_) => eprintln!("error: analysis cancelled (timeout reached)"),
        other => eprintln!("error: {other}"),
    }
    code
}
