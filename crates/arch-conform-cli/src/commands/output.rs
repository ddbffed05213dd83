//! Report printing.

use std::path::Path;

use anyhow::Result;
use arch_conform::{AnalysisReport, SourceDiagnostic};

use crate::OutputFormat;

/// Print a report in the specified format.
///
/// `root` is where diagnostic paths are relative to; the rich format reads
/// sources from there.
pub fn print(report: &AnalysisReport, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => println!("{}", report.render_json()?),
        OutputFormat::Compact => print!("{}", report.render_compact()),
        OutputFormat::Rich => print_rich(report, root),
    }
    Ok(())
}

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

fn print_text(report: &AnalysisReport) {
    print!("{}", colorize(report));
}

/// [`AnalysisReport::render_text`] with ANSI colours on severities and the
/// summary line.
fn colorize(report: &AnalysisReport) -> String {
    let text = report.render_text();
    let summary = report.summary();
    let (errors, warnings) = report.count_by_severity();
    let summary_color = if errors > 0 {
        RED
    } else if warnings > 0 {
        YELLOW
    } else {
        GREEN
    };

    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let colored = if line == summary {
            format!("{summary_color}{line}{RESET}")
        } else if let Some(rest) = line.strip_prefix("  error:") {
            format!("  {RED}error{RESET}:{rest}")
        } else if let Some(rest) = line.strip_prefix("  warning:") {
            format!("  {YELLOW}warning{RESET}:{rest}")
        } else if let Some(rest) = line.strip_prefix("engine warning:") {
            format!("{YELLOW}engine warning{RESET}:{rest}")
        } else {
            line.to_string()
        };
        out.push_str(&colored);
        out.push('\n');
    }
    out
}

fn print_rich(report: &AnalysisReport, root: &Path) {
    for diagnostic in &report.diagnostics {
        match std::fs::read_to_string(root.join(&diagnostic.location.file)) {
            Ok(source) => {
                let rich = SourceDiagnostic::new(diagnostic, &source);
                println!("{:?}", miette::Report::new(rich));
            }
            Err(_) => println!("{}\n", diagnostic.format()),
        }
    }
    for warning in &report.engine_warnings {
        println!("engine warning: {warning}");
    }
    println!("{}", report.summary());
}
