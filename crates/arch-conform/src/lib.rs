//! # arch-conform
//!
//! Architecture-conformance analyzer for Go source trees.
//!
//! This is the main facade crate. It re-exports the core model, engine and
//! reporter, the Go front end and the built-in rules, and adds
//! [`Analyzer`], which runs the whole pipeline.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use arch_conform::{Analyzer, Config};
//!
//! let config = Config::from_file("arch-conform.toml".as_ref())?;
//! let analyzer = Analyzer::builder()
//!     .root("./service")
//!     .config(config)
//!     .build()?;
//!
//! let report = analyzer.analyze()?;
//! print!("{}", report.render_text());
//! std::process::exit(report.exit_code());
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [analyzer]
//! exclude = ["**/vendor/**", "**/*_test.go"]
//!
//! [rules]
//! entry_point_dir = "cmd"
//!
//! [[rules.layer_order]]
//! name = "domain"
//! prefixes = ["internal/domain"]
//!
//! [[rules.layer_order]]
//! name = "app"
//! prefixes = ["internal/app"]
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use arch_conform_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use arch_conform_rules::*;
}

/// Go discovery, parsing and extraction.
pub mod go {
    pub use arch_conform_go::*;
}

mod analyzer;

pub use analyzer::{AnalysisError, Analyzer, AnalyzerBuilder};
