//! # arch-conform-core
//!
//! Core framework for architecture-conformance analysis.
//!
//! This crate is language-agnostic. It provides:
//!
//! - [`StructuralModel`] and [`ModelBuilder`], the read-only index of files,
//!   declarations and import edges shared by all rules
//! - [`Rule`] trait for pluggable rules over the model
//! - [`RuleEngine`] for running enabled rules in parallel
//! - [`AnalysisReport`] for ordering, pass/fail and rendering
//! - [`Config`] / [`RuleConfig`] for TOML configuration
//!
//! ## Example
//!
//! ```ignore
//! use arch_conform_core::{CancelToken, RuleConfig, RuleEngine, StructuralModel};
//!
//! let config = RuleConfig::default();
//! let model = StructuralModel::builder().build(&config);
//! let engine = RuleEngine::new(vec![Box::new(MyRule)]);
//! let output = engine.run(&model, &config, &CancelToken::new())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod config;
mod engine;
mod model;
mod report;
mod rule;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use cancel::{CancelToken, Cancelled};
pub use config::{
    whole_name_regex, AnalyzerConfig, Config, ConfigError, ForbiddenImport, LayerDef, RuleConfig,
};
pub use engine::{EngineError, EngineOutput, EngineWarning, RuleEngine};
pub use model::{
    DeclFact, DeclKind, Declaration, FileFacts, ImportEdge, ImportFact, ModelBuilder,
    ParseStatus, SourceFile, StructuralModel,
};
pub use report::AnalysisReport;
pub use rule::{Rule, RuleBox, RuleError};
pub use types::{
    byte_offset, Diagnostic, DiagnosticKind, Location, Severity, SourceDiagnostic,
    EXTRACTION_CODE, EXTRACTION_RULE, LOAD_ERROR_CODE, LOAD_ERROR_RULE, PARSE_ERROR_CODE,
    PARSE_ERROR_RULE,
};
