//! # arch-conform-go
//!
//! Tree-sitter based Go front end for arch-conform.
//!
//! This crate turns a directory of Go sources into the per-file facts that
//! `arch-conform-core` builds its structural model from:
//!
//! - [`LanguageExtractor`] trait for pluggable language support
//! - [`GoExtractor`] for Go package, import and declaration extraction
//! - [`SourceLoader`] for discovery, parallel reading and parsing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod extractor;
pub mod go;
pub mod loader;

pub use extractor::{first_syntax_error, LanguageExtractor, ParseFailure, ParsedFile};
pub use go::GoExtractor;
pub use loader::{LoadError, LoadOutcome, LoadedFile, SourceLoader};
