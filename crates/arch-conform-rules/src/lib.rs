//! # arch-conform-rules
//!
//! Built-in conformance rules for arch-conform.
//!
//! Every rule evaluates the whole [`StructuralModel`] at once and reads its
//! options from [`RuleConfig`].
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | ARC001 | `single-entry-point` | Exactly one well-formed `main` under `cmd/` |
//! | ARC002 | `layer-direction` | Lower layers must not import higher layers |
//! | ARC003 | `naming-convention` | Declaration names match per-kind patterns |
//! | ARC004 | `forbidden-import` | Configured imports are forbidden, optionally per layer |
//!
//! ## Usage
//!
//! ```ignore
//! use arch_conform_core::{CancelToken, RuleConfig, RuleEngine};
//! use arch_conform_rules::all_rules;
//!
//! let engine = RuleEngine::new(all_rules());
//! let output = engine.run(&model, &RuleConfig::default(), &CancelToken::new())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod forbidden_import;
mod layer;
mod layer_direction;
mod naming_convention;
mod presets;
mod single_entry_point;

pub use forbidden_import::ForbiddenImports;
pub use layer::LayerResolver;
pub use layer_direction::LayerDirection;
pub use naming_convention::NamingConvention;
pub use presets::{all_rules, structure_rules, Preset};
pub use single_entry_point::SingleEntryPoint;

/// Re-export core types for convenience.
pub use arch_conform_core::{Diagnostic, Rule, RuleConfig, Severity, StructuralModel};
