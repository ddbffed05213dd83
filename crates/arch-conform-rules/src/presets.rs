//! Rule catalog and presets.

use arch_conform_core::RuleBox;

use crate::{ForbiddenImports, LayerDirection, NamingConvention, SingleEntryPoint};

/// Preset configurations for arch-conform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every built-in rule.
    All,
    /// Only the entry-point and layer rules.
    Structure,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::All => all_rules(),
            Self::Structure => structure_rules(),
        }
    }
}

/// Returns the entry-point and layer rules.
///
/// Includes:
/// - `single-entry-point` (ARC001)
/// - `layer-direction` (ARC002)
#[must_use]
pub fn structure_rules() -> Vec<RuleBox> {
    vec![
        Box::new(SingleEntryPoint::new()),
        Box::new(LayerDirection::new()),
    ]
}

/// Returns all available rules, in catalog order.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(SingleEntryPoint::new()),
        Box::new(LayerDirection::new()),
        Box::new(NamingConvention::new()),
        Box::new(ForbiddenImports::new()),
    ]
}
