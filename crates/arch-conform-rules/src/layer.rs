//! Layer resolution: maps package paths to architecture layers.

use arch_conform_core::utils::is_under;
use arch_conform_core::{RuleConfig, StructuralModel};

/// Resolves `/`-separated package paths to architecture layer names.
///
/// Resolution uses longest-prefix-match so that more specific package
/// prefixes take priority over broader ones.
#[derive(Debug, Clone)]
pub struct LayerResolver {
    /// (package_prefix, layer_name) sorted by prefix length descending.
    map: Vec<(String, String)>,
}

impl LayerResolver {
    /// Build a resolver from config.
    #[must_use]
    pub fn new(config: &RuleConfig) -> Self {
        let mut map: Vec<(String, String)> = Vec::new();
        for layer in &config.layer_order {
            for prefix in &layer.prefixes {
                map.push((
                    prefix.trim_end_matches('/').to_string(),
                    layer.name.clone(),
                ));
            }
        }
        // Longest prefix first for correct matching
        map.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { map }
    }

    /// Whether no layer is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Which layer does this package path belong to?
    #[must_use]
    pub fn resolve(&self, package_path: &str) -> Option<&str> {
        self.map
            .iter()
            .find(|(prefix, _)| is_under(package_path, prefix))
            .map(|(_, layer)| layer.as_str())
    }

    /// Resolves a full import path, falling back to its module-relative form.
    ///
    /// `example.com/app/internal/domain` resolves through a layer declared
    /// as `internal/domain` when the model's module path is `example.com/app`.
    #[must_use]
    pub fn resolve_in(&self, model: &StructuralModel, package_path: &str) -> Option<&str> {
        self.resolve(package_path).or_else(|| {
            model
                .module_relative(package_path)
                .and_then(|relative| self.resolve(relative))
        })
    }
}
