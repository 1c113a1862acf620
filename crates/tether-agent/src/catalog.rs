//! Provider alias to model id mapping.

use std::collections::HashMap;

/// Default provider used when a request does not name one.
pub const DEFAULT_PROVIDER: &str = "nova-lite";

/// Maps short provider names to backend model ids.
///
/// Providers without an alias are passed through unchanged, so a full model id
/// can be used as a provider name directly.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    aliases: HashMap<String, String>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::empty()
            .with_alias("nova-lite", "amazon.nova-lite-v1:0")
            .with_alias("anthropic", "anthropic.claude-3-sonnet-20240229-v1:0")
    }
}

impl ModelCatalog {
    /// A catalog with no aliases.
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Add or replace an alias.
    pub fn with_alias(mut self, provider: impl Into<String>, model_id: impl Into<String>) -> Self {
        self.aliases.insert(provider.into(), model_id.into());
        self
    }

    /// Add every alias from `aliases`, replacing existing ones.
    pub fn extend<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resolve a provider name to a model id.
    pub fn resolve(&self, provider: &str) -> String {
        self.aliases
            .get(provider)
            .cloned()
            .unwrap_or_else(|| provider.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_aliases() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.resolve("nova-lite"), "amazon.nova-lite-v1:0");
        assert_eq!(
            catalog.resolve("anthropic"),
            "anthropic.claude-3-sonnet-20240229-v1:0"
        );
    }

    #[test]
    fn test_unknown_provider_passes_through() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.resolve("gpt-4o-mini"), "gpt-4o-mini");
    }

    #[test]
    fn test_extend_overrides() {
        let catalog = ModelCatalog::default().extend([("nova-lite", "amazon.nova-pro-v1:0")]);
        assert_eq!(catalog.resolve("nova-lite"), "amazon.nova-pro-v1:0");
    }
}
