use std::collections::BTreeMap;
use std::sync::Arc;

use super::{AuthProvider, PermissiveProvider, ProviderConfig};
use crate::{Error, Result};

pub type ProviderFactory = fn(&BTreeMap<String, serde_json::Value>) -> Result<Arc<dyn AuthProvider>>;

/// Static lookup table of provider factories, keyed by [`ProviderConfig::class`]
/// (§9: "plug-in modules register an implementation factory through a known
/// symbol. No reflection beyond a lookup table is required."). Only the
/// bundled `permissive` factory is registered here; enterprise builds extend
/// this with their own [`ProviderRegistry::register`] calls before [`load`]
/// runs.
pub struct ProviderRegistry {
    factories: BTreeMap<&'static str, ProviderFactory>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: BTreeMap::new(),
        };
        registry.register("permissive", |_kwargs| Ok(Arc::new(PermissiveProvider)));
        registry
    }

    pub fn register(&mut self, class: &'static str, factory: ProviderFactory) {
        let _ = self.factories.insert(class, factory);
    }

    /// Look up, construct, and initialize the configured provider (§4.5).
    /// A `class` absent from the registry is a **fatal** startup error
    /// (§4.5, §7): the platform refuses to run without an explicitly
    /// chosen, recognized provider.
    pub async fn load(&self, config: &ProviderConfig) -> Result<Arc<dyn AuthProvider>> {
        let factory = self.factories.get(config.class.as_str()).ok_or_else(|| {
            Error::generic(format!(
                "no auth provider registered for class '{}'",
                config.class
            ))
            .with_name("E_AUTH_PROVIDER_UNKNOWN")
        })?;
        let provider = factory(&config.kwargs)?;
        provider.initialize().await?;
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_known_provider() {
        let registry = ProviderRegistry::new();
        let config = ProviderConfig {
            class: "permissive".to_string(),
            kwargs: BTreeMap::new(),
        };
        let provider = registry.load(&config).await.unwrap();
        assert!(provider.validate_token("x").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_load_unknown_provider_is_error() {
        let registry = ProviderRegistry::new();
        let config = ProviderConfig {
            class: "enterprise-sso".to_string(),
            kwargs: BTreeMap::new(),
        };
        assert!(registry.load(&config).await.is_err());
    }

    #[test]
    fn test_register_overrides_entry() {
        let mut registry = ProviderRegistry::new();
        registry.register("permissive", |_kwargs| Ok(Arc::new(PermissiveProvider)));
        assert!(registry.factories.contains_key("permissive"));
    }
}
