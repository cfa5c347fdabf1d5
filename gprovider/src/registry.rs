//! Provider registry with name-based routing and compatibility fallback.
//!
//! ```rust
//! use gprovider::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! assert!(registry.is_empty());
//! assert_eq!(registry.len(), 0);
//! ```

use std::sync::Arc;

use gcommon::Registry;

use crate::{ModelProvider, ProviderFamily};

#[derive(Default)]
pub struct ProviderRegistry {
    providers: Registry<ProviderFamily, Arc<dyn ModelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P>(&mut self, provider: P)
    where
        P: ModelProvider + 'static,
    {
        self.providers.insert(provider.family(), Arc::new(provider));
    }

    pub fn register_shared(&mut self, provider: Arc<dyn ModelProvider>) {
        self.providers.insert(provider.family(), provider);
    }

    pub fn get(&self, family: ProviderFamily) -> Option<Arc<dyn ModelProvider>> {
        self.providers.get(&family).cloned()
    }

    /// Routes a catalog provider name to an adapter. Unknown names fall back
    /// once to the OpenAI-compatible adapter, which covers most third-party
    /// gateways; there is no second fallback.
    pub fn route(&self, provider_name: &str) -> Option<Arc<dyn ModelProvider>> {
        let family = ProviderFamily::from_name(provider_name).unwrap_or(ProviderFamily::OpenAiCompat);
        self.get(family)
            .or_else(|| self.get(ProviderFamily::OpenAiCompat))
    }

    pub fn remove(&mut self, family: ProviderFamily) -> Option<Arc<dyn ModelProvider>> {
        self.providers.remove(&family)
    }

    pub fn contains(&self, family: ProviderFamily) -> bool {
        self.providers.contains_key(&family)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
