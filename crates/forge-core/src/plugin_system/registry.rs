//! Plugin registry/factory: maps a plugin name to the closure that builds a
//! fresh instance of it, plus which config prefixes it is reachable under.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;

type Creator = Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;

#[derive(Default)]
struct Inner {
    creators: HashMap<String, Creator>,
    config_mapping: HashMap<String, Vec<String>>,
}

/// Concurrent-safe plugin factory. Plugins are never stored as live
/// instances here — only the closure that builds one — so registration
/// and creation can be called from any number of readers/writers.
#[derive(Default)]
pub struct PluginRegistry {
    inner: RwLock<Inner>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `creator` under `name`. Fails with `AlreadyExists` if a
    /// creator is already registered under `name` — the registry only ever
    /// holds one creator per name. `config_prefix`, if given, is recorded as
    /// this name's first config-prefix membership; use [`Self::map_to_prefix`]
    /// to expose an already-registered plugin under additional prefixes.
    pub async fn register(
        &self,
        name: &str,
        config_prefix: Option<&str>,
        creator: Creator,
    ) -> Result<(), PluginSystemError> {
        let mut inner = self.inner.write().await;
        if inner.creators.contains_key(name) {
            return Err(PluginSystemError::AlreadyExists { plugin_id: name.to_string() });
        }
        inner.creators.insert(name.to_string(), creator);

        if let Some(prefix) = config_prefix {
            let members = inner.config_mapping.entry(prefix.to_string()).or_default();
            members.push(name.to_string());
        }
        Ok(())
    }

    /// Exposes an already-registered plugin under an additional config
    /// prefix. Mapping the same name into the same prefix twice is logged
    /// (not rejected) and deduplicated within that prefix's member list.
    pub async fn map_to_prefix(&self, name: &str, config_prefix: &str) -> Result<(), PluginSystemError> {
        let mut inner = self.inner.write().await;
        if !inner.creators.contains_key(name) {
            return Err(PluginSystemError::NotFound { plugin_id: name.to_string() });
        }
        let members = inner.config_mapping.entry(config_prefix.to_string()).or_default();
        if members.iter().any(|m| m == name) {
            tracing::warn!(plugin = name, prefix = config_prefix, "plugin already mapped to this config prefix");
        } else {
            members.push(name.to_string());
        }
        Ok(())
    }

    /// Builds a fresh instance via the registered creator.
    pub async fn create(&self, name: &str) -> Result<Arc<dyn Plugin>, PluginSystemError> {
        let inner = self.inner.read().await;
        let creator = inner
            .creators
            .get(name)
            .ok_or_else(|| PluginSystemError::NotFound { plugin_id: name.to_string() })?;
        Ok(creator())
    }

    /// Removes the creator and drops `name` from every config prefix it was
    /// mapped to, removing prefixes left with no members.
    pub async fn unregister(&self, name: &str) -> Result<(), PluginSystemError> {
        let mut inner = self.inner.write().await;
        if inner.creators.remove(name).is_none() {
            return Err(PluginSystemError::NotFound { plugin_id: name.to_string() });
        }
        inner.config_mapping.retain(|_, members| {
            members.retain(|m| m != name);
            !members.is_empty()
        });
        Ok(())
    }

    pub async fn is_registered(&self, name: &str) -> bool {
        self.inner.read().await.creators.contains_key(name)
    }

    pub async fn registered_names(&self) -> Vec<String> {
        self.inner.read().await.creators.keys().cloned().collect()
    }

    pub async fn names_for_prefix(&self, config_prefix: &str) -> Vec<String> {
        self.inner
            .read()
            .await
            .config_mapping
            .get(config_prefix)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin_system::dependency::Dependency;
    use crate::plugin_system::version::ApiVersion;
    use async_trait::async_trait;

    struct Dummy(String);

    #[async_trait]
    impl Plugin for Dummy {
        fn id(&self) -> &str {
            &self.0
        }

        fn version(&self) -> ApiVersion {
            ApiVersion::new(1, 0, 0)
        }

        fn dependencies(&self) -> Vec<Dependency> {
            Vec::new()
        }
    }

    fn creator_for(name: &str) -> Creator {
        let name = name.to_string();
        Arc::new(move || Arc::new(Dummy(name.clone())) as Arc<dyn Plugin>)
    }

    #[tokio::test]
    async fn register_then_create_returns_fresh_instance() {
        let registry = PluginRegistry::new();
        registry.register("a", Some("plugins.a"), creator_for("a")).await.unwrap();
        let plugin = registry.create("a").await.unwrap();
        assert_eq!(plugin.id(), "a");
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let registry = PluginRegistry::new();
        registry.register("a", None, creator_for("a")).await.unwrap();
        let err = registry.register("a", None, creator_for("a")).await.unwrap_err();
        assert!(matches!(err, PluginSystemError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn unregister_drops_empty_prefix() {
        let registry = PluginRegistry::new();
        registry.register("a", Some("shared"), creator_for("a")).await.unwrap();
        registry.unregister("a").await.unwrap();
        assert!(registry.names_for_prefix("shared").await.is_empty());
        assert!(!registry.is_registered("a").await);
    }

    #[tokio::test]
    async fn duplicate_prefix_membership_is_deduplicated() {
        let registry = PluginRegistry::new();
        registry.register("a", Some("p1"), creator_for("a")).await.unwrap();
        registry.map_to_prefix("a", "p1").await.unwrap();
        assert_eq!(registry.names_for_prefix("p1").await, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn map_to_prefix_exposes_a_plugin_under_a_second_prefix() {
        let registry = PluginRegistry::new();
        registry.register("a", Some("p1"), creator_for("a")).await.unwrap();
        registry.map_to_prefix("a", "p2").await.unwrap();
        assert_eq!(registry.names_for_prefix("p1").await, vec!["a".to_string()]);
        assert_eq!(registry.names_for_prefix("p2").await, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn map_to_prefix_fails_for_an_unregistered_name() {
        let registry = PluginRegistry::new();
        let err = registry.map_to_prefix("ghost", "p1").await.unwrap_err();
        assert!(matches!(err, PluginSystemError::NotFound { .. }));
    }
}
