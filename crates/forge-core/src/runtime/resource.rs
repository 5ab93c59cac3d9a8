//! Type-erased resource store: a shared (`name`) and private (`owner:name`)
//! namespace held behind one lock, with access-tracked [`ResourceInfo`] kept
//! alongside each value.
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::kernel::constants::{
    RESOURCE_CLEANUP_SLOW_WARNING_SECS, RESOURCE_CLEANUP_SOFT_TIMEOUT_SECS,
    RESOURCE_SIZE_ESTIMATE_MAX_DEPTH, RESOURCE_SIZE_ESTIMATE_MAX_ELEMENTS,
};
use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::runtime::error::RuntimeSystemError;

type CleanupFuture = Pin<Box<dyn Future<Output = std::result::Result<(), String>> + Send>>;
/// A caller-supplied async cleanup callback, captured at registration time
/// while the concrete resource type is still known. Rust has no runtime
/// reflection, so unlike a hypothetical host-language probe chain
/// (shutdown/stop/close/...), the resource author decides what "graceful"
/// means for their own type and hands us a closure that does it.
type CleanupFn = Arc<dyn Fn() -> CleanupFuture + Send + Sync>;
/// Optional snapshot used for approximate size estimation.
type SnapshotFn = Arc<dyn Fn() -> serde_json::Value + Send + Sync>;

#[derive(Clone)]
struct StoredResource {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    cleanup: Option<CleanupFn>,
    snapshot: Option<SnapshotFn>,
}

#[derive(Debug, Clone)]
pub struct ResourceInfo {
    pub name: String,
    pub type_name: String,
    pub owner_plugin_id: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub access_count: u64,
    pub size_bytes: u64,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceStats {
    pub total: usize,
    pub shared_count: usize,
    pub private_count: usize,
    pub total_size_bytes: u64,
}

struct Inner {
    resources: HashMap<String, StoredResource>,
    info: HashMap<String, ResourceInfo>,
}

pub struct ResourceStore {
    inner: RwLock<Inner>,
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner { resources: HashMap::new(), info: HashMap::new() }) }
    }

    pub async fn register_shared<T>(&self, name: &str, value: Arc<T>) -> Result<()>
    where
        T: Any + Send + Sync + 'static,
    {
        self.register(name.to_string(), name, value, None, false, None, None).await
    }

    pub async fn register_shared_with_cleanup<T, F>(&self, name: &str, value: Arc<T>, cleanup: F) -> Result<()>
    where
        T: Any + Send + Sync + 'static,
        F: Fn() -> CleanupFuture + Send + Sync + 'static,
    {
        self.register(name.to_string(), name, value, None, false, Some(Arc::new(cleanup)), None).await
    }

    pub async fn register_private<T>(&self, owner_plugin_id: &str, name: &str, value: Arc<T>) -> Result<()>
    where
        T: Any + Send + Sync + 'static,
    {
        let key = format!("{}:{}", owner_plugin_id, name);
        self.register(key, name, value, Some(owner_plugin_id.to_string()), true, None, None).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn register<T>(
        &self,
        key: String,
        name: &str,
        value: Arc<T>,
        owner: Option<String>,
        is_private: bool,
        cleanup: Option<CleanupFn>,
        snapshot: Option<SnapshotFn>,
    ) -> Result<()>
    where
        T: Any + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(Error::RuntimeSystem(RuntimeSystemError::Resource(PluginSystemError::InvalidConfig {
                plugin_id: owner.clone().unwrap_or_default(),
                message: "resource name must not be empty".into(),
                source: None,
            })));
        }

        let type_name = std::any::type_name::<T>();
        let stale = {
            let mut inner = self.inner.write().await;
            match inner.resources.get(&key) {
                Some(existing) if existing.type_name != type_name => {
                    return Err(Error::RuntimeSystem(RuntimeSystemError::Resource(PluginSystemError::ResourceInvalid {
                        plugin_id: owner.unwrap_or_default(),
                        resource: name.to_string(),
                        message: format!(
                            "resource '{}' already registered with type '{}', cannot replace with '{}'",
                            name, existing.type_name, type_name
                        ),
                    })));
                }
                Some(_) => {
                    debug!(resource = %key, "replacing existing resource of the same type");
                    inner.resources.remove(&key)
                }
                None => None,
            }
        };

        // Detach and clean the stale value outside the lock.
        if let Some(stale) = stale {
            if let Some(cleanup) = stale.cleanup {
                if let Err(e) = run_graceful_cleanup(&key, cleanup).await {
                    warn!(resource = %key, error = %e, "cleanup of replaced resource failed");
                }
            }
        }

        let now = Utc::now();
        let mut inner = self.inner.write().await;
        inner.resources.insert(
            key.clone(),
            StoredResource { value, type_name, cleanup, snapshot: snapshot.clone() },
        );
        let size_bytes = estimate_size(snapshot.as_ref());
        inner.info.insert(
            key,
            ResourceInfo {
                name: name.to_string(),
                type_name: type_name.to_string(),
                owner_plugin_id: owner,
                is_private,
                created_at: now,
                last_used_at: now,
                access_count: 0,
                size_bytes,
                metadata: HashMap::new(),
            },
        );
        Ok(())
    }

    pub async fn get_shared<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync + 'static,
    {
        self.get(name).await
    }

    pub async fn get_private<T>(&self, owner_plugin_id: &str, name: &str) -> Result<Option<Arc<T>>>
    where
        T: Any + Send + Sync + 'static,
    {
        if owner_plugin_id.is_empty() {
            return Err(Error::RuntimeSystem(RuntimeSystemError::MissingPluginContext {
                operation: "get_private".into(),
            }));
        }
        let key = format!("{}:{}", owner_plugin_id, name);
        Ok(self.get(&key).await)
    }

    async fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync + 'static,
    {
        let mut inner = self.inner.write().await;
        let resource = inner.resources.get(key)?.value.clone();
        let typed = Arc::downcast::<T>(resource).ok()?;
        if let Some(info) = inner.info.get_mut(key) {
            info.access_count += 1;
            info.last_used_at = Utc::now();
        }
        Some(typed)
    }

    pub async fn get_resource_info(&self, key: &str) -> Option<ResourceInfo> {
        self.inner.read().await.info.get(key).cloned()
    }

    pub async fn list_resources(&self) -> Vec<ResourceInfo> {
        self.inner.read().await.info.values().cloned().collect()
    }

    pub async fn get_resource_stats(&self) -> ResourceStats {
        let inner = self.inner.read().await;
        let mut stats = ResourceStats::default();
        for info in inner.info.values() {
            stats.total += 1;
            if info.is_private {
                stats.private_count += 1;
            } else {
                stats.shared_count += 1;
            }
            stats.total_size_bytes += info.size_bytes;
        }
        stats
    }

    /// Cleans up resources owned by `plugin_id`. `None` is the privileged,
    /// empty-context form that cleans every resource in the store;
    /// `Some(id)` only cleans resources owned by `id`.
    pub async fn cleanup_resources(&self, plugin_id: Option<&str>) -> Result<()> {
        let targets: Vec<(String, StoredResource)> = {
            let inner = self.inner.read().await;
            inner
                .resources
                .iter()
                .filter(|(key, _)| match plugin_id {
                    None => true,
                    Some(owner) => inner.info.get(*key).and_then(|i| i.owner_plugin_id.as_deref()) == Some(owner),
                })
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };

        let mut errors = Vec::new();
        for (key, resource) in &targets {
            if let Some(cleanup) = resource.cleanup.clone() {
                if let Err(e) = run_graceful_cleanup(key, cleanup).await {
                    errors.push(format!("{}: {}", key, e));
                }
            }
        }

        let mut inner = self.inner.write().await;
        for (key, _) in &targets {
            inner.resources.remove(key);
            inner.info.remove(key);
        }
        drop(inner);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::RuntimeSystem(RuntimeSystemError::Resource(PluginSystemError::ResourceInvalid {
                plugin_id: plugin_id.unwrap_or("<privileged>").to_string(),
                resource: "<multiple>".to_string(),
                message: format!("cleanup errors: {}", errors.join("; ")),
            })))
        }
    }
}

async fn run_graceful_cleanup(key: &str, cleanup: CleanupFn) -> std::result::Result<(), String> {
    let started = tokio::time::Instant::now();
    let handle = tokio::spawn(async move { cleanup().await });
    let result = timeout(Duration::from_secs(RESOURCE_CLEANUP_SOFT_TIMEOUT_SECS), handle).await;

    let elapsed = started.elapsed();
    if elapsed > Duration::from_secs(RESOURCE_CLEANUP_SLOW_WARNING_SECS) {
        warn!(resource = %key, elapsed_secs = elapsed.as_secs(), "slow cleanup");
    }

    match result {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(msg))) => Err(msg),
        Ok(Err(join_err)) if join_err.is_panic() => Err("cleanup panicked".to_string()),
        Ok(Err(join_err)) => Err(join_err.to_string()),
        Err(_) => Err("cleanup exceeded soft timeout".to_string()),
    }
}

/// Recursively estimates a resource's size from its JSON snapshot, bounded
/// by depth and per-collection element caps. Falls back to zero for
/// resources with no snapshot — Rust gives us no way to introspect an
/// arbitrary `dyn Any` payload's memory footprint.
fn estimate_size(snapshot: Option<&SnapshotFn>) -> u64 {
    match snapshot {
        Some(f) => estimate_json_size(&f(), 0),
        None => 0,
    }
}

fn estimate_json_size(value: &serde_json::Value, depth: usize) -> u64 {
    if depth >= RESOURCE_SIZE_ESTIMATE_MAX_DEPTH {
        return 0;
    }
    match value {
        serde_json::Value::Null => 0,
        serde_json::Value::Bool(_) => 1,
        serde_json::Value::Number(_) => 8,
        serde_json::Value::String(s) => s.len() as u64,
        serde_json::Value::Array(items) => items
            .iter()
            .take(RESOURCE_SIZE_ESTIMATE_MAX_ELEMENTS)
            .map(|v| estimate_json_size(v, depth + 1))
            .sum(),
        serde_json::Value::Object(map) => map
            .iter()
            .take(RESOURCE_SIZE_ESTIMATE_MAX_ELEMENTS)
            .map(|(k, v)| k.len() as u64 + estimate_json_size(v, depth + 1))
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_and_get_shared_round_trips() {
        let store = ResourceStore::new();
        store.register_shared("counter", Arc::new(42i32)).await.unwrap();
        let got: Arc<i32> = store.get_shared("counter").await.unwrap();
        assert_eq!(*got, 42);
        let info = store.get_resource_info("counter").await.unwrap();
        assert_eq!(info.access_count, 1);
    }

    #[tokio::test]
    async fn private_resources_require_owner_context() {
        let store = ResourceStore::new();
        store.register_private("plugin.a", "state", Arc::new(String::from("x"))).await.unwrap();
        let denied = store.get_private::<String>("", "state").await;
        assert!(denied.is_err());
        let got: Arc<String> = store.get_private("plugin.a", "state").await.unwrap().unwrap();
        assert_eq!(*got, "x");
    }

    #[tokio::test]
    async fn type_mismatch_on_replace_is_rejected() {
        let store = ResourceStore::new();
        store.register_shared("thing", Arc::new(1i32)).await.unwrap();
        let err = store.register_shared("thing", Arc::new("nope".to_string())).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn cleanup_resources_is_owner_scoped() {
        let store = ResourceStore::new();
        store.register_private("plugin.a", "a-state", Arc::new(1i32)).await.unwrap();
        store.register_private("plugin.b", "b-state", Arc::new(2i32)).await.unwrap();
        store.cleanup_resources(Some("plugin.a")).await.unwrap();
        assert!(store.get_resource_info("plugin.a:a-state").await.is_none());
        assert!(store.get_resource_info("plugin.b:b-state").await.is_some());
    }
}
