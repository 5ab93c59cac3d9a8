//! The per-plugin runtime environment: a scoped handle onto the
//! process-wide resource store, event bus, and config manager, plus a
//! plugin-context string that gates private resource access.
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::event::{EventBus, EventFilter, EventListener, PluginEvent};
use crate::kernel::error::Result;
use crate::runtime::error::RuntimeSystemError;
use crate::runtime::resource::{ResourceInfo, ResourceStats, ResourceStore};
use crate::storage::config::ConfigManager;

/// Composes the resource store, event bus, and config manager a plugin sees
/// during its lifecycle. `resources` and `event_bus` are shared (the same
/// underlying instances back every plugin's `Runtime`); `context` is not —
/// each scoped runtime owns its own, set once via [`Runtime::with_plugin_context`].
#[derive(Clone)]
pub struct Runtime {
    resources: Arc<ResourceStore>,
    event_bus: Arc<EventBus>,
    config: Arc<ConfigManager>,
    context: Arc<RwLock<String>>,
}

impl Runtime {
    pub fn new(resources: Arc<ResourceStore>, event_bus: Arc<EventBus>, config: Arc<ConfigManager>) -> Self {
        Self { resources, event_bus, config, context: Arc::new(RwLock::new(String::new())) }
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub async fn current_plugin_context(&self) -> String {
        self.context.read().await.clone()
    }

    /// Forges a new `Runtime` scoped to `name`, sharing the same resource
    /// store/event bus/config. Only a currently-unscoped runtime may be
    /// forged into a named one; an already-scoped runtime forging into a
    /// *different* name is refused and the original is returned unchanged.
    pub async fn with_plugin_context(&self, name: &str) -> Runtime {
        let current = self.context.read().await.clone();
        if current.is_empty() && !name.is_empty() {
            return Runtime {
                resources: self.resources.clone(),
                event_bus: self.event_bus.clone(),
                config: self.config.clone(),
                context: Arc::new(RwLock::new(name.to_string())),
            };
        }
        if current == name {
            return self.clone();
        }
        warn!(current = %current, requested = %name, "refused to forge plugin context");
        self.clone()
    }

    async fn require_context(&self, operation: &str) -> Result<String> {
        let ctx = self.current_plugin_context().await;
        if ctx.is_empty() {
            return Err(crate::kernel::error::Error::RuntimeSystem(RuntimeSystemError::MissingPluginContext {
                operation: operation.to_string(),
            }));
        }
        Ok(ctx)
    }

    pub async fn register_private<T>(&self, name: &str, value: Arc<T>) -> Result<()>
    where
        T: std::any::Any + Send + Sync + 'static,
    {
        let ctx = self.require_context("register_private").await?;
        self.resources.register_private(&ctx, name, value).await
    }

    pub async fn get_private<T>(&self, name: &str) -> Result<Option<Arc<T>>>
    where
        T: std::any::Any + Send + Sync + 'static,
    {
        let ctx = self.require_context("get_private").await?;
        self.resources.get_private(&ctx, name).await
    }

    pub async fn get_shared<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: std::any::Any + Send + Sync + 'static,
    {
        self.resources.get_shared(name).await
    }

    pub async fn get_resource_info(&self, key: &str) -> Option<ResourceInfo> {
        self.resources.get_resource_info(key).await
    }

    pub async fn list_resources(&self) -> Vec<ResourceInfo> {
        self.resources.list_resources().await
    }

    pub async fn get_resource_stats(&self) -> ResourceStats {
        self.resources.get_resource_stats().await
    }

    /// Cleans up resources owned by the current plugin context, or every
    /// resource in the store if called with no context set (privileged).
    pub async fn cleanup_resources(&self) -> Result<()> {
        let ctx = self.current_plugin_context().await;
        if ctx.is_empty() {
            self.resources.cleanup_resources(None).await
        } else {
            self.resources.cleanup_resources(Some(&ctx)).await
        }
    }

    pub async fn emit_event(&self, event: PluginEvent) {
        self.event_bus.publish(event).await;
    }

    pub async fn add_listener(&self, filter: EventFilter, handler: Arc<dyn EventListener>) -> uuid::Uuid {
        self.event_bus.subscribe(filter, handler).await
    }

    /// Idempotent: shutting down an already-shut-down runtime is a no-op.
    pub async fn shutdown(&self) -> Result<()> {
        self.cleanup_resources().await
    }
}
