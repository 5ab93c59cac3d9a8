//! Generalizes `kernel::component::KernelComponent`'s `initialize`/`start`/
//! `stop` shape into the full plugin status state machine: transitions emit
//! lifecycle/health/upgrade/rollback events and demote to `Failed` on fatal
//! error, matching the non-terminal/terminal split on [`PluginStatus`].
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::event::{EventKind, HealthEvent, LifecycleEvent, PluginEvent, RollbackEvent, UpgradeEvent};
use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{HealthReport, HealthStatus, Plugin, PluginStatus, UpgradeCapability};
use crate::plugin_system::version::ApiVersion;
use crate::runtime::environment::Runtime;

/// Owns one plugin's status and drives it through the state machine,
/// emitting matching events on the plugin's scoped runtime at every step.
pub struct PluginLifecycle {
    plugin: Arc<dyn Plugin>,
    runtime: Runtime,
    status: RwLock<PluginStatus>,
    version: RwLock<ApiVersion>,
}

fn status_to_health(status: PluginStatus) -> HealthStatus {
    match status {
        PluginStatus::Active => HealthStatus::Healthy,
        PluginStatus::Failed => HealthStatus::Unhealthy,
        PluginStatus::Suspended => HealthStatus::Suspended,
        PluginStatus::Upgrading => HealthStatus::Upgrading,
        PluginStatus::Rollback => HealthStatus::RollingBack,
        PluginStatus::Initializing => HealthStatus::Initializing,
        PluginStatus::Inactive => HealthStatus::Inactive,
        PluginStatus::Stopping | PluginStatus::Terminated => HealthStatus::Stopping,
    }
}

impl PluginLifecycle {
    pub fn new(plugin: Arc<dyn Plugin>, base_runtime: &Runtime) -> Self {
        let version = plugin.version();
        PluginLifecycle {
            runtime: Runtime::clone(base_runtime),
            plugin,
            status: RwLock::new(PluginStatus::Inactive),
            version: RwLock::new(version),
        }
    }

    pub fn plugin_id(&self) -> &str {
        self.plugin.id()
    }

    pub async fn status(&self) -> PluginStatus {
        *self.status.read().await
    }

    /// The version currently in effect — the plugin's declared version
    /// until an upgrade completes, or the rolled-back version after a
    /// failed one.
    pub async fn version(&self) -> ApiVersion {
        self.version.read().await.clone()
    }

    async fn emit(&self, kind: EventKind, status: Option<&str>) {
        let mut builder = PluginEvent::builder(self.plugin.id(), kind);
        if let Some(status) = status {
            builder = builder.status(status);
        }
        self.runtime.emit_event(builder.build()).await;
    }

    async fn set_status(&self, status: PluginStatus) {
        *self.status.write().await = status;
    }

    fn not_initialized(&self, operation: &str) -> Error {
        PluginSystemError::NotInitialized { plugin_id: self.plugin.id().to_string(), operation: operation.to_string() }
            .into()
    }

    /// Requires a runtime be available (it always is, post-construction);
    /// runs `InitializeResources`, demoting to `Failed` on error.
    pub async fn initialize(&self) -> Result<()> {
        self.emit(EventKind::Lifecycle(LifecycleEvent::Initializing), None).await;
        self.set_status(PluginStatus::Initializing).await;

        match self.plugin.initialize_resources(&self.runtime).await {
            Ok(()) => {
                self.set_status(PluginStatus::Inactive).await;
                self.emit(EventKind::Lifecycle(LifecycleEvent::Initialized), None).await;
                Ok(())
            }
            Err(err) => {
                self.set_status(PluginStatus::Failed).await;
                error!(plugin = self.plugin.id(), error = %err, "plugin initialization failed");
                Err(err)
            }
        }
    }

    pub async fn start(&self) -> Result<()> {
        if *self.status.read().await == PluginStatus::Active {
            return Err(PluginSystemError::AlreadyActive { plugin_id: self.plugin.id().to_string() }.into());
        }
        self.emit(EventKind::Lifecycle(LifecycleEvent::Starting), None).await;
        self.set_status(PluginStatus::Initializing).await;

        if let Err(err) = self.plugin.startup_tasks(&self.runtime).await {
            self.set_status(PluginStatus::Failed).await;
            error!(plugin = self.plugin.id(), error = %err, "plugin startup failed");
            return Err(err);
        }

        self.set_status(PluginStatus::Active).await;
        self.emit(EventKind::Lifecycle(LifecycleEvent::Started), None).await;

        if let Err(err) = self.plugin.check_health(&self.runtime).await {
            warn!(plugin = self.plugin.id(), error = %err, "post-start health check failed");
            return Err(err);
        }
        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        if *self.status.read().await != PluginStatus::Active {
            return Err(PluginSystemError::NotActive { plugin_id: self.plugin.id().to_string(), operation: "Stop".to_string() }.into());
        }
        self.emit(EventKind::Lifecycle(LifecycleEvent::Stopping), None).await;
        self.set_status(PluginStatus::Stopping).await;

        if let Err(err) = self.plugin.cleanup_tasks(&self.runtime).await {
            self.set_status(PluginStatus::Failed).await;
            error!(plugin = self.plugin.id(), error = %err, "plugin cleanup failed");
            return Err(err);
        }

        self.set_status(PluginStatus::Terminated).await;
        self.emit(EventKind::Lifecycle(LifecycleEvent::Stopped), None).await;
        Ok(())
    }

    pub async fn suspend(&self) -> Result<()> {
        if *self.status.read().await != PluginStatus::Active {
            return Err(PluginSystemError::NotActive { plugin_id: self.plugin.id().to_string(), operation: "Suspend".to_string() }.into());
        }
        self.set_status(PluginStatus::Suspended).await;
        self.emit(EventKind::Health(HealthEvent::StatusChanged), Some("suspended")).await;
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        if *self.status.read().await != PluginStatus::Suspended {
            return Err(PluginSystemError::NotActive { plugin_id: self.plugin.id().to_string(), operation: "Resume".to_string() }.into());
        }
        self.set_status(PluginStatus::Active).await;
        self.emit(EventKind::Health(HealthEvent::StatusChanged), Some("active")).await;
        Ok(())
    }

    pub async fn prepare_upgrade(&self, target: &ApiVersion) -> Result<()> {
        let allowed = self.plugin.has_capability(UpgradeCapability::ConfigUpgrade)
            || self.plugin.has_capability(UpgradeCapability::VersionUpgrade);
        if !allowed {
            return Err(PluginSystemError::UpgradeNotSupported { plugin_id: self.plugin.id().to_string() }.into());
        }
        if *self.status.read().await != PluginStatus::Active {
            return Err(PluginSystemError::NotActive { plugin_id: self.plugin.id().to_string(), operation: "PrepareUpgrade".to_string() }.into());
        }
        self.set_status(PluginStatus::Upgrading).await;
        self.emit(EventKind::Upgrade(UpgradeEvent::Initiated), Some(&target.to_string())).await;
        Ok(())
    }

    /// On failure, attempts an automatic rollback to the version recorded
    /// before this upgrade began; if rollback also fails, demotes to
    /// `Failed` and returns the compound error.
    pub async fn execute_upgrade(&self, target: &ApiVersion) -> Result<()> {
        if *self.status.read().await != PluginStatus::Upgrading {
            return Err(PluginSystemError::NotActive { plugin_id: self.plugin.id().to_string(), operation: "ExecuteUpgrade".to_string() }.into());
        }
        let previous = self.version.read().await.clone();

        match self.plugin.execute_upgrade(&self.runtime, target).await {
            Ok(()) => {
                *self.version.write().await = target.clone();
                self.set_status(PluginStatus::Active).await;
                self.emit(EventKind::Upgrade(UpgradeEvent::Completed), Some(&target.to_string())).await;
                Ok(())
            }
            Err(upgrade_err) => {
                self.emit(EventKind::Upgrade(UpgradeEvent::Failed), Some(&upgrade_err.to_string())).await;
                match self.rollback_upgrade(&previous).await {
                    Ok(()) => Err(upgrade_err),
                    Err(rollback_err) => {
                        self.set_status(PluginStatus::Failed).await;
                        Err(Error::Other(format!(
                            "upgrade to {} failed ({}), and automatic rollback to {} also failed ({})",
                            target, upgrade_err, previous, rollback_err
                        )))
                    }
                }
            }
        }
    }

    pub async fn rollback_upgrade(&self, previous: &ApiVersion) -> Result<()> {
        let status = *self.status.read().await;
        if status != PluginStatus::Upgrading && status != PluginStatus::Failed {
            return Err(PluginSystemError::NotActive { plugin_id: self.plugin.id().to_string(), operation: "RollbackUpgrade".to_string() }.into());
        }
        self.emit(EventKind::Rollback(RollbackEvent::Initiated), Some(&previous.to_string())).await;

        match self.plugin.rollback_upgrade(&self.runtime, previous).await {
            Ok(()) => {
                *self.version.write().await = previous.clone();
                self.set_status(PluginStatus::Active).await;
                self.emit(EventKind::Rollback(RollbackEvent::Completed), Some(&previous.to_string())).await;
                Ok(())
            }
            Err(err) => {
                self.set_status(PluginStatus::Failed).await;
                self.emit(EventKind::Rollback(RollbackEvent::Failed), Some(&err.to_string())).await;
                Err(err)
            }
        }
    }

    /// Maps status to a textual health, emits a matching health event, and
    /// (only while `Active`) invokes the plugin's own health check.
    pub async fn get_health(&self) -> HealthReport {
        let status = *self.status.read().await;
        let health_status = status_to_health(status);
        self.emit(EventKind::Health(HealthEvent::CheckStarted), None).await;

        let (message, health_status) = if status == PluginStatus::Active {
            match self.plugin.check_health(&self.runtime).await {
                Ok(()) => ("ok".to_string(), health_status),
                Err(err) => (err.to_string(), HealthStatus::Unhealthy),
            }
        } else {
            (format!("plugin is {}", status), health_status)
        };

        let event_kind = match health_status {
            HealthStatus::Healthy => HealthEvent::StatusOk,
            HealthStatus::Unhealthy => HealthEvent::StatusCritical,
            _ => HealthEvent::StatusUnknown,
        };
        self.emit(EventKind::Health(event_kind), Some(&health_status.to_string())).await;

        HealthReport {
            status: health_status,
            message,
            details: std::collections::HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Best-effort cancellation wrapper: runs `initialize` on a background
    /// task and returns early if `token` is cancelled first, but does not
    /// interrupt the inner work (it keeps running to completion). Plugins
    /// wanting true cancellation should set `is_context_aware()` and the
    /// host should enforce its own deadline instead of relying on this.
    pub async fn initialize_context(self: &Arc<Self>, token: CancellationToken) -> Result<()> {
        self.run_context(token, |lifecycle| Box::pin(async move { lifecycle.initialize().await })).await
    }

    pub async fn start_context(self: &Arc<Self>, token: CancellationToken) -> Result<()> {
        self.run_context(token, |lifecycle| Box::pin(async move { lifecycle.start().await })).await
    }

    pub async fn stop_context(self: &Arc<Self>, token: CancellationToken) -> Result<()> {
        self.run_context(token, |lifecycle| Box::pin(async move { lifecycle.stop().await })).await
    }

    async fn run_context<F>(self: &Arc<Self>, token: CancellationToken, f: F) -> Result<()>
    where
        F: FnOnce(Arc<Self>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let lifecycle = Arc::clone(self);
        tokio::spawn(async move {
            let result = f(lifecycle).await;
            let _ = tx.send(result);
        });

        tokio::select! {
            result = rx => result.map_err(|_| Error::Other("lifecycle task panicked before completing".to_string()))?,
            _ = token.cancelled() => Err(PluginSystemError::OperationCancelled {
                plugin_id: self.plugin.id().to_string(),
                operation: "lifecycle context operation".to_string(),
            }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin_system::dependency::Dependency;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingPlugin {
        id: String,
        fail_start: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Plugin for CountingPlugin {
        fn id(&self) -> &str {
            &self.id
        }

        fn version(&self) -> ApiVersion {
            ApiVersion::new(1, 0, 0)
        }

        fn dependencies(&self) -> Vec<Dependency> {
            Vec::new()
        }

        async fn startup_tasks(&self, _runtime: &Runtime) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_start {
                Err(PluginSystemError::InternalError("boom".to_string()).into())
            } else {
                Ok(())
            }
        }
    }

    async fn test_runtime() -> Runtime {
        let dir = tempdir().unwrap();
        let provider = Arc::new(crate::storage::local::LocalStorageProvider::new(dir.path().to_path_buf()));
        let config = Arc::new(crate::storage::config::ConfigManager::new(
            provider,
            dir.path().join("app"),
            dir.path().join("plugins"),
            crate::storage::config::ConfigFormat::Json,
        ));
        Runtime::new(
            Arc::new(crate::runtime::resource::ResourceStore::new()),
            Arc::new(crate::event::EventBus::new()),
            config,
        )
    }

    #[tokio::test]
    async fn start_transitions_to_active_and_emits_events() {
        let runtime = test_runtime().await;
        let plugin: Arc<dyn Plugin> = Arc::new(CountingPlugin { id: "a".to_string(), fail_start: false, calls: AtomicUsize::new(0) });
        let lifecycle = PluginLifecycle::new(plugin, &runtime);
        lifecycle.initialize().await.unwrap();
        lifecycle.start().await.unwrap();
        assert_eq!(lifecycle.status().await, PluginStatus::Active);
    }

    #[tokio::test]
    async fn failed_startup_demotes_to_failed() {
        let runtime = test_runtime().await;
        let plugin: Arc<dyn Plugin> = Arc::new(CountingPlugin { id: "a".to_string(), fail_start: true, calls: AtomicUsize::new(0) });
        let lifecycle = PluginLifecycle::new(plugin, &runtime);
        lifecycle.initialize().await.unwrap();
        assert!(lifecycle.start().await.is_err());
        assert_eq!(lifecycle.status().await, PluginStatus::Failed);
    }

    #[tokio::test]
    async fn stop_requires_active() {
        let runtime = test_runtime().await;
        let plugin: Arc<dyn Plugin> = Arc::new(CountingPlugin { id: "a".to_string(), fail_start: false, calls: AtomicUsize::new(0) });
        let lifecycle = PluginLifecycle::new(plugin, &runtime);
        assert!(lifecycle.stop().await.is_err());
    }

    #[tokio::test]
    async fn context_variant_respects_cancellation() {
        let runtime = test_runtime().await;
        let plugin: Arc<dyn Plugin> = Arc::new(CountingPlugin { id: "a".to_string(), fail_start: false, calls: AtomicUsize::new(0) });
        let lifecycle = Arc::new(PluginLifecycle::new(plugin, &runtime));
        let token = CancellationToken::new();
        token.cancel();
        let result = lifecycle.initialize_context(token).await;
        assert!(result.is_err());
    }
}
