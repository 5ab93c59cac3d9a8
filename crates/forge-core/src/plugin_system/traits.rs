use std::fmt;

use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::plugin_system::dependency::Dependency;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::ApiVersion;
use crate::event::filter::EventFilter;
use crate::runtime::environment::Runtime;

/// Where a plugin sits in its lifecycle state machine. Transitions are only
/// ever made by `plugin_system::lifecycle`; nothing else assigns this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    Inactive,
    Initializing,
    Active,
    Suspended,
    Stopping,
    Terminated,
    Failed,
    Upgrading,
    Rollback,
}

impl PluginStatus {
    /// Terminal states never transition further without external intervention.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PluginStatus::Terminated | PluginStatus::Failed)
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PluginStatus::Inactive => "inactive",
            PluginStatus::Initializing => "initializing",
            PluginStatus::Active => "active",
            PluginStatus::Suspended => "suspended",
            PluginStatus::Stopping => "stopping",
            PluginStatus::Terminated => "terminated",
            PluginStatus::Failed => "failed",
            PluginStatus::Upgrading => "upgrading",
            PluginStatus::Rollback => "rollback",
        };
        write!(f, "{}", s)
    }
}

/// What kind of in-place upgrade a plugin supports, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeCapability {
    None,
    ConfigUpgrade,
    VersionUpgrade,
    Replace,
}

/// Health status returned by [`Plugin::check_health`] by way of
/// `plugin_system::lifecycle::get_health`.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub message: String,
    pub details: std::collections::HashMap<String, String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Suspended,
    Upgrading,
    RollingBack,
    Initializing,
    Inactive,
    Stopping,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Suspended => "suspended",
            HealthStatus::Upgrading => "upgrading",
            HealthStatus::RollingBack => "rolling-back",
            HealthStatus::Initializing => "initializing",
            HealthStatus::Inactive => "inactive",
            HealthStatus::Stopping => "stopping",
        };
        write!(f, "{}", s)
    }
}

/// Core trait every plugin implements. Identity and metadata are plain
/// getters; lifecycle steps are async hooks the lifecycle state machine
/// calls at the appropriate transition. Plugins are held as
/// `Arc<dyn Plugin>`, so all methods take `&self` — any internal state a
/// plugin needs across calls must use interior mutability.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Canonical or legacy-bare plugin id, used as the registry/graph key.
    fn id(&self) -> &str;

    fn name(&self) -> &str {
        self.id()
    }

    fn description(&self) -> &str {
        ""
    }

    fn version(&self) -> ApiVersion;

    /// Config subtree this plugin reads its settings from, if any.
    fn config_prefix(&self) -> Option<&str> {
        None
    }

    /// Tie-break weight used by the resolver's topological sort: higher
    /// weight plugins are scheduled first among otherwise-equal candidates.
    fn weight(&self) -> i32 {
        0
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    fn capabilities(&self) -> Vec<UpgradeCapability> {
        vec![UpgradeCapability::None]
    }

    fn has_capability(&self, capability: UpgradeCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Subscription filter applied to events this plugin receives via its
    /// runtime's event bus listener, if it registers one.
    fn event_filters(&self) -> EventFilter {
        EventFilter::match_all()
    }

    /// Whether this plugin implements true cancellation in its `*_context`
    /// lifecycle variants rather than relying on the default best-effort
    /// background-task wrapper.
    fn is_context_aware(&self) -> bool {
        false
    }

    /// Called once during `Initialize`, before the plugin is considered
    /// ready. Acquire resources, register shared state, etc.
    async fn initialize_resources(&self, _runtime: &Runtime) -> Result<()> {
        Ok(())
    }

    /// Called once during `Start`, after resources are initialized.
    async fn startup_tasks(&self, _runtime: &Runtime) -> Result<()> {
        Ok(())
    }

    /// Called once during `Stop`, before the plugin is marked terminated.
    async fn cleanup_tasks(&self, _runtime: &Runtime) -> Result<()> {
        Ok(())
    }

    /// Invoked after a successful `Start`, and again whenever a host asks
    /// for this plugin's health while it is active.
    async fn check_health(&self, _runtime: &Runtime) -> Result<()> {
        Ok(())
    }

    /// Runs the actual upgrade; only called when capability allows it and
    /// the plugin is already in the `Upgrading` state.
    async fn execute_upgrade(&self, _runtime: &Runtime, _target_version: &ApiVersion) -> Result<()> {
        Err(PluginSystemError::UpgradeNotSupported { plugin_id: self.id().to_string() }.into())
    }

    /// Reverts an in-progress or failed upgrade back to `previous_version`.
    async fn rollback_upgrade(&self, _runtime: &Runtime, _previous_version: &ApiVersion) -> Result<()> {
        Err(PluginSystemError::UpgradeNotSupported { plugin_id: self.id().to_string() }.into())
    }
}
