//! Plugin system error taxonomy.
//!
//! One closed set of error kinds shared by the registry, dependency graph,
//! conflict resolver, and lifecycle state machine. Every variant carries
//! enough context (`plugin_id`, `operation`, `message`) to log or surface
//! without the caller needing to downcast, plus an optional chained source.
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::version::VersionError;

pub type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("plugin not found: {plugin_id}")]
    NotFound { plugin_id: String },

    #[error("plugin already registered: {plugin_id}")]
    AlreadyExists { plugin_id: String },

    #[error("plugin '{plugin_id}' is not initialized (operation: {operation})")]
    NotInitialized { plugin_id: String, operation: String },

    #[error("plugin '{plugin_id}' is not active (operation: {operation})")]
    NotActive { plugin_id: String, operation: String },

    #[error("plugin '{plugin_id}' is already active")]
    AlreadyActive { plugin_id: String },

    #[error("invalid plugin id '{plugin_id}': {message}")]
    InvalidId { plugin_id: String, message: String },

    #[error("invalid version for plugin '{plugin_id}': {source}")]
    InvalidVersion {
        plugin_id: String,
        #[source]
        source: VersionError,
    },

    #[error("invalid configuration for plugin '{plugin_id}': {message}")]
    InvalidConfig {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Source>,
    },

    #[error("dependency not met for plugin '{plugin_id}': {message}")]
    DependencyNotMet {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Box<DependencyError>>,
    },

    #[error("plugin '{plugin_id}' does not support upgrade")]
    UpgradeNotSupported { plugin_id: String },

    #[error("upgrade failed for plugin '{plugin_id}': {message}")]
    UpgradeFailed {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Source>,
    },

    #[error("resource '{resource}' not found (requested by {plugin_id})")]
    ResourceNotFound { plugin_id: String, resource: String },

    #[error("resource '{resource}' invalid for plugin '{plugin_id}': {message}")]
    ResourceInvalid {
        plugin_id: String,
        resource: String,
        message: String,
    },

    #[error("operation '{operation}' timed out for plugin '{plugin_id}'")]
    OperationTimeout { plugin_id: String, operation: String },

    #[error("operation '{operation}' cancelled for plugin '{plugin_id}'")]
    OperationCancelled { plugin_id: String, operation: String },

    #[error("health check failed for plugin '{plugin_id}': {message}")]
    HealthCheckFailed {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Source>,
    },

    #[error("security violation for plugin '{plugin_id}': {message}")]
    SecurityViolation { plugin_id: String, message: String },

    #[error("dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),

    #[error("internal plugin system error: {0}")]
    InternalError(String),
}

impl PluginSystemError {
    /// The plugin id this error pertains to, where applicable.
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            Self::NotFound { plugin_id }
            | Self::AlreadyExists { plugin_id }
            | Self::NotInitialized { plugin_id, .. }
            | Self::NotActive { plugin_id, .. }
            | Self::AlreadyActive { plugin_id }
            | Self::InvalidId { plugin_id, .. }
            | Self::InvalidVersion { plugin_id, .. }
            | Self::InvalidConfig { plugin_id, .. }
            | Self::DependencyNotMet { plugin_id, .. }
            | Self::UpgradeNotSupported { plugin_id }
            | Self::UpgradeFailed { plugin_id, .. }
            | Self::ResourceNotFound { plugin_id, .. }
            | Self::ResourceInvalid { plugin_id, .. }
            | Self::OperationTimeout { plugin_id, .. }
            | Self::OperationCancelled { plugin_id, .. }
            | Self::HealthCheckFailed { plugin_id, .. }
            | Self::SecurityViolation { plugin_id, .. } => Some(plugin_id),
            Self::DependencyResolution(_) | Self::InternalError(_) => None,
        }
    }
}
