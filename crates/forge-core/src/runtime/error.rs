//! Errors specific to the runtime environment: resource store access and
//! plugin-context scoping. Resource/version/lifecycle errors that are part
//! of the shared taxonomy are reused from `plugin_system::error` rather than
//! duplicated here.
use crate::plugin_system::error::PluginSystemError;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeSystemError {
    #[error(transparent)]
    Resource(#[from] PluginSystemError),

    #[error("refused to switch plugin context from '{current}' to '{requested}'")]
    ContextForgingDenied { current: String, requested: String },

    #[error("plugin context required for private resource access, operation '{operation}'")]
    MissingPluginContext { operation: String },

    #[error("cleanup for plugin '{plugin_id}' is restricted to its owner or a privileged empty context")]
    UnauthorizedCleanup { plugin_id: String },

    #[error("runtime shutdown already in progress or complete")]
    AlreadyShuttingDown,
}
