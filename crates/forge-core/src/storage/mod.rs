//! # Storage
//!
//! Abstractions for managing application data, configuration files, and
//! other persistent storage needs, respecting platform conventions (XDG
//! base directories on Linux).
//!
//! - **[`config`]**: typed configuration loading/parsing via
//!   [`ConfigManager`](config::ConfigManager) and per-component
//!   [`ConfigStorageExt`](config::ConfigStorageExt).
//! - **[`error`]**: storage-specific error types.
//! - **[`local`]**: local filesystem [`LocalStorageProvider`](local::LocalStorageProvider).
//! - **[`manager`]**: [`DefaultStorageManager`], orchestrating a provider
//!   plus a config manager rooted at the XDG config/data directories.
//! - **[`provider`]**: the [`StorageProvider`] trait, an abstraction over
//!   storage backends.
pub mod provider;
pub mod local;
pub mod manager; // Add manager module
pub mod config; // Add configuration module
pub mod error; // Add error module


/// Re-export key types
pub use provider::StorageProvider;
pub use local::LocalStorageProvider;
pub use manager::{StorageManager, DefaultStorageManager}; // Export manager types
pub use config::{
    ConfigManager, ConfigFormat, ConfigData, ConfigScope,
    PluginConfigScope, ConfigStorageExt,
}; // Export config types
pub use error::StorageSystemError; // Export the new error type

    
    // Test module declaration
    #[cfg(test)]
    mod tests;