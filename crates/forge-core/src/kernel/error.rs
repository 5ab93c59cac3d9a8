//! Top-level kernel error type, aggregating each subsystem's typed error
//! enum behind one `Error` via `#[from]`.
use std::result::Result as StdResult;

use std::path::PathBuf;
use crate::plugin_system::error::PluginSystemError;
use crate::event::error::EventSystemError;
use crate::runtime::error::RuntimeSystemError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("runtime system error: {0}")]
    RuntimeSystem(#[from] RuntimeSystemError),

    #[error("storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        component_name: Option<String>,
        type_id_str: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Error related to `DependencyRegistry` operations or component lookup failures.
    #[error("component registry error during operation '{operation}': {message}")]
    ComponentRegistryError {
        operation: String,
        component_name: Option<String>,
        type_id_str: Option<String>,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

/// A phase in the kernel's bootstrap/shutdown lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("bootstrap")]
    Bootstrap,
    #[error("initialize")]
    Initialize,
    #[error("start")]
    Start,
    #[error("shutdown")]
    Shutdown,
}

/// Shorthand for `Result` with our `Error` type.
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<std::io::Error> for Error {
    fn from(io_err: std::io::Error) -> Self {
        Error::StorageSystem(StorageSystemError::io(io_err, "unknown", PathBuf::new()))
    }
}

impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }
}