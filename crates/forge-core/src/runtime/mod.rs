//! The runtime environment plugins see at lifecycle time: a resource store,
//! an event bus, and config access, scoped by plugin context.
pub mod environment;
pub mod error;
pub mod resource;

pub use environment::Runtime;
pub use error::RuntimeSystemError;
pub use resource::{ResourceInfo, ResourceStats, ResourceStore};
