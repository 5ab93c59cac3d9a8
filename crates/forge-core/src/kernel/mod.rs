//! # Kernel
//!
//! Bootstrapping, the plugin/component dependency registry, system-wide
//! constants, and the top-level error type every subsystem error converts
//! into.
//!
//! - **[`bootstrap`]**: [`Application`](bootstrap::Application), composing
//!   storage, the event bus, the resource store, the plugin registry, the
//!   dependency graph, and per-plugin lifecycles into one bootstrap/run/
//!   shutdown sequence.
//! - **[`component`]**: [`KernelComponent`](component::KernelComponent) and
//!   the TypeId-keyed [`DependencyRegistry`](component::DependencyRegistry).
//! - **[`constants`]**: kernel-level tuning defaults.
//! - **[`error`]**: [`Error`](error::Error), aggregating every subsystem
//!   error behind `#[from]`.
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use component::{DependencyRegistry, KernelComponent};
pub use error::{Error, Result};
