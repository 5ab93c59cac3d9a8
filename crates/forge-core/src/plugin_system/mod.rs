//! # Plugin System
//!
//! In-process plugin kernel: identity, versioning, dependency modeling,
//! the dependency graph and its resolver, conflict reporting, the
//! registry/factory, the `Plugin` trait, and the lifecycle state machine
//! that drives instances through it.
//!
//! ## Submodules
//!
//! - **[`identity`]**: canonical plugin id grammar and parsing.
//! - **[`version`]**: [`ApiVersion`] and [`VersionConstraint`](version::VersionConstraint)
//!   comparison semantics.
//! - **[`dependency`]**: the [`Dependency`] edge type and its error taxonomy.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError), the
//!   plugin-system-wide error enum.
//! - **[`traits`]**: the [`Plugin`] trait and its supporting status/health types.
//! - **[`registry`]**: the creator-closure factory, [`PluginRegistry`].
//! - **[`graph`]**: the dependency graph, its topological sort and conflict
//!   detection.
//! - **[`conflict`]**: turns raw graph conflicts into ranked, human-readable
//!   [`ConflictReport`](conflict::ConflictReport)s.
//! - **[`lifecycle`]**: the state machine, [`PluginLifecycle`](lifecycle::PluginLifecycle),
//!   that drives a registered [`Plugin`] through its states.
pub mod conflict;
pub mod dependency;
pub mod error;
pub mod graph;
pub mod identity;
pub mod lifecycle;
pub mod registry;
pub mod traits;
pub mod version;

pub use dependency::Dependency;
pub use error::PluginSystemError;
pub use graph::DependencyGraph;
pub use lifecycle::PluginLifecycle;
pub use registry::PluginRegistry;
pub use traits::{Plugin, PluginStatus};
pub use version::ApiVersion;
