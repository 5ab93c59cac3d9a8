//! Event model, subscription filters, and the bus that dispatches events
//! from plugin lifecycle and runtime activity to subscribed listeners.
pub mod bus;
pub mod error;
pub mod filter;
pub mod types;

pub use bus::{DispatchMode, EventBus, EventBusStats, EventListener};
pub use error::EventSystemError;
pub use filter::EventFilter;
pub use types::{
    ConfigurationEvent, DependencyEvent, ErrorEvent, EventCategory, EventKind, EventPriority, HealthEvent,
    LifecycleEvent, PerformanceEvent, PluginEvent, PluginEventBuilder, ResourceEvent, RollbackEvent, SecurityEvent,
    UpgradeEvent,
};
