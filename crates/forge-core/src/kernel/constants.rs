//! Kernel-level tuning defaults.
//!
//! These back the runtime's configurable knobs (event bus worker pool,
//! handler timeouts, history capacity, resource cleanup budgets) with
//! concrete values a host can override at construction time.

/// Application name used for the default config/data directory layout.
pub const APP_NAME: &str = "forge";

/// Current kernel API version, compared against a plugin's declared
/// compatible range during registration.
pub const API_VERSION: &str = "0.1.0";

/// Configuration directory name under the user's config home.
pub const CONFIG_DIR_NAME: &str = ".forge";

/// Default size of the event bus's bounded worker pool.
pub const DEFAULT_EVENT_WORKER_POOL_SIZE: usize = 50;

/// Default per-handler dispatch timeout.
pub const DEFAULT_EVENT_HANDLER_TIMEOUT_SECS: u64 = 30;

/// Default capacity of the event history ring buffer.
pub const DEFAULT_EVENT_HISTORY_CAPACITY: usize = 1000;

/// Soft per-resource cleanup budget; context-aware cleanups are bounded by
/// this via `tokio::time::timeout`.
pub const RESOURCE_CLEANUP_SOFT_TIMEOUT_SECS: u64 = 3;

/// Cleanups taking longer than this are still allowed to finish but log a
/// "slow cleanup" warning.
pub const RESOURCE_CLEANUP_SLOW_WARNING_SECS: u64 = 5;

/// Depth limit for reflective resource size estimation.
pub const RESOURCE_SIZE_ESTIMATE_MAX_DEPTH: usize = 20;

/// Per-collection element cap for reflective resource size estimation.
pub const RESOURCE_SIZE_ESTIMATE_MAX_ELEMENTS: usize = 1000;

/// Default plugins directory, relative to the data directory.
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Default temporary directory, relative to the data directory.
pub const TEMP_DIR: &str = "tmp";
