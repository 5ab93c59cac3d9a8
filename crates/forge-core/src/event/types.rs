//! Closed event model: every [`EventKind`] a plugin or the kernel can emit,
//! grouped into the categories the event bus and filters key on.
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    Low,
    Normal,
    High,
    Critical,
}

impl Default for EventPriority {
    fn default() -> Self {
        EventPriority::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Lifecycle,
    Health,
    Resource,
    Performance,
    Configuration,
    Dependency,
    Upgrade,
    Rollback,
    Security,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Initializing,
    Initialized,
    Starting,
    Started,
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthEvent {
    CheckStarted,
    CheckRunning,
    CheckDone,
    CheckFailed,
    StatusOk,
    StatusWarning,
    StatusCritical,
    StatusUnknown,
    StatusChanged,
    MetricsChanged,
    MetricsThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceEvent {
    Exhausted,
    Created,
    Modified,
    Deleted,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceEvent {
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationEvent {
    Changed,
    Invalid,
    Applied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyEvent {
    Missing,
    StatusChanged,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeEvent {
    Available,
    Initiated,
    Validating,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackEvent {
    Initiated,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEvent {
    Violation,
    AuthFailed,
    AuthDenied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorEvent {
    Occurred,
    Resolved,
    PanicRecovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", content = "kind")]
pub enum EventKind {
    Lifecycle(LifecycleEvent),
    Health(HealthEvent),
    Resource(ResourceEvent),
    Performance(PerformanceEvent),
    Configuration(ConfigurationEvent),
    Dependency(DependencyEvent),
    Upgrade(UpgradeEvent),
    Rollback(RollbackEvent),
    Security(SecurityEvent),
    Error(ErrorEvent),
}

impl EventKind {
    pub fn category(&self) -> EventCategory {
        match self {
            EventKind::Lifecycle(_) => EventCategory::Lifecycle,
            EventKind::Health(_) => EventCategory::Health,
            EventKind::Resource(_) => EventCategory::Resource,
            EventKind::Performance(_) => EventCategory::Performance,
            EventKind::Configuration(_) => EventCategory::Configuration,
            EventKind::Dependency(_) => EventCategory::Dependency,
            EventKind::Upgrade(_) => EventCategory::Upgrade,
            EventKind::Rollback(_) => EventCategory::Rollback,
            EventKind::Security(_) => EventCategory::Security,
            EventKind::Error(_) => EventCategory::Error,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An emitted event, immutable once constructed via [`PluginEventBuilder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEvent {
    kind: EventKind,
    priority: EventPriority,
    plugin_id: String,
    source: String,
    category: EventCategory,
    status: Option<String>,
    error: Option<String>,
    metadata: HashMap<String, String>,
    timestamp: DateTime<Utc>,
}

impl PluginEvent {
    pub fn builder(plugin_id: impl Into<String>, kind: EventKind) -> PluginEventBuilder {
        PluginEventBuilder::new(plugin_id, kind)
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn priority(&self) -> EventPriority {
        self.priority
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

pub struct PluginEventBuilder {
    kind: EventKind,
    priority: EventPriority,
    plugin_id: String,
    source: Option<String>,
    status: Option<String>,
    error: Option<String>,
    metadata: HashMap<String, String>,
}

impl PluginEventBuilder {
    fn new(plugin_id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            kind,
            priority: EventPriority::default(),
            plugin_id: plugin_id.into(),
            source: None,
            status: None,
            error: None,
            metadata: HashMap::new(),
        }
    }

    pub fn priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> PluginEvent {
        let category = self.kind.category();
        PluginEvent {
            kind: self.kind,
            priority: self.priority,
            plugin_id: self.plugin_id.clone(),
            source: self.source.unwrap_or(self.plugin_id),
            category,
            status: self.status,
            error: self.error,
            metadata: self.metadata,
            timestamp: Utc::now(),
        }
    }
}
