//! Event subscription filters: types/priorities/plugin-ids/categories/time
//! range, each dimension empty meaning "match all".
use chrono::{DateTime, Utc};

use crate::event::types::{EventCategory, EventKind, EventPriority, PluginEvent};

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub kinds: Vec<EventKind>,
    pub categories: Vec<EventCategory>,
    pub priorities: Vec<EventPriority>,
    pub plugin_ids: Vec<String>,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl EventFilter {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.categories.push(category);
        self
    }

    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priorities.push(priority);
        self
    }

    pub fn with_plugin_id(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugin_ids.push(plugin_id.into());
        self
    }

    pub fn with_time_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.time_range = Some((from, to));
        self
    }

    pub fn matches(&self, event: &PluginEvent) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(event.kind()) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&event.category()) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&event.priority()) {
            return false;
        }
        if !self.plugin_ids.is_empty() && !self.plugin_ids.iter().any(|id| id == event.plugin_id()) {
            return false;
        }
        if let Some((from, to)) = self.time_range {
            let ts = event.timestamp();
            if ts < from || ts > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::types::{EventKind, LifecycleEvent};

    #[test]
    fn empty_filter_matches_everything() {
        let event = PluginEvent::builder("plugin.a", EventKind::Lifecycle(LifecycleEvent::Started)).build();
        assert!(EventFilter::match_all().matches(&event));
    }

    #[test]
    fn plugin_id_and_category_filter_narrows() {
        let event = PluginEvent::builder("plugin.a", EventKind::Lifecycle(LifecycleEvent::Started)).build();
        let matching = EventFilter::match_all()
            .with_plugin_id("plugin.a")
            .with_category(EventCategory::Lifecycle);
        assert!(matching.matches(&event));

        let non_matching = EventFilter::match_all().with_plugin_id("plugin.b");
        assert!(!non_matching.matches(&event));
    }

    #[test]
    fn kind_filter_distinguishes_same_category_events() {
        use crate::event::types::HealthEvent;

        let critical = PluginEvent::builder("plugin.a", EventKind::Health(HealthEvent::StatusCritical)).build();
        let warning = PluginEvent::builder("plugin.a", EventKind::Health(HealthEvent::StatusWarning)).build();

        let filter = EventFilter::match_all().with_kind(EventKind::Health(HealthEvent::StatusCritical));
        assert!(filter.matches(&critical));
        assert!(!filter.matches(&warning));
    }
}
