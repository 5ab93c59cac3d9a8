//! Cross-module scenarios exercising the registry, dependency graph,
//! lifecycle state machine, and event bus together, the way `Application`
//! wires them at runtime.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use forge_core::event::{EventBus, EventFilter, EventKind, EventListener, LifecycleEvent, PluginEvent};
use forge_core::plugin_system::dependency::Dependency;
use forge_core::plugin_system::graph::DependencyGraph;
use forge_core::plugin_system::lifecycle::PluginLifecycle;
use forge_core::plugin_system::traits::{Plugin, PluginStatus};
use forge_core::plugin_system::version::{ApiVersion, VersionConstraint};
use forge_core::runtime::environment::Runtime;
use forge_core::runtime::resource::ResourceStore;
use forge_core::storage::config::{ConfigFormat, ConfigManager};
use forge_core::storage::local::LocalStorageProvider;

struct StubPlugin {
    id: &'static str,
    version: ApiVersion,
    dependencies: Vec<Dependency>,
}

#[async_trait]
impl Plugin for StubPlugin {
    fn id(&self) -> &str {
        self.id
    }

    fn version(&self) -> ApiVersion {
        self.version.clone()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies.clone()
    }
}

fn test_runtime() -> (tempfile::TempDir, Runtime) {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(LocalStorageProvider::new(dir.path().to_path_buf()));
    let config = Arc::new(ConfigManager::new(
        provider,
        dir.path().join("config"),
        dir.path().join("plugins"),
        ConfigFormat::Json,
    ));
    let runtime = Runtime::new(Arc::new(ResourceStore::new()), Arc::new(EventBus::new()), config);
    (dir, runtime)
}

/// S1 — linear init: B requires A; both reach `Active`, and the event
/// history for each contains initializing, initialized, starting, started
/// in order.
#[tokio::test]
async fn s1_linear_init_orders_by_dependency_and_emits_lifecycle_sequence() {
    let (_dir, runtime) = test_runtime();

    let plugin_a: Arc<dyn Plugin> = Arc::new(StubPlugin { id: "a", version: ApiVersion::new(1, 0, 0), dependencies: Vec::new() });
    let plugin_b: Arc<dyn Plugin> = Arc::new(StubPlugin {
        id: "b",
        version: ApiVersion::new(1, 0, 0),
        dependencies: vec![Dependency::required("a", "a").with_version_constraint(VersionConstraint::min(ApiVersion::new(1, 0, 0)))],
    });

    let mut graph = DependencyGraph::new();
    graph.add_plugin("a", 0, Some(plugin_a.version()), Vec::new());
    graph.add_plugin("b", 0, Some(plugin_b.version()), Vec::new());
    for dep in plugin_b.dependencies() {
        graph.add_dependency("b", dep);
    }

    assert!(graph.find_conflicts().is_empty());
    let order = graph.topological_sort().unwrap();
    assert_eq!(order, vec!["a".to_string(), "b".to_string()]);

    let lifecycle_a = PluginLifecycle::new(plugin_a.clone(), &runtime);
    let lifecycle_b = PluginLifecycle::new(plugin_b.clone(), &runtime);
    for id in &order {
        let lifecycle = if *id == "a" { &lifecycle_a } else { &lifecycle_b };
        lifecycle.initialize().await.unwrap();
        lifecycle.start().await.unwrap();
    }

    assert_eq!(lifecycle_a.status().await, PluginStatus::Active);
    assert_eq!(lifecycle_b.status().await, PluginStatus::Active);

    for id in ["a", "b"] {
        let history = runtime.event_bus().get_plugin_history(id).await;
        let sequence: Vec<_> = history.iter().map(|e| e.kind().clone()).collect();
        assert_eq!(
            sequence,
            vec![
                EventKind::Lifecycle(LifecycleEvent::Initializing),
                EventKind::Lifecycle(LifecycleEvent::Initialized),
                EventKind::Lifecycle(LifecycleEvent::Starting),
                EventKind::Lifecycle(LifecycleEvent::Started),
            ]
        );
    }
}

/// S2 — cycle rejected: A and B require each other; resolution fails with
/// a cycle naming both, and neither plugin's status has moved off inactive.
#[tokio::test]
async fn s2_cycle_is_rejected_before_any_plugin_is_touched() {
    let mut graph = DependencyGraph::new();
    graph.add_plugin("a", 0, Some(ApiVersion::new(1, 0, 0)), Vec::new());
    graph.add_plugin("b", 0, Some(ApiVersion::new(1, 0, 0)), Vec::new());
    graph.add_dependency("a", Dependency::required("b", "b"));
    graph.add_dependency("b", Dependency::required("a", "a"));

    use forge_core::plugin_system::dependency::DependencyError;
    let err = graph.topological_sort().unwrap_err();
    match err {
        DependencyError::CyclicDependency(mut ids) => {
            ids.sort();
            assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected CyclicDependency, got {:?}", other),
    }

    let (_dir, runtime) = test_runtime();
    let plugin_a: Arc<dyn Plugin> = Arc::new(StubPlugin { id: "a", version: ApiVersion::new(1, 0, 0), dependencies: Vec::new() });
    let lifecycle_a = PluginLifecycle::new(plugin_a, &runtime);
    assert_eq!(lifecycle_a.status().await, PluginStatus::Inactive);
}

/// S3 — version conflict: A requires lib >= 2.0.0, lib is present at 1.9.0.
#[tokio::test]
async fn s3_version_conflict_is_reported_as_version_too_low() {
    use forge_core::plugin_system::graph::{GraphConflict, VersionMismatchReason};

    let mut graph = DependencyGraph::new();
    graph.add_plugin("a", 0, Some(ApiVersion::new(1, 0, 0)), Vec::new());
    graph.add_plugin("lib", 0, Some(ApiVersion::new(1, 9, 0)), Vec::new());
    graph.add_dependency(
        "a",
        Dependency::required("lib", "lib").with_version_constraint(VersionConstraint::min(ApiVersion::new(2, 0, 0))),
    );

    let conflicts = graph.find_conflicts();
    assert_eq!(conflicts.len(), 1);
    match &conflicts[0] {
        GraphConflict::VersionIncompatible { plugin_id, depends_on, reason, .. } => {
            assert_eq!(plugin_id, "a");
            assert_eq!(depends_on, "lib");
            assert_eq!(*reason, VersionMismatchReason::VersionTooLow);
        }
        other => panic!("expected VersionIncompatible, got {:?}", other),
    }
}

/// S4 — owner-only cleanup: a resource registered under plugin context P is
/// not visible to Q, and cleaning up Q's context never touches P's resource.
#[tokio::test]
async fn s4_private_resources_are_isolated_by_owner_and_cleanup_is_scoped() {
    let (_dir, base) = test_runtime();
    let p = base.with_plugin_context("p").await;
    let q = base.with_plugin_context("q").await;

    p.register_private("cache", Arc::new(42i32)).await.unwrap();
    assert!(p.get_private::<i32>("cache").await.unwrap().is_some());
    assert!(q.get_private::<i32>("cache").await.unwrap().is_none());

    // Cleaning up Q's own context cannot remove P's resource.
    q.cleanup_resources().await.unwrap();
    assert!(p.get_private::<i32>("cache").await.unwrap().is_some());

    // Cleaning up P's own context removes it.
    p.cleanup_resources().await.unwrap();
    assert!(p.get_private::<i32>("cache").await.unwrap().is_none());
}

struct CountingListener(Arc<AtomicUsize>);

#[async_trait]
impl EventListener for CountingListener {
    async fn handle(&self, _event: &PluginEvent) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// S6 — event filtering: a listener scoped to plugin X and the
/// `health.status.critical` event type receives only that exact type from
/// X, not X's `health.status.warning` events (same category, different
/// type) and not other plugins' critical events.
#[tokio::test]
async fn s6_listener_receives_only_events_matching_its_filter() {
    use forge_core::event::HealthEvent;

    let bus = EventBus::new();
    bus.set_dispatch_mode(forge_core::event::DispatchMode::Sync).await;
    let count = Arc::new(AtomicUsize::new(0));
    let filter = EventFilter::match_all().with_plugin_id("x").with_kind(EventKind::Health(HealthEvent::StatusCritical));
    bus.subscribe(filter, Arc::new(CountingListener(count.clone()))).await;

    bus.publish(PluginEvent::builder("x", EventKind::Health(HealthEvent::StatusCritical)).build()).await;
    bus.publish(PluginEvent::builder("x", EventKind::Health(HealthEvent::StatusWarning)).build()).await;
    bus.publish(PluginEvent::builder("y", EventKind::Health(HealthEvent::StatusCritical)).build()).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

/// Invariant 8 — a panicking listener is isolated: the next event still
/// reaches other listeners, and the bus's panic counter increments by one.
#[tokio::test]
async fn panicking_listener_does_not_disrupt_other_listeners() {
    struct PanickingListener;

    #[async_trait]
    impl EventListener for PanickingListener {
        async fn handle(&self, _event: &PluginEvent) {
            panic!("boom");
        }
    }

    let bus = EventBus::new();
    bus.set_dispatch_mode(forge_core::event::DispatchMode::Sync).await;
    let count = Arc::new(AtomicUsize::new(0));
    bus.subscribe_all(Arc::new(PanickingListener)).await;
    bus.subscribe_all(Arc::new(CountingListener(count.clone()))).await;

    bus.publish(PluginEvent::builder("x", EventKind::Lifecycle(LifecycleEvent::Started)).build()).await;
    bus.publish(PluginEvent::builder("x", EventKind::Lifecycle(LifecycleEvent::Stopped)).build()).await;

    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(bus.get_event_stats().dropped_panics, 1);
}

/// Invariant 1 — registering the same name twice fails `AlreadyExists`.
#[tokio::test]
async fn invariant_register_rejects_duplicate_names() {
    use forge_core::plugin_system::registry::PluginRegistry;

    let registry = PluginRegistry::new();
    let creator: Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync> =
        Arc::new(|| Arc::new(StubPlugin { id: "a", version: ApiVersion::new(1, 0, 0), dependencies: Vec::new() }) as Arc<dyn Plugin>);

    registry.register("a", None, creator.clone()).await.unwrap();
    assert!(registry.is_registered("a").await);
    assert!(registry.register("a", None, creator).await.is_err());

    let created = registry.create("a").await.unwrap();
    assert_eq!(created.id(), "a");
}

/// Invariant 4 — parse/format round-trips at semantic equality.
#[test]
fn invariant_version_round_trip_is_semantically_idempotent() {
    let original = ApiVersion::parse("1.2.3-beta.1").unwrap();
    let formatted = original.to_string();
    let reparsed = ApiVersion::parse(&formatted).unwrap();
    assert_eq!(original.cmp(&reparsed), std::cmp::Ordering::Equal);
}

struct FlakyUpgradePlugin {
    version: std::sync::Mutex<ApiVersion>,
}

#[async_trait]
impl Plugin for FlakyUpgradePlugin {
    fn id(&self) -> &str {
        "flaky"
    }

    fn version(&self) -> ApiVersion {
        self.version.lock().unwrap().clone()
    }

    fn capabilities(&self) -> Vec<forge_core::plugin_system::traits::UpgradeCapability> {
        vec![forge_core::plugin_system::traits::UpgradeCapability::ConfigUpgrade]
    }

    async fn execute_upgrade(&self, _runtime: &Runtime, _target_version: &ApiVersion) -> forge_core::kernel::error::Result<()> {
        Err(forge_core::plugin_system::error::PluginSystemError::UpgradeFailed {
            plugin_id: "flaky".to_string(),
            message: "upgrade hook deliberately fails".to_string(),
            source: None,
        }
        .into())
    }

    async fn rollback_upgrade(&self, _runtime: &Runtime, previous_version: &ApiVersion) -> forge_core::kernel::error::Result<()> {
        *self.version.lock().unwrap() = previous_version.clone();
        Ok(())
    }
}

/// S5 — upgrade with automatic rollback: the plugin's `execute_upgrade` hook
/// fails, so the lifecycle rolls back to the prior version on its own and
/// ends `Active` again, with the failed upgrade and the rollback both
/// recorded in the event history in order.
#[tokio::test]
async fn s5_failed_upgrade_rolls_back_automatically() {
    let (_dir, runtime) = test_runtime();
    let original = ApiVersion::new(1, 0, 0);
    let target = ApiVersion::new(2, 0, 0);

    let plugin: Arc<dyn Plugin> = Arc::new(FlakyUpgradePlugin { version: std::sync::Mutex::new(original.clone()) });
    let lifecycle = PluginLifecycle::new(plugin, &runtime);
    lifecycle.initialize().await.unwrap();
    lifecycle.start().await.unwrap();

    lifecycle.prepare_upgrade(&target).await.unwrap();
    let err = lifecycle.execute_upgrade(&target).await.unwrap_err();
    assert!(err.to_string().contains("deliberately fails"));

    assert_eq!(lifecycle.status().await, PluginStatus::Active);
    assert_eq!(lifecycle.version().await, original);

    let history = runtime.event_bus().get_plugin_history("flaky").await;
    let sequence: Vec<_> = history.iter().map(|e| e.kind().clone()).collect();
    assert_eq!(
        sequence,
        vec![
            EventKind::Lifecycle(LifecycleEvent::Initializing),
            EventKind::Lifecycle(LifecycleEvent::Initialized),
            EventKind::Lifecycle(LifecycleEvent::Starting),
            EventKind::Lifecycle(LifecycleEvent::Started),
            EventKind::Upgrade(forge_core::event::UpgradeEvent::Initiated),
            EventKind::Upgrade(forge_core::event::UpgradeEvent::Failed),
            EventKind::Rollback(forge_core::event::RollbackEvent::Initiated),
            EventKind::Rollback(forge_core::event::RollbackEvent::Completed),
        ]
    );
}
