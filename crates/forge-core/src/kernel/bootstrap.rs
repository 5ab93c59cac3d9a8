use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::event::EventBus;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin_system::graph::DependencyGraph;
use crate::plugin_system::lifecycle::PluginLifecycle;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::Plugin;
use crate::runtime::environment::Runtime;
use crate::runtime::resource::ResourceStore;
use crate::storage::manager::DefaultStorageManager;

/// Composes the kernel's components — storage, event bus, resource store,
/// plugin registry, dependency graph, and the per-plugin lifecycle table —
/// and drives them through the bootstrap/run/shutdown sequence.
pub struct Application {
    storage: Arc<DefaultStorageManager>,
    resources: Arc<ResourceStore>,
    event_bus: Arc<EventBus>,
    registry: Arc<PluginRegistry>,
    graph: RwLock<DependencyGraph>,
    lifecycles: RwLock<HashMap<String, Arc<PluginLifecycle>>>,
    initialized: bool,
}

impl Application {
    /// Creates a new application with default components rooted at the
    /// platform's XDG config/data directories.
    pub fn new() -> Result<Self> {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::API_VERSION);

        let storage = Arc::new(DefaultStorageManager::new()?);
        log::info!("Using config directory: {}", storage.config_dir().display());
        log::info!("Using data directory: {}", storage.data_dir().display());

        Ok(Application {
            storage,
            resources: Arc::new(ResourceStore::new()),
            event_bus: Arc::new(EventBus::new()),
            registry: Arc::new(PluginRegistry::new()),
            graph: RwLock::new(DependencyGraph::new()),
            lifecycles: RwLock::new(HashMap::new()),
            initialized: false,
        })
    }

    pub fn storage_manager(&self) -> Arc<DefaultStorageManager> {
        self.storage.clone()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    pub fn resources(&self) -> Arc<ResourceStore> {
        self.resources.clone()
    }

    pub fn registry(&self) -> Arc<PluginRegistry> {
        self.registry.clone()
    }

    /// Builds a fresh, unscoped `Runtime` sharing this application's
    /// resource store, event bus, and config manager.
    pub fn runtime(&self) -> Runtime {
        Runtime::new(self.resources.clone(), self.event_bus.clone(), self.storage.get_config_manager().clone())
    }

    /// Registers a plugin factory under `name`, reachable via `config_prefix`
    /// if given. Does not instantiate the plugin yet — see [`Self::instantiate_all`].
    pub async fn register_plugin(
        &self,
        name: &str,
        config_prefix: Option<&str>,
        creator: Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>,
    ) -> Result<()> {
        self.registry.register(name, config_prefix, creator).await.map_err(Error::PluginSystem)
    }

    /// Creates one instance of every registered plugin, builds the
    /// dependency graph over them, and wraps each in a `PluginLifecycle`
    /// scoped to its own `Runtime` context. Does not initialize or start
    /// anything yet — see [`Self::initialize_all`]/[`Self::start_all`].
    pub async fn instantiate_all(&self) -> Result<()> {
        let names = self.registry.registered_names().await;
        let mut graph = self.graph.write().await;
        let mut lifecycles = self.lifecycles.write().await;

        for name in &names {
            let plugin = self.registry.create(name).await.map_err(Error::PluginSystem)?;
            graph.add_plugin(plugin.id(), plugin.weight(), Some(plugin.version()), Vec::new());
            for dependency in plugin.dependencies() {
                graph.add_dependency(plugin.id(), dependency);
            }

            let runtime = self.runtime().with_plugin_context(plugin.id()).await;
            lifecycles.insert(plugin.id().to_string(), Arc::new(PluginLifecycle::new(plugin, &runtime)));
        }
        Ok(())
    }

    /// Dependency-ordered startup: checks the graph for conflicts and
    /// cycles, then initializes and starts every plugin in topological
    /// order. A missing/version/resource conflict or a cycle aborts before
    /// touching any plugin.
    pub async fn initialize_all(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Initialize,
                component_name: None,
                type_id_str: None,
                message: "application already initialized".to_string(),
                source: None,
            });
        }

        let order = {
            let graph = self.graph.read().await;
            let conflicts = graph.find_conflicts();
            if !conflicts.is_empty() {
                let reports = crate::plugin_system::conflict::build_reports(conflicts);
                let summary = reports.iter().map(|r| r.summary.clone()).collect::<Vec<_>>().join("; ");
                return Err(Error::KernelLifecycleError {
                    phase: KernelLifecyclePhase::Initialize,
                    component_name: None,
                    type_id_str: None,
                    message: format!("unresolved plugin conflicts: {}", summary),
                    source: None,
                });
            }
            graph.topological_sort().map_err(|e| Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Initialize,
                component_name: None,
                type_id_str: None,
                message: e.to_string(),
                source: None,
            })?
        };

        let lifecycles = self.lifecycles.read().await;
        for id in &order {
            if let Some(lifecycle) = lifecycles.get(id) {
                log::info!("Initializing plugin: {}", id);
                lifecycle.initialize().await?;
            }
        }
        for id in &order {
            if let Some(lifecycle) = lifecycles.get(id) {
                log::info!("Starting plugin: {}", id);
                lifecycle.start().await?;
            }
        }

        self.initialized = true;
        log::info!("Application initialized and started successfully.");
        Ok(())
    }

    /// Bootstraps and runs every registered plugin once, then tears them
    /// down in reverse dependency order.
    pub async fn run(&mut self) -> Result<()> {
        self.instantiate_all().await?;
        self.initialize_all().await?;
        self.shutdown().await
    }

    /// Stops every plugin in reverse topological order. Errors from
    /// individual plugins are logged and collected; the first one is
    /// returned after every plugin has had a chance to stop.
    pub async fn shutdown(&mut self) -> Result<()> {
        log::info!("Shutting down plugins...");
        let order = {
            let graph = self.graph.read().await;
            graph.topological_sort().unwrap_or_default()
        };
        let lifecycles = self.lifecycles.read().await;

        let mut first_error = None;
        for id in order.iter().rev() {
            if let Some(lifecycle) = lifecycles.get(id) {
                log::info!("Stopping plugin: {}", id);
                if let Err(e) = lifecycle.stop().await {
                    log::error!("Error stopping plugin {}: {}", id, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        self.initialized = false;
        log::info!("Plugin shutdown complete.");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub async fn lifecycle(&self, plugin_id: &str) -> Option<Arc<PluginLifecycle>> {
        self.lifecycles.read().await.get(plugin_id).cloned()
    }
}
