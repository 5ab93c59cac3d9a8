//! Demo plugin: installs a `tracing-subscriber` during `initialize_resources`,
//! reading its filter directive from this plugin's own config prefix.
use async_trait::async_trait;
use forge_core::kernel::error::Result;
use forge_core::plugin_system::dependency::Dependency;
use forge_core::plugin_system::traits::Plugin;
use forge_core::plugin_system::version::ApiVersion;
use forge_core::runtime::environment::Runtime;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
pub struct LoggingPlugin;

impl LoggingPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for LoggingPlugin {
    fn id(&self) -> &str {
        "core-logging"
    }

    fn description(&self) -> &str {
        "Installs the process-wide tracing subscriber"
    }

    fn version(&self) -> ApiVersion {
        ApiVersion::new(0, 1, 0)
    }

    fn config_prefix(&self) -> Option<&str> {
        Some("core-logging")
    }

    fn weight(&self) -> i32 {
        100
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    async fn initialize_resources(&self, runtime: &Runtime) -> Result<()> {
        let config = runtime.config().get_plugin_config(self.id())?;
        let directive: String = config.get_or("filter", "info".to_string());

        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            log::warn!("global tracing subscriber already installed, core-logging left it in place");
        }
        tracing_log::LogTracer::init().ok();

        log::info!("core-logging initialized with filter '{}'", directive);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::event::EventBus;
    use forge_core::runtime::resource::ResourceStore;
    use forge_core::storage::config::{ConfigFormat, ConfigManager};
    use forge_core::storage::local::LocalStorageProvider;
    use std::sync::Arc;

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

    #[tokio::test]
    async fn reads_filter_from_own_config_prefix() {
        let (_dir, runtime) = test_runtime();
        let plugin = LoggingPlugin::new();
        assert_eq!(plugin.config_prefix(), Some("core-logging"));
        // Missing config falls back to "info" rather than failing.
        plugin.initialize_resources(&runtime).await.unwrap();
    }
}
