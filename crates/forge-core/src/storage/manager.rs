use std::any::Any;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;

use crate::kernel::component::KernelComponent;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::storage::config::{ConfigFormat, ConfigManager};
use crate::storage::provider::StorageProvider;
use crate::storage::local::LocalStorageProvider; // Default provider

/// Storage manager component interface
/// This simply wraps a StorageProvider for now
#[async_trait]
pub trait StorageManager: KernelComponent + StorageProvider {}

/// Default implementation of StorageManager
#[derive(Clone)]
pub struct DefaultStorageManager {
    name: &'static str,
    provider: Arc<dyn StorageProvider>, // Holds the actual provider
    config_dir: PathBuf,
    data_dir: PathBuf,
    config_manager: Arc<ConfigManager>,
}

/// `$XDG_CONFIG_HOME` (or `~/.config`) joined with [`constants::CONFIG_DIR_NAME`].
fn xdg_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(dir).join(constants::APP_NAME);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config").join(constants::APP_NAME)
}

/// `$XDG_DATA_HOME` (or `~/.local/share`) joined with [`constants::APP_NAME`].
fn xdg_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(dir).join(constants::APP_NAME);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".local").join("share").join(constants::APP_NAME)
}

impl DefaultStorageManager {
    /// Creates a storage manager rooted at the platform's XDG config/data
    /// directories, with a `LocalStorageProvider` scoped to the data
    /// directory and a `ConfigManager` scoped to the config directory.
    pub fn new() -> Result<Self> {
        let config_dir = xdg_config_dir();
        let data_dir = xdg_data_dir();
        Self::with_dirs(config_dir, data_dir)
    }

    /// Creates a storage manager rooted at explicit config/data directories
    /// (used by tests and hosts that don't want XDG auto-detection).
    pub fn with_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Result<Self> {
        let provider: Arc<dyn StorageProvider> = Arc::new(LocalStorageProvider::new(data_dir.clone()));
        provider.create_dir_all(&config_dir)?;
        provider.create_dir_all(&data_dir)?;
        let plugin_config_dir = config_dir.join(constants::DEFAULT_PLUGINS_DIR);
        let config_manager =
            Arc::new(ConfigManager::new(provider.clone(), config_dir.clone(), plugin_config_dir, ConfigFormat::Json));
        Ok(Self { name: "DefaultStorageManager", provider, config_dir, data_dir, config_manager })
    }

    /// Create a new storage manager with a custom provider, rooted at the
    /// default XDG config directory (used for `config_dir()`/`data_dir()`).
    pub fn with_provider(provider: Arc<dyn StorageProvider>) -> Self {
        let config_dir = xdg_config_dir();
        let data_dir = xdg_data_dir();
        let plugin_config_dir = config_dir.join(constants::DEFAULT_PLUGINS_DIR);
        let config_manager =
            Arc::new(ConfigManager::new(provider.clone(), config_dir.clone(), plugin_config_dir, ConfigFormat::Json));
        Self { name: "DefaultStorageManager", provider, config_dir, data_dir, config_manager }
    }

    /// Get the underlying provider
    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn get_config_manager(&self) -> &Arc<ConfigManager> {
        &self.config_manager
    }
}

impl Debug for DefaultStorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultStorageManager")
            .field("name", &self.name)
            .field("provider", &self.provider.name()) // Show provider name
            .field("config_dir", &self.config_dir)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

#[async_trait]
impl KernelComponent for DefaultStorageManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        // Delegate to provider if it has an init method (currently doesn't)
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        // Delegate to provider if it has a start method (currently doesn't)
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        // Delegate to provider if it has a stop method (currently doesn't)
        Ok(())
    }
    // Removed as_any and as_any_mut
}

// Implement StorageProvider by delegating to the internal provider
impl StorageProvider for DefaultStorageManager {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn exists(&self, path: &Path) -> bool {
        self.provider.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.provider.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.provider.is_dir(path)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        self.provider.create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.provider.create_dir_all(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.provider.read_to_string(path)
    }

    fn read_to_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.provider.read_to_bytes(path)
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        self.provider.write_string(path, contents)
    }

    fn write_bytes(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.provider.write_bytes(path, contents)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.provider.copy(from, to)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.provider.rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.provider.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.provider.remove_dir(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.provider.remove_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.provider.read_dir(path)
    }

    fn metadata(&self, path: &Path) -> Result<std::fs::Metadata> {
        self.provider.metadata(path)
    }

    // Note: open_read, open_write, open_append return Box<dyn Read/Write>
    // which might not be Send/Sync. This could be an issue if the manager
    // needs to be Send/Sync. For now, we delegate directly.
    fn open_read(&self, path: &Path) -> Result<Box<dyn std::io::Read>> {
        self.provider.open_read(path)
    }

    fn open_write(&self, path: &Path) -> Result<Box<dyn std::io::Write>> {
        self.provider.open_write(path)
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn std::io::Write>> {
        self.provider.open_append(path)
    }
}

// Implement the marker trait
impl StorageManager for DefaultStorageManager {}

// Default using the current directory for both config and data.
impl Default for DefaultStorageManager {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_dirs(cwd.clone(), cwd).expect("failed to create default storage directories")
    }
}