//! Demo plugin: probes a handful of basic host facts (OS, CPU count,
//! total memory) and publishes them as a shared resource other plugins
//! can read, logging a one-line summary at startup.
use std::collections::HashMap;
use std::fs;

use async_trait::async_trait;
use forge_core::kernel::error::Result;
use forge_core::plugin_system::dependency::Dependency;
use forge_core::plugin_system::traits::Plugin;
use forge_core::plugin_system::version::ApiVersion;
use forge_core::runtime::environment::Runtime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const ENVIRONMENT_REPORT_RESOURCE: &str = "environment-report";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OsInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnvironmentReport {
    pub os: OsInfo,
    pub logical_cpu_count: usize,
    pub total_memory_kb: Option<u64>,
}

fn parse_os_release(contents: &str) -> OsInfo {
    let mut fields: HashMap<&str, String> = HashMap::new();
    for line in contents.lines() {
        if let Some((key, value)) = line.split_once('=') {
            fields.insert(key, value.trim_matches('"').to_string());
        }
    }
    OsInfo {
        id: fields.get("ID").cloned(),
        name: fields.get("NAME").cloned(),
        version_id: fields.get("VERSION_ID").cloned(),
    }
}

fn count_logical_cpus(contents: &str) -> usize {
    contents.lines().filter(|l| l.starts_with("processor")).count()
}

fn parse_mem_total_kb(contents: &str) -> Option<u64> {
    contents
        .lines()
        .find(|l| l.starts_with("MemTotal:"))
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|v| v.parse().ok())
}

fn probe_environment() -> EnvironmentReport {
    let os = fs::read_to_string("/etc/os-release").map(|c| parse_os_release(&c)).unwrap_or_default();
    let logical_cpu_count = fs::read_to_string("/proc/cpuinfo").map(|c| count_logical_cpus(&c)).unwrap_or(0);
    let total_memory_kb = fs::read_to_string("/proc/meminfo").ok().and_then(|c| parse_mem_total_kb(&c));
    EnvironmentReport { os, logical_cpu_count, total_memory_kb }
}

#[derive(Default)]
pub struct EnvironmentCheckPlugin;

impl EnvironmentCheckPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for EnvironmentCheckPlugin {
    fn id(&self) -> &str {
        "core-environment-check"
    }

    fn description(&self) -> &str {
        "Probes basic host capabilities and publishes a summary resource"
    }

    fn version(&self) -> ApiVersion {
        ApiVersion::new(0, 1, 0)
    }

    fn weight(&self) -> i32 {
        50
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::required("core-logging", "core-logging")]
    }

    async fn initialize_resources(&self, runtime: &Runtime) -> Result<()> {
        let report = probe_environment();
        log::info!(
            "host environment: os={:?} cpus={} mem_kb={:?}",
            report.os.pretty_label(),
            report.logical_cpu_count,
            report.total_memory_kb
        );
        runtime.resources().register_shared(ENVIRONMENT_REPORT_RESOURCE, Arc::new(report)).await?;
        Ok(())
    }
}

impl OsInfo {
    fn pretty_label(&self) -> String {
        self.name.clone().or_else(|| self.id.clone()).unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::event::EventBus;
    use forge_core::runtime::resource::ResourceStore;
    use forge_core::storage::config::{ConfigFormat, ConfigManager};
    use forge_core::storage::local::LocalStorageProvider;

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

    #[test]
    fn parses_os_release() {
        let contents = "ID=fedora\nNAME=\"Fedora Linux\"\nVERSION_ID=\"40\"\n";
        let os = parse_os_release(contents);
        assert_eq!(os.id.as_deref(), Some("fedora"));
        assert_eq!(os.name.as_deref(), Some("Fedora Linux"));
        assert_eq!(os.version_id.as_deref(), Some("40"));
    }

    #[test]
    fn counts_logical_cpus() {
        let contents = "processor\t: 0\nprocessor\t: 1\nprocessor\t: 2\n";
        assert_eq!(count_logical_cpus(contents), 3);
    }

    #[test]
    fn parses_mem_total() {
        let contents = "MemTotal:       16384000 kB\nMemFree:        1000 kB\n";
        assert_eq!(parse_mem_total_kb(contents), Some(16384000));
    }

    #[test]
    fn declares_dependency_on_core_logging() {
        let plugin = EnvironmentCheckPlugin::new();
        let deps = plugin.dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].id, "core-logging");
        assert!(deps[0].required);
    }

    #[tokio::test]
    async fn publishes_environment_report_resource() {
        let (_dir, runtime) = test_runtime();
        let plugin = EnvironmentCheckPlugin::new();
        plugin.initialize_resources(&runtime).await.unwrap();
        let report = runtime.resources().get_shared::<EnvironmentReport>(ENVIRONMENT_REPORT_RESOURCE).await;
        assert!(report.is_some(), "initialize_resources must publish the environment report");
    }
}
