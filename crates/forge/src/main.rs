use std::sync::Arc;

use clap::Parser;
use forge_core::kernel::bootstrap::Application;
use forge_core::plugin_system::traits::Plugin;

/// Demo host binary wiring the kernel end-to-end with its first-party plugins.
#[derive(Parser)]
#[command(name = "forge", about = "Plugin kernel demo host")]
struct Cli {
    /// Print "pong" and exit, bypassing application startup entirely.
    #[arg(long)]
    ping: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.ping {
        println!("pong");
        return;
    }

    println!("Initializing application...");

    let mut app = match Application::new() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize application: {}", e);
            return;
        }
    };

    let registrations: [(&str, Option<&str>, Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>); 2] = [
        (
            "core-logging",
            Some("core-logging"),
            Arc::new(|| Arc::new(core_logging::LoggingPlugin::new()) as Arc<dyn Plugin>),
        ),
        (
            "core-environment-check",
            None,
            Arc::new(|| Arc::new(core_environment_check::EnvironmentCheckPlugin::new()) as Arc<dyn Plugin>),
        ),
    ];

    for (name, config_prefix, creator) in registrations {
        if let Err(e) = app.register_plugin(name, config_prefix, creator).await {
            eprintln!("Failed to register {}: {}", name, e);
            return;
        }
    }

    if let Err(e) = app.run().await {
        eprintln!("Application error: {}", e);
    }

    println!("Shutting down application...");
}
