//! Widget Gateway - dashboard widget feed server
//!
//! Serves configured widget definitions as the XML/JSON payloads a
//! dashboard widget API expects.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use widget_gateway::{
    cli::{Cli, Command},
    config::Config,
    gateway::Gateway,
    registry::load_definition_file,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Some(Command::Check { ref file }) => run_check(file).await,
        Some(Command::Serve) | None => run_server(cli).await,
    }
}

/// Validate a widget definition file
async fn run_check(file: &Path) -> ExitCode {
    match load_definition_file(file).await {
        Ok(definition) => {
            println!("✅ {} - valid ({})", definition.name, definition.kind);
            if !definition.description.is_empty() {
                println!("   {}", definition.description);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Validation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run the gateway server
async fn run_server(cli: Cli) -> ExitCode {
    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            // Apply CLI overrides
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host = host.clone();
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        gate = config.auth.api_key.is_some(),
        "Starting widget gateway"
    );

    let mut gateway = Gateway::new(config);

    match gateway.load_widgets().await {
        Ok(count) => {
            info!(widgets = count, "Widget definitions loaded");
        }
        Err(e) => {
            error!("Failed to load widget definitions: {e}");
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = gateway.run().await {
        error!("Gateway error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Gateway shutdown complete");
    ExitCode::SUCCESS
}
