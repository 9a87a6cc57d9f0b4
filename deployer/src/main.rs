//! Nomad Deployment API - Entry Point
//!
//! Serves the branch deployment API in front of a Nomad cluster.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use deployer::app::options::AppOptions;
use deployer::app::run::run;
use deployer::logs::{init_logging, LogOptions};
use deployer::settings::{Settings, DEFAULT_SETTINGS_PATH};
use deployer::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize version: {e}"),
        }
        return;
    }

    // Retrieve the settings file
    let config_path = cli_args.get("config").map(PathBuf::from);
    let (mut settings, from_file) = match Settings::load_configured(config_path.as_deref()).await {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Unable to read settings file: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = settings.apply_env().and_then(|_| settings.validate()) {
        eprintln!("Invalid settings: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        log_dir: settings.log_dir.clone(),
        json_format: settings.log_json,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            println!("Failed to initialize logging: {e}");
            None
        }
    };

    if !from_file {
        info!("No settings file at {}, using defaults", DEFAULT_SETTINGS_PATH);
    }

    // Run the server
    let options = AppOptions::from(&settings);

    info!(
        "Running Nomad deployment API {} with options: {:?}",
        version.version, options
    );
    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Failed to run the deployment API: {e}");
        std::process::exit(1);
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, waiting for Ctrl+C only");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
        }
        info!("Ctrl+C received, shutting down...");
    }
}
