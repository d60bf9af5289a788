//! Command-line front end for the failover client.
//!
//! ```text
//! endpoint-failover [--config failover.toml] get /health
//! endpoint-failover status
//! endpoint-failover reset
//! ```
//!
//! Without a config file the settings fall back to defaults, with the
//! candidate list taken from `BACKEND_BASE_URLS`.

use clap::{Parser, Subcommand};
use reqwest::Method;
use std::path::{Path, PathBuf};

use endpoint_failover::config::loader::{apply_base_urls_override, load_config, BASE_URLS_ENV};
use endpoint_failover::config::validation::validate_config;
use endpoint_failover::config::FailoverSettings;
use endpoint_failover::observability::logging::init_logging;
use endpoint_failover::FailoverClient;

#[derive(Parser)]
#[command(name = "endpoint-failover")]
#[command(about = "HTTP client with automatic base URL failover", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "failover.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request for a path on the active base URL
    Get {
        /// Path relative to the base URL, e.g. /health
        path: String,
    },
    /// Print the persisted failover record
    Status,
    /// Forget all failover state
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = settings_from(&cli.config)?;
    init_logging(&settings.observability);

    tracing::debug!(
        config = %cli.config.display(),
        candidates = settings.candidates.base_urls.len(),
        discovery_enabled = settings.discovery.enabled,
        storage = %settings.storage.path,
        "Configuration loaded"
    );

    let client = FailoverClient::builder(settings).build()?;

    match cli.command {
        Commands::Get { path } => {
            client.init().await?;
            let Some(request) = client.request(Method::GET, &path) else {
                return Err("failover state is not initialized".into());
            };

            let response = client.send(request).await?;
            eprintln!("{} {}", response.status, response.url);
            println!("{}", response.text());
        }
        Commands::Status => {
            client.init().await?;
            match client.snapshot().await {
                Some(config) => println!("{}", serde_json::to_string_pretty(&config)?),
                None => println!("No failover state"),
            }
        }
        Commands::Reset => {
            client.reset().await;
            println!("Failover state cleared");
        }
    }

    Ok(())
}

fn settings_from(path: &Path) -> Result<FailoverSettings, Box<dyn std::error::Error>> {
    if path.exists() {
        return Ok(load_config(path)?);
    }

    let mut settings = FailoverSettings::default();
    if let Ok(raw) = std::env::var(BASE_URLS_ENV) {
        apply_base_urls_override(&mut settings, &raw);
    }
    if let Err(errors) = validate_config(&settings) {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(format!(
            "{} not found and defaults are invalid: {}",
            path.display(),
            details.join(", ")
        )
        .into());
    }
    Ok(settings)
}
