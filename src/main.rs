use anyhow::Result;
use khon_detect::{config, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Parses a level or a full directive list such as `khon_detect=debug,tower_http=info`
fn build_env_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| {
        anyhow::anyhow!(
            "Invalid log level: '{}' ({}). Use a level (error, warn, info, debug, trace) or target=level directives",
            directives,
            e
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Determine log level: environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    let env_filter = match build_env_filter(&log_level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing with the determined log level
    tracing_subscriber::fmt().with_env_filter(env_filter).json().init();

    info!("Starting khon-detect server with log level: {}", log_level);
    info!(
        "Configuration loaded: detection={}, classification={}",
        config.models.detection.path.display(),
        config.models.classification.path.display()
    );

    // Start the server
    server::run(config).await?;

    Ok(())
}
