pub mod app;
pub mod config;
pub mod error;
pub mod outcome;

pub use app::App;
pub use config::{Config, LoggingConfig, TemperatureUnit, ValidationResult, WeatherConfig};
pub use error::{AppError, BoxError, Cancelled, ErrorKind};
pub use outcome::Outcome;

use anyhow::Result;

/// Initialize logging with `RUST_LOG`, falling back to `default_filter`
pub fn init(default_filter: &str) -> Result<()> {
    let fallback = if default_filter.trim().is_empty() {
        "info"
    } else {
        default_filter
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Weatherboard core initialized");
    Ok(())
}
