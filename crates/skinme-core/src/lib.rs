pub mod config;
pub mod error;
pub mod language;

pub use config::{Config, ServiceConfig, StorageConfig, UiConfig, WeatherConfig};
pub use error::{AppError, ConfigError, NetworkError, StorageError, WeatherError};
pub use language::Language;

use anyhow::Result;

/// Initialize tracing for the SkinMe client.
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("SkinMe core initialized");
    Ok(())
}
