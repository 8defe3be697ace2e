use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::Config;

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    scope: CancellationToken,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    ///
    /// Config warnings are logged, so initialize logging first.
    pub fn new() -> Result<Self> {
        Self::from_config(Config::load()?)
    }

    /// Validate a loaded configuration and build the app around it
    ///
    /// Fails on validation errors; warnings are logged.
    pub fn from_config(config: Config) -> Result<Self> {
        config.check()?;
        Ok(Self::with_config(config))
    }

    /// Create an application instance around an already loaded configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            scope: CancellationToken::new(),
        }
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Root cancellation scope. Work started under it stops on shutdown.
    pub fn scope(&self) -> CancellationToken {
        self.scope.clone()
    }

    /// Shutdown the application, cancelling everything running under its scope
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        self.scope.cancel();
        Ok(())
    }
}
