use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tourguide_agent::AgentRuntime;
use tourguide_core::config::{AppConfig, ConfigError, LoadOptions};
use tourguide_core::{Catalog, CatalogError};
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
    pub runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("catalog load failed for `{path}`: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
    #[error("agent runtime setup failed: {0}")]
    Agent(String),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let path = config.catalog.path.clone();
    let catalog = Arc::new(
        Catalog::load(&path).map_err(|source| BootstrapError::Catalog { path: path.clone(), source })?,
    );
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        path = %path.display(),
        places = catalog.len(),
        "place catalog loaded"
    );

    let runtime = AgentRuntime::from_config(catalog.clone(), &config)
        .map_err(|error| BootstrapError::Agent(error.to_string()))?;
    info!(
        event_name = "system.bootstrap.runtime_ready",
        correlation_id = "bootstrap",
        polisher = runtime.polisher_name().unwrap_or("none"),
        safety_enabled = config.safety.enabled,
        "agent runtime ready"
    );

    Ok(Application { config, catalog, runtime: Arc::new(runtime) })
}
