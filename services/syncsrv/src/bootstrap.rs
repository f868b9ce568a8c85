//! Service Bootstrap and Initialization
//!
//! Configuration loading, logging, advisor selection, initial state and the
//! background producers.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use common::service_bootstrap::{get_service_port, ServiceInfo};
use syncmon_model::{NodeRegistry, RecordSet};
use syncmon_routing::load_catalog;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::advisory::{Advisor, HttpAdvisory};
use crate::app_state::AppState;
use crate::config::{AdvisoryConfig, SyncsrvConfig, DEFAULT_PORT, SERVICE_NAME};
use crate::error::{Result, SyncsrvError};
use crate::ingest::{spawn_ingest_task, TrafficGenerator};
use crate::insight::spawn_insight_refresher;
use crate::links::spawn_link_heartbeat;

pub fn create_service_info() -> ServiceInfo {
    ServiceInfo::new(
        SERVICE_NAME,
        "Sync Monitoring Service - Replication Dashboard & Operator Actions",
        DEFAULT_PORT,
    )
}

/// A validated configuration and the warnings found while checking it
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: SyncsrvConfig,
    /// Logged by [`init_environment`] once the subscriber is installed
    pub warnings: Vec<String>,
}

/// Load `.env`, start logging, print the banner and report config warnings
pub fn init_environment(service_info: &ServiceInfo, loaded: &LoadedConfig) -> Result<()> {
    common::service_bootstrap::load_development_env();

    common::service_bootstrap::init_logging(service_info, Some(&loaded.config.logging))
        .map_err(|e| SyncsrvError::Config(format!("Failed to initialize logging: {}", e)))?;

    common::service_bootstrap::print_startup_banner(service_info);
    info!("SyncSrv starting");
    for warning in &loaded.warnings {
        warn!("Config: {}", warning);
    }
    Ok(())
}

/// Layered configuration load, port resolution and validation
///
/// Runs before logging is up, so warnings are returned rather than logged.
pub fn load_configuration(path: Option<&Path>, service_info: &ServiceInfo) -> Result<LoadedConfig> {
    let mut config: SyncsrvConfig = common::load_service_config(SERVICE_NAME, path)
        .map_err(|e| SyncsrvError::Config(e.to_string()))?;

    config.api.port = get_service_port(config.api.port, service_info);

    let result = config.validate()?;
    Ok(LoadedConfig {
        config,
        warnings: result.warnings,
    })
}

/// HTTP backend when enabled, otherwise the static fallback advisor
pub fn build_advisor(config: &AdvisoryConfig) -> Result<Advisor> {
    if !config.enabled {
        info!("Advisory: disabled, serving static insights");
        return Ok(Advisor::offline());
    }

    let backend = HttpAdvisory::new(config)?;
    info!(
        "Advisory: {} via {:?} (timeout {}s)",
        config.model, config.endpoint, config.timeout_secs
    );
    Ok(Advisor::new(Arc::new(backend)))
}

/// Registry, catalog and seeded collection
///
/// Returns the generator as well so ingestion continues the id sequence.
pub fn build_state(config: SyncsrvConfig, advisor: Advisor) -> Result<(AppState, TrafficGenerator)> {
    let registry = NodeRegistry::standard();
    let catalog = Arc::new(load_catalog(&config.routes, &registry)?);

    let mut generator = TrafficGenerator::new(Arc::clone(&catalog), config.ingest.seed);
    let seed = generator.batch(config.ingest.initial_records, Utc::now());
    let initial = RecordSet::new(seed).retain_latest(config.ingest.max_records);
    info!(
        "Seeded {} records over {} routes and {} nodes",
        initial.len(),
        catalog.len(),
        registry.len()
    );

    let state = AppState::new(config, registry, catalog, advisor, initial);
    Ok((state, generator))
}

/// Start every background producer; all stop when `token` is cancelled
pub fn spawn_background_tasks(
    state: &Arc<AppState>,
    generator: TrafficGenerator,
    token: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    let config = &state.config;
    let mut handles = Vec::new();

    if config.ingest.enabled {
        handles.push(spawn_ingest_task(
            Arc::clone(&state.records),
            generator,
            config.ingest.clone(),
            token.clone(),
        ));
    } else {
        info!("Ingest: disabled");
    }

    if config.links.enabled {
        handles.push(spawn_link_heartbeat(
            Arc::clone(&state.links),
            config.links.interval(),
            token.clone(),
        ));
    }

    handles.push(spawn_insight_refresher(
        Arc::clone(state),
        config.advisory.refresh_interval(),
        token.clone(),
    ));

    debug!("Background tasks: {}", handles.len());
    handles
}
