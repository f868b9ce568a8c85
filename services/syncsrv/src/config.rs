//! syncsrv configuration
//!
//! Loaded by [`common::config_loader::load_service_config`]: defaults, then
//! `config/syncsrv.yaml` (or `--config`), then `SYNCSRV_*` environment
//! variables, e.g. `SYNCSRV_API__PORT=7002` or `SYNCSRV_INGEST__ENABLED=false`.

use common::{ApiConfig, BaseServiceConfig, LoggingConfig, ValidationResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use syncmon_routing::RouteRow;
use syncmon_stats::AttributionPolicy;

use crate::error::{Result, SyncsrvError};

pub const SERVICE_NAME: &str = "syncsrv";
pub const DEFAULT_PORT: u16 = 6005;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncsrvConfig {
    #[serde(default = "default_service")]
    pub service: BaseServiceConfig,

    #[serde(default = "default_api")]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub links: LinksConfig,

    #[serde(default)]
    pub advisory: AdvisoryConfig,

    #[serde(default)]
    pub exceptions: ExceptionsConfig,

    /// Route table; empty means the built-in catalog
    #[serde(default)]
    pub routes: Vec<RouteRow>,
}

impl Default for SyncsrvConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            api: default_api(),
            logging: LoggingConfig::default(),
            ingest: IngestConfig::default(),
            links: LinksConfig::default(),
            advisory: AdvisoryConfig::default(),
            exceptions: ExceptionsConfig::default(),
            routes: Vec::new(),
        }
    }
}

fn default_service() -> BaseServiceConfig {
    BaseServiceConfig {
        name: SERVICE_NAME.to_string(),
        description: Some("Sync Monitoring Service".to_string()),
    }
}

fn default_api() -> ApiConfig {
    ApiConfig::with_port(DEFAULT_PORT)
}

/// Synthetic record producer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Run the periodic producer (the initial seed happens regardless)
    pub enabled: bool,
    /// Records generated at startup
    pub initial_records: usize,
    pub interval_secs: u64,
    pub batch_size: usize,
    /// Retention cap; the oldest records are evicted beyond it
    pub max_records: usize,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_records: 150,
            interval_secs: 30,
            batch_size: 5,
            max_records: 1000,
            seed: None,
        }
    }
}

impl IngestConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 4,
        }
    }
}

impl LinksConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// External advisory service (OpenAI-compatible chat completions)
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// When false the static fallback answers every request
    pub enabled: bool,
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// How often the cached health insight is checked for staleness
    pub refresh_secs: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 10,
            refresh_secs: 15,
        }
    }
}

impl AdvisoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

// Keeps the api key out of logs
impl std::fmt::Debug for AdvisoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryConfig")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("refresh_secs", &self.refresh_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionsConfig {
    /// Default attribution when a request does not pick one
    pub attribution: AttributionPolicy,
}

impl SyncsrvConfig {
    /// Collect every problem, then fail with all errors joined
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut result = ValidationResult::new();
        self.service.validate(&mut result);
        self.api.validate(&mut result);
        self.logging.validate(&mut result);

        if self.ingest.interval_secs == 0 {
            result.add_error("ingest.interval_secs must be greater than 0".to_string());
        }
        if self.ingest.batch_size == 0 {
            result.add_error("ingest.batch_size must be greater than 0".to_string());
        }
        if self.ingest.max_records < self.ingest.batch_size {
            result.add_error(format!(
                "ingest.max_records ({}) must be at least ingest.batch_size ({})",
                self.ingest.max_records, self.ingest.batch_size
            ));
        }
        if self.ingest.initial_records > self.ingest.max_records {
            result.add_warning(format!(
                "ingest.initial_records ({}) exceeds max_records ({}); the seed will be trimmed",
                self.ingest.initial_records, self.ingest.max_records
            ));
        }
        if self.links.interval_secs == 0 {
            result.add_error("links.interval_secs must be greater than 0".to_string());
        }

        if self.advisory.enabled {
            match self.advisory.endpoint.as_deref() {
                None | Some("") => result.add_error(
                    "advisory.endpoint is required when advisory.enabled is true".to_string(),
                ),
                Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    result.add_error(format!("advisory.endpoint '{}' is not an http(s) URL", url))
                },
                Some(_) => {}
            }
            if self.advisory.api_key.is_none() {
                result.add_warning("advisory.api_key not set; requests go out unauthenticated".to_string());
            }
        }
        if self.advisory.timeout_secs == 0 {
            result.add_error("advisory.timeout_secs must be greater than 0".to_string());
        }
        if self.advisory.refresh_secs == 0 {
            result.add_error("advisory.refresh_secs must be greater than 0".to_string());
        }

        if result.is_valid {
            Ok(result)
        } else {
            Err(SyncsrvError::InvalidConfig(result.errors.join("; ")))
        }
    }
}
