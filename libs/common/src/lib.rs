//! SyncMonitor common library
//!
//! Pieces shared by every service:
//! - configuration structs and layered loading
//! - logging with runtime level control and HTTP access logs
//! - API response envelopes and health models
//! - startup and shutdown helpers

pub mod api_types;
pub mod config_loader;
pub mod logging;
pub mod service_bootstrap;
pub mod service_config;
pub mod shutdown;

pub use service_config::{
    ApiConfig, BaseServiceConfig, LoggingConfig, ValidationResult, DEFAULT_API_HOST,
    ENV_LOG_DIR, LOCALHOST_HOST,
};

pub use api_types::{
    ComponentHealth, ErrorInfo, ErrorResponse, HealthStatus, ServiceStatus, SuccessResponse,
};

#[cfg(feature = "axum")]
pub use api_types::AppError;

pub use config_loader::{load_service_config, service_figment};

// Re-export common dependencies
pub use serde;
pub use serde_json;
pub use tokio;
