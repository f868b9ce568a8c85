//! Configuration structures shared across services
//!
//! - Base configuration structs (BaseServiceConfig, ApiConfig, LoggingConfig)
//! - Validation result type collected by each service's `validate()`

use serde::{Deserialize, Serialize};
use std::env;

// ============================================================================
// Default configuration constants
// ============================================================================

/// Default API bind host (listen on all interfaces)
pub const DEFAULT_API_HOST: &str = "0.0.0.0";

/// Localhost address for testing
pub const LOCALHOST_HOST: &str = "127.0.0.1";

/// Environment variable overriding the log root for every service
pub const ENV_LOG_DIR: &str = "SYNCMON_LOG_DIR";

// ============================================================================
// Base service configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Free text shown in the startup banner
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for BaseServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            description: None,
        }
    }
}

// ============================================================================
// API configuration
// ============================================================================

/// API server configuration
///
/// Note: port has no serde default - each service sets its own default port
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,

    pub port: u16,
}

impl ApiConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            host: default_api_host(),
            port,
        }
    }

    /// `host:port` for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Logging configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: String,

    /// Write HTTP access logs to a separate `api` subdirectory
    #[serde(default = "bool_true")]
    pub enable_api_log: bool,

    /// Number of daily log files to retain
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_service_name() -> String {
    "unnamed_service".to_string()
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_log_level() -> String {
    env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_max_files() -> usize {
    30
}

/// Serde default for boolean true
pub fn bool_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            enable_api_log: true,
            max_files: default_max_files(),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Errors and warnings collected while validating a configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl BaseServiceConfig {
    pub fn validate(&self, result: &mut ValidationResult) {
        if self.name.is_empty() {
            result.add_error("Service name cannot be empty".to_string());
        }
    }
}

impl ApiConfig {
    pub fn validate(&self, result: &mut ValidationResult) {
        if self.port == 0 {
            result.add_error("API port cannot be 0".to_string());
        } else if self.port < 1024 {
            result.add_warning(format!(
                "API port {} is in system range (< 1024)",
                self.port
            ));
        }

        if self.host.is_empty() {
            result.add_error("API host cannot be empty".to_string());
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self, result: &mut ValidationResult) {
        if self.level.parse::<tracing::Level>().is_err() {
            result.add_warning(format!(
                "Unknown log level '{}', falling back to info",
                self.level
            ));
        }
        if self.dir.is_empty() {
            result.add_error("Log directory cannot be empty".to_string());
        }
    }
}
