//! Shared error handling for SyncMonitor crates
//!
//! Library crates keep their own domain error enums and expose a common
//! surface through [`SyncMonErrorTrait`]. [`SyncMonError`] covers the
//! failures of the shared plumbing in `common` (configuration loading and
//! logging setup).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// ErrorInfo - API error payload
// ============================================================================

/// Error payload carried by API error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// HTTP status code
    pub code: u16,
    /// Human readable message
    pub message: String,
    /// Stable machine readable code (e.g. `NODE_NOT_FOUND`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Per-field validation messages
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, Vec<String>>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            message: message.into(),
            error_code: None,
            field_errors: HashMap::new(),
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    pub fn add_field_error(mut self, field: impl Into<String>, error: impl Into<String>) -> Self {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(error.into());
        self
    }
}

// ============================================================================
// SyncMonError - shared plumbing errors
// ============================================================================

#[derive(Debug, Error)]
pub enum SyncMonError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bad filter directive or a subscriber that cannot be installed
    #[error("Logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SyncMonResult<T> = Result<T, SyncMonError>;

impl SyncMonError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}

// ============================================================================
// Error trait shared by every crate's error type
// ============================================================================

/// Error category, used for classification and log routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    // Infrastructure layer
    Configuration,
    Network,
    Timeout,

    // Business logic layer
    Validation,
    NotFound,
    Conflict,

    // Record model layer
    DataIntegrity,

    // System level
    Internal,
}

/// Common interface over the per-crate error enums.
///
/// Each crate keeps its own variants (`ModelError`, `RoutingError`,
/// `SyncsrvError`) and implements this trait for uniform codes, HTTP
/// mapping and log levels.
pub trait SyncMonErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Stable error code (for API payloads and logs)
    fn error_code(&self) -> &'static str;

    fn category(&self) -> ErrorCategory;

    #[cfg(feature = "axum-support")]
    fn http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict | ErrorCategory::DataIntegrity => StatusCode::CONFLICT,
            ErrorCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorCategory::Network => StatusCode::BAD_GATEWAY,
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::DataIntegrity => Level::ERROR,
            ErrorCategory::Validation | ErrorCategory::NotFound => Level::INFO,
            ErrorCategory::Configuration
            | ErrorCategory::Conflict
            | ErrorCategory::Network
            | ErrorCategory::Timeout => Level::WARN,
        }
    }
}
