//! syncsrv error types

use common::{AppError, ErrorInfo};
use errors::{ErrorCategory, SyncMonErrorTrait};
use syncmon_model::ModelError;
use syncmon_routing::RoutingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncsrvError>;

#[derive(Debug, Error)]
pub enum SyncsrvError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unparseable query or path parameter
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter { param: String, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("Advisory service error: {0}")]
    Advisory(String),

    #[error("Advisory service timed out")]
    AdvisoryTimeout,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncsrvError {
    pub fn invalid_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub fn advisory(msg: impl Into<String>) -> Self {
        Self::Advisory(msg.into())
    }
}

impl SyncMonErrorTrait for SyncsrvError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "SYNCSRV_CONFIG_ERROR",
            Self::InvalidConfig(_) => "SYNCSRV_INVALID_CONFIG",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::Model(e) => e.error_code(),
            Self::Routing(e) => e.error_code(),
            Self::Advisory(_) => "SYNCSRV_ADVISORY_ERROR",
            Self::AdvisoryTimeout => "SYNCSRV_ADVISORY_TIMEOUT",
            Self::Http(_) => "SYNCSRV_HTTP_ERROR",
            Self::Internal(_) => "SYNCSRV_INTERNAL_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::InvalidConfig(_) => ErrorCategory::Configuration,
            Self::InvalidParameter { .. } => ErrorCategory::Validation,
            Self::Model(e) => e.category(),
            Self::Routing(e) => e.category(),
            Self::Advisory(_) => ErrorCategory::Network,
            Self::AdvisoryTimeout => ErrorCategory::Timeout,
            Self::Http(e) if e.is_timeout() => ErrorCategory::Timeout,
            Self::Http(_) => ErrorCategory::Network,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

impl From<SyncsrvError> for AppError {
    fn from(err: SyncsrvError) -> Self {
        match err.log_level() {
            tracing::Level::ERROR => tracing::error!("Request failed: {}", err),
            tracing::Level::WARN => tracing::warn!("Request failed: {}", err),
            _ => tracing::debug!("Request rejected: {}", err),
        }

        let app = match (&err, err.category()) {
            (SyncsrvError::InvalidParameter { param, reason }, _) => {
                AppError::invalid_param(param.clone(), reason.clone())
            },
            (_, ErrorCategory::NotFound) => AppError::not_found(err.to_string()),
            (_, ErrorCategory::Internal) => AppError::internal_error(err.to_string()),
            _ => {
                let status = err.http_status();
                AppError::new(
                    status,
                    ErrorInfo::new(err.to_string()).with_code(status.as_u16()),
                )
            },
        };
        app.with_error_code(err.error_code())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let err = SyncsrvError::invalid_param("category", "unknown data category: bulk");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);

        let err = SyncsrvError::from(ModelError::NodeNotFound("ZZ".into()));
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NODE_NOT_FOUND");

        assert_eq!(
            SyncsrvError::AdvisoryTimeout.http_status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            SyncsrvError::advisory("502 from upstream").http_status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_invalid_param_carries_field_error() {
        let app: AppError = SyncsrvError::invalid_param("rule", "unknown sync rule: x").into();
        assert_eq!(app.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            app.error.field_errors["rule"],
            vec!["unknown sync rule: x".to_string()]
        );
        assert_eq!(app.error.error_code.as_deref(), Some("INVALID_PARAMETER"));
    }

    #[test]
    fn test_not_found_and_internal_mapping() {
        let app: AppError = SyncsrvError::from(ModelError::NodeNotFound("ZZ".into())).into();
        assert_eq!(app.status, StatusCode::NOT_FOUND);
        assert_eq!(app.error.code, 404);
        assert_eq!(app.error.error_code.as_deref(), Some("NODE_NOT_FOUND"));

        let app: AppError = SyncsrvError::Internal("store poisoned".into()).into();
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.error.error_code.as_deref(), Some("SYNCSRV_INTERNAL_ERROR"));

        let app: AppError = SyncsrvError::AdvisoryTimeout.into();
        assert_eq!(app.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(app.error.code, 504);
    }
}
