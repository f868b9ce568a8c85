//! Model Layer Error Types

use errors::{ErrorCategory, SyncMonErrorTrait};
use thiserror::Error;

/// Result type for syncmon-model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Model layer errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Two-letter flag code outside the six known values
    #[error("Unknown sync flag: {0}")]
    UnknownFlag(String),

    #[error("Unknown data category: {0}")]
    UnknownCategory(String),

    #[error("Unknown sync rule: {0}")]
    UnknownRule(String),

    #[error("Unknown track: {0}")]
    UnknownTrack(String),

    /// Node id not present in the registry
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Record breaks the track invariant or another structural rule
    #[error("Integrity violation on record {record_id}: {reason}")]
    Integrity { record_id: String, reason: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

// Helper methods
impl ModelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ModelError::Validation(msg.into())
    }

    pub fn integrity(record_id: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::Integrity {
            record_id: record_id.into(),
            reason: reason.into(),
        }
    }
}

impl SyncMonErrorTrait for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownFlag(_) => "UNKNOWN_FLAG",
            Self::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Self::UnknownRule(_) => "UNKNOWN_RULE",
            Self::UnknownTrack(_) => "UNKNOWN_TRACK",
            Self::NodeNotFound(_) => "NODE_NOT_FOUND",
            Self::Integrity { .. } => "INTEGRITY_VIOLATION",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::NodeNotFound(_) => ErrorCategory::NotFound,
            Self::Integrity { .. } => ErrorCategory::DataIntegrity,
            _ => ErrorCategory::Validation,
        }
    }
}
