use errors::{ErrorCategory, SyncMonErrorTrait};
use syncmon_model::ModelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoutingError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Route {label} starts and ends at the same node")]
    SelfLoop { label: String },

    #[error("Duplicate route: {label} ({category})")]
    Duplicate { label: String, category: String },

    /// Route endpoint not in the node registry
    #[error("Route {label} references unknown node {node}")]
    UnknownNode { label: String, node: String },

    #[error("Route {label} declares the {declared} track but its destination requires {expected}")]
    TrackMismatch {
        label: String,
        declared: String,
        expected: String,
    },

    #[error("Invalid route row: {0}")]
    InvalidRow(#[from] ModelError),
}

impl SyncMonErrorTrait for RoutingError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SelfLoop { .. } => "ROUTE_SELF_LOOP",
            Self::Duplicate { .. } => "ROUTE_DUPLICATE",
            Self::UnknownNode { .. } => "ROUTE_UNKNOWN_NODE",
            Self::TrackMismatch { .. } => "ROUTE_TRACK_MISMATCH",
            Self::InvalidRow(_) => "ROUTE_INVALID_ROW",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Duplicate { .. } => ErrorCategory::Conflict,
            _ => ErrorCategory::Configuration,
        }
    }
}
