//! SyncSrv library exports
//!
//! The binary wires these together; integration tests drive the router
//! through [`routes::create_routes`] with a hand-built [`AppState`].

pub mod advisory;
pub mod api;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod ingest;
pub mod insight;
pub mod links;
pub mod routes;
pub mod store;

pub use advisory::{
    Advice, AdvisoryService, Advisor, ConnectivityDiagnosis, HealthInsight, HealthSummary,
    HttpAdvisory, RiskLevel, StaticAdvisory,
};
pub use app_state::AppState;
pub use config::SyncsrvConfig;
pub use error::{Result, SyncsrvError};
pub use ingest::TrafficGenerator;
pub use links::{LinkMonitor, LinkSample};
pub use routes::create_routes;
pub use store::RecordStore;
