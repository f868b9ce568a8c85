//! SyncMonitor Routing Library
//!
//! Declarative route catalog: which `(source, destination, category)` routes
//! exist, which rule they require and which track's flags they use. Records
//! are assigned to routes by table lookup.

pub mod catalog;
pub mod error;
pub mod loader;

pub use catalog::{FlagTriad, RouteCatalog, RouteDefinition};
pub use error::{Result, RoutingError};
pub use loader::{load_catalog, RouteRow};
