//! SyncMonitor Model Library
//!
//! Record model for the sync monitor: flags, categories, rules, the node
//! registry, record filters and the force-sync transition. Pure logic with
//! no service dependencies.
//!
//! # Modules
//!
//! - `types`: `SyncRecord`, `SyncFlag` (track x stage), categories and rules
//! - `node`: `NodeRegistry` and `ServerNode`
//! - `collection`: versioned, immutable `RecordSet`
//! - `filter`: category / rule selectors
//! - `transition`: the force-sync operator action
//! - `validation`: record checks against the registry
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use syncmon_model::{force_sync, DataCategory, NodeId, RecordSet, SyncFlag, SyncRecord, SyncRule};
//!
//! let record = SyncRecord::new(
//!     "10000",
//!     NodeId::from("DM"),
//!     NodeId::from("DS"),
//!     DataCategory::Master,
//!     SyncRule::AllData,
//!     SyncFlag::PRIMARY_PENDING,
//!     Utc::now(),
//! );
//! let records = RecordSet::new(vec![record]);
//! let next = force_sync(&records, "10000", Utc::now());
//! assert_eq!(next.get("10000").map(|r| r.flag), Some(SyncFlag::PRIMARY_IN_TRANSIT));
//! ```

pub mod collection;
pub mod error;
pub mod filter;
pub mod node;
pub mod transition;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use collection::RecordSet;
pub use error::{ModelError, Result};
pub use filter::{filter, RecordFilter, Selector};
pub use node::{NodeRegistry, NodeStatus, ServerNode};
pub use transition::{force_sync, force_sync_with_outcome, ForceSyncOutcome};
pub use types::{DataCategory, NodeId, Stage, SyncFlag, SyncRecord, SyncRule, Track};
pub use validation::{validate_record, validate_record_id};
