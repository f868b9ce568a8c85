//! Validation Utilities
//!
//! Structural checks on records against the node registry. Pure, no IO.

use crate::error::{ModelError, Result};
use crate::node::NodeRegistry;
use crate::types::SyncRecord;

/// Validate a record id
///
/// Rules:
/// - Length: 1-64 characters
/// - Characters: alphanumeric, underscore (_), hyphen (-)
///
/// # Examples
/// ```
/// use syncmon_model::validate_record_id;
///
/// assert!(validate_record_id("10042").is_ok());
/// assert!(validate_record_id("sync-7_a").is_ok());
/// assert!(validate_record_id("").is_err());
/// assert!(validate_record_id("../etc").is_err());
/// ```
pub fn validate_record_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ModelError::validation("Record id cannot be empty"));
    }
    if id.len() > 64 {
        return Err(ModelError::validation(format!(
            "Record id too long ({} characters). Maximum length is 64 characters.",
            id.len()
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ModelError::validation(format!(
            "Record id can only contain letters, numbers, underscores and hyphens: '{}'",
            id
        )));
    }
    Ok(())
}

/// Check a record against the registry.
///
/// Both endpoints must be registered and distinct, and the flag's track must
/// be Primary exactly when the destination is the statutory node.
pub fn validate_record(record: &SyncRecord, registry: &NodeRegistry) -> Result<()> {
    validate_record_id(&record.id)?;

    for endpoint in [&record.source, &record.destination] {
        if !registry.contains(endpoint.as_str()) {
            return Err(ModelError::NodeNotFound(endpoint.to_string()));
        }
    }

    if record.source == record.destination {
        return Err(ModelError::integrity(
            &record.id,
            format!("source and destination are both {}", record.source),
        ));
    }

    let expected = registry.expected_track(record.destination.as_str());
    if record.flag.track != expected {
        return Err(ModelError::integrity(
            &record.id,
            format!(
                "flag {} is on the {} track but a record to {} belongs on the {} track",
                record.flag, record.flag.track, record.destination, expected
            ),
        ));
    }

    Ok(())
}
