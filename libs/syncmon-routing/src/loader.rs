//! Configured Route Loader
//!
//! Builds a [`RouteCatalog`] from the route rows of the service
//! configuration. Rows name nodes and enums as strings, so each one is
//! parsed and checked against the node registry before the catalog is built.

use serde::{Deserialize, Serialize};
use syncmon_model::{DataCategory, NodeRegistry, SyncRule, Track};
use tracing::{debug, info};

use crate::catalog::{RouteCatalog, RouteDefinition};
use crate::error::{Result, RoutingError};

/// One route as written in configuration
///
/// ```yaml
/// routes:
///   - { source: DM, destination: DS, category: master }
///   - { source: TS, destination: DM, category: transaction, rule: sales_return }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRow {
    pub source: String,
    pub destination: String,
    pub category: String,
    #[serde(default)]
    pub rule: Option<String>,
    /// Defaults to the track implied by the destination
    #[serde(default)]
    pub track: Option<String>,
}

/// Load the catalog from configured rows
///
/// An empty row list yields [`RouteCatalog::standard`].
///
/// # Returns
/// * `Ok(RouteCatalog)` - Validated catalog
/// * `Err(RoutingError)` - Unknown node, bad enum value, wrong track, duplicate or self-loop
pub fn load_catalog(rows: &[RouteRow], registry: &NodeRegistry) -> Result<RouteCatalog> {
    if rows.is_empty() {
        debug!("No configured routes, using the standard catalog");
        return Ok(RouteCatalog::standard());
    }

    let definitions = rows
        .iter()
        .map(|row| parse_row(row, registry))
        .collect::<Result<Vec<_>>>()?;
    let catalog = RouteCatalog::from_definitions(definitions)?;

    info!("Routes loaded: {} from configuration", catalog.len());
    Ok(catalog)
}

fn parse_row(row: &RouteRow, registry: &NodeRegistry) -> Result<RouteDefinition> {
    let label = format!("{} → {}", row.source, row.destination);

    for node in [&row.source, &row.destination] {
        if !registry.contains(node) {
            return Err(RoutingError::UnknownNode {
                label,
                node: node.clone(),
            });
        }
    }

    let category: DataCategory = row.category.parse()?;
    let rule = row
        .rule
        .as_deref()
        .map(str::parse::<SyncRule>)
        .transpose()?;

    let expected = registry.expected_track(&row.destination);
    let track = match row.track.as_deref() {
        Some(declared) => {
            let declared: Track = declared.parse()?;
            if declared != expected {
                return Err(RoutingError::TrackMismatch {
                    label,
                    declared: declared.to_string(),
                    expected: expected.to_string(),
                });
            }
            declared
        },
        None => expected,
    };

    Ok(RouteDefinition::new(
        &row.source,
        &row.destination,
        category,
        rule,
        track,
    ))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn rows(yaml: &str) -> Vec<RouteRow> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_empty_rows_use_standard_catalog() {
        let catalog = load_catalog(&[], &NodeRegistry::standard()).unwrap();
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_rows_from_yaml() {
        let rows = rows(
            r#"
- { source: DM, destination: DS, category: master }
- { source: TS, destination: DM, category: "Transaction Data", rule: "Sales & Return Only" }
- { source: DM, destination: KS, category: transaction, track: port }
"#,
        );
        let catalog = load_catalog(&rows, &NodeRegistry::standard()).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.routes()[0].track, Track::Primary);
        assert_eq!(catalog.routes()[1].required_rule, Some(SyncRule::SalesReturn));
        assert_eq!(catalog.routes()[2].track, Track::Regional);
    }

    #[test]
    fn test_rejects_unknown_node_and_bad_values() {
        let registry = NodeRegistry::standard();

        let err = load_catalog(&rows("- { source: DM, destination: ZZ, category: master }"), &registry)
            .unwrap_err();
        assert!(matches!(err, RoutingError::UnknownNode { .. }));

        let err = load_catalog(&rows("- { source: DM, destination: TS, category: bulk }"), &registry)
            .unwrap_err();
        assert!(matches!(err, RoutingError::InvalidRow(_)));
    }

    #[test]
    fn test_rejects_track_that_breaks_invariant() {
        let err = load_catalog(
            &rows("- { source: DM, destination: DS, category: master, track: regional }"),
            &NodeRegistry::standard(),
        )
        .unwrap_err();
        assert!(matches!(err, RoutingError::TrackMismatch { .. }));
    }
}
