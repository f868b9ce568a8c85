//! Data Transfer Objects for the Sync Service API
//!
//! Query parameters arrive as raw strings and are parsed here, so an
//! unknown selector becomes a 400 with a field error instead of a generic
//! query rejection.

use serde::{Deserialize, Serialize};
use syncmon_model::{ForceSyncOutcome, RecordFilter, Selector, SyncRecord};
use syncmon_stats::AttributionPolicy;

use crate::error::{Result, SyncsrvError};

// === Query Parameters ===

/// `?category=&rule=`; missing, empty or `all` selects everything
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub category: Option<String>,
    pub rule: Option<String>,
}

impl FilterQuery {
    pub fn to_filter(&self) -> Result<RecordFilter> {
        let category = parse_selector("category", self.category.as_deref())?;
        let rule = parse_selector("rule", self.rule.as_deref())?;
        Ok(RecordFilter::new(category, rule))
    }
}

/// Filter plus the region attribution policy for exception views
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExceptionsQuery {
    pub category: Option<String>,
    pub rule: Option<String>,
    pub attribution: Option<String>,
}

impl ExceptionsQuery {
    pub fn to_filter(&self) -> Result<RecordFilter> {
        FilterQuery {
            category: self.category.clone(),
            rule: self.rule.clone(),
        }
        .to_filter()
    }

    /// Requested policy, or `default` when the parameter is absent
    pub fn attribution_or(&self, default: AttributionPolicy) -> Result<AttributionPolicy> {
        match self.attribution.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|e: String| SyncsrvError::invalid_param("attribution", e)),
        }
    }
}

fn parse_selector<T>(param: &str, raw: Option<&str>) -> Result<Selector<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(Selector::All),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| SyncsrvError::invalid_param(param, e.to_string())),
    }
}

// === Request Bodies ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLevelRequest {
    /// tracing filter directive, e.g. `debug` or `info,syncsrv=trace`
    pub level: String,
}

// === Responses ===

#[derive(Debug, Clone, Serialize)]
pub struct RecordList {
    pub version: u64,
    pub total: usize,
    pub records: Vec<SyncRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForceSyncResponse {
    pub id: String,
    /// Collection version after the action
    pub version: u64,
    #[serde(flatten)]
    pub outcome: ForceSyncOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLevelResponse {
    pub level: String,
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use syncmon_model::{DataCategory, SyncFlag, SyncRule};

    #[test]
    fn test_filter_query_parsing() {
        let query = FilterQuery::default();
        assert_eq!(query.to_filter().unwrap(), RecordFilter::default());

        let query = FilterQuery {
            category: Some("Master Data".to_string()),
            rule: Some("all".to_string()),
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.category, Selector::Only(DataCategory::Master));
        assert_eq!(filter.rule, Selector::All);

        let query = FilterQuery {
            category: None,
            rule: Some("sales_return".to_string()),
        };
        assert_eq!(
            query.to_filter().unwrap().rule,
            Selector::Only(SyncRule::SalesReturn)
        );
    }

    #[test]
    fn test_unknown_selector_names_the_parameter() {
        let query = FilterQuery {
            category: Some("bulk".to_string()),
            rule: None,
        };
        match query.to_filter().unwrap_err() {
            SyncsrvError::InvalidParameter { param, .. } => assert_eq!(param, "category"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_attribution_default_and_override() {
        let query = ExceptionsQuery::default();
        assert_eq!(
            query.attribution_or(AttributionPolicy::RegistryOrder).unwrap(),
            AttributionPolicy::RegistryOrder
        );

        let query = ExceptionsQuery {
            attribution: Some("source-first".to_string()),
            ..ExceptionsQuery::default()
        };
        assert_eq!(
            query.attribution_or(AttributionPolicy::RegistryOrder).unwrap(),
            AttributionPolicy::SourceFirst
        );

        let query = ExceptionsQuery {
            attribution: Some("random".to_string()),
            ..ExceptionsQuery::default()
        };
        assert!(query.attribution_or(AttributionPolicy::SourceFirst).is_err());
    }

    #[test]
    fn test_force_sync_response_shape() {
        let response = ForceSyncResponse {
            id: "10001".to_string(),
            version: 4,
            outcome: ForceSyncOutcome::Advanced {
                from: SyncFlag::PRIMARY_PENDING,
                to: SyncFlag::PRIMARY_IN_TRANSIT,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["outcome"], "advanced");
        assert_eq!(json["version"], 4);
    }
}
