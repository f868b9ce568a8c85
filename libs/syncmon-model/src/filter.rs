//! Record filters
//!
//! Category and rule selectors applied before any aggregation. Filtering is
//! pure and preserves input order, so applying the two selectors in either
//! order gives the same result.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{DataCategory, SyncRecord, SyncRule};

/// `All` matches everything, `Only(v)` matches exactly `v`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Selector::All
    }
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str("all"),
            Selector::Only(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// Parses `all` (any case, or empty) as [`Selector::All`], anything else via `T::from_str`
impl<T: FromStr> FromStr for Selector<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Selector::All)
        } else {
            s.parse().map(Selector::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    pub category: Selector<DataCategory>,
    pub rule: Selector<SyncRule>,
}

impl RecordFilter {
    pub fn new(category: Selector<DataCategory>, rule: Selector<SyncRule>) -> Self {
        Self { category, rule }
    }

    pub fn matches(&self, record: &SyncRecord) -> bool {
        self.category.matches(&record.category) && self.rule.matches(&record.rule)
    }

    pub fn apply(&self, records: &[SyncRecord]) -> Vec<SyncRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category == Selector::All && self.rule == Selector::All
    }
}

/// Records matching both selectors, in input order
pub fn filter(
    records: &[SyncRecord],
    category: Selector<DataCategory>,
    rule: Selector<SyncRule>,
) -> Vec<SyncRecord> {
    RecordFilter::new(category, rule).apply(records)
}
