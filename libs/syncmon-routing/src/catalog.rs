//! Route catalog
//!
//! Static table of the routes records travel on. Each definition names its
//! endpoints, the category it carries, an optional required rule and the
//! track whose flags it uses.
//!
//! ## Index
//!
//! Definitions are indexed by `(source, destination, category)`. Because the
//! category is part of the key, a record can only ever match definitions of
//! its own category, so no record is counted under two routes.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use syncmon_model::{DataCategory, NodeId, Stage, SyncFlag, SyncRecord, SyncRule, Track};

use crate::error::{Result, RoutingError};

/// The three flags of one track, in stage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagTriad {
    pub pending: SyncFlag,
    pub in_transit: SyncFlag,
    pub success: SyncFlag,
}

impl FlagTriad {
    pub const fn of(track: Track) -> Self {
        Self {
            pending: SyncFlag::new(track, Stage::Pending),
            in_transit: SyncFlag::new(track, Stage::InTransit),
            success: SyncFlag::new(track, Stage::Success),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    pub source: NodeId,
    pub destination: NodeId,
    pub category: DataCategory,
    /// `None` accepts records of any rule
    pub required_rule: Option<SyncRule>,
    pub track: Track,
}

impl RouteDefinition {
    pub fn new(
        source: &str,
        destination: &str,
        category: DataCategory,
        required_rule: Option<SyncRule>,
        track: Track,
    ) -> Self {
        Self {
            source: NodeId::from(source),
            destination: NodeId::from(destination),
            category,
            required_rule,
            track,
        }
    }

    /// Display label, e.g. `DM → DS`
    pub fn label(&self) -> String {
        format!("{} → {}", self.source, self.destination)
    }

    pub fn flags(&self) -> FlagTriad {
        FlagTriad::of(self.track)
    }

    pub fn accepts(&self, record: &SyncRecord) -> bool {
        record.source == self.source
            && record.destination == self.destination
            && record.category == self.category
            && self.required_rule.map_or(true, |rule| rule == record.rule)
    }
}

impl fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}", self.label(), self.category.label())?;
        if let Some(rule) = self.required_rule {
            write!(f, ", {}", rule.label())?;
        }
        write!(f, "]")
    }
}

type RouteKey = (NodeId, NodeId, DataCategory);

#[derive(Debug, Clone)]
pub struct RouteCatalog {
    routes: Vec<RouteDefinition>,
    index: FxHashMap<RouteKey, Vec<usize>>,
}

impl RouteCatalog {
    /// Build a catalog, rejecting self-loops and duplicate
    /// `(source, destination, category, rule)` entries
    pub fn from_definitions(routes: Vec<RouteDefinition>) -> Result<Self> {
        for (i, route) in routes.iter().enumerate() {
            if route.source == route.destination {
                return Err(RoutingError::SelfLoop {
                    label: route.label(),
                });
            }
            let duplicate = routes[..i].iter().any(|earlier| {
                earlier.source == route.source
                    && earlier.destination == route.destination
                    && earlier.category == route.category
                    && earlier.required_rule == route.required_rule
            });
            if duplicate {
                return Err(RoutingError::Duplicate {
                    label: route.label(),
                    category: route.category.label().to_string(),
                });
            }
        }

        Ok(Self::indexed(routes))
    }

    /// The ten routes of the standard deployment.
    ///
    /// Master data fans out from DM to every node and flows back from the
    /// ports to DS. Transaction data fans out from DM and returns from the
    /// ports to DM for sales and returns only.
    pub fn standard() -> Self {
        use DataCategory::{Master, Transaction};
        use Track::{Primary, Regional};

        let routes = vec![
            RouteDefinition::new("DM", "DS", Master, None, Primary),
            RouteDefinition::new("DM", "TS", Master, None, Regional),
            RouteDefinition::new("DM", "KS", Master, None, Regional),
            RouteDefinition::new("TS", "DS", Master, None, Primary),
            RouteDefinition::new("KS", "DS", Master, None, Primary),
            RouteDefinition::new("DM", "DS", Transaction, None, Primary),
            RouteDefinition::new("DM", "TS", Transaction, None, Regional),
            RouteDefinition::new("DM", "KS", Transaction, None, Regional),
            RouteDefinition::new("TS", "DM", Transaction, Some(SyncRule::SalesReturn), Regional),
            RouteDefinition::new("KS", "DM", Transaction, Some(SyncRule::SalesReturn), Regional),
        ];

        Self::indexed(routes)
    }

    fn indexed(routes: Vec<RouteDefinition>) -> Self {
        let mut index: FxHashMap<RouteKey, Vec<usize>> = FxHashMap::default();
        for (i, route) in routes.iter().enumerate() {
            index
                .entry((route.source.clone(), route.destination.clone(), route.category))
                .or_default()
                .push(i);
        }
        Self { routes, index }
    }

    /// Definition a record travels on.
    ///
    /// Endpoints and category must match exactly. A definition requiring the
    /// record's rule is preferred over one without a required rule.
    pub fn match_route(&self, record: &SyncRecord) -> Option<&RouteDefinition> {
        self.match_index(record).map(|i| &self.routes[i])
    }

    /// Position of the matching definition in catalog order
    pub fn match_index(&self, record: &SyncRecord) -> Option<usize> {
        let key = (
            record.source.clone(),
            record.destination.clone(),
            record.category,
        );
        let candidates = self.index.get(&key)?;

        candidates
            .iter()
            .copied()
            .find(|&i| self.routes[i].required_rule == Some(record.rule))
            .or_else(|| {
                candidates
                    .iter()
                    .copied()
                    .find(|&i| self.routes[i].required_rule.is_none())
            })
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn routes_for(&self, category: DataCategory) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter().filter(move |r| r.category == category)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
