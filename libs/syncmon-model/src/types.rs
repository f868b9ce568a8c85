//! Record types
//!
//! A sync record moves between two nodes on one of two tracks. Its flag is
//! the product of the track and the stage it has reached, encoded on the
//! wire with the two-letter codes the replicated systems use
//! (`TN`/`TS`/`TY` on the primary track, `UN`/`US`/`UY` on the regional one).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

// ============================================================================
// Track / Stage / SyncFlag
// ============================================================================

/// Replication track. Records delivered to the statutory node travel on the
/// primary ("Dubai") track, everything else on the regional ("Port") track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    #[serde(alias = "dubai", alias = "Dubai")]
    Primary,
    #[serde(alias = "port", alias = "Port")]
    Regional,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Primary, Track::Regional];

    /// Leading letter of the flag code
    const fn code_prefix(self) -> char {
        match self {
            Track::Primary => 'T',
            Track::Regional => 'U',
        }
    }

    /// Lane title used by the two-lane view
    pub const fn lane_name(self) -> &'static str {
        match self {
            Track::Primary => "Dubai",
            Track::Regional => "Port",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Primary => write!(f, "primary"),
            Track::Regional => write!(f, "regional"),
        }
    }
}

impl FromStr for Track {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "dubai" => Ok(Track::Primary),
            "regional" | "port" => Ok(Track::Regional),
            _ => Err(ModelError::UnknownTrack(s.to_string())),
        }
    }
}

/// How far a record has progressed along its track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    InTransit,
    Success,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Pending, Stage::InTransit, Stage::Success];

    const fn code_suffix(self) -> char {
        match self {
            Stage::Pending => 'N',
            Stage::InTransit => 'S',
            Stage::Success => 'Y',
        }
    }
}

/// Sync flag: one of six (track, stage) states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncFlag {
    pub track: Track,
    pub stage: Stage,
}

impl SyncFlag {
    pub const PRIMARY_PENDING: SyncFlag = SyncFlag::new(Track::Primary, Stage::Pending);
    pub const PRIMARY_IN_TRANSIT: SyncFlag = SyncFlag::new(Track::Primary, Stage::InTransit);
    pub const PRIMARY_SUCCESS: SyncFlag = SyncFlag::new(Track::Primary, Stage::Success);
    pub const REGIONAL_PENDING: SyncFlag = SyncFlag::new(Track::Regional, Stage::Pending);
    pub const REGIONAL_IN_TRANSIT: SyncFlag = SyncFlag::new(Track::Regional, Stage::InTransit);
    pub const REGIONAL_SUCCESS: SyncFlag = SyncFlag::new(Track::Regional, Stage::Success);

    pub const fn new(track: Track, stage: Stage) -> Self {
        Self { track, stage }
    }

    /// Two-letter wire code (`TN`, `TS`, `TY`, `UN`, `US`, `UY`)
    pub const fn code(self) -> &'static str {
        match (self.track, self.stage) {
            (Track::Primary, Stage::Pending) => "TN",
            (Track::Primary, Stage::InTransit) => "TS",
            (Track::Primary, Stage::Success) => "TY",
            (Track::Regional, Stage::Pending) => "UN",
            (Track::Regional, Stage::InTransit) => "US",
            (Track::Regional, Stage::Success) => "UY",
        }
    }

    /// Next flag reachable by an operator push.
    ///
    /// Only `Pending` moves (to `InTransit` on the same track); completion is
    /// reported by the replicated system, never forced.
    pub const fn advanced(self) -> Option<SyncFlag> {
        match self.stage {
            Stage::Pending => Some(SyncFlag::new(self.track, Stage::InTransit)),
            Stage::InTransit | Stage::Success => None,
        }
    }

    pub const fn is_pending(self) -> bool {
        matches!(self.stage, Stage::Pending)
    }

    pub const fn is_success(self) -> bool {
        matches!(self.stage, Stage::Success)
    }
}

impl fmt::Display for SyncFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SyncFlag {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (Some(t), Some(st), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ModelError::UnknownFlag(s.to_string()));
        };
        let track = Track::ALL
            .into_iter()
            .find(|track| track.code_prefix() == t.to_ascii_uppercase());
        let stage = Stage::ALL
            .into_iter()
            .find(|stage| stage.code_suffix() == st.to_ascii_uppercase());
        match (track, stage) {
            (Some(track), Some(stage)) => Ok(SyncFlag::new(track, stage)),
            _ => Err(ModelError::UnknownFlag(s.to_string())),
        }
    }
}

impl Serialize for SyncFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for SyncFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Category / Rule
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    #[serde(alias = "Master Data")]
    Master,
    #[serde(alias = "Transaction Data")]
    Transaction,
}

impl DataCategory {
    pub const ALL: [DataCategory; 2] = [DataCategory::Master, DataCategory::Transaction];

    pub const fn label(self) -> &'static str {
        match self {
            DataCategory::Master => "Master Data",
            DataCategory::Transaction => "Transaction Data",
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DataCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "master" | "masterdata" => Ok(DataCategory::Master),
            "transaction" | "transactiondata" => Ok(DataCategory::Transaction),
            _ => Err(ModelError::UnknownCategory(s.to_string())),
        }
    }
}

/// Which records of a category a route carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncRule {
    #[serde(alias = "Sales & Return Only")]
    SalesReturn,
    #[serde(alias = "All Data")]
    AllData,
}

impl SyncRule {
    pub const ALL: [SyncRule; 2] = [SyncRule::SalesReturn, SyncRule::AllData];

    pub const fn label(self) -> &'static str {
        match self {
            SyncRule::SalesReturn => "Sales & Return Only",
            SyncRule::AllData => "All Data",
        }
    }
}

impl fmt::Display for SyncRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SyncRule {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "salesreturn" | "salesreturnonly" | "sr" => Ok(SyncRule::SalesReturn),
            "alldata" => Ok(SyncRule::AllData),
            _ => Err(ModelError::UnknownRule(s.to_string())),
        }
    }
}

/// Lowercase with separators and `&` dropped: "Sales & Return Only" -> "salesreturnonly"
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ============================================================================
// NodeId / SyncRecord
// ============================================================================

/// Short node identifier such as `DM` or `TS`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit of replicated data moving from `source` to `destination`.
///
/// `id`, endpoints, category, rule and `timestamp` never change after
/// creation. `flag` and `last_modified` change only through the force-sync
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub id: String,
    pub source: NodeId,
    pub destination: NodeId,
    pub category: DataCategory,
    pub rule: SyncRule,
    pub flag: SyncFlag,
    pub timestamp: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub description: String,
}

impl SyncRecord {
    /// New record created at `timestamp`; `last_modified` starts equal to it.
    pub fn new(
        id: impl Into<String>,
        source: NodeId,
        destination: NodeId,
        category: DataCategory,
        rule: SyncRule,
        flag: SyncFlag,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let description = format!("{} Sync: {} to {}", category.label(), source, destination);
        Self {
            id: id.into(),
            source,
            destination,
            category,
            rule,
            flag,
            timestamp,
            last_modified: timestamp,
            description,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn track(&self) -> Track {
        self.flag.track
    }

    pub fn stage(&self) -> Stage {
        self.flag.stage
    }

    /// Hours elapsed since creation, with millisecond resolution
    pub fn aging_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.timestamp).num_milliseconds() as f64 / 3_600_000.0
    }
}
