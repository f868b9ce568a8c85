//! Node registry
//!
//! The set of servers taking part in replication. The registry is fixed for
//! the lifetime of the process; only a node's (simulated) status may change,
//! and doing so produces a new registry value.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::types::{NodeId, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Active,
    Inactive,
}

impl NodeStatus {
    pub fn toggled(self) -> Self {
        match self {
            NodeStatus::Active => NodeStatus::Inactive,
            NodeStatus::Inactive => NodeStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerNode {
    pub id: NodeId,
    pub name: String,
    /// Network address shown to operators
    pub address: String,
    pub status: NodeStatus,
    pub track: Track,
    pub region: String,
    /// Destination of every primary-track record
    #[serde(default)]
    pub statutory: bool,
}

impl ServerNode {
    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }

    pub fn is_regional(&self) -> bool {
        self.track == Track::Regional
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRegistry {
    nodes: Vec<ServerNode>,
}

impl NodeRegistry {
    /// Build a registry, checking ids are unique and exactly one node is statutory
    pub fn new(nodes: Vec<ServerNode>) -> Result<Self> {
        for (i, node) in nodes.iter().enumerate() {
            if node.id.as_str().is_empty() {
                return Err(ModelError::validation("Node id cannot be empty"));
            }
            if nodes[..i].iter().any(|n| n.id == node.id) {
                return Err(ModelError::validation(format!(
                    "Duplicate node id: {}",
                    node.id
                )));
            }
        }

        let statutory = nodes.iter().filter(|n| n.statutory).count();
        if statutory != 1 {
            return Err(ModelError::validation(format!(
                "Registry needs exactly one statutory node, found {}",
                statutory
            )));
        }

        Ok(Self { nodes })
    }

    /// The four-node deployment: Dubai management and statutory servers plus
    /// the Tanzania and Kenya port servers.
    pub fn standard() -> Self {
        let node = |id: &str, name: &str, address: &str, status, track, region: &str| ServerNode {
            id: NodeId::from(id),
            name: name.to_string(),
            address: address.to_string(),
            status,
            track,
            region: region.to_string(),
            statutory: false,
        };

        let mut statutory = node(
            "DS",
            "Dubai Statutory (DS)",
            "192.168.1.11",
            NodeStatus::Active,
            Track::Primary,
            "Dubai",
        );
        statutory.statutory = true;

        Self {
            nodes: vec![
                node(
                    "DM",
                    "Dubai Management (DM)",
                    "192.168.1.10",
                    NodeStatus::Active,
                    Track::Primary,
                    "Dubai",
                ),
                statutory,
                node(
                    "TS",
                    "Tanzania Port (TS)",
                    "192.168.2.50",
                    NodeStatus::Active,
                    Track::Regional,
                    "Tanzania",
                ),
                node(
                    "KS",
                    "Kenya Port (KS)",
                    "192.168.3.50",
                    NodeStatus::Inactive,
                    Track::Regional,
                    "Kenya",
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&ServerNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Nodes in registry order
    pub fn iter(&self) -> impl Iterator<Item = &ServerNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_active()).count()
    }

    pub fn statutory(&self) -> Option<&ServerNode> {
        self.nodes.iter().find(|n| n.statutory)
    }

    /// Regional nodes in registry order
    pub fn regional(&self) -> impl Iterator<Item = &ServerNode> {
        self.nodes.iter().filter(|n| n.is_regional())
    }

    pub fn is_regional(&self, id: &str) -> bool {
        self.get(id).is_some_and(ServerNode::is_regional)
    }

    /// Region of the primary site (the statutory node's region)
    pub fn primary_region(&self) -> &str {
        self.statutory().map_or("Dubai", |n| n.region.as_str())
    }

    /// Track a record between these endpoints must carry
    pub fn expected_track(&self, destination: &str) -> Track {
        match self.statutory() {
            Some(node) if node.id == destination => Track::Primary,
            _ => Track::Regional,
        }
    }

    /// Registry with one node's status replaced
    pub fn with_status(&self, id: &str, status: NodeStatus) -> Result<Self> {
        if !self.contains(id) {
            return Err(ModelError::NodeNotFound(id.to_string()));
        }
        let nodes = self
            .nodes
            .iter()
            .map(|n| {
                if n.id == id {
                    ServerNode {
                        status,
                        ..n.clone()
                    }
                } else {
                    n.clone()
                }
            })
            .collect();
        Ok(Self { nodes })
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = NodeRegistry::standard();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.active_count(), 3);
        assert_eq!(registry.statutory().unwrap().id, "DS");
        assert_eq!(registry.primary_region(), "Dubai");

        let regional: Vec<&str> = registry.regional().map(|n| n.id.as_str()).collect();
        assert_eq!(regional, vec!["TS", "KS"]);
        assert!(registry.is_regional("KS"));
        assert!(!registry.is_regional("DM"));
        assert!(!registry.is_regional("XX"));
    }

    #[test]
    fn test_expected_track_follows_statutory_destination() {
        let registry = NodeRegistry::standard();
        assert_eq!(registry.expected_track("DS"), Track::Primary);
        assert_eq!(registry.expected_track("DM"), Track::Regional);
        assert_eq!(registry.expected_track("TS"), Track::Regional);
    }

    #[test]
    fn test_with_status_returns_new_registry() {
        let registry = NodeRegistry::standard();
        let updated = registry.with_status("KS", NodeStatus::Active).unwrap();

        assert_eq!(registry.active_count(), 3);
        assert_eq!(updated.active_count(), 4);
        assert!(matches!(
            registry.with_status("ZZ", NodeStatus::Active),
            Err(ModelError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_new_rejects_duplicates_and_missing_statutory() {
        let mut nodes: Vec<ServerNode> = NodeRegistry::standard().iter().cloned().collect();
        nodes.push(nodes[0].clone());
        assert!(NodeRegistry::new(nodes).is_err());

        let nodes: Vec<ServerNode> = NodeRegistry::standard()
            .iter()
            .filter(|n| !n.statutory)
            .cloned()
            .collect();
        assert!(NodeRegistry::new(nodes).is_err());
    }
}
