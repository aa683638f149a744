//! Cluster inventory records as served by the authority service
//!
//! Nodes and pods arrive in two differently-shaped JSON documents but carry
//! the same three facts: a name, a location (node IP or pod host IP) and a
//! list of status conditions. `ClusterEntity` folds both shapes into one type.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// Annotation k3s uses to publish a node's internal address
pub const INTERNAL_IP_ANNOTATION: &str = "k3s.io/internal-ip";

/// A single `{type, status}` entry of a status conditions list
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Condition {
    #[serde(rename = "type", default)]
    pub condition_type: String,

    /// "True", "False" or "Unknown"
    #[serde(default)]
    pub status: String,
}

impl Condition {
    pub fn new(condition_type: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            condition_type: condition_type.into(),
            status: status.into(),
        }
    }
}

// ============================================================================
// SBIO: Pure readiness logic (no I/O)
// ============================================================================

/// Returns true if any condition is `Ready` with status `True`.
///
/// Stops at the first match. An empty list, or one without a matching entry,
/// is simply "not ready".
pub fn is_ready(conditions: &[Condition]) -> bool {
    conditions
        .iter()
        .any(|c| c.condition_type == "Ready" && c.status == "True")
}

/// Readiness derived from an entity's conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessReport {
    pub ready: bool,
}

impl ReadinessReport {
    pub fn from_conditions(conditions: &[Condition]) -> Self {
        Self {
            ready: is_ready(conditions),
        }
    }
}

impl fmt::Display for ReadinessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.ready { "True" } else { "False" })
    }
}

// ============================================================================
// Wire shapes
// ============================================================================

/// Top-level `{"items": [...]}` envelope of a kubectl list
#[derive(Debug, Clone, Deserialize)]
pub struct EntityList<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub metadata: NodeMetadata,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeMetadata {
    pub name: String,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodRecord {
    pub metadata: PodMetadata,
    #[serde(default)]
    pub status: EntityStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodMetadata {
    pub name: String,
}

/// The `status` object; only pods carry `hostIP`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(rename = "hostIP")]
    pub host_ip: Option<String>,
}

/// Which inventory collection a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Pod,
}

impl EntityKind {
    /// Path segment on the authority service
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Node => "nodes",
            EntityKind::Pod => "pods",
        }
    }

    /// Section title used in the status report
    pub fn title(&self) -> &'static str {
        match self {
            EntityKind::Node => "Nodes",
            EntityKind::Pod => "Pods",
        }
    }

    /// Header of the location column
    pub fn location_label(&self) -> &'static str {
        match self {
            EntityKind::Node => "IP",
            EntityKind::Pod => "HostIP",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// One node or pod
#[derive(Debug, Clone)]
pub enum ClusterEntity {
    Node(NodeRecord),
    Pod(PodRecord),
}

impl ClusterEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            ClusterEntity::Node(_) => EntityKind::Node,
            ClusterEntity::Pod(_) => EntityKind::Pod,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ClusterEntity::Node(n) => &n.metadata.name,
            ClusterEntity::Pod(p) => &p.metadata.name,
        }
    }

    /// Node internal IP or pod host IP, if the record carries one
    pub fn location_key(&self) -> Option<&str> {
        match self {
            ClusterEntity::Node(n) => n
                .metadata
                .annotations
                .get(INTERNAL_IP_ANNOTATION)
                .map(String::as_str),
            ClusterEntity::Pod(p) => p.status.host_ip.as_deref(),
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        match self {
            ClusterEntity::Node(n) => &n.status.conditions,
            ClusterEntity::Pod(p) => &p.status.conditions,
        }
    }

    pub fn readiness(&self) -> ReadinessReport {
        ReadinessReport::from_conditions(self.conditions())
    }
}

/// Parse a kubectl list document of the given kind into entities.
pub fn parse_entities(
    kind: EntityKind,
    json: &str,
) -> Result<Vec<ClusterEntity>, serde_json::Error> {
    let entities = match kind {
        EntityKind::Node => serde_json::from_str::<EntityList<NodeRecord>>(json)?
            .items
            .into_iter()
            .map(ClusterEntity::Node)
            .collect(),
        EntityKind::Pod => serde_json::from_str::<EntityList<PodRecord>>(json)?
            .items
            .into_iter()
            .map(ClusterEntity::Pod)
            .collect(),
    };
    Ok(entities)
}
