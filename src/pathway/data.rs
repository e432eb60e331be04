use super::node::{coordinate, DiagnosticNode, NodeId, NodeKind, NodeType, Position};
use super::PathwayGraph;
use crate::config::LayoutSettings;
use crate::error::ValidationError;
use crate::wire::ordered_map;
use ahash::AHashSet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CHECK_TYPE: &str = "check_type";
const SEVERITY: &str = "severity";
const IMPACT: &str = "impact";
const EFFECTIVENESS: &str = "effectiveness";

fn default_node_type() -> String {
    NodeType::Check.as_str().to_string()
}

/// The stored shape of one pathway node.
///
/// Type-specific attributes may live under `properties` or, in older files, as
/// flat top-level fields (`check_type`, `severity`, `impact`, `effectiveness`).
/// Older files may also store the position as top-level `x`/`y`. Those flat
/// fields are collected in `legacy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub legacy: Map<String, Value>,
}

/// The stored shape of a whole pathway, as kept in a rule's `pathway_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathway_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub layout_settings: LayoutSettings,
    #[serde(default, with = "ordered_map")]
    pub nodes: Vec<(String, NodeData)>,
    #[serde(default)]
    pub connections: Vec<(String, String)>,
}

/// A trait for stored or foreign pathway formats that can be turned into a [`PathwayGraph`].
pub trait IntoPathway {
    /// Consumes the object and builds a pathway graph from it.
    fn into_pathway(self) -> Result<PathwayGraph, ValidationError>;
}

impl IntoPathway for PathwayData {
    fn into_pathway(self) -> Result<PathwayGraph, ValidationError> {
        PathwayGraph::from_data(self)
    }
}

impl NodeData {
    fn into_node(self, key: &str) -> Result<DiagnosticNode, ValidationError> {
        let node_type: NodeType = self.node_type.parse()?;
        // The map key is authoritative over any embedded node_id.
        let mut node = DiagnosticNode::new(NodeId::from(key), node_type);
        node.set_content(self.content);

        let position = self.position.or_else(|| legacy_position(&self.legacy));
        if let Some(position) = position {
            node.set_position(position.x, position.y);
        }

        let mut kind = NodeKind::default_for(node_type);
        for (name, value) in self.legacy.iter().chain(self.properties.iter()) {
            apply_property(&mut kind, key, name, value);
        }
        node.set_kind(kind);
        Ok(node)
    }

    fn from_node(node: &DiagnosticNode) -> Self {
        // Cleared attributes are written as null so they stay cleared on reload.
        let text = |v: &Option<String>| v.as_deref().map_or(Value::Null, Value::from);
        let mut properties = Map::new();
        match node.kind() {
            NodeKind::Problem => {}
            NodeKind::Check { check_type } => {
                properties.insert(CHECK_TYPE.into(), text(check_type));
            }
            NodeKind::Condition { severity } => {
                properties.insert(SEVERITY.into(), text(severity));
            }
            NodeKind::Action {
                impact,
                effectiveness,
            } => {
                properties.insert(IMPACT.into(), text(impact));
                properties.insert(
                    EFFECTIVENESS.into(),
                    effectiveness.map_or(Value::Null, Value::from),
                );
            }
        }
        Self {
            node_id: Some(node.id().to_string()),
            node_type: node.node_type().as_str().to_string(),
            content: node.content().to_string(),
            connections: node.connections().iter().map(|c| c.to_string()).collect(),
            position: Some(node.position()),
            // Flat copies keep older readers working.
            legacy: properties.clone(),
            properties,
        }
    }
}

fn legacy_position(legacy: &Map<String, Value>) -> Option<Position> {
    let x = coordinate(legacy.get("x")?.clone()).ok()?;
    let y = coordinate(legacy.get("y")?.clone()).ok()?;
    Some(Position::new(x, y))
}

fn string_property(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

fn apply_property(kind: &mut NodeKind, node_id: &str, name: &str, value: &Value) {
    match (kind, name) {
        (NodeKind::Check { check_type }, CHECK_TYPE) => *check_type = string_property(value),
        (NodeKind::Condition { severity }, SEVERITY) => *severity = string_property(value),
        (NodeKind::Action { impact, .. }, IMPACT) => *impact = string_property(value),
        (NodeKind::Action { effectiveness, .. }, EFFECTIVENESS) => {
            *effectiveness = match value {
                Value::Null => None,
                other => match parse_effectiveness(other) {
                    Some(v) => Some(v),
                    None => {
                        warn!(
                            "Node {}: ignoring unreadable effectiveness value {}",
                            node_id, other
                        );
                        *effectiveness
                    }
                },
            }
        }
        (_, "x" | "y") => {}
        (kind, other) => debug!(
            "Node {}: ignoring property '{}' on {} node",
            node_id,
            other,
            kind.node_type()
        ),
    }
}

fn parse_effectiveness(value: &Value) -> Option<u8> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .and_then(|v| u8::try_from(v).ok())
}

impl PathwayGraph {
    /// Builds a pathway from its stored shape.
    ///
    /// Unknown node types are rejected. Edges that reference missing nodes or
    /// repeat an earlier edge are dropped with a warning. Each node's
    /// `connections` list is rebuilt from the edges.
    pub fn from_data(data: PathwayData) -> Result<Self, ValidationError> {
        let mut graph = PathwayGraph::new(data.name);
        graph.description = data.description;
        graph.layout = data.layout_settings;
        if let Some(id) = data.pathway_id {
            graph.pathway_id = id;
        }

        let mut seen = AHashSet::new();
        for (key, node_data) in data.nodes {
            if !seen.insert(key.clone()) {
                return Err(ValidationError::DuplicateNodeId(key));
            }
            let node = node_data.into_node(&key)?;
            graph.index.insert(node.id().clone(), graph.nodes.len());
            graph.nodes.push(node);
        }

        for (source, target) in data.connections {
            if !graph.contains(&source) || !graph.contains(&target) {
                warn!(
                    "Dropping connection {} -> {}: endpoint not found",
                    source, target
                );
                continue;
            }
            if !graph.connect(&source, &target) {
                warn!("Dropping duplicate connection {} -> {}", source, target);
            }
        }

        // Timestamps last, since connect() touches the modification date.
        if let Some(created) = data.created_date {
            graph.created_date = created;
        }
        graph.last_modified_date = data
            .last_modified_date
            .unwrap_or_else(|| graph.created_date.clone());
        Ok(graph)
    }

    /// The stored shape of this pathway.
    pub fn to_data(&self) -> PathwayData {
        PathwayData {
            pathway_id: Some(self.pathway_id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            created_date: Some(self.created_date.clone()),
            last_modified_date: Some(self.last_modified_date.clone()),
            layout_settings: self.layout,
            nodes: self
                .nodes
                .iter()
                .map(|n| (n.id().to_string(), NodeData::from_node(n)))
                .collect(),
            connections: self
                .edges
                .iter()
                .map(|(s, t)| (s.to_string(), t.to_string()))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let data: PathwayData = serde_json::from_str(json)
            .map_err(|e| ValidationError::InvalidPathwayData(e.to_string()))?;
        Self::from_data(data)
    }

    pub fn to_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(&self.to_data())
            .map_err(|e| ValidationError::InvalidPathwayData(e.to_string()))
    }
}
