use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier of a node within a pathway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first eight characters, as used in validation messages.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four roles a node can play in a diagnostic pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Problem,
    Check,
    Condition,
    Action,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Problem,
        NodeType::Check,
        NodeType::Condition,
        NodeType::Action,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Problem => "problem",
            NodeType::Check => "check",
            NodeType::Condition => "condition",
            NodeType::Action => "action",
        }
    }

    /// Capitalised name used in messages, e.g. `"Check"`.
    pub fn label(&self) -> &'static str {
        match self {
            NodeType::Problem => "Problem",
            NodeType::Check => "Check",
            NodeType::Condition => "Condition",
            NodeType::Action => "Action",
        }
    }

    /// Layout column: problems on the left, actions on the right.
    pub fn column(&self) -> i64 {
        match self {
            NodeType::Problem => 0,
            NodeType::Check => 1,
            NodeType::Condition => 2,
            NodeType::Action => 3,
        }
    }

    fn allowed() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(NodeType::as_str).collect();
        format!("{{{}}}", names.join(", "))
    }
}

impl FromStr for NodeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidNodeType {
                type_name: s.to_string(),
                allowed: NodeType::allowed(),
            })
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_CHECK_TYPE: &str = "Visual Inspection";
pub const DEFAULT_SEVERITY: &str = "Normal";
pub const DEFAULT_IMPACT: &str = "Adjustment";
pub const DEFAULT_EFFECTIVENESS: u8 = 3;

/// Type-specific data carried by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Problem,
    Check {
        check_type: Option<String>,
    },
    Condition {
        severity: Option<String>,
    },
    Action {
        impact: Option<String>,
        effectiveness: Option<u8>,
    },
}

impl NodeKind {
    /// The data a freshly created node of `node_type` starts with.
    pub fn default_for(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Problem => NodeKind::Problem,
            NodeType::Check => NodeKind::Check {
                check_type: Some(DEFAULT_CHECK_TYPE.to_string()),
            },
            NodeType::Condition => NodeKind::Condition {
                severity: Some(DEFAULT_SEVERITY.to_string()),
            },
            NodeType::Action => NodeKind::Action {
                impact: Some(DEFAULT_IMPACT.to_string()),
                effectiveness: Some(DEFAULT_EFFECTIVENESS),
            },
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Problem => NodeType::Problem,
            NodeKind::Check { .. } => NodeType::Check,
            NodeKind::Condition { .. } => NodeType::Condition,
            NodeKind::Action { .. } => NodeType::Action,
        }
    }
}

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(deserialize_with = "coordinate")]
    pub x: i64,
    #[serde(deserialize_with = "coordinate")]
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Accepts integer or floating point coordinates; floats are rounded.
pub(crate) fn coordinate<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid coordinate: {}", value)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A single problem, check, condition or action in a diagnostic pathway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticNode {
    id: NodeId,
    kind: NodeKind,
    content: String,
    connections: Vec<NodeId>,
    position: Position,
}

impl DiagnosticNode {
    pub fn new(id: NodeId, node_type: NodeType) -> Self {
        Self {
            id,
            kind: NodeKind::default_for(node_type),
            content: String::new(),
            connections: Vec::new(),
            position: Position::default(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, x: i64, y: i64) {
        self.position = Position::new(x, y);
    }

    /// Outgoing targets, mirrored from the owning pathway's edge list.
    pub fn connections(&self) -> &[NodeId] {
        &self.connections
    }

    pub fn has_connection(&self, target: &str) -> bool {
        self.connections.iter().any(|c| c.as_str() == target)
    }

    pub(crate) fn add_connection(&mut self, target: NodeId) -> bool {
        if self.has_connection(target.as_str()) {
            return false;
        }
        self.connections.push(target);
        true
    }

    pub(crate) fn remove_connection(&mut self, target: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.as_str() != target);
        self.connections.len() != before
    }

    pub fn check_type(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Check { check_type } => check_type.as_deref(),
            _ => None,
        }
    }

    /// Sets the check type. Returns `false` (and does nothing) on non-check nodes.
    pub fn set_check_type(&mut self, value: Option<String>) -> bool {
        match &mut self.kind {
            NodeKind::Check { check_type } => {
                *check_type = non_empty(value);
                true
            }
            _ => false,
        }
    }

    pub fn severity(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Condition { severity } => severity.as_deref(),
            _ => None,
        }
    }

    /// Sets the condition severity. Returns `false` on non-condition nodes.
    pub fn set_severity(&mut self, value: Option<String>) -> bool {
        match &mut self.kind {
            NodeKind::Condition { severity } => {
                *severity = non_empty(value);
                true
            }
            _ => false,
        }
    }

    pub fn impact(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Action { impact, .. } => impact.as_deref(),
            _ => None,
        }
    }

    /// Sets the action impact. Returns `false` on non-action nodes.
    pub fn set_impact(&mut self, value: Option<String>) -> bool {
        match &mut self.kind {
            NodeKind::Action { impact, .. } => {
                *impact = non_empty(value);
                true
            }
            _ => false,
        }
    }

    pub fn effectiveness(&self) -> Option<u8> {
        match &self.kind {
            NodeKind::Action { effectiveness, .. } => *effectiveness,
            _ => None,
        }
    }

    /// Sets the action effectiveness rating (1 to 5). Returns `false` on non-action nodes.
    pub fn set_effectiveness(&mut self, value: Option<u8>) -> bool {
        match &mut self.kind {
            NodeKind::Action { effectiveness, .. } => {
                *effectiveness = value;
                true
            }
            _ => false,
        }
    }

    /// Changes the node's role, resetting its type-specific data to the defaults.
    pub fn change_type(&mut self, node_type: NodeType) {
        self.kind = NodeKind::default_for(node_type);
    }

    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    /// Lists completeness problems of this node. An empty list means the node is complete.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.id.as_str().is_empty() {
            issues.push("Node ID is missing".to_string());
        }
        if self.content.is_empty() {
            issues.push("Node content is empty".to_string());
        }
        match &self.kind {
            NodeKind::Problem => {}
            NodeKind::Check { check_type: None } => {
                issues.push("Check type is not specified".to_string())
            }
            NodeKind::Condition { severity: None } => {
                issues.push("Condition severity is not specified".to_string())
            }
            NodeKind::Action {
                impact,
                effectiveness,
            } => {
                if impact.is_none() {
                    issues.push("Action impact is not specified".to_string());
                }
                if let Some(e) = effectiveness.filter(|e| !(1..=5).contains(e)) {
                    issues.push(format!("Action effectiveness {} is outside 1-5", e));
                }
            }
            _ => {}
        }
        issues
    }

    /// A copy of this node under a new id and without connections.
    pub fn duplicate(&self) -> Self {
        Self {
            id: NodeId::generate(),
            connections: Vec::new(),
            ..self.clone()
        }
    }
}

impl fmt::Display for DiagnosticNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.content.chars().take(30).collect();
        write!(
            f,
            "{} ({}): {}...",
            self.node_type().label(),
            self.id.short(),
            preview
        )
    }
}
