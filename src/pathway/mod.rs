//! The visual pathway builder's graph model.
//!
//! A [`PathwayGraph`] owns an insertion-ordered arena of [`DiagnosticNode`]s and an
//! ordered list of directed edges. Insertion order matters: it decides which nodes
//! start a traversal and therefore the order of phrases in the generated rule text.

use crate::config::LayoutSettings;
use crate::error::ValidationError;
use crate::timestamp::now_iso;
use ahash::AHashMap;
use log::debug;
use uuid::Uuid;

mod data;
mod layout;
mod node;
mod outline;
mod traversal;
mod validation;

pub use data::*;
pub use node::*;
pub use outline::*;
pub use traversal::*;
pub use validation::*;

/// A directed graph of problem, check, condition and action nodes.
#[derive(Debug, Clone)]
pub struct PathwayGraph {
    pathway_id: String,
    name: String,
    description: String,
    created_date: String,
    last_modified_date: String,
    layout: LayoutSettings,
    nodes: Vec<DiagnosticNode>,
    index: AHashMap<NodeId, usize>,
    edges: Vec<(NodeId, NodeId)>,
}

impl Default for PathwayGraph {
    fn default() -> Self {
        Self::new("")
    }
}

impl PathwayGraph {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_iso();
        Self {
            pathway_id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            created_date: now.clone(),
            last_modified_date: now,
            layout: LayoutSettings::default(),
            nodes: Vec::new(),
            index: AHashMap::new(),
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.pathway_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn created_date(&self) -> &str {
        &self.created_date
    }

    pub fn last_modified_date(&self) -> &str {
        &self.last_modified_date
    }

    pub fn layout(&self) -> &LayoutSettings {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: LayoutSettings) {
        self.layout = layout;
        self.touch();
    }

    fn touch(&mut self) {
        self.last_modified_date = now_iso();
    }

    /// Adds a node with a generated id. Without a position, it is stacked below the
    /// lowest node of the same type in that type's column.
    pub fn add_node(&mut self, node_type: NodeType, position: Option<Position>) -> NodeId {
        let id = NodeId::generate();
        let node = DiagnosticNode::new(id.clone(), node_type);
        self.insert_node(node, position);
        id
    }

    /// Adds a node under a caller-chosen id.
    pub fn add_node_with_id(
        &mut self,
        id: impl Into<NodeId>,
        node_type: NodeType,
        position: Option<Position>,
    ) -> Result<NodeId, ValidationError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(ValidationError::DuplicateNodeId(id.to_string()));
        }
        let node = DiagnosticNode::new(id.clone(), node_type);
        self.insert_node(node, position);
        Ok(id)
    }

    fn insert_node(&mut self, mut node: DiagnosticNode, position: Option<Position>) {
        let position = position.unwrap_or_else(|| self.calculate_node_position(node.node_type()));
        node.set_position(position.x, position.y);
        debug!(
            "Adding {} node {} at ({}, {})",
            node.node_type(),
            node.id(),
            position.x,
            position.y
        );
        self.index.insert(node.id().clone(), self.nodes.len());
        self.nodes.push(node);
        self.touch();
    }

    pub fn node(&self, id: &str) -> Option<&DiagnosticNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut DiagnosticNode> {
        match self.index.get(id) {
            Some(&slot) => {
                self.last_modified_date = now_iso();
                Some(&mut self.nodes[slot])
            }
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[DiagnosticNode] {
        &self.nodes
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &DiagnosticNode> {
        self.nodes.iter().filter(move |n| n.node_type() == node_type)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All edges as `(source, target)` pairs in creation order.
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|(s, t)| s.as_str() == source && t.as_str() == target)
    }

    /// Removes a node together with every edge and connection that references it.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(slot) = self.index.get(id).copied() else {
            return false;
        };
        self.nodes.remove(slot);
        self.edges
            .retain(|(s, t)| s.as_str() != id && t.as_str() != id);
        for node in &mut self.nodes {
            node.remove_connection(id);
        }
        self.rebuild_index();
        self.touch();
        debug!("Removed node {}", id);
        true
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id().clone(), slot))
            .collect();
    }

    /// Adds the edge `source -> target`.
    ///
    /// Returns `false` if either node is missing or the edge already exists.
    /// Self-loops and cycles are accepted; [`PathwayGraph::validate`] reports them.
    pub fn connect(&mut self, source: &str, target: &str) -> bool {
        let (Some(&source_slot), Some(&target_slot)) = (self.index.get(source), self.index.get(target))
        else {
            return false;
        };
        if self.has_edge(source, target) {
            return false;
        }
        let source_id = self.nodes[source_slot].id().clone();
        let target_id = self.nodes[target_slot].id().clone();
        self.nodes[source_slot].add_connection(target_id.clone());
        self.edges.push((source_id, target_id));
        self.touch();
        debug!("Connected {} -> {}", source, target);
        true
    }

    /// Removes the edge `source -> target`. Returns `false` if it does not exist.
    pub fn disconnect(&mut self, source: &str, target: &str) -> bool {
        let Some(pos) = self
            .edges
            .iter()
            .position(|(s, t)| s.as_str() == source && t.as_str() == target)
        else {
            return false;
        };
        self.edges.remove(pos);
        if let Some(&slot) = self.index.get(source) {
            self.nodes[slot].remove_connection(target);
        }
        self.touch();
        debug!("Disconnected {} -> {}", source, target);
        true
    }

    /// Removes every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.touch();
    }

    /// A copy of this pathway under a new pathway id, named "Copy of ...".
    ///
    /// Node ids are kept; they only need to be unique within one pathway.
    pub fn duplicate(&self) -> Self {
        let now = now_iso();
        let name = if self.name.is_empty() {
            String::new()
        } else {
            format!("Copy of {}", self.name)
        };
        Self {
            pathway_id: Uuid::new_v4().to_string(),
            name,
            created_date: now.clone(),
            last_modified_date: now,
            ..self.clone()
        }
    }
}
