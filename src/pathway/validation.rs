use super::node::{NodeId, NodeType};
use super::PathwayGraph;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

/// Advisory findings about a pathway, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathwayIssues {
    pub nodes: Vec<String>,
    pub connections: Vec<String>,
    pub structure: Vec<String>,
}

impl PathwayIssues {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty() && self.structure.is_empty()
    }

    pub fn total(&self) -> usize {
        self.nodes.len() + self.connections.len() + self.structure.len()
    }
}

impl PathwayGraph {
    /// Checks the pathway for incomplete nodes, disconnected nodes, missing
    /// problem or action nodes, dead ends and cycles. Never fails.
    pub fn validate(&self) -> PathwayIssues {
        let mut issues = PathwayIssues::default();

        for node in &self.nodes {
            for issue in node.validate() {
                issues
                    .nodes
                    .push(format!("Node {}: {}", node.id().short(), issue));
            }
        }

        let connected: AHashSet<&str> = self
            .edges
            .iter()
            .flat_map(|(s, t)| [s.as_str(), t.as_str()])
            .collect();
        for node in self.nodes.iter().filter(|n| !connected.contains(n.id().as_str())) {
            issues.connections.push(format!(
                "{} node {} is disconnected",
                node.node_type().label(),
                node.id().short()
            ));
        }

        if self.nodes_of_type(NodeType::Problem).next().is_none() {
            issues
                .structure
                .push("No problem statement defined".to_string());
        }
        if self.nodes_of_type(NodeType::Action).next().is_none() {
            issues.structure.push("No action steps defined".to_string());
        }

        let sources: AHashSet<&str> = self.edges.iter().map(|(s, _)| s.as_str()).collect();
        for node in &self.nodes {
            if node.node_type() != NodeType::Action && !sources.contains(node.id().as_str()) {
                issues.structure.push(format!(
                    "{} node {} ends pathway without an action",
                    node.node_type().label(),
                    node.id().short()
                ));
            }
        }

        let cycles = self.detect_cycles();
        if !cycles.is_empty() {
            issues
                .structure
                .push(format!("Pathway contains {} cycle(s)", cycles.len()));
        }

        issues
    }

    /// Finds cycles with a depth-first search.
    ///
    /// One cycle is reported per edge that closes back onto the current search
    /// path, so cycles sharing nodes can be reported more than once. The count is
    /// an upper bound, not a cycle basis.
    pub fn detect_cycles(&self) -> Vec<Vec<NodeId>> {
        let mut finder = CycleFinder {
            adjacency: self.adjacency(),
            visited: AHashSet::new(),
            on_stack: AHashSet::new(),
            cycles: Vec::new(),
        };
        for node in &self.nodes {
            if !finder.visited.contains(node.id().as_str()) {
                finder.visit(node.id(), Vec::new());
            }
        }
        finder.cycles
    }

    pub fn has_cycle(&self) -> bool {
        !self.detect_cycles().is_empty()
    }
}

struct CycleFinder<'a> {
    adjacency: AHashMap<&'a str, Vec<&'a NodeId>>,
    visited: AHashSet<&'a str>,
    on_stack: AHashSet<&'a str>,
    cycles: Vec<Vec<NodeId>>,
}

impl<'a> CycleFinder<'a> {
    /// `path` is this call's own copy of the search path leading to `node`.
    fn visit(&mut self, node: &'a NodeId, mut path: Vec<&'a NodeId>) {
        if self.on_stack.contains(node.as_str()) {
            if let Some(start) = path.iter().position(|p| *p == node) {
                self.cycles
                    .push(path[start..].iter().map(|id| (*id).clone()).collect());
            }
            return;
        }
        if !self.visited.insert(node.as_str()) {
            return;
        }
        self.on_stack.insert(node.as_str());
        path.push(node);

        let neighbours = self.adjacency.get(node.as_str()).cloned().unwrap_or_default();
        for neighbour in neighbours {
            self.visit(neighbour, path.clone());
        }
        self.on_stack.remove(node.as_str());
    }
}
