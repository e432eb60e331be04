use super::data::PathwayData;
use super::node::{DiagnosticNode, NodeId, NodeKind, NodeType};
use super::PathwayGraph;
use crate::rule::{Action, Condition, parse_phrase_text, render_phrases, PhraseActions};
use ahash::{AHashMap, AHashSet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Condition and action phrases collected from a pathway, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulePhrases {
    pub conditions: Vec<String>,
    pub actions: Vec<String>,
}

/// A pathway flattened into the shape of a stored rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRule {
    pub text: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    pub is_complex: bool,
    pub name: String,
    pub description: String,
    pub pathway_data: PathwayData,
}

impl PathwayGraph {
    /// Nodes a traversal starts from.
    ///
    /// These are the nodes without incoming edges. If every node has one, all
    /// problem nodes are used, and failing that, the first node.
    pub fn start_nodes(&self) -> Vec<&NodeId> {
        let targets: AHashSet<&str> = self.edges.iter().map(|(_, t)| t.as_str()).collect();
        let roots: Vec<&NodeId> = self
            .nodes
            .iter()
            .map(DiagnosticNode::id)
            .filter(|id| !targets.contains(id.as_str()))
            .collect();
        if !roots.is_empty() {
            return roots;
        }

        let problems: Vec<&NodeId> = self
            .nodes_of_type(NodeType::Problem)
            .map(DiagnosticNode::id)
            .collect();
        if !problems.is_empty() {
            return problems;
        }
        self.nodes.iter().map(DiagnosticNode::id).take(1).collect()
    }

    /// Outgoing neighbours of every node, in edge order.
    pub(super) fn adjacency(&self) -> AHashMap<&str, Vec<&NodeId>> {
        let mut adjacency: AHashMap<&str, Vec<&NodeId>> = AHashMap::new();
        for (source, target) in &self.edges {
            adjacency.entry(source.as_str()).or_default().push(target);
        }
        adjacency
    }

    /// Walks the pathway depth-first from every start node and collects one phrase per node.
    ///
    /// Each node is visited at most once across all start nodes; children are
    /// followed in edge order.
    pub fn collect_phrases(&self) -> RulePhrases {
        let adjacency = self.adjacency();
        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut phrases = RulePhrases::default();

        for start in self.start_nodes() {
            let mut stack: Vec<&NodeId> = vec![start];
            while let Some(id) = stack.pop() {
                if !visited.insert(id.as_str()) {
                    continue;
                }
                let Some(node) = self.node(id.as_str()) else {
                    warn!("Traversal reached unknown node {}", id);
                    continue;
                };
                let phrase = node_phrase(node);
                match node.node_type() {
                    NodeType::Action => phrases.actions.push(phrase),
                    _ => phrases.conditions.push(phrase),
                }
                if let Some(children) = adjacency.get(id.as_str()) {
                    stack.extend(children.iter().rev());
                }
            }
        }
        phrases
    }

    /// Renders the pathway as rule text, e.g.
    /// `IF problem is 'Temp high' AND Temp>90,\nTHEN\n  1. Apply cooling`.
    pub fn convert_to_rule_text(&self) -> String {
        let phrases = self.collect_phrases();
        debug!(
            "Pathway {} yields {} condition phrase(s) and {} action phrase(s)",
            self.pathway_id,
            phrases.conditions.len(),
            phrases.actions.len()
        );
        render_phrases(&phrases.conditions, &phrases.actions)
    }

    /// Flattens the pathway into rule form: its text, the conditions and actions
    /// parsed back out of that text, and a snapshot of the graph.
    pub fn convert_to_structured_data(&self) -> StructuredRule {
        let text = self.convert_to_rule_text();
        let parsed = parse_phrase_text(&text, PhraseActions::SplitLabel).unwrap_or_default();
        StructuredRule {
            conditions: parsed.conditions,
            actions: parsed.actions,
            text,
            is_complex: true,
            name: self.name.clone(),
            description: self.description.clone(),
            pathway_data: self.to_data(),
        }
    }
}

/// The rule phrase a single node contributes.
pub fn node_phrase(node: &DiagnosticNode) -> String {
    let trimmed = node.content().trim();
    let content = if trimmed.is_empty() {
        format!("[Empty {}]", node.node_type().label())
    } else {
        trimmed.to_string()
    };

    match node.kind() {
        NodeKind::Problem => format!("problem is '{}'", content),
        NodeKind::Check { check_type } => match check_type {
            Some(check_type) => format!("{} shows '{}'", check_type, content),
            None => format!("check shows '{}'", content),
        },
        NodeKind::Condition { severity } => match severity {
            Some(severity) => format!("{} condition: {}", severity, content),
            None => content,
        },
        NodeKind::Action { impact, .. } => match impact {
            Some(impact) => format!("{}: {}", impact, content),
            None => content,
        },
    }
}
