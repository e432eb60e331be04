use super::node::NodeId;
use super::traversal::node_phrase;
use super::PathwayGraph;
use ahash::{AHashMap, AHashSet};
use std::cell::RefCell;
use std::fmt;

/// A wrapper to display a pathway as a tree, one branch per start node.
///
/// Nodes reached a second time (shared children or cycles) are printed with a
/// `(see above)` marker instead of being expanded again.
pub struct PathwayOutline<'a> {
    pub pathway: &'a PathwayGraph,
}

impl<'a> PathwayOutline<'a> {
    pub fn new(pathway: &'a PathwayGraph) -> Self {
        Self { pathway }
    }
}

impl<'a> fmt::Display for PathwayOutline<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.pathway.name().is_empty() {
            "Untitled pathway"
        } else {
            self.pathway.name()
        };
        writeln!(f, "{}", name)?;

        let adjacency = self.pathway.adjacency();
        let printed = RefCell::new(AHashSet::new());
        let starts = self.pathway.start_nodes();
        let last = starts.len().saturating_sub(1);
        for (i, start) in starts.into_iter().enumerate() {
            self.fmt_as_tree(start, f, "", i == last, &adjacency, &printed)?;
        }
        Ok(())
    }
}

impl<'a> PathwayOutline<'a> {
    /// Recursively formats a node and its children.
    fn fmt_as_tree(
        &self,
        id: &NodeId,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
        adjacency: &AHashMap<&str, Vec<&NodeId>>,
        printed: &RefCell<AHashSet<String>>,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let Some(node) = self.pathway.node(id.as_str()) else {
            return writeln!(f, "<Unknown Node {}>", id);
        };
        let label = format!("[{}] {}", node.node_type().label(), node_phrase(node));
        if !printed.borrow_mut().insert(id.to_string()) {
            return writeln!(f, "{} (see above)", label);
        }
        writeln!(f, "{}", label)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        if let Some(children) = adjacency.get(id.as_str()) {
            let last = children.len().saturating_sub(1);
            for (i, child) in children.iter().enumerate() {
                self.fmt_as_tree(child, f, &child_prefix, i == last, adjacency, printed)?;
            }
        }
        Ok(())
    }
}
