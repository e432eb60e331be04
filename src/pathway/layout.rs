use super::node::{NodeType, Position};
use super::PathwayGraph;
use crate::config::NODE_HEIGHT;
use ahash::AHashMap;
use log::debug;

impl PathwayGraph {
    /// Where a new node of `node_type` goes: in its type's column, below the
    /// lowest existing node of that type (or at `initial_y` in an empty column).
    pub fn calculate_node_position(&self, node_type: NodeType) -> Position {
        let x = self.layout.column_x(node_type.column());
        let y = self
            .nodes_of_type(node_type)
            .map(|n| n.position().y + NODE_HEIGHT + self.layout.node_margin)
            .fold(self.layout.initial_y, i64::max);
        Position::new(x, y)
    }

    /// Re-positions every node into its type's column, stacked in insertion order.
    ///
    /// Only positions change; nodes and edges are untouched.
    pub fn auto_layout(&mut self) {
        let layout = self.layout;
        let mut cursors: AHashMap<NodeType, i64> = NodeType::ALL
            .iter()
            .map(|t| (*t, layout.initial_y))
            .collect();

        for node in &mut self.nodes {
            let node_type = node.node_type();
            let cursor = cursors.entry(node_type).or_insert(layout.initial_y);
            node.set_position(layout.column_x(node_type.column()), *cursor);
            *cursor += layout.row_step();
        }
        self.touch();
        debug!("Auto-layout placed {} node(s)", self.nodes.len());
    }
}
