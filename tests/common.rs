//! Common test utilities for building pathways, rules and stored data.
use elicit::prelude::*;

/// Sets the content of a node that is known to exist.
#[allow(dead_code)]
pub fn set_content(pathway: &mut PathwayGraph, id: &NodeId, content: &str) {
    pathway
        .node_mut(id.as_str())
        .expect("node should exist")
        .set_content(content);
}

/// Creates the pathway `Problem -> Check -> Condition -> Action` with all
/// type-specific data cleared, so every node contributes its bare phrase.
///
/// Returns the pathway and the node ids in chain order.
#[allow(dead_code)]
pub fn create_linear_pathway() -> (PathwayGraph, Vec<NodeId>) {
    let mut pathway = PathwayGraph::new("Overheating");
    let problem = pathway.add_node(NodeType::Problem, None);
    let check = pathway.add_node(NodeType::Check, None);
    let condition = pathway.add_node(NodeType::Condition, None);
    let action = pathway.add_node(NodeType::Action, None);

    set_content(&mut pathway, &problem, "Temp high");
    set_content(&mut pathway, &check, "Sensor check");
    set_content(&mut pathway, &condition, "Temp>90");
    set_content(&mut pathway, &action, "Apply cooling");

    pathway.node_mut(check.as_str()).unwrap().set_check_type(None);
    pathway.node_mut(condition.as_str()).unwrap().set_severity(None);
    pathway.node_mut(action.as_str()).unwrap().set_impact(None);

    assert!(pathway.connect(problem.as_str(), check.as_str()));
    assert!(pathway.connect(check.as_str(), condition.as_str()));
    assert!(pathway.connect(condition.as_str(), action.as_str()));

    (pathway, vec![problem, check, condition, action])
}

/// Conditions `door_open AND temperature > 90`.
#[allow(dead_code)]
pub fn sample_conditions() -> Vec<Condition> {
    vec![
        Condition::new("door_open", Operator::Equal, "true", Connector::And),
        Condition::new("temperature", Operator::GreaterThan, "90", Connector::None),
    ]
}

/// Two actions given out of sequence order.
#[allow(dead_code)]
pub fn sample_actions() -> Vec<Action> {
    vec![
        Action::new("Adjust", "thermostat", "70", 2),
        Action::new("Apply", "cooling", "", 1),
    ]
}

/// A rule built from [`sample_conditions`] and [`sample_actions`].
#[allow(dead_code)]
pub fn sample_rule() -> Rule {
    Rule::from_parts(sample_conditions(), sample_actions())
}

/// A pathway in the older storage shape: flat type fields, top-level `x`/`y`,
/// no `properties`, and one connection to a node that does not exist.
#[allow(dead_code)]
pub fn legacy_pathway_json() -> &'static str {
    r#"{
        "pathway_id": "legacy-1",
        "name": "Legacy pathway",
        "nodes": {
            "p1": { "node_type": "problem", "content": "No power", "x": 10, "y": 20.6 },
            "c1": { "node_type": "check", "content": "Fuse", "check_type": "Measurement" },
            "a1": { "node_type": "action", "content": "Replace fuse", "impact": "Replacement", "effectiveness": "4" }
        },
        "connections": [["p1", "c1"], ["c1", "a1"], ["c1", "ghost"], ["p1", "c1"]]
    }"#
}
