//! Unit tests for small building blocks: errors, enums, timestamps and layout settings.
use elicit::prelude::*;
use elicit::timestamp::{now_iso, parse_iso};

#[test]
fn test_error_messages() {
    let parse = RuleTextEngine::parse_text("THEN only").unwrap_err();
    assert!(parse.to_string().starts_with("Rule text is malformed: "));

    assert_eq!(
        ValidationError::DuplicateNodeId("n1".to_string()).to_string(),
        "A node with id 'n1' already exists in the pathway"
    );
    assert_eq!(
        ValidationError::InvalidPathwayData("bad".to_string()).to_string(),
        "Invalid pathway data: bad"
    );

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let store: StoreError = json_err.into();
    assert!(matches!(store, StoreError::Json(_)));
    assert!(store.to_string().starts_with("Failed to (de)serialize JSON"));
}

#[test]
fn test_errors_box_into_prelude_result() {
    fn load() -> Result<PathwayGraph> {
        Ok(PathwayGraph::from_json(r#"{ "nodes": { "x": { "node_type": "gadget" } } }"#)?)
    }
    let err = load().unwrap_err();
    assert!(err.to_string().contains("Invalid node type: 'gadget'"));
}

#[test]
fn test_node_type_parsing() {
    assert_eq!("action".parse::<NodeType>().unwrap(), NodeType::Action);
    assert!("Action".parse::<NodeType>().is_err());
    assert_eq!(NodeType::Condition.to_string(), "condition");
    assert_eq!(NodeType::Condition.label(), "Condition");
}

#[test]
fn test_operator_and_connector_tokens() {
    let symbols: Vec<&str> = Operator::PARSE_ORDER.iter().map(Operator::symbol).collect();
    assert_eq!(symbols, vec!["contains", ">=", "<=", "!=", "=", ">", "<"]);
    assert_eq!(Connector::And.to_string(), "AND");
    assert_eq!(Connector::None.to_string(), "");
    assert!(Connector::default().is_none());
}

#[test]
fn test_rule_type_ordering_and_display() {
    assert!(RuleType::Pathway < RuleType::Capture);
    assert!(RuleType::Capture < RuleType::Rule);
    assert_eq!(RuleType::Capture.to_string(), "Capture");
}

#[test]
fn test_timestamps() {
    let now = now_iso();
    assert!(parse_iso(&now).is_some());
    assert!(now.contains('T'));

    let with_offset = parse_iso("2024-03-01T09:15:02+01:00").unwrap();
    assert_eq!(with_offset.format("%H:%M").to_string(), "09:15");
    assert!(parse_iso("2024-03-01T09:15:02").is_some());
    assert!(parse_iso("2024-03-01 09:15:02").is_some());
    assert!(parse_iso("March first").is_none());
}

#[test]
fn test_layout_settings_columns() {
    let layout = LayoutSettings::default();
    assert_eq!(layout.column_x(0), 50);
    assert_eq!(layout.column_x(3), 950);
    assert_eq!(layout.row_step(), 140);

    let partial: LayoutSettings = serde_json::from_str(r#"{ "initial_y": 10 }"#).unwrap();
    assert_eq!(partial.initial_y, 10);
    assert_eq!(partial.column_width, 250);
}

#[test]
fn test_node_id_short_form() {
    let id = NodeId::from("abcdef0123456789");
    assert_eq!(id.short(), "abcdef01");
    assert_eq!(NodeId::from("abc").short(), "abc");
    assert_eq!(NodeId::generate().as_str().len(), 36);
}
