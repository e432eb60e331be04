//! Tests for the stored rule model: structure edits, pathway snapshots and validation.
mod common;
use common::*;
use elicit::prelude::*;
use elicit::rule::PROBLEM_TYPE_KEY;
use serde_json::Value;

#[test]
fn test_from_parts_generates_text() {
    let rule = sample_rule();
    assert_eq!(
        rule.text(),
        "IF door_open AND temperature > 90,\nTHEN\n  1. Apply cooling\n  2. Adjust thermostat to 70"
    );
    assert_eq!(rule.rule_type(), RuleType::Rule);
    assert!(rule.is_complex);
    assert_eq!(rule.use_count(), 0);
    assert_eq!(rule.id().len(), 36);
}

#[test]
fn test_add_condition_moves_connector_to_previous() {
    let mut rule = Rule::new();
    rule.add_flag("door_open");
    rule.add_condition(Condition::new("temp", Operator::GreaterThan, "90", Connector::Or));
    rule.add_condition(Condition::compare("fan", Operator::Equal, "off"));

    assert_eq!(
        rule.conditions(),
        &[
            Condition::new("door_open", Operator::Equal, "true", Connector::Or),
            Condition::new("temp", Operator::GreaterThan, "90", Connector::And),
            Condition::new("fan", Operator::Equal, "off", Connector::None),
        ]
    );
    assert_eq!(rule.text(), "IF door_open OR temp > 90 AND fan = off,\nTHEN");
}

#[test]
fn test_add_action_continues_sequence() {
    let mut rule = Rule::new();
    rule.add_action("cooling", None, "", None);
    rule.add_action("thermostat", Some("Adjust"), "70", Some(5));
    rule.add_action("supervisor", Some("Contact"), "", None);

    let sequences: Vec<u32> = rule.actions().iter().map(|a| a.sequence).collect();
    assert_eq!(sequences, vec![1, 5, 6]);
    assert!(rule.text().ends_with(
        "THEN\n  1. Apply cooling\n  2. Adjust thermostat to 70\n  3. Contact supervisor"
    ));
}

#[test]
fn test_resync_from_text() {
    let mut rule = sample_rule();
    rule.resync_from_text("IF leak, THEN Replace seal").unwrap();
    assert_eq!(rule.conditions(), &[Condition::flag("leak")]);
    assert_eq!(rule.actions(), &[Action::new("Replace", "seal", "", 1)]);
    assert_eq!(rule.text(), "IF leak,\nTHEN\n  1. Replace seal");
}

#[test]
fn test_failed_resync_leaves_rule_untouched() {
    let mut rule = sample_rule();
    let before = rule.clone();
    assert!(rule.resync_from_text("no clause keywords here").is_err());
    assert_eq!(rule, before);
}

#[test]
fn test_free_text_is_kept_verbatim() {
    let rule = Rule::from_free_text("Check the pump when it hums");
    assert_eq!(rule.text(), "Check the pump when it hums");
    assert!(rule.conditions().is_empty());
    assert_eq!(rule.describe(60), "Check the pump when it hums");
}

#[test]
fn test_rule_from_pathway_keeps_snapshot() {
    let (pathway, _) = create_linear_pathway();
    let rule = Rule::from_pathway(&pathway);

    assert_eq!(rule.rule_type(), RuleType::Pathway);
    assert_eq!(rule.name, "Overheating");
    assert_eq!(rule.text(), pathway.convert_to_rule_text());
    assert_eq!(
        rule.conditions(),
        &[
            Condition::new("problem is 'Temp high'", Operator::Equal, "true", Connector::And),
            Condition::new("check shows 'Sensor check'", Operator::Equal, "true", Connector::And),
            Condition::new("Temp>90", Operator::Equal, "true", Connector::None),
        ]
    );
    assert_eq!(rule.actions(), &[Action::apply("Apply cooling", 1)]);

    let rebuilt = rule.pathway().unwrap().unwrap();
    assert_eq!(rebuilt.len(), 4);
    assert_eq!(rebuilt.convert_to_rule_text(), rule.text());
}

#[test]
fn test_structure_edit_detaches_pathway() {
    let (pathway, _) = create_linear_pathway();
    let mut rule = Rule::from_pathway(&pathway);
    rule.add_flag("fan_off");

    assert!(rule.pathway_data().is_none());
    assert!(rule.pathway().is_none());
    assert_eq!(rule.rule_type(), RuleType::Rule);
    assert!(rule.text().contains("AND fan_off,\nTHEN"));
}

#[test]
fn test_set_pathway_keeps_name_when_pathway_has_none() {
    let (mut pathway, _) = create_linear_pathway();
    pathway.set_name("");

    let mut rule = sample_rule();
    rule.name = "Keep me".to_string();
    rule.set_pathway(&pathway);

    assert_eq!(rule.name, "Keep me");
    assert_eq!(rule.rule_type(), RuleType::Pathway);
    assert_eq!(rule.text(), pathway.convert_to_rule_text());
}

#[test]
fn test_rule_type_from_metadata() {
    let mut rule = sample_rule();
    assert_eq!(rule.rule_type(), RuleType::Rule);
    rule.metadata
        .insert(PROBLEM_TYPE_KEY.to_string(), Value::from(""));
    assert_eq!(rule.rule_type(), RuleType::Rule);
    assert_eq!(rule.describe(60), "door_open AND temperature > 90");

    rule.metadata
        .insert(PROBLEM_TYPE_KEY.to_string(), Value::from("Electrical"));
    assert_eq!(rule.rule_type(), RuleType::Capture);
}

#[test]
fn test_describe_fallbacks() {
    let mut rule = sample_rule();
    assert_eq!(rule.describe(60), "door_open AND temperature > 90");
    assert_eq!(rule.describe(10), "door_open ...");

    rule.description = "Cooling loop".to_string();
    assert_eq!(rule.describe(60), "Cooling loop");
    rule.name = "Overheat response".to_string();
    assert_eq!(rule.describe(60), "Overheat response");

    let (pathway, _) = create_linear_pathway();
    let mut pathway_rule = Rule::from_pathway(&pathway);
    pathway_rule.name.clear();
    assert_eq!(pathway_rule.describe(60), "Temp high");
}

#[test]
fn test_display_shows_type_and_description() {
    assert_eq!(
        sample_rule().to_string(),
        "[Rule] door_open AND temperature > 90"
    );
}

#[test]
fn test_usage_tracking() {
    let mut rule = sample_rule();
    assert_eq!(rule.formatted_last_used(), "Never");

    rule.record_usage();
    rule.record_usage();
    assert_eq!(rule.use_count(), 2);
    assert!(rule.last_used().is_some());
    assert_eq!(rule.formatted_last_used().len(), "2024-03-01 09:15".len());

    let stored = Rule::from_json(r#"{ "text": "x", "last_used": "2024-03-01T09:15:02.123456" }"#)
        .unwrap();
    assert_eq!(stored.formatted_last_used(), "2024-03-01 09:15");

    let garbled = Rule::from_json(r#"{ "text": "x", "last_used": "yesterday" }"#).unwrap();
    assert_eq!(garbled.formatted_last_used(), "Unknown");
}

#[test]
fn test_validate_empty_rule() {
    let issues = Rule::new().validate();
    assert_eq!(issues.general, vec!["Rule text is empty"]);
    assert_eq!(issues.conditions, vec!["No conditions defined"]);
    assert_eq!(issues.actions, vec!["No actions defined"]);
    assert_eq!(issues.total(), 3);
}

#[test]
fn test_validate_reports_incomplete_parts() {
    let json = r#"{
        "rule_id": "",
        "text": "IF a, THEN Apply x",
        "conditions": [
            { "param": "a", "connector": "AND" },
            { "param": " ", "connector": "OR" }
        ],
        "actions": [
            { "target": "x", "sequence": 2 },
            { "target": "", "sequence": 2 },
            { "target": "y", "sequence": 2 }
        ]
    }"#;
    let issues = Rule::from_json(json).unwrap().validate();

    assert_eq!(issues.general, vec!["Rule ID is missing"]);
    assert_eq!(
        issues.conditions,
        vec![
            "Condition 2 is missing a parameter",
            "Last condition should not have a connector"
        ]
    );
    assert_eq!(
        issues.actions,
        vec!["Action 2 is missing a target", "Duplicate sequence number 2"]
    );
}

#[test]
fn test_valid_rule_has_no_issues() {
    assert!(sample_rule().validate().is_empty());
}

#[test]
fn test_duplicate_resets_usage() {
    let mut rule = sample_rule();
    rule.name = "Cooling".to_string();
    rule.record_usage();

    let copy = rule.duplicate();
    assert_ne!(copy.id(), rule.id());
    assert_eq!(copy.name, "Copy of Cooling");
    assert_eq!(copy.use_count(), 0);
    assert!(copy.last_used().is_none());
    assert_eq!(copy.text(), rule.text());
    assert_eq!(copy.conditions(), rule.conditions());
}

#[test]
fn test_json_defaults_and_errors() {
    let rule = Rule::from_json(r#"{ "text": "IF a, THEN Apply b" }"#).unwrap();
    assert_eq!(rule.text(), "IF a, THEN Apply b");
    assert!(rule.conditions().is_empty());
    assert!(rule.is_complex);
    assert_eq!(rule.use_count(), 0);
    assert!(!rule.id().is_empty());
    assert!(!rule.created_date().is_empty());

    assert!(matches!(
        Rule::from_json("[1, 2]"),
        Err(StoreError::InvalidRule(_))
    ));
    assert!(matches!(Rule::from_json("{ bad"), Err(StoreError::Json(_))));
}

#[test]
fn test_pathway_rule_json_round_trip() {
    let (pathway, _) = create_linear_pathway();
    let rule = Rule::from_pathway(&pathway);
    let restored = Rule::from_json(&rule.to_json().unwrap()).unwrap();
    assert_eq!(restored, rule);
    assert_eq!(restored.rule_type(), RuleType::Pathway);
}
