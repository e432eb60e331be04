//! Tests for the rule collection: storage, search, import/export and statistics.
mod common;
use common::*;
use elicit::capture::CaptureOutcome;
use elicit::collection::{ImportSummary, UsageFilter, DEFAULT_COLLECTION_NAME};
use elicit::prelude::*;
use serde_json::json;

/// A collection holding a written rule, a quick capture and a pathway rule, in that order.
fn create_mixed_collection() -> (Collection, Vec<String>) {
    let mut collection = Collection::new("Plant A");

    let mut written = Rule::from_parts(
        vec![
            Condition::new("door_open", Operator::Equal, "true", Connector::And),
            Condition::compare("temp", Operator::GreaterThan, "90"),
        ],
        vec![Action::apply("cooling", 1)],
    );
    written.description = "Cooling loop".to_string();

    let capture = QuickCapture {
        problem_type: Some("Mechanical".to_string()),
        solutions: vec!["Replace bearing".to_string()],
        effectiveness: Some(CaptureOutcome::CompleteSolution),
        ..QuickCapture::new("Pump noise")
    }
    .into_rule();

    let (pathway, _) = create_linear_pathway();
    let from_pathway = Rule::from_pathway(&pathway);

    let ids = vec![
        collection.add_rule(written),
        collection.add_rule(capture),
        collection.add_rule(from_pathway),
    ];
    (collection, ids)
}

fn ids_of(rules: &[&Rule]) -> Vec<String> {
    rules.iter().map(|r| r.id().to_string()).collect()
}

#[test]
fn test_add_get_update_remove() {
    let mut collection = Collection::new("Plant A");
    let rule = sample_rule();
    let id = collection.add_rule(rule.clone());

    assert_eq!(collection.len(), 1);
    assert!(collection.contains(&id));
    assert_eq!(collection.get_rule(&id), Some(&rule));

    let mut changed = rule.clone();
    changed.name = "Renamed".to_string();
    assert!(collection.update_rule(changed));
    assert_eq!(collection.get_rule(&id).unwrap().name, "Renamed");
    assert!(!collection.update_rule(Rule::new()));

    assert!(collection.remove_rule(&id).is_some());
    assert!(collection.is_empty());
    assert!(collection.remove_rule(&id).is_none());
}

#[test]
fn test_adding_same_id_replaces_in_place() {
    let (mut collection, ids) = create_mixed_collection();
    let mut replacement = collection.get_rule(&ids[1]).unwrap().clone();
    replacement.name = "Replaced".to_string();

    assert_eq!(collection.add_rule(replacement), ids[1]);
    assert_eq!(collection.len(), 3);
    assert_eq!(collection.rules()[1].name, "Replaced");
}

#[test]
fn test_removal_keeps_order_and_lookup() {
    let (mut collection, ids) = create_mixed_collection();
    collection.remove_rule(&ids[1]);

    let remaining: Vec<&str> = collection.rules().iter().map(Rule::id).collect();
    assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str()]);
    assert_eq!(collection.get_rule(&ids[2]).unwrap().id(), ids[2]);
}

#[test]
fn test_rules_by_type() {
    let (collection, ids) = create_mixed_collection();
    assert_eq!(ids_of(&collection.rules_by_type(RuleType::Capture)), vec![ids[1].clone()]);
    assert_eq!(ids_of(&collection.rules_by_type(RuleType::Pathway)), vec![ids[2].clone()]);
}

#[test]
fn test_search_ignores_case_by_default() {
    let (collection, ids) = create_mixed_collection();
    let found = collection.search("COOLING", &SearchOptions::default());
    assert_eq!(ids_of(&found), vec![ids[0].clone(), ids[2].clone()]);

    let sensitive = SearchOptions {
        case_sensitive: true,
        ..SearchOptions::default()
    };
    assert!(collection.search("COOLING", &sensitive).is_empty());
}

#[test]
fn test_search_by_field() {
    let (collection, ids) = create_mixed_collection();
    let in_conditions = SearchOptions {
        fields: SearchFields::Conditions,
        ..SearchOptions::default()
    };
    let in_actions = SearchOptions {
        fields: SearchFields::Actions,
        ..SearchOptions::default()
    };
    let in_text = SearchOptions {
        fields: SearchFields::Text,
        ..SearchOptions::default()
    };

    assert_eq!(ids_of(&collection.search("door", &in_conditions)), vec![ids[0].clone()]);
    assert!(collection.search("bearing", &in_conditions).is_empty());
    assert_eq!(ids_of(&collection.search("bearing", &in_actions)), vec![ids[1].clone()]);
    assert_eq!(ids_of(&collection.search("loop", &in_text)), vec![ids[0].clone()]);
}

#[test]
fn test_search_filters() {
    let (mut collection, ids) = create_mixed_collection();
    for _ in 0..5 {
        collection.record_rule_usage(&ids[0]);
    }

    let by_type = SearchOptions {
        rule_type: Some(RuleType::Capture),
        ..SearchOptions::default()
    };
    assert_eq!(ids_of(&collection.search("", &by_type)), vec![ids[1].clone()]);

    let frequent = SearchOptions {
        usage: Some(UsageFilter::Frequent),
        ..SearchOptions::default()
    };
    assert_eq!(ids_of(&collection.search("", &frequent)), vec![ids[0].clone()]);

    let never = SearchOptions {
        usage: Some(UsageFilter::NeverUsed),
        ..SearchOptions::default()
    };
    assert_eq!(
        ids_of(&collection.search("", &never)),
        vec![ids[1].clone(), ids[2].clone()]
    );

    let effective = SearchOptions {
        effectiveness: Some("Complete Solution".to_string()),
        ..SearchOptions::default()
    };
    assert_eq!(ids_of(&collection.search("", &effective)), vec![ids[1].clone()]);

    let future = SearchOptions {
        created_from: Some("9999-01-01".to_string()),
        ..SearchOptions::default()
    };
    assert!(collection.search("", &future).is_empty());

    let until_future = SearchOptions {
        created_to: Some("9999-01-01".to_string()),
        ..SearchOptions::default()
    };
    assert_eq!(collection.search("", &until_future).len(), 3);
}

#[test]
fn test_record_usage_of_unknown_rule() {
    let (mut collection, _) = create_mixed_collection();
    assert!(!collection.record_rule_usage("missing"));
}

#[test]
fn test_duplicate_rule() {
    let (mut collection, ids) = create_mixed_collection();
    let copy_id = collection.duplicate_rule(&ids[2]).unwrap();

    assert_eq!(collection.len(), 4);
    assert_ne!(copy_id, ids[2]);
    assert_eq!(collection.get_rule(&copy_id).unwrap().name, "Copy of Overheating");
    assert!(collection.duplicate_rule("missing").is_none());
}

#[test]
fn test_export_then_import_into_another_collection() {
    let (source, ids) = create_mixed_collection();
    let export = source.export_rules(Some(&[ids[0].as_str(), "missing"][..]));
    assert_eq!(export.collection_name, "Plant A");
    assert_eq!(export.rules.len(), 1);

    let value = serde_json::to_value(&export).unwrap();
    let mut target = Collection::new("Plant B");
    let first = target.import_rules(&value);
    assert_eq!(first.added, 1);
    assert_eq!(first.updated, 0);
    assert_eq!(target.get_rule(&ids[0]), source.get_rule(&ids[0]));

    let second = target.import_rules(&value);
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 1);
    assert_eq!(target.len(), 1);
}

#[test]
fn test_export_everything() {
    let (collection, ids) = create_mixed_collection();
    let export = collection.export_rules(None);
    let exported: Vec<&str> = export.rules.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(exported, ids.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn test_import_shapes() {
    let mut collection = Collection::new("Imports");

    let list = json!([
        { "rule_id": "r1", "text": "IF a, THEN Apply b" },
        42,
        { "text": "IF c, THEN Apply d" }
    ]);
    let summary = collection.import_rules(&list);
    assert_eq!((summary.added, summary.updated, summary.skipped), (2, 0, 1));
    assert!(collection.contains("r1"));

    let keyed = json!({
        "rules": {
            "k1": { "text": "IF e, THEN Apply f" },
            "k2": { "rule_id": "own", "text": "IF g, THEN Apply h" }
        }
    });
    let summary = collection.import_rules(&keyed);
    assert_eq!(summary.added, 2);
    assert!(collection.contains("k1"));
    assert!(collection.contains("own"));
    assert!(!collection.contains("k2"));

    let single = json!({ "rule_id": "single", "text": "IF i, THEN Apply j" });
    assert_eq!(collection.import_rules(&single).added, 1);
    assert_eq!(collection.len(), 5);

    assert_eq!(
        collection.import_rules(&json!("nonsense")),
        ImportSummary::default()
    );
}

#[test]
fn test_statistics() {
    let (mut collection, ids) = create_mixed_collection();
    assert_eq!(collection.statistics().latest_usage, None);

    for _ in 0..3 {
        collection.record_rule_usage(&ids[0]);
    }
    collection.record_rule_usage(&ids[1]);

    let stats = collection.statistics();
    assert_eq!(stats.total_rules, 3);
    assert_eq!(stats.rules_by_type.get(&RuleType::Rule), Some(&1));
    assert_eq!(stats.rules_by_type.get(&RuleType::Capture), Some(&1));
    assert_eq!(stats.rules_by_type.get(&RuleType::Pathway), Some(&1));
    assert_eq!((stats.never_used, stats.used_once, stats.used_multiple), (1, 1, 1));
    assert!(stats.earliest_rule <= stats.latest_rule);
    assert!(stats.latest_usage.is_some());
}

#[test]
fn test_statistics_of_empty_collection() {
    let stats = Collection::default().statistics();
    assert_eq!(stats.total_rules, 0);
    assert!(stats.rules_by_type.is_empty());
    assert_eq!(stats.earliest_rule, None);
}

#[test]
fn test_recent_and_frequent_rules() {
    let (mut collection, ids) = create_mixed_collection();
    for _ in 0..2 {
        collection.record_rule_usage(&ids[0]);
    }
    std::thread::sleep(std::time::Duration::from_millis(5));
    collection.record_rule_usage(&ids[1]);

    assert_eq!(
        ids_of(&collection.recently_used(5)),
        vec![ids[1].clone(), ids[0].clone()]
    );
    assert_eq!(ids_of(&collection.recently_used(1)), vec![ids[1].clone()]);
    assert_eq!(
        ids_of(&collection.frequently_used(3)),
        vec![ids[0].clone(), ids[1].clone(), ids[2].clone()]
    );
}

#[test]
fn test_validate_lists_only_incomplete_rules() {
    let (mut collection, _) = create_mixed_collection();
    let empty_id = collection.add_rule(Rule::new());

    let report = collection.validate();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].0, empty_id);
    assert_eq!(report[0].1.total(), 3);
}

#[test]
fn test_save_and_load_round_trip() {
    let (mut collection, ids) = create_mixed_collection();
    collection.description = "Line 3 issues".to_string();
    collection.record_rule_usage(&ids[2]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("rules.json");
    collection.save_to_file(&path).unwrap();

    let loaded = Collection::load_from_file(&path).unwrap();
    assert_eq!(loaded.id(), collection.id());
    assert_eq!(loaded.name, "Plant A");
    assert_eq!(loaded.description, "Line 3 issues");
    assert_eq!(loaded.created_date(), collection.created_date());
    assert_eq!(loaded.rules(), collection.rules());
    assert_eq!(
        loaded.get_rule(&ids[2]).unwrap().rule_type(),
        RuleType::Pathway
    );
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Collection::load_from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}

#[test]
fn test_stored_key_wins_over_embedded_id() {
    let json = r#"{
        "rules": {
            "key-1": { "rule_id": "other", "text": "IF a, THEN Apply b" }
        }
    }"#;
    let collection = Collection::from_json(json).unwrap();
    assert_eq!(collection.name, DEFAULT_COLLECTION_NAME);
    assert!(collection.contains("key-1"));
    assert!(!collection.contains("other"));
}
