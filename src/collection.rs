//! An ordered, file-backed set of diagnostic rules.

use crate::error::StoreError;
use crate::rule::{Rule, RuleIssues, RuleType};
use crate::timestamp::now_iso;
use crate::wire::ordered_map;
use ahash::AHashMap;
use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const DEFAULT_COLLECTION_NAME: &str = "Diagnostic Collection";

/// Rules used at least this often count as frequently used.
pub const FREQUENT_USE_THRESHOLD: u64 = 5;

/// Which parts of a rule a search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFields {
    #[default]
    All,
    /// Rule text and description.
    Text,
    Conditions,
    Actions,
}

/// Filters a search by how often a rule has been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageFilter {
    NeverUsed,
    UsedAtLeastOnce,
    /// Used at least [`FREQUENT_USE_THRESHOLD`] times.
    Frequent,
    /// Used at some point, i.e. has a `last_used` timestamp.
    RecentlyUsed,
}

impl UsageFilter {
    fn matches(&self, rule: &Rule) -> bool {
        match self {
            UsageFilter::NeverUsed => rule.use_count() == 0,
            UsageFilter::UsedAtLeastOnce => rule.use_count() > 0,
            UsageFilter::Frequent => rule.use_count() >= FREQUENT_USE_THRESHOLD,
            UsageFilter::RecentlyUsed => rule.last_used().is_some(),
        }
    }
}

/// Options for [`Collection::search`]. The default searches every field, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub rule_type: Option<RuleType>,
    pub fields: SearchFields,
    pub usage: Option<UsageFilter>,
    /// Earliest creation date, compared as an ISO-8601 string.
    pub created_from: Option<String>,
    /// Latest creation date, compared as an ISO-8601 string.
    pub created_to: Option<String>,
    /// Matches the `effectiveness` label quick captures store in metadata.
    pub effectiveness: Option<String>,
}

/// Result of [`Collection::import_rules`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    /// Entries that could not be read as a rule.
    pub skipped: usize,
}

/// Counts and dates describing a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total_rules: usize,
    pub rules_by_type: BTreeMap<RuleType, usize>,
    pub never_used: usize,
    pub used_once: usize,
    pub used_multiple: usize,
    pub earliest_rule: Option<String>,
    pub latest_rule: Option<String>,
    pub latest_usage: Option<String>,
}

/// The stored shape of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionData {
    #[serde(default)]
    collection_id: Option<String>,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    created_date: Option<String>,
    #[serde(default)]
    last_modified_date: Option<String>,
    #[serde(default, with = "ordered_map")]
    rules: Vec<(String, Rule)>,
}

fn default_name() -> String {
    DEFAULT_COLLECTION_NAME.to_string()
}

/// A subset of rules prepared for sharing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleExport {
    pub collection_name: String,
    pub export_date: String,
    #[serde(with = "ordered_map")]
    pub rules: Vec<(String, Rule)>,
}

/// Rules keyed by id, kept in the order they were added.
#[derive(Debug, Clone)]
pub struct Collection {
    collection_id: String,
    pub name: String,
    pub description: String,
    created_date: String,
    last_modified_date: String,
    rules: Vec<Rule>,
    index: AHashMap<String, usize>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION_NAME)
    }
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_iso();
        Self {
            collection_id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            created_date: now.clone(),
            last_modified_date: now,
            rules: Vec::new(),
            index: AHashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.collection_id
    }

    pub fn created_date(&self) -> &str {
        &self.created_date
    }

    pub fn last_modified_date(&self) -> &str {
        &self.last_modified_date
    }

    fn touch(&mut self) {
        self.last_modified_date = now_iso();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .rules
            .iter()
            .enumerate()
            .map(|(slot, rule)| (rule.id().to_string(), slot))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in insertion order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.index.contains_key(rule_id)
    }

    pub fn get_rule(&self, rule_id: &str) -> Option<&Rule> {
        self.index.get(rule_id).map(|&slot| &self.rules[slot])
    }

    pub fn get_rule_mut(&mut self, rule_id: &str) -> Option<&mut Rule> {
        match self.index.get(rule_id) {
            Some(&slot) => {
                self.last_modified_date = now_iso();
                Some(&mut self.rules[slot])
            }
            None => None,
        }
    }

    /// Adds a rule and returns its id. A rule with the same id is replaced in place.
    pub fn add_rule(&mut self, rule: Rule) -> String {
        let id = rule.id().to_string();
        match self.index.get(&id) {
            Some(&slot) => self.rules[slot] = rule,
            None => {
                self.index.insert(id.clone(), self.rules.len());
                self.rules.push(rule);
            }
        }
        self.touch();
        debug!("Added rule {}", id);
        id
    }

    /// Replaces the stored rule with the same id. Returns `false` if there is none.
    pub fn update_rule(&mut self, rule: Rule) -> bool {
        let Some(&slot) = self.index.get(rule.id()) else {
            return false;
        };
        self.rules[slot] = rule;
        self.touch();
        true
    }

    pub fn remove_rule(&mut self, rule_id: &str) -> Option<Rule> {
        let slot = self.index.get(rule_id).copied()?;
        let rule = self.rules.remove(slot);
        self.rebuild_index();
        self.touch();
        debug!("Removed rule {}", rule_id);
        Some(rule)
    }

    pub fn rules_by_type(&self, rule_type: RuleType) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.rule_type() == rule_type)
            .collect()
    }

    /// Rules matching `query` and every filter in `options`, in collection order.
    ///
    /// An empty query matches every rule, so the filters can be used alone.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<&Rule> {
        let normalize = |text: &str| {
            if options.case_sensitive {
                text.to_string()
            } else {
                text.to_lowercase()
            }
        };
        let query = normalize(query);

        self.rules
            .iter()
            .filter(|rule| options.rule_type.is_none_or(|t| rule.rule_type() == t))
            .filter(|rule| {
                query.is_empty()
                    || searchable_text(rule, options.fields)
                        .iter()
                        .any(|text| normalize(text).contains(&query))
            })
            .filter(|rule| {
                options
                    .created_from
                    .as_deref()
                    .is_none_or(|from| rule.created_date() >= from)
            })
            .filter(|rule| {
                options
                    .created_to
                    .as_deref()
                    .is_none_or(|to| rule.created_date() <= to)
            })
            .filter(|rule| options.usage.is_none_or(|usage| usage.matches(rule)))
            .filter(|rule| {
                options.effectiveness.as_deref().is_none_or(|wanted| {
                    rule.metadata.get("effectiveness").and_then(Value::as_str) == Some(wanted)
                })
            })
            .collect()
    }

    pub fn record_rule_usage(&mut self, rule_id: &str) -> bool {
        let Some(&slot) = self.index.get(rule_id) else {
            return false;
        };
        self.rules[slot].record_usage();
        self.touch();
        true
    }

    /// Adds a copy of a rule and returns the copy's id.
    pub fn duplicate_rule(&mut self, rule_id: &str) -> Option<String> {
        let copy = self.get_rule(rule_id)?.duplicate();
        Some(self.add_rule(copy))
    }

    /// Imports rules from an export, a saved collection, a list of rules or a single rule.
    ///
    /// Rules whose id is already present replace the stored rule. Entries that are
    /// not readable as rules are skipped with a warning.
    pub fn import_rules(&mut self, data: &Value) -> ImportSummary {
        let entries: Vec<(Option<&str>, &Value)> = match data {
            Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
            Value::Object(map) => match map.get("rules") {
                Some(Value::Object(rules)) => {
                    rules.iter().map(|(k, v)| (Some(k.as_str()), v)).collect()
                }
                Some(Value::Array(rules)) => rules.iter().map(|v| (None, v)).collect(),
                Some(_) => Vec::new(),
                None => vec![(None, data)],
            },
            _ => Vec::new(),
        };

        let mut summary = ImportSummary::default();
        for (key, value) in entries {
            let mut rule = match Rule::from_value(value.clone()) {
                Ok(rule) => rule,
                Err(e) => {
                    warn!("Skipping rule during import: {}", e);
                    summary.skipped += 1;
                    continue;
                }
            };
            if let Some(key) = key.filter(|_| value.get("rule_id").is_none()) {
                rule.set_id(key);
            }
            if self.update_rule(rule.clone()) {
                summary.updated += 1;
            } else {
                self.add_rule(rule);
                summary.added += 1;
            }
        }
        info!(
            "Imported rules: {} added, {} updated, {} skipped",
            summary.added, summary.updated, summary.skipped
        );
        summary
    }

    /// Exports the given rules (unknown ids are ignored), or every rule for `None`.
    pub fn export_rules(&self, rule_ids: Option<&[&str]>) -> RuleExport {
        let rules = match rule_ids {
            None => self.rules.iter().collect(),
            Some(ids) => ids.iter().filter_map(|id| self.get_rule(id)).collect::<Vec<_>>(),
        };
        RuleExport {
            collection_name: self.name.clone(),
            export_date: now_iso(),
            rules: rules
                .into_iter()
                .map(|r| (r.id().to_string(), r.clone()))
                .collect(),
        }
    }

    pub fn statistics(&self) -> CollectionStats {
        let rules_by_type = self.rules.iter().map(Rule::rule_type).counts();
        let mut stats = CollectionStats {
            total_rules: self.rules.len(),
            rules_by_type: rules_by_type.into_iter().collect(),
            ..CollectionStats::default()
        };
        for rule in &self.rules {
            match rule.use_count() {
                0 => stats.never_used += 1,
                1 => stats.used_once += 1,
                _ => stats.used_multiple += 1,
            }
        }
        let created = self.rules.iter().map(Rule::created_date).minmax();
        if let Some((earliest, latest)) = created.into_option() {
            stats.earliest_rule = Some(earliest.to_string());
            stats.latest_rule = Some(latest.to_string());
        }
        stats.latest_usage = self
            .rules
            .iter()
            .filter_map(Rule::last_used)
            .max()
            .map(str::to_string);
        stats
    }

    /// Up to `count` used rules, most recently used first.
    pub fn recently_used(&self, count: usize) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.last_used().is_some())
            .sorted_by(|a, b| b.last_used().cmp(&a.last_used()))
            .take(count)
            .collect()
    }

    /// Up to `count` rules, most used first. Ties keep collection order.
    pub fn frequently_used(&self, count: usize) -> Vec<&Rule> {
        self.rules
            .iter()
            .sorted_by_key(|r| Reverse(r.use_count()))
            .take(count)
            .collect()
    }

    /// Validation issues of every rule that has any, in collection order.
    pub fn validate(&self) -> Vec<(String, RuleIssues)> {
        self.rules
            .iter()
            .map(|r| (r.id().to_string(), r.validate()))
            .filter(|(_, issues)| !issues.is_empty())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        let data = CollectionData {
            collection_id: Some(self.collection_id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            created_date: Some(self.created_date.clone()),
            last_modified_date: Some(self.last_modified_date.clone()),
            rules: self
                .rules
                .iter()
                .map(|r| (r.id().to_string(), r.clone()))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Reads a collection. The key of each entry in `rules` is taken as the rule's id.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let data: CollectionData = serde_json::from_str(json)?;
        let mut collection = Collection::new(data.name);
        collection.description = data.description;
        if let Some(id) = data.collection_id {
            collection.collection_id = id;
        }
        for (key, mut rule) in data.rules {
            if rule.id() != key {
                debug!("Rule stored under '{}' carries id '{}'; using the key", key, rule.id());
                rule.set_id(key);
            }
            collection.add_rule(rule);
        }
        if let Some(created) = data.created_date {
            collection.created_date = created;
        }
        collection.last_modified_date = data
            .last_modified_date
            .unwrap_or_else(|| collection.created_date.clone());
        Ok(collection)
    }

    /// Writes the collection as pretty JSON, creating parent directories.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        fs::write(path, self.to_json()?).map_err(|e| io_error(path, e))?;
        info!("Saved {} rule(s) to '{}'", self.rules.len(), path.display());
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let collection = Self::from_json(&content)?;
        info!(
            "Loaded {} rule(s) from '{}'",
            collection.rules.len(),
            path.display()
        );
        Ok(collection)
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn searchable_text(rule: &Rule, fields: SearchFields) -> Vec<String> {
    let mut texts = Vec::new();
    if matches!(fields, SearchFields::All | SearchFields::Text) {
        texts.push(rule.text().to_string());
        if !rule.description.is_empty() {
            texts.push(rule.description.clone());
        }
    }
    if matches!(fields, SearchFields::All | SearchFields::Conditions) {
        texts.extend(
            rule.conditions()
                .iter()
                .map(|c| format!("{} {} {}", c.param, c.operator, c.value)),
        );
    }
    if matches!(fields, SearchFields::All | SearchFields::Actions) {
        texts.extend(
            rule.actions()
                .iter()
                .map(|a| format!("{} {} {}", a.action_type, a.target, a.value)),
        );
    }
    texts
}
