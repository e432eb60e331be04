use super::action::{Action, DEFAULT_ACTION_TYPE};
use super::condition::{Condition, Connector};
use super::text::RuleTextEngine;
use crate::error::{ParseError, StoreError, ValidationError};
use crate::pathway::{IntoPathway, NodeType, PathwayData, PathwayGraph, StructuredRule};
use crate::timestamp::{now_iso, parse_iso};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Metadata key under which quick captures record their problem type.
pub const PROBLEM_TYPE_KEY: &str = "problem_type";

fn generate_rule_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

/// How a rule was authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleType {
    /// Built in the visual pathway editor.
    Pathway,
    /// Entered through the quick capture form.
    Capture,
    /// Written directly as rule text or structure.
    Rule,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Pathway => "Pathway",
            RuleType::Capture => "Capture",
            RuleType::Rule => "Rule",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completeness problems of a rule, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleIssues {
    pub conditions: Vec<String>,
    pub actions: Vec<String>,
    pub general: Vec<String>,
}

impl RuleIssues {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.actions.is_empty() && self.general.is_empty()
    }

    pub fn total(&self) -> usize {
        self.conditions.len() + self.actions.len() + self.general.len()
    }
}

/// A stored diagnostic rule.
///
/// The structured conditions and actions (or, for pathway rules, the pathway
/// snapshot) are the source of truth; `text` is derived from them. Free-form text
/// that has not been structured yet is kept verbatim until
/// [`Rule::resync_from_text`] succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default = "generate_rule_id")]
    rule_id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_complex: bool,
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    actions: Vec<Action>,
    #[serde(default = "now_iso")]
    created_date: String,
    #[serde(default = "now_iso")]
    last_modified_date: String,
    #[serde(default)]
    last_used: Option<String>,
    #[serde(default)]
    use_count: u64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pathway_data: Option<PathwayData>,
}

impl Default for Rule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule {
    /// An empty rule with a fresh id.
    pub fn new() -> Self {
        let now = now_iso();
        Self {
            rule_id: generate_rule_id(),
            text: String::new(),
            name: String::new(),
            description: String::new(),
            is_complex: true,
            conditions: Vec::new(),
            actions: Vec::new(),
            created_date: now.clone(),
            last_modified_date: now,
            last_used: None,
            use_count: 0,
            metadata: Map::new(),
            pathway_data: None,
        }
    }

    /// A rule holding `text` verbatim, with no structure yet.
    pub fn from_free_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new()
        }
    }

    /// A rule whose text is generated from the given structure.
    pub fn from_parts(conditions: Vec<Condition>, actions: Vec<Action>) -> Self {
        let mut rule = Self::new();
        rule.conditions = conditions;
        rule.actions = actions;
        rule.regenerate_text();
        rule
    }

    /// A rule built from a flattened pathway. The pathway snapshot is kept.
    pub fn from_structured(structured: StructuredRule) -> Self {
        let mut rule = Self::new();
        rule.apply_structured(structured);
        rule
    }

    pub fn from_pathway(pathway: &PathwayGraph) -> Self {
        Self::from_structured(pathway.convert_to_structured_data())
    }

    /// Text and structure that were produced together elsewhere and are stored as given.
    pub(crate) fn from_content(text: String, conditions: Vec<Condition>, actions: Vec<Action>) -> Self {
        Self {
            text,
            conditions,
            actions,
            ..Self::new()
        }
    }

    pub fn id(&self) -> &str {
        &self.rule_id
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.rule_id = id.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn created_date(&self) -> &str {
        &self.created_date
    }

    pub fn last_modified_date(&self) -> &str {
        &self.last_modified_date
    }

    pub fn last_used(&self) -> Option<&str> {
        self.last_used.as_deref()
    }

    pub fn use_count(&self) -> u64 {
        self.use_count
    }

    pub fn pathway_data(&self) -> Option<&PathwayData> {
        self.pathway_data.as_ref()
    }

    /// Rebuilds the pathway this rule was authored from, if any.
    pub fn pathway(&self) -> Option<Result<PathwayGraph, ValidationError>> {
        self.pathway_data.clone().map(IntoPathway::into_pathway)
    }

    /// Re-derives the rule from `pathway`, replacing text, structure and snapshot.
    pub fn set_pathway(&mut self, pathway: &PathwayGraph) {
        self.apply_structured(pathway.convert_to_structured_data());
        self.touch();
    }

    fn apply_structured(&mut self, structured: StructuredRule) {
        self.text = structured.text;
        self.conditions = structured.conditions;
        self.actions = structured.actions;
        self.is_complex = structured.is_complex;
        if !structured.name.is_empty() {
            self.name = structured.name;
        }
        if !structured.description.is_empty() {
            self.description = structured.description;
        }
        self.pathway_data = Some(structured.pathway_data);
    }

    fn touch(&mut self) {
        self.last_modified_date = now_iso();
    }

    /// Regenerates the text from the structure. Structure edits make the text
    /// canonical, so any pathway snapshot no longer describes the rule.
    fn regenerate_text(&mut self) {
        self.text = RuleTextEngine::generate_text(&self.conditions, &self.actions);
        if self.pathway_data.take().is_some() {
            debug!("Rule {} detached from its pathway", self.rule_id);
        }
        self.touch();
    }

    pub fn set_conditions(&mut self, conditions: Vec<Condition>) {
        self.conditions = conditions;
        self.regenerate_text();
    }

    pub fn set_actions(&mut self, actions: Vec<Action>) {
        self.actions = actions;
        self.regenerate_text();
    }

    /// Appends a condition.
    ///
    /// The condition's connector joins it to the previous condition (`AND` when
    /// unset); the appended condition becomes the last one and carries none.
    pub fn add_condition(&mut self, mut condition: Condition) {
        let joiner = if condition.connector.is_none() {
            Connector::And
        } else {
            condition.connector
        };
        if let Some(previous) = self.conditions.last_mut() {
            previous.connector = joiner;
        }
        condition.connector = Connector::None;
        self.conditions.push(condition);
        self.regenerate_text();
    }

    /// Shorthand for [`Rule::add_condition`] with a `param = true` flag.
    pub fn add_flag(&mut self, param: impl Into<String>) {
        self.add_condition(Condition::flag(param));
    }

    /// Appends an action. Without a sequence it goes after the highest existing one.
    pub fn add_action(
        &mut self,
        target: impl Into<String>,
        action_type: Option<&str>,
        value: impl Into<String>,
        sequence: Option<u32>,
    ) {
        let sequence = sequence.unwrap_or_else(|| {
            self.actions
                .iter()
                .map(|a| a.sequence)
                .max()
                .map_or(1, |max| max + 1)
        });
        self.actions.push(Action::new(
            action_type.unwrap_or(DEFAULT_ACTION_TYPE),
            target,
            value,
            sequence,
        ));
        self.regenerate_text();
    }

    /// Parses `text` and, on success, replaces the structure with the result and
    /// regenerates the text. On failure the rule is left untouched.
    pub fn resync_from_text(&mut self, text: &str) -> Result<(), ParseError> {
        let parsed = RuleTextEngine::parse_text(text)?;
        self.conditions = parsed.conditions;
        self.actions = parsed.actions;
        self.regenerate_text();
        Ok(())
    }

    pub fn record_usage(&mut self) {
        self.use_count += 1;
        self.last_used = Some(now_iso());
    }

    /// `last_used` as `YYYY-MM-DD HH:MM`, `"Never"` if unused, `"Unknown"` if unreadable.
    pub fn formatted_last_used(&self) -> String {
        match &self.last_used {
            None => "Never".to_string(),
            Some(value) => parse_iso(value)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    pub fn rule_type(&self) -> RuleType {
        if self.pathway_data.is_some() {
            RuleType::Pathway
        } else if self.problem_type().is_some() {
            RuleType::Capture
        } else {
            RuleType::Rule
        }
    }

    /// The non-empty `problem_type` a quick capture stored in the metadata.
    fn problem_type(&self) -> Option<&str> {
        self.metadata
            .get(PROBLEM_TYPE_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }

    /// A one-line description for listings, at most `max_len` characters plus `"..."`.
    ///
    /// Falls back from the name, to the description, to the pathway's problem
    /// statement, to a captured problem, to the IF clause, to the raw text.
    pub fn describe(&self, max_len: usize) -> String {
        if !self.name.is_empty() {
            return truncate(&self.name, max_len);
        }
        if !self.description.is_empty() {
            return truncate(&self.description, max_len);
        }

        if let Some(data) = &self.pathway_data {
            let problem = data.nodes.iter().map(|(_, n)| n).find(|n| {
                n.node_type == NodeType::Problem.as_str() && !n.content.is_empty()
            });
            if let Some(node) = problem {
                return truncate(&node.content, max_len);
            }
        }

        if self.problem_type().is_some() {
            let problem = self
                .text
                .split_once("problem is '")
                .and_then(|(_, rest)| rest.split_once('\''))
                .map(|(problem, _)| problem);
            if let Some(problem) = problem {
                return truncate(problem, max_len);
            }
        }

        if self.text.contains("IF ") {
            let if_part = self
                .text
                .split_once(",\nTHEN")
                .or_else(|| self.text.split_once(", THEN"));
            if let Some((if_part, _)) = if_part {
                return truncate(&if_part.replacen("IF ", "", 1), max_len);
            }
        }
        truncate(&self.text, max_len)
    }

    /// Checks the rule for missing parts. Never fails.
    pub fn validate(&self) -> RuleIssues {
        let mut issues = RuleIssues::default();

        if self.rule_id.is_empty() {
            issues.general.push("Rule ID is missing".to_string());
        }
        if self.text.trim().is_empty() {
            issues.general.push("Rule text is empty".to_string());
        }

        if self.conditions.is_empty() {
            issues.conditions.push("No conditions defined".to_string());
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            if condition.param.trim().is_empty() {
                issues
                    .conditions
                    .push(format!("Condition {} is missing a parameter", i + 1));
            }
        }
        if self.conditions.last().is_some_and(|c| !c.connector.is_none()) {
            issues
                .conditions
                .push("Last condition should not have a connector".to_string());
        }

        if self.actions.is_empty() {
            issues.actions.push("No actions defined".to_string());
        }
        for (i, action) in self.actions.iter().enumerate() {
            if action.target.trim().is_empty() {
                issues
                    .actions
                    .push(format!("Action {} is missing a target", i + 1));
            }
        }
        for sequence in self.actions.iter().map(|a| a.sequence).duplicates() {
            issues
                .actions
                .push(format!("Duplicate sequence number {}", sequence));
        }

        issues
    }

    /// A copy under a new id with usage reset and the name prefixed "Copy of".
    pub fn duplicate(&self) -> Self {
        let now = now_iso();
        let name = if self.name.is_empty() {
            String::new()
        } else {
            format!("Copy of {}", self.name)
        };
        Self {
            rule_id: generate_rule_id(),
            name,
            created_date: now.clone(),
            last_modified_date: now,
            last_used: None,
            use_count: 0,
            ..self.clone()
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Reads a rule from a JSON value. Missing fields take their defaults.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        if !value.is_object() {
            return Err(StoreError::InvalidRule(format!(
                "expected a JSON object, found {}",
                value
            )));
        }
        serde_json::from_value(value).map_err(|e| StoreError::InvalidRule(e.to_string()))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule_type(), self.describe(60))
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
