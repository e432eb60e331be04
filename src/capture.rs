//! The quick capture form: a short problem, checks, observations and solutions
//! entry that becomes a rule without building a pathway.

use crate::rule::{
    parse_phrase_text, render_phrases, ParsedRule, PhraseActions, Rule, PROBLEM_TYPE_KEY,
};
use crate::timestamp::now_iso;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Placeholder shown in the problem type selector before a type is chosen.
pub const UNSELECTED_PROBLEM_TYPE: &str = "Select type...";

/// How well the captured solution worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureOutcome {
    #[default]
    CompleteSolution,
    TemporaryFix,
    PartialImprovement,
    Ineffective,
}

impl CaptureOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CaptureOutcome::CompleteSolution => "Complete Solution",
            CaptureOutcome::TemporaryFix => "Temporary Fix",
            CaptureOutcome::PartialImprovement => "Partial Improvement",
            CaptureOutcome::Ineffective => "Ineffective",
        }
    }
}

impl fmt::Display for CaptureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A quick capture of one troubleshooting session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickCapture {
    pub problem_type: Option<String>,
    pub problem: String,
    pub checks: Vec<String>,
    pub observations: Vec<String>,
    pub solutions: Vec<String>,
    pub severity: Option<String>,
    pub effectiveness: Option<CaptureOutcome>,
    pub notes: String,
}

impl QuickCapture {
    pub fn new(problem: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            ..Self::default()
        }
    }

    /// The selected problem type. Blank and placeholder values count as unset.
    pub fn problem_type(&self) -> Option<&str> {
        self.problem_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != UNSELECTED_PROBLEM_TYPE)
    }

    /// `"{type}: {problem}"`, or just the problem when no type is selected.
    pub fn problem_description(&self) -> String {
        let problem = self.problem.trim();
        match self.problem_type() {
            Some(problem_type) => format!("{}: {}", problem_type, problem),
            None => problem.to_string(),
        }
    }

    /// Condition phrases in order: the problem, then each check paired with the
    /// observation at the same position, then any observations left over.
    pub fn condition_phrases(&self) -> Vec<String> {
        let mut phrases = Vec::new();
        let description = self.problem_description();
        if !description.is_empty() {
            phrases.push(format!("problem is '{}'", description));
        }

        let checks = entries(&self.checks);
        let observations = entries(&self.observations);
        for (i, check) in checks.iter().enumerate() {
            match observations.get(i) {
                Some(observation) => phrases.push(format!("{} shows {}", check, observation)),
                None => phrases.push(check.to_string()),
            }
        }
        for observation in observations.iter().skip(checks.len()) {
            phrases.push(format!("Observed {}", observation));
        }
        phrases
    }

    /// The non-blank solutions, in the order they were entered.
    pub fn action_phrases(&self) -> Vec<String> {
        entries(&self.solutions)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn generate_text(&self) -> String {
        render_phrases(&self.condition_phrases(), &self.action_phrases())
    }

    /// Boolean conditions and `Apply` actions read back from the generated text.
    pub fn to_structured(&self) -> ParsedRule {
        parse_phrase_text(&self.generate_text(), PhraseActions::ApplyWhole).unwrap_or_default()
    }

    /// What is missing before the capture can be saved.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.problem.trim().is_empty() {
            issues.push("Problem description is missing".to_string());
        }
        if entries(&self.solutions).is_empty() {
            issues.push("At least one solution action is required".to_string());
        }
        issues
    }

    /// Builds the stored rule. Problem type, severity, effectiveness and notes go
    /// into the rule's metadata.
    pub fn into_rule(self) -> Rule {
        let text = self.generate_text();
        let structured = self.to_structured();
        let mut rule = Rule::from_content(text, structured.conditions, structured.actions);

        let effectiveness = self
            .effectiveness
            .map_or("Unknown", |outcome| outcome.label());
        rule.metadata
            .insert("effectiveness".into(), Value::from(effectiveness));
        rule.metadata.insert(
            PROBLEM_TYPE_KEY.into(),
            Value::from(self.problem_type().unwrap_or_default()),
        );
        if let Some(severity) = &self.severity {
            rule.metadata
                .insert("severity".into(), Value::from(severity.as_str()));
        }
        if !self.notes.trim().is_empty() {
            rule.metadata
                .insert("notes".into(), Value::from(self.notes.trim()));
        }
        rule.metadata
            .insert("capture_date".into(), Value::from(now_iso()));
        rule
    }
}

fn entries(list: &[String]) -> Vec<&str> {
    list.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}
