use serde::{Deserialize, Serialize};
use std::fmt;

/// Action types the text parser recognises as a leading keyword.
pub const KNOWN_ACTION_TYPES: [&str; 8] = [
    "Apply", "Adjust", "Replace", "Clean", "Measure", "Check", "Restart", "Contact",
];

/// The action type used when none is given or recognised.
pub const DEFAULT_ACTION_TYPE: &str = "Apply";

fn default_action_type() -> String {
    DEFAULT_ACTION_TYPE.to_string()
}

fn default_sequence() -> u32 {
    1
}

/// A single step in the THEN clause of a rule.
///
/// `sequence` orders the steps; it is not the number shown in rule text, which is
/// the step's rank after sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default = "default_action_type")]
    pub action_type: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_sequence")]
    pub sequence: u32,
}

impl Action {
    pub fn new(
        action_type: impl Into<String>,
        target: impl Into<String>,
        value: impl Into<String>,
        sequence: u32,
    ) -> Self {
        Self {
            action_type: action_type.into(),
            target: target.into(),
            value: value.into(),
            sequence,
        }
    }

    /// An `Apply` action with no value.
    pub fn apply(target: impl Into<String>, sequence: u32) -> Self {
        Self::new(DEFAULT_ACTION_TYPE, target, "", sequence)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action_type, self.target)?;
        if !self.value.is_empty() {
            write!(f, " to {}", self.value)?;
        }
        Ok(())
    }
}
