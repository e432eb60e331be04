use super::action::{Action, DEFAULT_ACTION_TYPE, KNOWN_ACTION_TYPES};
use super::clauses::{
    action_lines, detect_connector, split_clauses, split_rendered_clauses, split_segments,
};
use super::condition::{Condition, Connector, Operator};
use crate::error::ParseError;
use itertools::Itertools;
use log::debug;

/// Structured content recovered from rule text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRule {
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

/// Converts between structured conditions/actions and canonical rule text.
///
/// The canonical form is
///
/// ```text
/// IF door_open AND temperature > 90,
/// THEN
///   1. Apply cooling
///   2. Adjust setpoint to 70
/// ```
///
/// Generation is deterministic. Parsing is best effort: text that was not
/// produced by [`RuleTextEngine::generate_text`] may parse into a different
/// structure than its author intended.
pub struct RuleTextEngine;

impl RuleTextEngine {
    /// Renders conditions and actions as canonical rule text.
    ///
    /// Actions are ordered by `sequence` (stable for ties) and numbered by their
    /// rank, not by the stored sequence value.
    pub fn generate_text(conditions: &[Condition], actions: &[Action]) -> String {
        let mut tokens: Vec<String> = Vec::with_capacity(conditions.len() * 2);
        let last = conditions.len().saturating_sub(1);
        for (i, condition) in conditions.iter().enumerate() {
            tokens.push(condition.to_string());
            if i < last && !condition.connector.is_none() {
                tokens.push(condition.connector.token().to_string());
            }
        }
        let if_part = format!("IF {}", tokens.join(" "));

        let then_part = actions
            .iter()
            .sorted_by_key(|a| a.sequence)
            .enumerate()
            .fold(String::from("THEN"), |mut acc, (i, action)| {
                acc.push_str(&format!("\n  {}. {}", i + 1, action));
                acc
            });

        format!("{},\n{}", if_part, then_part)
    }

    /// Parses rule text back into conditions and actions.
    pub fn parse_text(text: &str) -> Result<ParsedRule, ParseError> {
        let clauses = split_clauses(text)?;

        let connector = detect_connector(&clauses.conditions);
        let conditions: Vec<Condition> = split_segments(&clauses.conditions, connector)
            .into_iter()
            .map(|(segment, connector)| Self::parse_condition(segment, connector))
            .collect();

        let actions: Vec<Action> = action_lines(clauses.actions)
            .into_iter()
            .map(|line| Self::parse_action(line.body, line.sequence))
            .collect();

        debug!(
            "Parsed rule text into {} condition(s) and {} action(s)",
            conditions.len(),
            actions.len()
        );
        Ok(ParsedRule {
            conditions,
            actions,
        })
    }

    /// Parses one condition segment. A segment without an operator is a boolean flag.
    pub fn parse_condition(segment: &str, connector: Connector) -> Condition {
        let segment = segment.trim();
        for op in Operator::PARSE_ORDER {
            if let Some((param, value)) = segment.split_once(op.symbol()) {
                return Condition::new(param.trim(), op, value.trim(), connector);
            }
        }
        Condition {
            connector,
            ..Condition::flag(segment)
        }
    }

    /// Parses one action body such as `"Adjust thermostat to 70"`.
    pub fn parse_action(body: &str, sequence: u32) -> Action {
        let body = body.trim();
        let matched = KNOWN_ACTION_TYPES
            .iter()
            .sorted_by_key(|t| std::cmp::Reverse(t.len()))
            .find_map(|t| {
                body.strip_prefix(*t)
                    .filter(|rest| rest.starts_with(' '))
                    .map(|rest| (*t, rest.trim()))
            });

        match matched {
            Some((action_type, target_value)) => match target_value.split_once(" to ") {
                Some((target, value)) => {
                    Action::new(action_type, target.trim(), value.trim(), sequence)
                }
                None => Action::new(action_type, target_value, "", sequence),
            },
            None => Action::new(DEFAULT_ACTION_TYPE, body, "", sequence),
        }
    }
}

/// How action lines of phrase-built text are split into type and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseActions {
    /// Every action is an `Apply` of the whole line.
    ApplyWhole,
    /// A leading `"Label: "` becomes the action type, as pathway actions are written.
    SplitLabel,
}

/// Renders free-form phrases as rule text, joining conditions with `AND` and
/// numbering actions in the order given.
pub fn render_phrases(conditions: &[String], actions: &[String]) -> String {
    let if_part = format!("IF {}", conditions.join(" AND "));
    let then_part = actions
        .iter()
        .enumerate()
        .fold(String::from("THEN"), |mut acc, (i, action)| {
            acc.push_str(&format!("\n  {}. {}", i + 1, action));
            acc
        });
    format!("{},\n{}", if_part, then_part)
}

/// Structures text built by [`render_phrases`].
///
/// Each `AND` segment is kept whole as a boolean condition, so phrases such as
/// `"check shows 'x > 3'"` are not split on the operator inside them.
pub fn parse_phrase_text(text: &str, style: PhraseActions) -> Result<ParsedRule, ParseError> {
    let clauses = split_rendered_clauses(text)?;

    let conditions = split_segments(&clauses.conditions, Connector::And)
        .into_iter()
        .map(|(segment, connector)| Condition {
            connector,
            ..Condition::flag(segment)
        })
        .collect();

    let actions = action_lines(clauses.actions)
        .into_iter()
        .map(|line| match (style, line.body.split_once(": ")) {
            (PhraseActions::SplitLabel, Some((label, target))) => {
                Action::new(label, target, "", line.sequence)
            }
            _ => Action::apply(line.body, line.sequence),
        })
        .collect();

    Ok(ParsedRule {
        conditions,
        actions,
    })
}
