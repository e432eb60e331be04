//! Splitting of rule text into its IF and THEN clauses.
//!
//! Shared by the rule text parser, the pathway converter and quick captures so
//! that all three agree on where clauses, segments and action lines begin.

use super::condition::Connector;
use crate::error::ParseError;

/// The condition and action halves of a rule text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Clauses<'a> {
    pub conditions: String,
    pub actions: &'a str,
}

/// One non-blank line of an action clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActionLine<'a> {
    pub sequence: u32,
    pub body: &'a str,
}

/// Splits rule text at the first comma that is followed (after optional whitespace) by `THEN`.
///
/// Accepts both `"IF a, THEN ..."` and the generated `"IF a,\nTHEN ..."`.
pub(crate) fn split_clauses(text: &str) -> Result<Clauses<'_>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::malformed("rule text is empty"));
    }
    if !text.contains("IF ") {
        return Err(ParseError::malformed("missing 'IF ' clause"));
    }
    let (comma, then_end) = find_then_separator(text)
        .ok_or_else(|| ParseError::malformed("missing ', THEN' separator"))?;

    Ok(Clauses {
        conditions: text[..comma].replacen("IF ", "", 1),
        actions: text[then_end..].trim(),
    })
}

/// Splits text built by `render_phrases` at the first literal `",\nTHEN"`.
///
/// Phrases may quote node content, so a `", THEN"` inside the IF clause is kept as content.
pub(crate) fn split_rendered_clauses(text: &str) -> Result<Clauses<'_>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::malformed("rule text is empty"));
    }
    if !text.contains("IF ") {
        return Err(ParseError::malformed("missing 'IF ' clause"));
    }
    let (conditions, actions) = text
        .split_once(RENDERED_SEPARATOR)
        .ok_or_else(|| ParseError::malformed("missing ',\\nTHEN' separator"))?;

    Ok(Clauses {
        conditions: conditions.replacen("IF ", "", 1),
        actions: actions.trim(),
    })
}

const RENDERED_SEPARATOR: &str = ",\nTHEN";

/// Returns the byte offsets of the separating comma and of the end of `THEN`.
fn find_then_separator(text: &str) -> Option<(usize, usize)> {
    text.match_indices(',').find_map(|(idx, _)| {
        let rest = &text[idx + 1..];
        let after_ws = rest.trim_start();
        after_ws
            .starts_with("THEN")
            .then(|| (idx, text.len() - after_ws.len() + "THEN".len()))
    })
}

/// The connector a condition clause is split on: `AND` wins over `OR`.
pub(crate) fn detect_connector(clause: &str) -> Connector {
    if clause.contains(Connector::And.separator()) {
        Connector::And
    } else if clause.contains(Connector::Or.separator()) {
        Connector::Or
    } else {
        Connector::None
    }
}

/// Splits a condition clause on `connector`, returning trimmed, non-empty segments.
///
/// Every segment carries `connector` except the last, which carries `Connector::None`.
pub(crate) fn split_segments(clause: &str, connector: Connector) -> Vec<(&str, Connector)> {
    let parts: Vec<&str> = if connector.is_none() {
        vec![clause.trim()]
    } else {
        clause
            .split(connector.separator())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    };
    let last = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, s)| (s, if i < last { connector } else { Connector::None }))
        .collect()
}

/// Splits an action clause into lines, reading an optional `"<digits>. "` sequence prefix.
///
/// Lines without a prefix get `line_index + 1`, where blank lines still count.
/// A prefix too large for `u32` saturates to `u32::MAX`.
pub(crate) fn action_lines(clause: &str) -> Vec<ActionLine<'_>> {
    clause
        .split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let (sequence, body) =
                split_sequence_prefix(line).unwrap_or((index as u32 + 1, line));
            Some(ActionLine {
                sequence,
                body: body.trim(),
            })
        })
        .collect()
}

fn split_sequence_prefix(line: &str) -> Option<(u32, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let body = line[digits..].strip_prefix(". ")?;
    let sequence = line[..digits].parse().unwrap_or(u32::MAX);
    Some((sequence, body))
}
