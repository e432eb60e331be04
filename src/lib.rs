//! # Elicit - Diagnostic Rule Capture
//!
//! **Elicit** captures troubleshooting knowledge as diagnostic rules of the form
//! `IF <conditions>, THEN <numbered actions>`. Rules can be authored three ways:
//!
//! 1.  **Structured**: conditions and actions edited directly on a [`rule::Rule`];
//!     the rule text is generated by the [`rule::RuleTextEngine`].
//! 2.  **Visual pathway**: a [`pathway::PathwayGraph`] of problem, check, condition
//!     and action nodes, flattened into rule text by a depth-first traversal.
//! 3.  **Quick capture**: a short problem/checks/observations/solutions form
//!     ([`capture::QuickCapture`]).
//!
//! Rules are kept in a [`collection::Collection`] and stored as JSON files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use elicit::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // 1. Build a pathway: problem -> check -> condition -> action.
//!     let mut pathway = PathwayGraph::new("Overheating");
//!     let problem = pathway.add_node(NodeType::Problem, None);
//!     let check = pathway.add_node(NodeType::Check, None);
//!     let action = pathway.add_node(NodeType::Action, None);
//!     if let Some(node) = pathway.node_mut(problem.as_str()) {
//!         node.set_content("Temp high");
//!     }
//!     if let Some(node) = pathway.node_mut(check.as_str()) {
//!         node.set_content("Sensor reading");
//!     }
//!     if let Some(node) = pathway.node_mut(action.as_str()) {
//!         node.set_content("Apply cooling");
//!     }
//!     pathway.connect(problem.as_str(), check.as_str());
//!     pathway.connect(check.as_str(), action.as_str());
//!
//!     // 2. Flatten it into a rule and store it.
//!     println!("{}", pathway.convert_to_rule_text());
//!     let mut collection = Collection::default();
//!     collection.add_rule(Rule::from_pathway(&pathway));
//!
//!     // 3. Rules can also be written as text and structured afterwards.
//!     let mut rule = Rule::from_free_text("IF door_open AND temperature > 90, THEN Apply cooling");
//!     rule.resync_from_text(&rule.text().to_string())?;
//!     collection.add_rule(rule);
//!
//!     collection.save_to_file("data/diagnostic_rules.json")?;
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod collection;
pub mod config;
pub mod error;
pub mod pathway;
pub mod prelude;
pub mod rule;
pub mod timestamp;

mod wire;
