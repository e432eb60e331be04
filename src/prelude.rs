//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the elicit crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use elicit::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/pathway.json")?;
//! let pathway = PathwayGraph::from_json(&json)?;
//!
//! let issues = pathway.validate();
//! println!("{} issue(s) found", issues.total());
//! println!("{}", PathwayOutline::new(&pathway));
//!
//! let parsed = RuleTextEngine::parse_text(&pathway.convert_to_rule_text())?;
//! println!("{} condition(s)", parsed.conditions.len());
//! # Ok(())
//! # }
//! ```

// Rule text
pub use crate::rule::{
    Action, Condition, Connector, Operator, ParsedRule, Rule, RuleIssues, RuleTextEngine,
    RuleType,
};

// Pathways
pub use crate::pathway::{
    DiagnosticNode, IntoPathway, NodeId, NodeType, PathwayData, PathwayGraph, PathwayIssues,
    PathwayOutline, Position, StructuredRule,
};

// Capture and storage
pub use crate::capture::QuickCapture;
pub use crate::collection::{Collection, SearchFields, SearchOptions};
pub use crate::config::{AppConfig, LayoutSettings};

// Error types
pub use crate::error::{ParseError, StoreError, ValidationError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
