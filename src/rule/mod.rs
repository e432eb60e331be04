//! Diagnostic rules: structured conditions and actions, and the canonical
//! `IF ... THEN ...` text they are displayed and edited as.

mod action;
mod clauses;
mod condition;
mod model;
mod text;

pub use action::*;
pub use condition::*;
pub use model::*;
pub use text::*;
