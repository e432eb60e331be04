use thiserror::Error;

/// Errors that can occur while parsing rule text into conditions and actions.
///
/// Callers treat this as "the text could not be parsed" and leave any existing
/// structured data untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Rule text is malformed: {reason}")]
    MalformedRule { reason: String },
}

impl ParseError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedRule {
            reason: reason.into(),
        }
    }
}

/// Errors raised when pathway data or node definitions are invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid node type: '{type_name}'. Must be one of {allowed}")]
    InvalidNodeType { type_name: String, allowed: String },

    #[error("A node with id '{0}' already exists in the pathway")]
    DuplicateNodeId(String),

    #[error("Invalid pathway data: {0}")]
    InvalidPathwayData(String),
}

/// Errors that can occur while loading or saving rules and collections.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to (de)serialize JSON: {0}")]
    Json(String),

    #[error("Invalid rule data: {0}")]
    InvalidRule(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err.to_string())
    }
}
