use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    SmallerThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<=")]
    SmallerThanOrEqual,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "contains")]
    Contains,
}

impl Operator {
    /// Operators in the order the parser tries them: longest symbol first.
    pub const PARSE_ORDER: [Operator; 7] = [
        Operator::Contains,
        Operator::GreaterThanOrEqual,
        Operator::SmallerThanOrEqual,
        Operator::NotEqual,
        Operator::Equal,
        Operator::GreaterThan,
        Operator::SmallerThan,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::GreaterThan => ">",
            Operator::SmallerThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::SmallerThanOrEqual => "<=",
            Operator::NotEqual => "!=",
            Operator::Contains => "contains",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical connector joining a condition to the next one. `None` marks the last condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Connector {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[default]
    #[serde(rename = "")]
    None,
}

impl Connector {
    pub fn token(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
            Connector::None => "",
        }
    }

    /// The separator this connector produces inside a condition clause.
    pub(crate) fn separator(&self) -> &'static str {
        match self {
            Connector::And => " AND ",
            Connector::Or => " OR ",
            Connector::None => "",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Connector::None)
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A single `param operator value` test in the IF clause of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub param: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub connector: Connector,
}

impl Condition {
    pub fn new(
        param: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
        connector: Connector,
    ) -> Self {
        Self {
            param: param.into(),
            operator,
            value: value.into(),
            connector,
        }
    }

    /// A `param operator value` test with no connector.
    pub fn compare(param: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self::new(param, operator, value, Connector::None)
    }

    /// A boolean observation, written as the bare parameter in rule text.
    pub fn flag(param: impl Into<String>) -> Self {
        Self::new(param, Operator::Equal, "true", Connector::None)
    }

    /// True when the condition is written as its bare parameter (`param = true`).
    pub fn is_flag(&self) -> bool {
        self.operator == Operator::Equal && self.value == "true"
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_flag() {
            f.write_str(&self.param)
        } else {
            write!(f, "{} {} {}", self.param, self.operator, self.value)
        }
    }
}
