use thiserror::Error;

use crate::range::Range;
use crate::types::RuleId;

/// ACL entry error types.
///
/// Only configuration-time paths return these; evaluation never fails.
#[derive(Error, Debug)]
pub enum AclError {
    #[error("Parse error at line {line}: {message}")]
    ParseErrorAtLine { line: usize, message: String },

    #[error("Invalid rule format: {0}")]
    InvalidRuleFormat(String),

    #[error("Rule {rule}: empty subnet list")]
    EmptyAddress { rule: RuleId },

    #[error("Rule {rule}: invalid address: {address}")]
    InvalidAddress { rule: RuleId, address: String },

    #[error("Rule {rule}: prefix length {prefix_len} too long for {address}")]
    InvalidPrefix {
        rule: RuleId,
        address: String,
        prefix_len: u8,
    },

    #[error("Rule {rule}: invalid {field} range {}-{}", .range.min, .range.max)]
    InvalidRange {
        rule: RuleId,
        field: &'static str,
        range: Range,
    },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AclError>;
