//! Introspection snapshot of a compiled rule.
//!
//! Field names are a fixed contract with external tooling that consumes the
//! serialized form.

use serde::Serialize;

use crate::compile::CompiledRule;
use crate::error::Result;
use crate::matcher::AddressMatcher;
use crate::range::{Range, RangeSet};

/// One `(min, max)` pair of a range list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeEntry {
    pub min: u16,
    pub max: u16,
}

impl From<&Range> for RangeEntry {
    fn from(range: &Range) -> Self {
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

/// Flat, string-oriented view of one compiled rule.
///
/// An absent address matcher is rendered as empty `*_type` and value.
///
/// A subnet side compiles as a whole: if any one of its subnets is malformed
/// the side holds no subnets at all, so `src`/`dst` is `""` while the type
/// stays `"ip"`, even when other subnets in the list were well-formed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntrospectionProjection {
    pub ace_id: String,
    pub uuid: String,
    pub src_type: String,
    pub src: String,
    pub dst_type: String,
    pub dst: String,
    pub proto_l: Vec<RangeEntry>,
    pub src_port_l: Vec<RangeEntry>,
    pub dst_port_l: Vec<RangeEntry>,
    pub action_l: Vec<String>,
    pub terminal: bool,
}

impl IntrospectionProjection {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl CompiledRule {
    /// Render the rule configuration for diagnostics.
    pub fn project(&self) -> IntrospectionProjection {
        let (src_type, src) = address_fields(self.src());
        let (dst_type, dst) = address_fields(self.dst());

        IntrospectionProjection {
            ace_id: self.id().to_string(),
            uuid: self.uuid().unwrap_or_default().to_string(),
            src_type,
            src,
            dst_type,
            dst,
            proto_l: range_entries(self.protocol()),
            src_port_l: range_entries(self.src_port()),
            dst_port_l: range_entries(self.dst_port()),
            action_l: self.actions().iter().map(ToString::to_string).collect(),
            terminal: self.is_terminal(),
        }
    }
}

fn address_fields(matcher: Option<&AddressMatcher>) -> (String, String) {
    match matcher {
        Some(m) => (m.kind().label().to_string(), m.describe()),
        None => (String::new(), String::new()),
    }
}

fn range_entries(set: &RangeSet) -> Vec<RangeEntry> {
    set.ranges().iter().map(RangeEntry::from).collect()
}
