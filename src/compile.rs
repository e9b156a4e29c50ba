use std::sync::Arc;

use crate::action::{CompiledAction, MatchOutcome};
use crate::error::{AclError, Result};
use crate::matcher::{AddressMatch, AddressMatcher};
use crate::range::RangeSet;
use crate::types::{MatchContext, PacketKey, RuleDefinition, RuleId};

/// A compiled ACL entry ready for matching.
///
/// Immutable once built; share it across threads behind an `Arc` and replace
/// it wholesale on reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    id: RuleId,
    uuid: Option<Arc<str>>,
    src: Option<AddressMatcher>,
    dst: Option<AddressMatcher>,
    protocol: RangeSet,
    src_port: RangeSet,
    dst_port: RangeSet,
    actions: Vec<CompiledAction>,
    terminal: bool,
}

impl CompiledRule {
    /// Evaluate one packet against this rule.
    ///
    /// On a match the rule id and uuid are written into `ctx` and every action
    /// is returned in configured order. A miss returns an empty outcome and
    /// leaves `ctx` untouched.
    pub fn evaluate<'r>(
        &'r self,
        packet: &PacketKey<'_>,
        ctx: &mut MatchContext,
    ) -> MatchOutcome<'r> {
        if !self.matches(packet) {
            return MatchOutcome::empty();
        }

        tracing::trace!(rule = self.id, protocol = packet.protocol, "acl entry matched");
        ctx.rule_id = Some(self.id);
        ctx.uuid = self.uuid.clone();
        MatchOutcome::from_actions(&self.actions)
    }

    /// Check all match criteria without producing an outcome
    pub fn matches(&self, packet: &PacketKey<'_>) -> bool {
        if let Some(src) = &self.src {
            if !src.matches(&packet.source()) {
                return false;
            }
        }

        if let Some(dst) = &self.dst {
            if !dst.matches(&packet.destination()) {
                return false;
            }
        }

        if !self.protocol.matches(u16::from(packet.protocol)) {
            return false;
        }

        // Ports are only meaningful for TCP and UDP
        if packet.has_ports() {
            if !self.dst_port.matches(packet.dst_port) {
                return false;
            }
            if !self.src_port.matches(packet.src_port) {
                return false;
            }
        }

        true
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// Whether the owning table stops traversal after this rule matches
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn src(&self) -> Option<&AddressMatcher> {
        self.src.as_ref()
    }

    pub fn dst(&self) -> Option<&AddressMatcher> {
        self.dst.as_ref()
    }

    pub fn protocol(&self) -> &RangeSet {
        &self.protocol
    }

    pub fn src_port(&self) -> &RangeSet {
        &self.src_port
    }

    pub fn dst_port(&self) -> &RangeSet {
        &self.dst_port
    }

    pub fn actions(&self) -> &[CompiledAction] {
        &self.actions
    }
}

/// Compile a rule definition.
///
/// Never fails: a malformed address yields a matcher that matches nothing, and
/// inverted ranges are kept as-is (they contain no value). Each degradation is
/// logged.
pub fn compile(def: &RuleDefinition) -> CompiledRule {
    for (field, set) in range_fields(def) {
        if let Some(range) = set.first_invalid() {
            tracing::warn!(rule = def.id, field, %range, "inverted range never matches");
        }
    }

    CompiledRule {
        id: def.id,
        uuid: def.uuid.as_deref().map(Arc::from),
        src: def.src.as_ref().map(|spec| AddressMatcher::compile(def.id, spec)),
        dst: def.dst.as_ref().map(|spec| AddressMatcher::compile(def.id, spec)),
        protocol: def.protocol.clone(),
        src_port: def.src_port.clone(),
        dst_port: def.dst_port.clone(),
        actions: def.actions.iter().map(CompiledAction::compile).collect(),
        terminal: def.terminal,
    }
}

/// Compile a rule definition, rejecting malformed input instead of degrading.
pub fn try_compile(def: &RuleDefinition) -> Result<CompiledRule> {
    for (field, set) in range_fields(def) {
        if let Some(range) = set.first_invalid() {
            return Err(AclError::InvalidRange {
                rule: def.id,
                field,
                range,
            });
        }
    }

    let src = def
        .src
        .as_ref()
        .map(|spec| AddressMatcher::try_compile(def.id, spec))
        .transpose()?;
    let dst = def
        .dst
        .as_ref()
        .map(|spec| AddressMatcher::try_compile(def.id, spec))
        .transpose()?;

    Ok(CompiledRule {
        src,
        dst,
        ..compile(def)
    })
}

fn range_fields(def: &RuleDefinition) -> [(&'static str, &RangeSet); 3] {
    [
        ("protocol", &def.protocol),
        ("src_port", &def.src_port),
        ("dst_port", &def.dst_port),
    ]
}
