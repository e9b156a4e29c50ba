use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::ActionSpec;
use crate::error::Result;
use crate::range::RangeSet;

/// TCP protocol number
pub const IPPROTO_TCP: u8 = 6;
/// UDP protocol number
pub const IPPROTO_UDP: u8 = 17;

/// Identifier of an ACL entry within its table
pub type RuleId = u32;

/// Security group identifier
pub type GroupId = u32;

/// Logical network identities attached to a packet
pub type NetworkSet = BTreeSet<String>;

/// One textual subnet: address plus prefix length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetSpec {
    pub address: String,
    pub prefix_len: u8,
}

impl SubnetSpec {
    pub fn new(address: impl Into<String>, prefix_len: u8) -> Self {
        Self {
            address: address.into(),
            prefix_len,
        }
    }
}

/// Uncompiled address descriptor for one side of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSpec {
    /// One or more subnets, matching if any contains the packet address
    Subnets(Vec<SubnetSpec>),
    /// Logical network name
    Network(String),
    /// Security group id
    SecurityGroup(GroupId),
}

impl AddressSpec {
    /// Single subnet descriptor
    pub fn subnet(address: impl Into<String>, prefix_len: u8) -> Self {
        AddressSpec::Subnets(vec![SubnetSpec::new(address, prefix_len)])
    }

    pub fn network(name: impl Into<String>) -> Self {
        AddressSpec::Network(name.into())
    }

    pub fn security_group(id: GroupId) -> Self {
        AddressSpec::SecurityGroup(id)
    }
}

/// Uncompiled, configuration-facing description of one ACL entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDefinition {
    pub id: RuleId,
    /// Opaque rule uuid from the management plane
    pub uuid: Option<String>,
    /// `None` matches every source
    pub src: Option<AddressSpec>,
    /// `None` matches every destination
    pub dst: Option<AddressSpec>,
    pub protocol: RangeSet,
    pub src_port: RangeSet,
    pub dst_port: RangeSet,
    pub actions: Vec<ActionSpec>,
    pub terminal: bool,
}

impl RuleDefinition {
    pub fn new(id: RuleId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Parse a definition from its JSON form
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Header fields of one packet, populated by the caller before evaluation.
///
/// Identity sets are borrowed from upstream classification state; an absent
/// set never matches a rule that needs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketKey<'a> {
    pub src_ip: Option<IpAddr>,
    pub dst_ip: Option<IpAddr>,
    pub protocol: u8,
    pub src_port: u16,
    pub dst_port: u16,
    pub src_networks: Option<&'a NetworkSet>,
    pub dst_networks: Option<&'a NetworkSet>,
    pub src_groups: Option<&'a [GroupId]>,
    pub dst_groups: Option<&'a [GroupId]>,
}

impl<'a> PacketKey<'a> {
    pub fn new(protocol: u8) -> Self {
        Self {
            protocol,
            ..Self::default()
        }
    }

    pub fn with_src_ip(mut self, ip: IpAddr) -> Self {
        self.src_ip = Some(ip);
        self
    }

    pub fn with_dst_ip(mut self, ip: IpAddr) -> Self {
        self.dst_ip = Some(ip);
        self
    }

    pub fn with_ports(mut self, src_port: u16, dst_port: u16) -> Self {
        self.src_port = src_port;
        self.dst_port = dst_port;
        self
    }

    pub fn with_networks(mut self, src: &'a NetworkSet, dst: &'a NetworkSet) -> Self {
        self.src_networks = Some(src);
        self.dst_networks = Some(dst);
        self
    }

    pub fn with_src_groups(mut self, groups: &'a [GroupId]) -> Self {
        self.src_groups = Some(groups);
        self
    }

    pub fn with_dst_groups(mut self, groups: &'a [GroupId]) -> Self {
        self.dst_groups = Some(groups);
        self
    }

    /// Ports only carry meaning for TCP and UDP
    pub fn has_ports(&self) -> bool {
        matches!(self.protocol, IPPROTO_TCP | IPPROTO_UDP)
    }

    pub fn source(&self) -> Endpoint<'a> {
        Endpoint {
            ip: self.src_ip,
            networks: self.src_networks,
            groups: self.src_groups,
        }
    }

    pub fn destination(&self) -> Endpoint<'a> {
        Endpoint {
            ip: self.dst_ip,
            networks: self.dst_networks,
            groups: self.dst_groups,
        }
    }
}

/// Address-related fields of one side of a packet
#[derive(Debug, Clone, Copy, Default)]
pub struct Endpoint<'a> {
    pub ip: Option<IpAddr>,
    pub networks: Option<&'a NetworkSet>,
    pub groups: Option<&'a [GroupId]>,
}

/// Per-evaluation side channel, written only when a rule matches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    pub rule_id: Option<RuleId>,
    pub uuid: Option<Arc<str>>,
}

impl MatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_matched(&self) -> bool {
        self.rule_id.is_some()
    }
}
