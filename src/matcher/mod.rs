mod identity;
mod ip;

pub use identity::{GroupMatcher, NetworkMatcher};
pub use ip::SubnetMatcher;

use crate::error::Result;
use crate::types::{AddressSpec, Endpoint, RuleId};

/// Trait for address matchers
pub trait AddressMatch: Send + Sync {
    /// Check if one side of a packet matches this matcher
    fn matches(&self, endpoint: &Endpoint<'_>) -> bool;
}

/// Kind of address matcher, as reported by introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    Subnet,
    Network,
    SecurityGroup,
}

impl AddressKind {
    pub fn label(&self) -> &'static str {
        match self {
            AddressKind::Subnet => "ip",
            AddressKind::Network => "network",
            AddressKind::SecurityGroup => "sg",
        }
    }
}

/// Enum wrapper for all address matcher types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressMatcher {
    Subnet(SubnetMatcher),
    Network(NetworkMatcher),
    SecurityGroup(GroupMatcher),
}

impl AddressMatcher {
    /// Compile a descriptor, rejecting malformed subnets.
    pub fn try_compile(rule: RuleId, spec: &AddressSpec) -> Result<Self> {
        Ok(match spec {
            AddressSpec::Subnets(subnets) => {
                AddressMatcher::Subnet(SubnetMatcher::from_specs(rule, subnets)?)
            }
            AddressSpec::Network(name) => AddressMatcher::Network(NetworkMatcher::new(name.clone())),
            AddressSpec::SecurityGroup(id) => AddressMatcher::SecurityGroup(GroupMatcher::new(*id)),
        })
    }

    /// Compile a descriptor. A malformed subnet list leaves the matcher empty,
    /// so it matches nothing.
    pub fn compile(rule: RuleId, spec: &AddressSpec) -> Self {
        Self::try_compile(rule, spec).unwrap_or_else(|err| {
            tracing::warn!(rule, error = %err, "address matcher degraded to match nothing");
            AddressMatcher::Subnet(SubnetMatcher::default())
        })
    }

    pub fn kind(&self) -> AddressKind {
        match self {
            AddressMatcher::Subnet(_) => AddressKind::Subnet,
            AddressMatcher::Network(_) => AddressKind::Network,
            AddressMatcher::SecurityGroup(_) => AddressKind::SecurityGroup,
        }
    }

    /// Human-readable configured value
    pub fn describe(&self) -> String {
        match self {
            AddressMatcher::Subnet(m) => m.describe(),
            AddressMatcher::Network(m) => m.name().to_string(),
            AddressMatcher::SecurityGroup(m) => m.id().to_string(),
        }
    }
}

impl AddressMatch for AddressMatcher {
    fn matches(&self, endpoint: &Endpoint<'_>) -> bool {
        match self {
            AddressMatcher::Subnet(m) => m.matches(endpoint),
            AddressMatcher::Network(m) => m.matches(endpoint),
            AddressMatcher::SecurityGroup(m) => m.matches(endpoint),
        }
    }
}
