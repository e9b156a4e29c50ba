use std::net::IpAddr;

use ipnet::IpNet;

use super::AddressMatch;
use crate::error::{AclError, Result};
use crate::types::{Endpoint, RuleId, SubnetSpec};

/// Subnet matcher - matches packet addresses inside any configured subnet.
///
/// Each subnet is stored truncated to its network address, so matching is a
/// masked comparison. An empty matcher matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubnetMatcher {
    networks: Vec<IpNet>,
}

impl SubnetMatcher {
    pub fn new(networks: Vec<IpNet>) -> Self {
        Self {
            networks: networks.iter().map(IpNet::trunc).collect(),
        }
    }

    /// Build from textual subnets, failing on the first malformed one.
    ///
    /// An empty list is rejected too.
    pub fn from_specs(rule: RuleId, specs: &[SubnetSpec]) -> Result<Self> {
        if specs.is_empty() {
            return Err(AclError::EmptyAddress { rule });
        }
        let networks = specs
            .iter()
            .map(|spec| parse_subnet(rule, spec))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { networks })
    }

    /// Check a single address against the stored (network, mask) pairs
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.networks.iter().any(|net| net.contains(&ip))
    }

    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// "network mask" per subnet, comma separated.
    ///
    /// A side whose subnet list failed to compile holds no networks and
    /// describes as an empty string.
    pub fn describe(&self) -> String {
        self.networks
            .iter()
            .map(|net| format!("{} {}", net.network(), net.netmask()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl AddressMatch for SubnetMatcher {
    fn matches(&self, endpoint: &Endpoint<'_>) -> bool {
        endpoint.ip.is_some_and(|ip| self.contains(ip))
    }
}

/// Mask `address/prefix_len` down to its network
fn parse_subnet(rule: RuleId, spec: &SubnetSpec) -> Result<IpNet> {
    let address: IpAddr = spec
        .address
        .trim()
        .parse()
        .map_err(|_| AclError::InvalidAddress {
            rule,
            address: spec.address.clone(),
        })?;
    let net = IpNet::new(address, spec.prefix_len).map_err(|_| AclError::InvalidPrefix {
        rule,
        address: spec.address.clone(),
        prefix_len: spec.prefix_len,
    })?;
    Ok(net.trunc())
}
