use super::AddressMatch;
use crate::types::{Endpoint, GroupId};

/// Network identity matcher - matches packets tagged with the configured network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkMatcher {
    name: String,
}

impl NetworkMatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AddressMatch for NetworkMatcher {
    fn matches(&self, endpoint: &Endpoint<'_>) -> bool {
        endpoint
            .networks
            .is_some_and(|networks| networks.contains(self.name.as_str()))
    }
}

/// Security group matcher - matches packets carrying the configured group id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMatcher {
    id: GroupId,
}

impl GroupMatcher {
    pub fn new(id: GroupId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }
}

impl AddressMatch for GroupMatcher {
    fn matches(&self, endpoint: &Endpoint<'_>) -> bool {
        endpoint.groups.is_some_and(|groups| groups.contains(&self.id))
    }
}
