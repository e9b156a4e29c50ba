//! ACL Entry - per-entry packet classification for a virtual router ACL layer
//!
//! An ACL entry is compiled once from its definition and then evaluated
//! against packet header fields on the forwarding path:
//! - Source/destination matching by subnet (IPv4 and IPv6), network identity,
//!   or security group
//! - Protocol matching and TCP/UDP port matching over range lists
//! - Ordered, de-duplicated action lists (pass/deny, mirror, log, ...)
//! - A flat introspection projection of the compiled configuration
//!
//! Ordering rules within a table, and acting on the returned actions, are the
//! caller's business.
//!
//! # Example
//!
//! ```rust
//! use acl_entry::{compile, parse_rules, MatchContext, PacketKey, SimpleAction};
//!
//! let rules = parse_rules("
//! 10 deny (1.1.1.0/24, any, proto=6, dport=22) terminal
//! 20 pass,log (any, network:vn-blue)
//! ").unwrap();
//!
//! let ssh_block = compile(&rules[0]);
//!
//! let packet = PacketKey::new(6)
//!     .with_src_ip("1.1.1.7".parse().unwrap())
//!     .with_ports(40000, 22);
//! let mut ctx = MatchContext::new();
//! let outcome = ssh_block.evaluate(&packet, &mut ctx);
//!
//! assert_eq!(outcome.verdict(), Some(SimpleAction::Deny));
//! assert_eq!(ctx.rule_id, Some(10));
//! assert!(ssh_block.is_terminal());
//! ```
//!
//! # Matching
//!
//! A packet matches when, in order:
//!
//! | Step | Criterion |
//! |------|-----------|
//! | 1 | source matcher (if configured) accepts the packet source |
//! | 2 | destination matcher (if configured) accepts the packet destination |
//! | 3 | protocol range list contains the protocol (empty = any) |
//! | 4 | for TCP/UDP only: destination and source port range lists contain the ports |
//!
//! Malformed configuration never aborts compilation: a bad subnet produces a
//! matcher that matches nothing. Use [`try_compile`] to reject it instead.

pub mod action;
pub mod compile;
pub mod error;
pub mod introspect;
pub mod matcher;
pub mod parser;
pub mod range;
pub mod slot;
pub mod types;

// Re-export commonly used items
pub use action::{
    ActionSpec, CompiledAction, MatchOutcome, MirrorAction, MirrorSpec, SimpleAction,
};
pub use compile::{compile, try_compile, CompiledRule};
pub use error::{AclError, Result};
pub use introspect::{IntrospectionProjection, RangeEntry};
pub use matcher::{
    AddressKind, AddressMatch, AddressMatcher, GroupMatcher, NetworkMatcher, SubnetMatcher,
};
pub use parser::{parse_range_set, parse_rules};
pub use range::{Range, RangeSet};
pub use slot::RuleSlot;
pub use types::{
    AddressSpec, Endpoint, GroupId, MatchContext, NetworkSet, PacketKey, RuleDefinition, RuleId,
    SubnetSpec, IPPROTO_TCP, IPPROTO_UDP,
};
