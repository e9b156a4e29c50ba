//! Line-oriented text syntax for ACL entries.
//!
//! ```text
//! <id> <action>[,<action>...] (<src>, <dst>[, proto=<ranges>][, sport=<ranges>][, dport=<ranges>]) [terminal]
//! ```
//!
//! Addresses are `any`, `network:<name>`, `sg:<id>`, or one or more subnets
//! joined with `|` (`10.0.0.0/8|fd00::/8`; a bare address is a host prefix).
//! Ranges are `|`-joined values or `min-max` pairs. Actions are `pass`, `deny`,
//! `log`, `alert`, `mirror:<analyzer>[@ip[:port]]`, `vrf:<name>`, `qos:<name>`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::action::{ActionSpec, MirrorSpec};
use crate::error::{AclError, Result};
use crate::range::{Range, RangeSet};
use crate::types::{AddressSpec, GroupId, RuleDefinition, RuleId, SubnetSpec};

/// Regex pattern for one rule line
static RULE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+([^\s(]+)\s*\(([^)]*)\)\s*(terminal)?$")
        .expect("RULE_PATTERN: hardcoded regex is invalid")
});

/// Parse ACL entries from text. `#` starts a comment.
pub fn parse_rules(text: &str) -> Result<Vec<RuleDefinition>> {
    let mut rules = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1;

        let line = match line.find('#') {
            Some(comment_pos) => &line[..comment_pos],
            None => line,
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        let rule = parse_single_rule(line).map_err(|e| AclError::ParseErrorAtLine {
            line: line_num,
            message: e.to_string(),
        })?;
        rules.push(rule);
    }

    Ok(rules)
}

/// Parse a single rule line
pub fn parse_single_rule(line: &str) -> Result<RuleDefinition> {
    let captures = RULE_PATTERN
        .captures(line)
        .ok_or_else(|| AclError::InvalidRuleFormat(line.to_string()))?;

    let id: RuleId = captures[1]
        .parse()
        .map_err(|_| AclError::InvalidRuleFormat(format!("Invalid rule id: {}", &captures[1])))?;
    let actions = captures[2]
        .split(',')
        .map(parse_action)
        .collect::<Result<Vec<_>>>()?;

    let mut args = captures[3].split(',').map(str::trim);
    let src = args
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AclError::InvalidRuleFormat("Missing source address".to_string()))?;
    let dst = args
        .next()
        .ok_or_else(|| AclError::InvalidRuleFormat("Missing destination address".to_string()))?;

    let mut rule = RuleDefinition {
        id,
        src: parse_address(src)?,
        dst: parse_address(dst)?,
        actions,
        terminal: captures.get(4).is_some(),
        ..RuleDefinition::default()
    };

    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| AclError::InvalidRuleFormat(format!("Expected key=value: {}", arg)))?;
        let ranges = parse_range_set(value)?;
        match key.trim() {
            "proto" => rule.protocol = ranges,
            "sport" => rule.src_port = ranges,
            "dport" => rule.dst_port = ranges,
            other => {
                return Err(AclError::InvalidRuleFormat(format!(
                    "Unknown match field: {}",
                    other
                )))
            }
        }
    }

    Ok(rule)
}

/// Parse an address token. `any` yields `None`.
///
/// Subnet address text is not validated here; compilation decides what a
/// malformed address means.
pub fn parse_address(spec: &str) -> Result<Option<AddressSpec>> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(AclError::InvalidRuleFormat("Empty address".to_string()));
    }
    if spec.eq_ignore_ascii_case("any") || spec == "*" {
        return Ok(None);
    }

    if let Some(name) = spec.strip_prefix("network:") {
        return Ok(Some(AddressSpec::network(name.trim())));
    }

    if let Some(id) = spec.strip_prefix("sg:") {
        let id: GroupId = id
            .trim()
            .parse()
            .map_err(|_| AclError::InvalidRuleFormat(format!("Invalid security group: {}", id)))?;
        return Ok(Some(AddressSpec::security_group(id)));
    }

    let subnets = spec
        .split('|')
        .map(|part| {
            let part = part.trim();
            match part.split_once('/') {
                Some((address, prefix)) => {
                    let prefix_len = prefix.trim().parse().map_err(|_| {
                        AclError::InvalidRuleFormat(format!("Invalid prefix length: {}", part))
                    })?;
                    Ok(SubnetSpec::new(address.trim(), prefix_len))
                }
                None => {
                    let host_len = if part.contains(':') { 128 } else { 32 };
                    Ok(SubnetSpec::new(part, host_len))
                }
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(AddressSpec::Subnets(subnets)))
}

/// Parse a range list such as `10-100|443`
pub fn parse_range_set(spec: &str) -> Result<RangeSet> {
    spec.split('|').map(parse_range).collect()
}

fn parse_range(spec: &str) -> Result<Range> {
    let spec = spec.trim();
    let invalid = || AclError::InvalidRuleFormat(format!("Invalid range: {}", spec));

    if let Some((start, end)) = spec.split_once('-') {
        let start: u16 = start.trim().parse().map_err(|_| invalid())?;
        let end: u16 = end.trim().parse().map_err(|_| invalid())?;
        if start > end {
            return Err(AclError::InvalidRuleFormat(format!(
                "Invalid range: {} > {}",
                start, end
            )));
        }
        Ok(Range::new(start, end))
    } else {
        let value: u16 = spec.parse().map_err(|_| invalid())?;
        Ok(Range::single(value))
    }
}

/// Parse one action token
pub fn parse_action(spec: &str) -> Result<ActionSpec> {
    let spec = spec.trim();
    let (kind, arg) = match spec.split_once(':') {
        Some((kind, arg)) => (kind, Some(arg)),
        None => (spec, None),
    };

    match (kind.to_lowercase().as_str(), arg) {
        ("pass", None) => Ok(ActionSpec::pass()),
        ("deny", None) => Ok(ActionSpec::deny()),
        ("log", None) => Ok(ActionSpec::Log),
        ("alert", None) => Ok(ActionSpec::Alert),
        ("mirror", Some(target)) => Ok(ActionSpec::Mirror(parse_mirror(target))),
        ("vrf", Some(vrf)) if !vrf.is_empty() => Ok(ActionSpec::VrfTranslate {
            vrf: vrf.to_string(),
            ignore_acl: false,
        }),
        ("qos", Some(name)) if !name.is_empty() => Ok(ActionSpec::Qos {
            name: name.to_string(),
        }),
        _ => Err(AclError::UnknownAction(spec.to_string())),
    }
}

fn parse_mirror(target: &str) -> MirrorSpec {
    let Some((analyzer, endpoint)) = target.split_once('@') else {
        return MirrorSpec {
            analyzer: target.to_string(),
            ip: None,
            port: None,
        };
    };

    // A bare IPv6 address also contains ':', so only split off a port when the
    // whole endpoint is not already an address.
    let (ip, port) = if endpoint.parse::<std::net::IpAddr>().is_ok() {
        (endpoint, None)
    } else {
        match endpoint.rsplit_once(':') {
            Some((ip, port)) => match port.parse::<u16>() {
                Ok(port) => (ip, Some(port)),
                Err(_) => (endpoint, None),
            },
            None => (endpoint, None),
        }
    };

    MirrorSpec {
        analyzer: analyzer.to_string(),
        ip: Some(ip.trim_start_matches('[').trim_end_matches(']').to_string()),
        port,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_pattern_regex_compiles() {
        assert!(RULE_PATTERN.is_match("1 pass(any, any)"));
    }

    #[test]
    fn test_parse_simple_rule() {
        let rules = parse_rules("1 pass (1.1.1.0/24, any, proto=10, dport=10-100)").unwrap();
        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.id, 1);
        assert_eq!(rule.src, Some(AddressSpec::subnet("1.1.1.0", 24)));
        assert!(rule.dst.is_none());
        assert_eq!(rule.protocol.ranges(), &[Range::single(10)]);
        assert_eq!(rule.dst_port.ranges(), &[Range::new(10, 100)]);
        assert!(rule.src_port.is_wildcard());
        assert_eq!(rule.actions, vec![ActionSpec::pass()]);
        assert!(!rule.terminal);
    }

    #[test]
    fn test_parse_identity_rule() {
        let text = "100 deny,log (sg:4, network:vn2, sport=100-1000) terminal";
        let rule = &parse_rules(text).unwrap()[0];
        assert_eq!(rule.src, Some(AddressSpec::security_group(4)));
        assert_eq!(rule.dst, Some(AddressSpec::network("vn2")));
        assert_eq!(rule.src_port.ranges(), &[Range::new(100, 1000)]);
        assert_eq!(rule.actions, vec![ActionSpec::deny(), ActionSpec::Log]);
        assert!(rule.terminal);
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let text = r#"
# leading comment
1 pass (any, any)   # trailing comment

2 deny (any, any)
"#;
        let rules = parse_rules(text).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].id, 2);
    }

    #[test]
    fn test_parse_multiple_subnets_and_hosts() {
        let spec = parse_address("10.0.0.0/8|1.1.1.1|fd11::3").unwrap().unwrap();
        assert_eq!(
            spec,
            AddressSpec::Subnets(vec![
                SubnetSpec::new("10.0.0.0", 8),
                SubnetSpec::new("1.1.1.1", 32),
                SubnetSpec::new("fd11::3", 128),
            ])
        );
    }

    #[test]
    fn test_malformed_address_passes_through() {
        let spec = parse_address("1.1.1/24").unwrap();
        assert_eq!(spec, Some(AddressSpec::subnet("1.1.1", 24)));
    }

    #[test]
    fn test_parse_range_set() {
        let set = parse_range_set("10-20|80").unwrap();
        assert_eq!(set.ranges(), &[Range::new(10, 20), Range::single(80)]);
        assert!(parse_range_set("20-10").is_err());
        assert!(parse_range_set("70000").is_err());
        assert!(parse_range_set("").is_err());
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_action("ALERT").unwrap(), ActionSpec::Alert);
        assert_eq!(
            parse_action("qos:gold").unwrap(),
            ActionSpec::Qos {
                name: "gold".to_string()
            }
        );
        assert_eq!(
            parse_action("vrf:red").unwrap(),
            ActionSpec::VrfTranslate {
                vrf: "red".to_string(),
                ignore_acl: false
            }
        );
        assert!(matches!(parse_action("drop"), Err(AclError::UnknownAction(_))));
        assert!(parse_action("pass:x").is_err());
        assert!(parse_action("qos:").is_err());
    }

    #[test]
    fn test_parse_mirror_targets() {
        let m = parse_mirror("a1@10.0.0.1:8099");
        assert_eq!(m.analyzer, "a1");
        assert_eq!(m.ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(m.port, Some(8099));

        let m = parse_mirror("a1@fd00::1");
        assert_eq!(m.ip.as_deref(), Some("fd00::1"));
        assert_eq!(m.port, None);

        let m = parse_mirror("a1@[fd00::1]:8099");
        assert_eq!(m.ip.as_deref(), Some("fd00::1"));
        assert_eq!(m.port, Some(8099));

        let m = parse_mirror("a1");
        assert!(m.ip.is_none());
    }

    #[test]
    fn test_parse_error_line_number() {
        let text = "1 pass (any, any)\n\n3 pass any";
        match parse_rules(text) {
            Err(AclError::ParseErrorAtLine { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected ParseErrorAtLine, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_field() {
        assert!(parse_single_rule("1 pass (any, any, ttl=3)").is_err());
        assert!(parse_single_rule("1 pass (any)").is_err());
        assert!(parse_single_rule("1 pass (, any)").is_err());
    }
}
