//! Configured actions and the outcome of a rule match.
//!
//! Only [`SimpleAction`] carries a verdict. Every other action kind is stored
//! and handed back to the caller untouched; mirroring, logging and the rest
//! are side effects owned by collaborators outside this crate.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Pass/deny verdict of a simple action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleAction {
    Pass,
    Deny,
}

impl SimpleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimpleAction::Pass => "pass",
            SimpleAction::Deny => "deny",
        }
    }
}

/// Uncompiled mirror target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSpec {
    pub analyzer: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Configured action as it appears in a rule definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpec {
    Simple(SimpleAction),
    Log,
    Alert,
    Mirror(MirrorSpec),
    VrfTranslate { vrf: String, ignore_acl: bool },
    Qos { name: String },
}

impl ActionSpec {
    pub fn pass() -> Self {
        ActionSpec::Simple(SimpleAction::Pass)
    }

    pub fn deny() -> Self {
        ActionSpec::Simple(SimpleAction::Deny)
    }
}

/// Compiled mirror target. An unparseable analyzer ip compiles to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorAction {
    pub analyzer: String,
    pub ip: Option<IpAddr>,
    pub port: Option<u16>,
}

/// Action owned by a compiled rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompiledAction {
    Simple(SimpleAction),
    Log,
    Alert,
    Mirror(MirrorAction),
    VrfTranslate { vrf: String, ignore_acl: bool },
    Qos { name: String },
}

impl CompiledAction {
    /// Compile one action spec.
    pub fn compile(spec: &ActionSpec) -> Self {
        match spec {
            ActionSpec::Simple(verdict) => CompiledAction::Simple(*verdict),
            ActionSpec::Log => CompiledAction::Log,
            ActionSpec::Alert => CompiledAction::Alert,
            ActionSpec::Mirror(mirror) => {
                let ip = mirror.ip.as_deref().and_then(|text| match text.parse() {
                    Ok(ip) => Some(ip),
                    Err(_) => {
                        tracing::warn!(
                            analyzer = %mirror.analyzer,
                            ip = text,
                            "ignoring malformed mirror destination"
                        );
                        None
                    }
                });
                CompiledAction::Mirror(MirrorAction {
                    analyzer: mirror.analyzer.clone(),
                    ip,
                    port: mirror.port,
                })
            }
            ActionSpec::VrfTranslate { vrf, ignore_acl } => CompiledAction::VrfTranslate {
                vrf: vrf.clone(),
                ignore_acl: *ignore_acl,
            },
            ActionSpec::Qos { name } => CompiledAction::Qos { name: name.clone() },
        }
    }

    /// Kind label used by introspection
    pub fn label(&self) -> &'static str {
        match self {
            CompiledAction::Simple(verdict) => verdict.as_str(),
            CompiledAction::Log => "log",
            CompiledAction::Alert => "alert",
            CompiledAction::Mirror(_) => "mirror",
            CompiledAction::VrfTranslate { .. } => "vrf-translate",
            CompiledAction::Qos { .. } => "qos",
        }
    }

    pub fn verdict(&self) -> Option<SimpleAction> {
        match self {
            CompiledAction::Simple(verdict) => Some(*verdict),
            _ => None,
        }
    }
}

impl fmt::Display for CompiledAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledAction::Mirror(m) => {
                write!(f, "mirror {}", m.analyzer)?;
                if let Some(ip) = m.ip {
                    write!(f, "@{}", ip)?;
                }
                if let Some(port) = m.port {
                    write!(f, ":{}", port)?;
                }
                Ok(())
            }
            CompiledAction::VrfTranslate { vrf, .. } => write!(f, "vrf-translate {}", vrf),
            CompiledAction::Qos { name } => write!(f, "qos {}", name),
            other => f.write_str(other.label()),
        }
    }
}

/// Actions produced by one successful evaluation, in configured order.
///
/// Borrows from the rule that produced it and cannot outlive that rule. An
/// empty outcome means the rule did not match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome<'r> {
    actions: Vec<&'r CompiledAction>,
}

impl<'r> MatchOutcome<'r> {
    /// Outcome of a non-matching evaluation; does not allocate.
    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Collect actions in order, collapsing repeats onto their first position.
    pub(crate) fn from_actions(actions: &'r [CompiledAction]) -> Self {
        let mut collected: Vec<&'r CompiledAction> = Vec::with_capacity(actions.len());
        for action in actions {
            if !collected.contains(&action) {
                collected.push(action);
            }
        }
        Self { actions: collected }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn actions(&self) -> &[&'r CompiledAction] {
        &self.actions
    }

    pub fn iter(&self) -> impl Iterator<Item = &'r CompiledAction> + '_ {
        self.actions.iter().copied()
    }

    /// First pass/deny verdict among the actions, if any
    pub fn verdict(&self) -> Option<SimpleAction> {
        self.iter().find_map(CompiledAction::verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple_action() {
        assert_eq!(
            CompiledAction::compile(&ActionSpec::deny()),
            CompiledAction::Simple(SimpleAction::Deny)
        );
    }

    #[test]
    fn test_compile_mirror_action() {
        let spec = ActionSpec::Mirror(MirrorSpec {
            analyzer: "collector".to_string(),
            ip: Some("10.1.1.1".to_string()),
            port: Some(8099),
        });
        let action = CompiledAction::compile(&spec);
        assert_eq!(action.label(), "mirror");
        assert_eq!(action.to_string(), "mirror collector@10.1.1.1:8099");
        assert!(action.verdict().is_none());
    }

    #[test]
    fn test_compile_mirror_malformed_ip() {
        let spec = ActionSpec::Mirror(MirrorSpec {
            analyzer: "collector".to_string(),
            ip: Some("10.1.1".to_string()),
            port: None,
        });
        match CompiledAction::compile(&spec) {
            CompiledAction::Mirror(m) => {
                assert_eq!(m.analyzer, "collector");
                assert!(m.ip.is_none());
            }
            other => panic!("expected mirror, got {:?}", other),
        }
    }

    #[test]
    fn test_outcome_collapses_duplicates() {
        let actions = vec![
            CompiledAction::Log,
            CompiledAction::Simple(SimpleAction::Pass),
            CompiledAction::Log,
            CompiledAction::Alert,
        ];
        let outcome = MatchOutcome::from_actions(&actions);
        let labels: Vec<_> = outcome.iter().map(|a| a.label()).collect();
        assert_eq!(labels, vec!["log", "pass", "alert"]);
        assert_eq!(outcome.verdict(), Some(SimpleAction::Pass));
    }

    #[test]
    fn test_empty_outcome() {
        let outcome = MatchOutcome::empty();
        assert!(outcome.is_empty());
        assert_eq!(outcome.len(), 0);
        assert!(outcome.verdict().is_none());
    }

    #[test]
    fn test_action_spec_json() {
        let specs: Vec<ActionSpec> = serde_json::from_str(
            r#"["log", {"simple": "pass"}, {"qos": {"name": "gold"}}]"#,
        )
        .unwrap();
        assert_eq!(
            specs,
            vec![
                ActionSpec::Log,
                ActionSpec::pass(),
                ActionSpec::Qos {
                    name: "gold".to_string()
                }
            ]
        );
    }
}
