//! Reference-counted holder for one active compiled rule.
//!
//! Readers take an `Arc` snapshot and evaluate against it without holding the
//! lock. Replacing the rule swaps the pointer; a superseded rule stays alive
//! until its last snapshot, and every outcome borrowed from it, is dropped.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::compile::{compile, try_compile, CompiledRule};
use crate::error::Result;
use crate::types::RuleDefinition;

pub struct RuleSlot {
    current: RwLock<Arc<CompiledRule>>,
}

impl RuleSlot {
    pub fn new(rule: CompiledRule) -> Self {
        Self {
            current: RwLock::new(Arc::new(rule)),
        }
    }

    /// Compile a definition into a new slot
    pub fn from_definition(def: &RuleDefinition) -> Self {
        Self::new(compile(def))
    }

    /// Snapshot of the active rule
    pub fn load(&self) -> Arc<CompiledRule> {
        self.current.read().clone()
    }

    /// Swap in a new rule and hand back the superseded one
    pub fn store(&self, rule: CompiledRule) -> Arc<CompiledRule> {
        let mut current = self.current.write();
        std::mem::replace(&mut *current, Arc::new(rule))
    }

    /// Compile and swap in a replacement definition
    pub fn replace(&self, def: &RuleDefinition) -> Arc<CompiledRule> {
        tracing::debug!(rule = def.id, "replacing acl entry");
        self.store(compile(def))
    }

    /// Like [`RuleSlot::replace`], but keeps the active rule if `def` is malformed
    pub fn try_replace(&self, def: &RuleDefinition) -> Result<Arc<CompiledRule>> {
        let rule = try_compile(def)?;
        tracing::debug!(rule = def.id, "replacing acl entry");
        Ok(self.store(rule))
    }
}

impl std::fmt::Debug for RuleSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSlot")
            .field("rule", &self.current.read().id())
            .finish()
    }
}
