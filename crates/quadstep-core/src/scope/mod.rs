//! Action target scopes and note-tag rules that change them.
//!
//! A [`ScopeRegistry`] names the eleven standard target scopes. Items and
//! skills may carry rules in their note text:
//!
//! ```text
//! <scope change rule: all-enemy>
//!   a.isStateAffected(14)
//! </scope change rule>
//! ```
//!
//! Conditions compile once into a [`Predicate`] and are evaluated against a
//! read-only [`ScopeContext`]. The first rule whose condition holds picks the
//! scope; otherwise the item keeps its own.
//!
//! # Example
//!
//! ```
//! use quadstep_core::scope::{ScopeContext, ScopeId, ScopeRegistry, ScopeRules};
//!
//! struct Battler;
//!
//! impl ScopeContext for Battler {
//!     fn is_state_affected(&self, state: u32) -> bool {
//!         state == 14
//!     }
//!     fn switch(&self, _id: u32) -> bool {
//!         false
//!     }
//!     fn variable(&self, _id: u32) -> i64 {
//!         0
//!     }
//! }
//!
//! let note = "<scope change rule: all-enemy>a.isStateAffected(14)</scope change rule>";
//! let rules = ScopeRules::parse_note(note, &ScopeRegistry::default()).unwrap();
//! assert_eq!(rules.resolve(&Battler, ScopeId::new(1)), ScopeId::new(2));
//! ```

mod predicate;
mod rules;

pub use predicate::{CompareOp, Predicate};
pub use rules::{ScopeRule, ScopeRules};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while compiling scope rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeRuleError {
    /// A rule names a scope the registry does not know.
    #[error("unknown scope {0:?}")]
    UnknownScope(String),

    /// A rule condition could not be parsed.
    #[error("bad condition at offset {position}: {reason}")]
    Parse {
        /// Byte offset into the condition text
        position: usize,
        /// What was expected
        reason: String,
    },
}

/// Read-only game state seen by rule conditions.
pub trait ScopeContext {
    /// Whether the acting battler has the state.
    fn is_state_affected(&self, state: u32) -> bool;

    /// Value of a game switch.
    fn switch(&self, id: u32) -> bool;

    /// Value of a game variable.
    fn variable(&self, id: u32) -> i64;
}

// =============================================================================
// Scope IDs
// =============================================================================

/// Numeric target scope. 0 means no scope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ScopeId(u8);

impl ScopeId {
    /// No target.
    pub const NONE: ScopeId = ScopeId(0);

    /// Creates a scope ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Raw value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope:{}", self.0)
    }
}

/// Scope names usable in note tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRegistry {
    ids: HashMap<String, ScopeId>,
}

impl ScopeRegistry {
    /// The standard scopes, in ID order.
    pub const STANDARD: [&'static str; 11] = [
        "1-enemy",
        "all-enemy",
        "1-random-enemy",
        "2-random-enemy",
        "3-random-enemy",
        "4-random-enemy",
        "1-ally",
        "all-ally",
        "1-ally-dead",
        "all-ally-dead",
        "user",
    ];

    /// An empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ids: HashMap::new(),
        }
    }

    /// Adds or replaces a named scope. Names are matched ignoring ASCII case.
    pub fn register(&mut self, name: &str, id: ScopeId) {
        self.ids.insert(name.to_ascii_lowercase(), id);
    }

    /// Looks up a scope by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<ScopeId> {
        self.ids.get(&name.trim().to_ascii_lowercase()).copied()
    }

    /// Number of named scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no scope is named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (name, id) in Self::STANDARD.iter().zip(1u8..) {
            registry.register(name, ScopeId::new(id));
        }
        registry
    }
}

// =============================================================================
// Action scope
// =============================================================================

/// The scope carried by an action, separate from its item.
///
/// Selecting an item sets the action's scope from the item's rules; later
/// changes affect only the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionScope {
    scope: ScopeId,
}

impl ActionScope {
    /// An action with no item selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scope: ScopeId::NONE,
        }
    }

    /// Take the scope of a newly selected item.
    pub fn select_item(&mut self, item_scope: ScopeId, rules: &ScopeRules, ctx: &dyn ScopeContext) {
        self.scope = rules.resolve(ctx, item_scope);
    }

    /// Override the scope.
    pub fn set(&mut self, scope: ScopeId) {
        self.scope = scope;
    }

    /// Current scope.
    #[must_use]
    pub const fn get(&self) -> ScopeId {
        self.scope
    }

    /// Whether the current scope is one of `scopes`.
    #[must_use]
    pub fn is_one_of(&self, scopes: &[ScopeId]) -> bool {
        scopes.contains(&self.scope)
    }

    /// Back to no item selected.
    pub fn clear(&mut self) {
        self.scope = ScopeId::NONE;
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::Table;
    use super::*;

    #[test]
    fn standard_names() {
        let registry = ScopeRegistry::default();
        assert_eq!(registry.len(), 11);
        assert_eq!(registry.id("1-enemy"), Some(ScopeId::new(1)));
        assert_eq!(registry.id("all-ally-dead"), Some(ScopeId::new(10)));
        assert_eq!(registry.id(" User "), Some(ScopeId::new(11)));
        assert_eq!(registry.id("everyone"), None);
    }

    #[test]
    fn custom_scopes_can_be_added() {
        let mut registry = ScopeRegistry::default();
        registry.register("Everyone", ScopeId::new(12));
        assert_eq!(registry.id("everyone"), Some(ScopeId::new(12)));
        assert!(ScopeRegistry::empty().is_empty());
    }

    #[test]
    fn action_scope_follows_rules_then_overrides() {
        let note = "<scope change rule: user>s[1]</scope change rule>";
        let rules = ScopeRules::parse_note(note, &ScopeRegistry::default()).unwrap();
        let mut ctx = Table::default();

        let mut action = ActionScope::new();
        assert_eq!(action.get(), ScopeId::NONE);
        action.select_item(ScopeId::new(1), &rules, &ctx);
        assert_eq!(action.get(), ScopeId::new(1));

        ctx.switches.insert(1);
        action.select_item(ScopeId::new(1), &rules, &ctx);
        assert_eq!(action.get(), ScopeId::new(11));
        assert!(action.is_one_of(&[ScopeId::new(7), ScopeId::new(11)]));

        action.set(ScopeId::new(8));
        assert!(!action.is_one_of(&[ScopeId::new(11)]));
        action.clear();
        assert_eq!(action.get(), ScopeId::NONE);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ScopeRuleError::UnknownScope("party".into()).to_string(),
            "unknown scope \"party\""
        );
        let parse = ScopeRuleError::Parse {
            position: 3,
            reason: "expected ')'".into(),
        };
        assert_eq!(parse.to_string(), "bad condition at offset 3: expected ')'");
    }
}
