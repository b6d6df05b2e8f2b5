//! Note-tag scanning and rule lookup.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Predicate, ScopeContext, ScopeId, ScopeRegistry, ScopeRuleError};

/// One `<scope change rule>` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRule {
    /// Scope applied when the condition holds
    pub scope: ScopeId,
    /// Compiled condition
    pub condition: Predicate,
}

/// The ordered rules of one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRules {
    rules: Vec<ScopeRule>,
}

impl ScopeRules {
    /// Items without rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every rule tag in a note, in order of appearance.
    ///
    /// Tag names are matched ignoring ASCII case, and the words may be
    /// joined by `-`, `_`, or a space. Text outside tags is ignored. An
    /// opening tag without a closing tag is skipped.
    ///
    /// # Errors
    ///
    /// [`ScopeRuleError::UnknownScope`] if a tag names a scope missing from
    /// `registry`, and [`ScopeRuleError::Parse`] if a condition does not
    /// compile. Parse offsets are relative to the condition body.
    pub fn parse_note(note: &str, registry: &ScopeRegistry) -> Result<Self, ScopeRuleError> {
        // ASCII lowercasing keeps byte offsets aligned with `note`.
        let lower = note.to_ascii_lowercase();
        let mut rules = Vec::new();
        let mut cursor = 0;

        while let Some(found) = lower[cursor..].find('<') {
            let start = cursor + found;
            let Some(after_open) = match_words(&lower, start + 1, "rule:") else {
                cursor = start + 1;
                continue;
            };
            let Some(name_len) = lower[after_open..].find('>') else {
                break;
            };
            let name = note[after_open..after_open + name_len].trim();
            let body_start = after_open + name_len + 1;

            let Some((body_end, resume)) = find_close(&lower, body_start) else {
                warn!(scope = name, "scope change rule without closing tag");
                cursor = body_start;
                continue;
            };

            let scope = registry
                .id(name)
                .ok_or_else(|| ScopeRuleError::UnknownScope(name.to_string()))?;
            let condition = Predicate::parse(&note[body_start..body_end])?;
            debug!(%scope, "scope change rule");
            rules.push(ScopeRule { scope, condition });
            cursor = resume;
        }

        Ok(Self { rules })
    }

    /// Scope of the first rule whose condition holds, else `default`.
    #[must_use]
    pub fn resolve(&self, ctx: &dyn ScopeContext, default: ScopeId) -> ScopeId {
        self.rules
            .iter()
            .find(|rule| rule.condition.evaluate(ctx))
            .map_or(default, |rule| rule.scope)
    }

    /// Appends a rule after the parsed ones.
    pub fn push(&mut self, rule: ScopeRule) {
        self.rules.push(rule);
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &ScopeRule> {
        self.rules.iter()
    }
}

/// Matches `scope?change?rule` plus `tail` at `at`, where `?` is one of
/// `-`, `_`, or a space. Returns the offset just past the match.
fn match_words(lower: &str, at: usize, tail: &str) -> Option<usize> {
    let rest = lower.get(at..)?;
    let rest = rest.strip_prefix("scope")?;
    let rest = strip_separator(rest)?.strip_prefix("change")?;
    let rest = strip_separator(rest)?.strip_prefix(tail)?;
    Some(lower.len() - rest.len())
}

fn strip_separator(text: &str) -> Option<&str> {
    text.strip_prefix(['-', '_', ' '])
}

/// Finds the closing tag after `from`. Returns the body end and the offset
/// past the tag.
fn find_close(lower: &str, from: usize) -> Option<(usize, usize)> {
    let mut cursor = from;
    while let Some(found) = lower[cursor..].find("</") {
        let start = cursor + found;
        if let Some(end) = match_words(lower, start + 2, "rule>") {
            return Some((start, end));
        }
        cursor = start + 2;
    }
    None
}
