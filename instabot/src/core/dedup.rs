//! Run-scoped record of identities already acted upon.

use std::collections::HashSet;

use crate::core::types::ActionKind;

/// Set of `(kind, identity)` pairs that succeeded during the current run.
///
/// Scope is the whole run, not a single tag. Only confirmed successes are
/// marked.
#[derive(Debug, Default, Clone)]
pub struct DedupTracker {
    seen: HashSet<(ActionKind, String)>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, kind: ActionKind, identity: &str) -> bool {
        self.seen.contains(&(kind, identity.to_string()))
    }

    /// Returns `false` if the pair was already present.
    pub fn mark(&mut self, kind: ActionKind, identity: &str) -> bool {
        self.seen.insert((kind, identity.to_string()))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
