//! Pure allow/deny decisions for a candidate and action kind.

use std::collections::HashSet;

use crate::core::dedup::DedupTracker;
use crate::core::limits::Limits;
use crate::core::types::{ActionKind, Candidate};

/// Outcome of an eligibility check. Every variant except `Allow` is an
/// expected skip, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Blacklisted,
    AlreadyActed,
    OutOfRange,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Static user lists and ranges that gate every action.
#[derive(Debug, Clone)]
pub struct Evaluator {
    limits: Limits,
    blacklist: HashSet<String>,
    whitelist: HashSet<String>,
    dedup: bool,
}

impl Evaluator {
    pub fn new(
        limits: Limits,
        blacklist: impl IntoIterator<Item = String>,
        whitelist: impl IntoIterator<Item = String>,
        dedup: bool,
    ) -> Self {
        Self {
            limits,
            blacklist: blacklist.into_iter().collect(),
            whitelist: whitelist.into_iter().collect(),
            dedup,
        }
    }

    /// Decide whether `kind` may be performed on `candidate`.
    ///
    /// Order: blacklist, dedup (when enabled), whitelist, follower range. The
    /// whitelist bypasses the range but never dedup.
    pub fn decide(&self, candidate: &Candidate, kind: ActionKind, seen: &DedupTracker) -> Decision {
        let identity = candidate.username.as_str();
        if self.blacklist.contains(identity) {
            return Decision::Blacklisted;
        }
        if self.dedup && seen.seen(kind, identity) {
            return Decision::AlreadyActed;
        }
        if self.whitelist.contains(identity) {
            return Decision::Allow;
        }
        if self.limits.range(kind).contains(candidate.follower_count) {
            Decision::Allow
        } else {
            Decision::OutOfRange
        }
    }

    pub fn allow(&self, candidate: &Candidate, kind: ActionKind, seen: &DedupTracker) -> bool {
        self.decide(candidate, kind, seen).is_allowed()
    }

    pub fn is_whitelisted(&self, identity: &str) -> bool {
        self.whitelist.contains(identity)
    }
}
