//! Follower-count ranges and per-tag quotas, plus their load-time invariants.

use serde::{Deserialize, Serialize};

use crate::core::types::ActionKind;

/// Inclusive follower-count bounds for one action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRange {
    pub min: u64,
    pub max: u64,
}

impl LimitRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, follower_count: u64) -> bool {
        self.min <= follower_count && follower_count <= self.max
    }

    /// True if every value in `self` is also inside `outer`.
    pub fn nests_in(&self, outer: &LimitRange) -> bool {
        outer.min <= self.min && self.max <= outer.max
    }
}

/// One [`LimitRange`] per action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub like: LimitRange,
    pub follow: LimitRange,
    pub comment: LimitRange,
}

impl Limits {
    pub fn range(&self, kind: ActionKind) -> &LimitRange {
        match kind {
            ActionKind::Follow => &self.follow,
            ActionKind::Like => &self.like,
            ActionKind::Comment => &self.comment,
        }
    }

    pub fn range_mut(&mut self, kind: ActionKind) -> &mut LimitRange {
        match kind {
            ActionKind::Follow => &mut self.follow,
            ActionKind::Like => &mut self.like,
            ActionKind::Comment => &mut self.comment,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            like: LimitRange::new(0, 10_000),
            follow: LimitRange::new(0, 10_000),
            comment: LimitRange::new(0, 10_000),
        }
    }
}

/// Maximum actions per kind for a single tag. Absent kinds are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagQuota {
    pub follow: u32,
    pub like: u32,
    pub comment: u32,
}

impl TagQuota {
    pub fn get(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Follow => self.follow,
            ActionKind::Like => self.like,
            ActionKind::Comment => self.comment,
        }
    }
}

/// Check range invariants:
/// - `min <= max` for every kind
/// - follow and comment ranges nest inside the like range
pub fn validate_limits(limits: &Limits) -> Vec<String> {
    let mut errors = Vec::new();

    for kind in ActionKind::ALL {
        let range = limits.range(kind);
        if range.min > range.max {
            errors.push(format!(
                "limits.{kind}: min {} exceeds max {}",
                range.min, range.max
            ));
        }
    }

    for kind in [ActionKind::Follow, ActionKind::Comment] {
        let range = limits.range(kind);
        if !range.nests_in(&limits.like) {
            errors.push(format!(
                "limits.{kind} [{}, {}] must be inside limits.like [{}, {}]",
                range.min, range.max, limits.like.min, limits.like.max
            ));
        }
    }

    errors
}
