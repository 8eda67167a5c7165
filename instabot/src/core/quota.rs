//! Per-tag, per-kind action counters bounded by configured quotas.

use std::collections::{BTreeMap, HashMap};

use crate::core::limits::TagQuota;
use crate::core::types::{ActionKind, Tag};

/// Tracks how many actions of each kind were performed under each tag.
///
/// Invariant: `count(tag, kind) <= limit(tag, kind)` at all times.
#[derive(Debug, Clone, Default)]
pub struct QuotaTracker {
    quotas: BTreeMap<Tag, TagQuota>,
    counts: HashMap<(Tag, ActionKind), u32>,
}

impl QuotaTracker {
    pub fn new(quotas: BTreeMap<Tag, TagQuota>) -> Self {
        Self {
            quotas,
            counts: HashMap::new(),
        }
    }

    /// Configured maximum; unknown tags have a quota of zero.
    pub fn limit(&self, tag: &Tag, kind: ActionKind) -> u32 {
        self.quotas.get(tag).map(|quota| quota.get(kind)).unwrap_or(0)
    }

    pub fn count(&self, tag: &Tag, kind: ActionKind) -> u32 {
        self.counts.get(&(tag.clone(), kind)).copied().unwrap_or(0)
    }

    pub fn remaining(&self, tag: &Tag, kind: ActionKind) -> u32 {
        self.limit(tag, kind).saturating_sub(self.count(tag, kind))
    }

    /// True once no kind has any remaining quota under `tag`.
    pub fn exhausted(&self, tag: &Tag) -> bool {
        ActionKind::ALL
            .iter()
            .all(|kind| self.remaining(tag, *kind) == 0)
    }

    /// Count one confirmed action. Returns `false` without counting when the
    /// quota is already spent.
    pub fn record(&mut self, tag: &Tag, kind: ActionKind) -> bool {
        if self.remaining(tag, kind) == 0 {
            return false;
        }
        *self.counts.entry((tag.clone(), kind)).or_insert(0) += 1;
        true
    }
}
