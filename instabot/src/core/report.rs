//! Run report: successful action counts keyed by `(tag, kind)`.

use std::collections::BTreeMap;

use crate::core::quota::QuotaTracker;
use crate::core::types::{ActionKind, Tag};

/// One report line key. Structural equality; storage order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportKey {
    pub tag: Tag,
    pub kind: ActionKind,
}

/// Global totals per kind. Always equal to the sum of report lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub followed: u32,
    pub liked: u32,
    pub commented: u32,
}

impl RunCounters {
    pub fn get(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Follow => self.followed,
            ActionKind::Like => self.liked,
            ActionKind::Comment => self.commented,
        }
    }

    fn bump(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Follow => self.followed += 1,
            ActionKind::Like => self.liked += 1,
            ActionKind::Comment => self.commented += 1,
        }
    }
}

/// Append-only aggregation of successful actions.
#[derive(Debug, Clone, Default)]
pub struct Report {
    lines: BTreeMap<ReportKey, u32>,
    counters: RunCounters,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tag: &Tag, kind: ActionKind) {
        let key = ReportKey {
            tag: tag.clone(),
            kind,
        };
        *self.lines.entry(key).or_insert(0) += 1;
        self.counters.bump(kind);
    }

    pub fn get(&self, tag: &Tag, kind: ActionKind) -> u32 {
        self.lines
            .get(&ReportKey {
                tag: tag.clone(),
                kind,
            })
            .copied()
            .unwrap_or(0)
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of every line of `kind`, for cross-checking [`RunCounters`].
    pub fn total(&self, kind: ActionKind) -> u32 {
        self.lines
            .iter()
            .filter(|(key, _)| key.kind == kind)
            .map(|(_, count)| *count)
            .sum()
    }

    /// Render `"<kind> <count>/<quota>"` for each kind recorded under `tag`,
    /// joined with `" - "`. Returns `None` if nothing was recorded yet.
    pub fn render_progress(&self, tag: &Tag, quota: &QuotaTracker) -> Option<String> {
        let mut line = String::new();
        for kind in ActionKind::ALL {
            let count = self.get(tag, kind);
            if count == 0 {
                continue;
            }
            line.push_str(&format!("{kind} {count}/{} - ", quota.limit(tag, kind)));
        }
        let line = line.trim_end_matches(" - ");
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }

    /// Render one sentence per line, e.g. `#travel has been liked 3 times`.
    pub fn render_final(&self) -> String {
        let mut out = String::new();
        for (key, count) in &self.lines {
            let times = if *count == 1 { "time" } else { "times" };
            out.push_str(&format!(
                "#{} has been {} {} {}\n",
                key.tag,
                key.kind.past_tense(),
                count,
                times
            ));
        }
        out
    }
}
