//! Shared deterministic types for the action engine.
//!
//! These types define stable contracts between core components. They carry no
//! I/O and compare structurally so they can be used as map keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of actions the engine performs on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Follow,
    Like,
    Comment,
}

impl ActionKind {
    /// Fixed priority order used when processing a candidate.
    pub const ALL: [ActionKind; 3] = [ActionKind::Follow, ActionKind::Like, ActionKind::Comment];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Follow => "follow",
            ActionKind::Like => "like",
            ActionKind::Comment => "comment",
        }
    }

    /// Past tense used in the final report ("liked" is not "like" + "ed").
    pub fn past_tense(self) -> &'static str {
        match self {
            ActionKind::Follow => "followed",
            ActionKind::Like => "liked",
            ActionKind::Comment => "commented",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topical label under which candidates are discovered, stored without `#`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A post discovered under a tag, together with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Author identity; follows and dedup are keyed on it.
    pub username: String,
    /// Post identity; likes and comments target it.
    pub post_id: String,
    pub follower_count: u64,
    /// Tag the candidate was listed under.
    pub tag: Tag,
}

/// Per-tag lifecycle inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    Pending,
    InProgress,
    Done(TagDone),
    /// Tag is on the tag blacklist and was never fetched.
    Skipped,
}

/// Why a tag finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDone {
    /// The candidate batch ran out.
    Exhausted,
    /// Every (tag, kind) quota reached zero remaining.
    QuotaFilled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn past_tense_handles_like() {
        assert_eq!(ActionKind::Like.past_tense(), "liked");
        assert_eq!(ActionKind::Follow.past_tense(), "followed");
        assert_eq!(ActionKind::Comment.past_tense(), "commented");
    }

    #[test]
    fn priority_order_is_follow_like_comment() {
        assert_eq!(
            ActionKind::ALL,
            [ActionKind::Follow, ActionKind::Like, ActionKind::Comment]
        );
    }
}
