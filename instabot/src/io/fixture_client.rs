//! [`SocialClient`] backed by a JSON account snapshot.
//!
//! Listings come from the snapshot; actions are logged and succeed without
//! touching any remote service.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::core::types::{Candidate, Tag};
use crate::error::RemoteError;
use crate::io::client::{Session, SocialClient};

/// One post entry in the snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct FixturePost {
    pub username: String,
    pub post_id: String,
    pub follower_count: u64,
}

/// Snapshot file layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub account: String,
    pub following: Vec<String>,
    pub followers: Vec<String>,
    pub tags: BTreeMap<String, Vec<FixturePost>>,
}

#[derive(Debug, Clone)]
pub struct FixtureClient {
    fixture: Fixture,
}

impl FixtureClient {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read fixture {}", path.display()))?;
        let fixture: Fixture =
            serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        Ok(Self::new(fixture))
    }
}

impl SocialClient for FixtureClient {
    fn login(&self) -> Result<Session, RemoteError> {
        info!(account = %self.fixture.account, "logged in");
        Ok(Session {
            account: self.fixture.account.clone(),
        })
    }

    fn list_candidates(
        &self,
        _session: &Session,
        tag: &Tag,
    ) -> Result<Vec<Candidate>, RemoteError> {
        let posts = self
            .fixture
            .tags
            .get(tag.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(posts
            .iter()
            .map(|post| Candidate {
                username: post.username.clone(),
                post_id: post.post_id.clone(),
                follower_count: post.follower_count,
                tag: tag.clone(),
            })
            .collect())
    }

    fn follow(&self, _session: &Session, username: &str) -> Result<(), RemoteError> {
        info!(username, "follow (fixture)");
        Ok(())
    }

    fn like(&self, _session: &Session, post_id: &str) -> Result<(), RemoteError> {
        info!(post_id, "like (fixture)");
        Ok(())
    }

    fn comment(&self, _session: &Session, post_id: &str, text: &str) -> Result<(), RemoteError> {
        info!(post_id, text, "comment (fixture)");
        Ok(())
    }

    fn unfollow(&self, _session: &Session, username: &str) -> Result<(), RemoteError> {
        info!(username, "unfollow (fixture)");
        Ok(())
    }

    fn list_following(&self, _session: &Session) -> Result<Vec<String>, RemoteError> {
        Ok(self.fixture.following.clone())
    }

    fn list_followers(&self, _session: &Session) -> Result<Vec<String>, RemoteError> {
        Ok(self.fixture.followers.clone())
    }
}
