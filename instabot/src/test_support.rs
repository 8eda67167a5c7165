//! Test-only doubles for the client, notifier and sleeper seams.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use anyhow::Result;

use crate::core::limits::{LimitRange, Limits};
use crate::core::types::{Candidate, Tag};
use crate::error::RemoteError;
use crate::io::client::{Session, SocialClient};
use crate::io::config::{BotConfig, RetryConfig};
use crate::io::notifier::{Notifier, RunStatus};
use crate::retry::Sleeper;

/// One recorded client call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Call {
    Login,
    List(String),
    Follow(String),
    Like(String),
    Comment(String, String),
    Unfollow(String),
    ListFollowing,
    ListFollowers,
}

/// Client that serves fixed batches, records every call and fails chosen
/// calls a set number of times before succeeding.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    tags: BTreeMap<String, Vec<Candidate>>,
    following: Vec<String>,
    followers: Vec<String>,
    failures: RefCell<HashMap<Call, (u32, RemoteError)>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedClient {
    pub fn with_tag(mut self, tag: &str, candidates: Vec<Candidate>) -> Self {
        self.tags.insert(tag.to_string(), candidates);
        self
    }

    pub fn with_following(mut self, usernames: &[&str]) -> Self {
        self.following = usernames.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_followers(mut self, usernames: &[&str]) -> Self {
        self.followers = usernames.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Fail `call` the next `times` times with `error`.
    pub fn failing(self, call: Call, times: u32, error: RemoteError) -> Self {
        self.failures.borrow_mut().insert(call, (times, error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_of(&self, filter: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| filter(call))
            .cloned()
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(call.clone());
        let mut failures = self.failures.borrow_mut();
        if let Some((remaining, error)) = failures.get_mut(&call)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(error.clone());
        }
        Ok(())
    }
}

impl SocialClient for ScriptedClient {
    fn login(&self) -> Result<Session, RemoteError> {
        self.record(Call::Login)?;
        Ok(Session {
            account: "tester".to_string(),
        })
    }

    fn list_candidates(
        &self,
        _session: &Session,
        tag: &Tag,
    ) -> Result<Vec<Candidate>, RemoteError> {
        self.record(Call::List(tag.to_string()))?;
        Ok(self.tags.get(tag.as_str()).cloned().unwrap_or_default())
    }

    fn follow(&self, _session: &Session, username: &str) -> Result<(), RemoteError> {
        self.record(Call::Follow(username.to_string()))
    }

    fn like(&self, _session: &Session, post_id: &str) -> Result<(), RemoteError> {
        self.record(Call::Like(post_id.to_string()))
    }

    fn comment(&self, _session: &Session, post_id: &str, text: &str) -> Result<(), RemoteError> {
        self.record(Call::Comment(post_id.to_string(), text.to_string()))
    }

    fn unfollow(&self, _session: &Session, username: &str) -> Result<(), RemoteError> {
        self.record(Call::Unfollow(username.to_string()))
    }

    fn list_following(&self, _session: &Session) -> Result<Vec<String>, RemoteError> {
        self.record(Call::ListFollowing)?;
        Ok(self.following.clone())
    }

    fn list_followers(&self, _session: &Session) -> Result<Vec<String>, RemoteError> {
        self.record(Call::ListFollowers)?;
        Ok(self.followers.clone())
    }
}

/// Notifier that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<(RunStatus, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(RunStatus, String)> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, status: RunStatus, body: &str) -> Result<()> {
        self.messages.borrow_mut().push((status, body.to_string()));
        Ok(())
    }
}

/// Sleeper that records requested waits instead of blocking.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }

    pub fn total(&self) -> Duration {
        self.slept.borrow().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

/// Candidate with a deterministic post id of `<username>-post`.
pub fn candidate(tag: &str, username: &str, follower_count: u64) -> Candidate {
    Candidate {
        username: username.to_string(),
        post_id: format!("{username}-post"),
        follower_count,
        tag: Tag::new(tag),
    }
}

/// Config with ranges `[10, 10000]` for every kind, no tags, and a fast
/// three-attempt retry policy.
pub fn base_config() -> BotConfig {
    let range = LimitRange::new(10, 10_000);
    BotConfig {
        limits: Limits {
            like: range,
            follow: range,
            comment: range,
        },
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_secs: 1,
        },
        ..BotConfig::default()
    }
}
