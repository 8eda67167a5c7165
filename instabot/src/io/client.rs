//! Remote service abstraction.
//!
//! The [`SocialClient`] trait decouples the engine from the service backend.
//! Tests use scripted clients that return predetermined batches and failures
//! without touching the network.

use crate::core::types::{Candidate, Tag};
use crate::error::RemoteError;

/// Authenticated session handle returned by [`SocialClient::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account: String,
}

pub trait SocialClient {
    fn login(&self) -> Result<Session, RemoteError>;

    /// Next batch of candidates under `tag`. Finite; may be empty.
    fn list_candidates(&self, session: &Session, tag: &Tag) -> Result<Vec<Candidate>, RemoteError>;

    fn follow(&self, session: &Session, username: &str) -> Result<(), RemoteError>;
    fn like(&self, session: &Session, post_id: &str) -> Result<(), RemoteError>;
    fn comment(&self, session: &Session, post_id: &str, text: &str) -> Result<(), RemoteError>;
    fn unfollow(&self, session: &Session, username: &str) -> Result<(), RemoteError>;

    /// Accounts the session follows, in the service's order.
    fn list_following(&self, session: &Session) -> Result<Vec<String>, RemoteError>;
    fn list_followers(&self, session: &Session) -> Result<Vec<String>, RemoteError>;
}
