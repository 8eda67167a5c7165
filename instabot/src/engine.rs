//! Run loop: tag iteration, gated actions, unfollow sync and final report.
//!
//! Everything runs on the calling thread, one remote action at a time. The
//! quota, dedup and report state is owned by a single run and returned in
//! [`RunResult`]; nothing is shared across runs.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument};

use crate::core::dedup::DedupTracker;
use crate::core::eligibility::{Decision, Evaluator};
use crate::core::quota::QuotaTracker;
use crate::core::report::{Report, RunCounters};
use crate::core::types::{ActionKind, Candidate, Tag, TagDone, TagState};
use crate::error::EngineError;
use crate::io::client::{Session, SocialClient};
use crate::io::config::BotConfig;
use crate::io::notifier::{Notifier, RunStatus, notify_or_log};
use crate::retry::{RetryExecutor, Sleeper};

/// Everything a finished run produced.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub report: Report,
    /// Accounts unfollowed by an unfollow sync, in the order processed.
    pub unfollowed: Vec<String>,
    /// Final state of every tag in the working set, in visiting order.
    pub tags: Vec<(Tag, TagState)>,
}

impl RunResult {
    pub fn counters(&self) -> RunCounters {
        self.report.counters()
    }
}

/// Mutable state owned by one tag-loop run.
struct RunState {
    quota: QuotaTracker,
    dedup: DedupTracker,
    report: Report,
}

pub struct Engine<'a, C, N, S> {
    config: &'a BotConfig,
    client: &'a C,
    notifier: &'a N,
    sleeper: &'a S,
}

impl<'a, C: SocialClient, N: Notifier, S: Sleeper> Engine<'a, C, N, S> {
    pub fn new(config: &'a BotConfig, client: &'a C, notifier: &'a N, sleeper: &'a S) -> Self {
        Self {
            config,
            client,
            notifier,
            sleeper,
        }
    }

    fn retry(&self) -> RetryExecutor<'a, N, S> {
        RetryExecutor::new(self.config.retry_policy(), self.notifier, self.sleeper)
    }

    /// Process every configured tag in order.
    pub fn run_tag_loop<R: Rng>(&self, rng: &mut R) -> Result<RunResult, EngineError> {
        self.config.validate()?;
        self.run_tags(self.config.tag_list(), rng)
    }

    /// Process `amount` distinct tags sampled from the configured list.
    ///
    /// `amount` is checked before any network activity.
    pub fn run_multi_tag_loop<R: Rng>(
        &self,
        amount: usize,
        rng: &mut R,
    ) -> Result<RunResult, EngineError> {
        self.config.validate()?;
        let tags = sample_tags(&self.config.tag_list(), amount, rng)?;
        info!(
            tags = %tags.iter().map(Tag::as_str).collect::<Vec<_>>().join(", "),
            "sampled tags"
        );
        self.run_tags(tags, rng)
    }

    /// Unfollow every followed account that does not follow back, except
    /// whitelisted ones. Quotas and eligibility do not apply.
    #[instrument(skip_all)]
    pub fn run_unfollow_sync(&self) -> Result<RunResult, EngineError> {
        self.config.validate()?;
        let retry = self.retry();
        let session = retry.execute("login", || self.client.login())?;
        let following = retry.execute("list following", || self.client.list_following(&session))?;
        let followers: HashSet<String> = retry
            .execute("list followers", || self.client.list_followers(&session))?
            .into_iter()
            .collect();
        info!(
            following = following.len(),
            followers = followers.len(),
            "syncing followers"
        );

        let evaluator = self.config.evaluator();
        let mut processed = HashSet::new();
        let mut unfollowed = Vec::new();
        for username in following {
            if !processed.insert(username.clone()) || followers.contains(&username) {
                continue;
            }
            if evaluator.is_whitelisted(&username) {
                debug!(username = %username, "whitelisted, keeping");
                continue;
            }
            retry.execute(&format!("unfollow {username}"), || {
                self.client.unfollow(&session, &username)
            })?;
            info!(username = %username, "unfollowed");
            unfollowed.push(username);
        }

        Ok(RunResult {
            unfollowed,
            ..RunResult::default()
        })
    }

    fn run_tags<R: Rng>(&self, tags: Vec<Tag>, rng: &mut R) -> Result<RunResult, EngineError> {
        let retry = self.retry();
        let session = retry.execute("login", || self.client.login())?;
        let evaluator = self.config.evaluator();
        let mut state = RunState {
            quota: QuotaTracker::new(self.config.quotas()),
            dedup: DedupTracker::new(),
            report: Report::new(),
        };

        let mut tag_states: Vec<(Tag, TagState)> = tags
            .into_iter()
            .map(|tag| (tag, TagState::Pending))
            .collect();
        for (tag, tag_state) in &mut tag_states {
            if self.config.is_tag_blacklisted(tag) {
                info!(tag = %tag, "tag is blacklisted, skipping");
                *tag_state = TagState::Skipped;
                continue;
            }
            *tag_state = TagState::InProgress;
            info!(tag = %tag, "processing tag");
            let done = self.run_tag(&retry, &session, tag, &evaluator, &mut state, rng)?;
            debug!(tag = %tag, ?done, "tag done");
            *tag_state = TagState::Done(done);
        }

        Ok(RunResult {
            report: state.report,
            unfollowed: Vec::new(),
            tags: tag_states,
        })
    }

    #[instrument(skip_all, fields(tag = %tag))]
    fn run_tag<R: Rng>(
        &self,
        retry: &RetryExecutor<'a, N, S>,
        session: &Session,
        tag: &Tag,
        evaluator: &Evaluator,
        state: &mut RunState,
        rng: &mut R,
    ) -> Result<TagDone, EngineError> {
        if state.quota.exhausted(tag) {
            return Ok(TagDone::QuotaFilled);
        }
        let candidates = retry.execute(&format!("list #{tag}"), || {
            self.client.list_candidates(session, tag)
        })?;
        debug!(candidates = candidates.len(), "fetched candidates");

        for candidate in &candidates {
            for kind in ActionKind::ALL {
                if state.quota.remaining(tag, kind) == 0 {
                    debug!(username = %candidate.username, %kind, "quota exhausted");
                    continue;
                }
                let decision = evaluator.decide(candidate, kind, &state.dedup);
                if decision != Decision::Allow {
                    debug!(username = %candidate.username, %kind, ?decision, "not eligible");
                    continue;
                }
                if !self.perform(retry, session, candidate, kind, rng)? {
                    continue;
                }

                state.quota.record(tag, kind);
                state.dedup.mark(kind, &candidate.username);
                state.report.add(tag, kind);
                if let Some(line) = state.report.render_progress(tag, &state.quota) {
                    info!("#{tag}: {line}");
                }
            }
            if state.quota.exhausted(tag) {
                return Ok(TagDone::QuotaFilled);
            }
        }
        Ok(TagDone::Exhausted)
    }

    /// Perform one action through the retry executor. Returns `false` when
    /// there was nothing to send (empty comment pool).
    fn perform<R: Rng>(
        &self,
        retry: &RetryExecutor<'a, N, S>,
        session: &Session,
        candidate: &Candidate,
        kind: ActionKind,
        rng: &mut R,
    ) -> Result<bool, EngineError> {
        match kind {
            ActionKind::Follow => {
                retry.execute(&format!("follow {}", candidate.username), || {
                    self.client.follow(session, &candidate.username)
                })?;
            }
            ActionKind::Like => {
                retry.execute(&format!("like {}", candidate.post_id), || {
                    self.client.like(session, &candidate.post_id)
                })?;
            }
            ActionKind::Comment => {
                let Some(text) = self.config.comments.choose(rng) else {
                    debug!("comment pool is empty");
                    return Ok(false);
                };
                retry.execute(&format!("comment {}", candidate.post_id), || {
                    self.client.comment(session, &candidate.post_id, text)
                })?;
            }
        }
        Ok(true)
    }
}

/// Draw `amount` distinct tags without replacement.
pub fn sample_tags<R: Rng>(
    tags: &[Tag],
    amount: usize,
    rng: &mut R,
) -> Result<Vec<Tag>, EngineError> {
    if amount == 0 || amount > tags.len() {
        return Err(EngineError::config(format!(
            "amount must be between 1 and the number of configured tags ({}), got {amount}",
            tags.len()
        )));
    }
    Ok(tags.choose_multiple(rng, amount).cloned().collect())
}

/// Render the final report, log it, and hand it to the notifier.
pub fn render_and_notify<N: Notifier>(result: &RunResult, notifier: &N) -> String {
    let mut body = result.report.render_final();
    match result.unfollowed.len() {
        0 => {}
        1 => body.push_str("1 user has been unfollowed\n"),
        n => body.push_str(&format!("{n} users have been unfollowed\n")),
    }
    if body.is_empty() {
        body.push_str("No action has been performed\n");
    }

    let counters = result.counters();
    info!(
        followed = counters.followed,
        liked = counters.liked,
        commented = counters.commented,
        unfollowed = result.unfollowed.len(),
        "run finished\n{body}"
    );
    notify_or_log(notifier, RunStatus::Success, &body);
    body
}
