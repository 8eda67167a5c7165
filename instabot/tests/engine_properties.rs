//! Run-level properties of the engine driven through scripted doubles.
//!
//! Each test builds a config, a scripted client and recording notifier and
//! sleeper, runs one engine mode end to end, and checks the observable
//! outcome: remote calls, report counts and notifications.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use instabot::core::backoff::cumulative_delay;
use instabot::core::limits::{LimitRange, TagQuota};
use instabot::core::types::{ActionKind, Tag, TagDone, TagState};
use instabot::engine::{Engine, render_and_notify};
use instabot::error::{EngineError, RemoteError};
use instabot::io::notifier::RunStatus;
use instabot::test_support::{
    Call, RecordingNotifier, RecordingSleeper, ScriptedClient, base_config, candidate,
};

fn quota(follow: u32, like: u32, comment: u32) -> TagQuota {
    TagQuota {
        follow,
        like,
        comment,
    }
}

#[test]
fn never_exceeds_any_tag_quota() {
    let mut config = base_config();
    config.comments = vec!["Great shot".to_string(), "Love it".to_string()];
    config.tags.insert("travel".to_string(), quota(2, 3, 1));
    config.tags.insert("food".to_string(), quota(1, 1, 0));
    let many = |tag: &str| {
        (0..10)
            .map(|i| candidate(tag, &format!("{tag}{i}"), 500))
            .collect::<Vec<_>>()
    };
    let client = ScriptedClient::default()
        .with_tag("travel", many("travel"))
        .with_tag("food", many("food"));
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let result = Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .expect("run");

    let travel = Tag::new("travel");
    let food = Tag::new("food");
    assert_eq!(result.report.get(&travel, ActionKind::Follow), 2);
    assert_eq!(result.report.get(&travel, ActionKind::Like), 3);
    assert_eq!(result.report.get(&travel, ActionKind::Comment), 1);
    assert_eq!(result.report.get(&food, ActionKind::Follow), 1);
    assert_eq!(result.report.get(&food, ActionKind::Like), 1);
    assert_eq!(result.report.get(&food, ActionKind::Comment), 0);
    assert_eq!(
        client
            .calls_of(|call| matches!(call, Call::Follow(_) | Call::Like(_) | Call::Comment(..)))
            .len(),
        8
    );
    assert!(
        result
            .tags
            .iter()
            .all(|(_, state)| *state == TagState::Done(TagDone::QuotaFilled))
    );
}

#[test]
fn out_of_range_candidates_are_never_acted_on() {
    let mut config = base_config();
    config.limits.follow = LimitRange::new(100, 1_000);
    config.tags.insert("travel".to_string(), quota(5, 5, 0));
    let client = ScriptedClient::default().with_tag(
        "travel",
        vec![
            candidate("travel", "tiny", 5),
            candidate("travel", "mid", 50),
            candidate("travel", "big", 500),
            candidate("travel", "huge", 50_000),
        ],
    );
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let result = Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .expect("run");

    assert_eq!(
        client.calls_of(|call| matches!(call, Call::Follow(_))),
        vec![Call::Follow("big".to_string())]
    );
    assert_eq!(
        client.calls_of(|call| matches!(call, Call::Like(_))),
        vec![
            Call::Like("mid-post".to_string()),
            Call::Like("big-post".to_string())
        ]
    );
    assert_eq!(
        result.tags,
        vec![(Tag::new("travel"), TagState::Done(TagDone::Exhausted))]
    );
}

#[test]
fn blacklist_beats_whitelist_and_whitelist_beats_range() {
    let mut config = base_config();
    config.blacklist.push("banned".to_string());
    config.whitelist.push("banned".to_string());
    config.whitelist.push("friend".to_string());
    config.tags.insert("travel".to_string(), quota(0, 5, 0));
    let client = ScriptedClient::default().with_tag(
        "travel",
        vec![
            candidate("travel", "banned", 500),
            candidate("travel", "friend", 1),
        ],
    );
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .expect("run");

    assert_eq!(
        client.calls_of(|call| matches!(call, Call::Like(_))),
        vec![Call::Like("friend-post".to_string())]
    );
}

#[test]
fn dedup_off_allows_repeat_identities() {
    let mut config = base_config();
    config.tags.insert("food".to_string(), quota(0, 5, 0));
    config.tags.insert("travel".to_string(), quota(0, 5, 0));
    let client = ScriptedClient::default()
        .with_tag("food", vec![candidate("food", "alice", 500)])
        .with_tag("travel", vec![candidate("travel", "alice", 500)]);
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let result = Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .expect("run");

    assert_eq!(result.counters().liked, 2);
}

#[test]
fn transient_failures_wait_one_then_two_units() {
    let mut config = base_config();
    config.tags.insert("travel".to_string(), quota(0, 1, 0));
    let client = ScriptedClient::default()
        .with_tag("travel", vec![candidate("travel", "a", 500)])
        .failing(
            Call::Like("a-post".to_string()),
            2,
            RemoteError::RateLimited("429".to_string()),
        );
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let result = Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .expect("run");

    let base = Duration::from_secs(config.retry.base_delay_secs);
    assert_eq!(sleeper.slept(), vec![base, base * 2]);
    assert_eq!(sleeper.total(), cumulative_delay(base, 2));
    assert_eq!(result.counters().liked, 1);
    assert!(notifier.messages().is_empty());
}

#[test]
fn exhausted_retries_abort_the_run_and_notify_failure() {
    let mut config = base_config();
    config.tags.insert("travel".to_string(), quota(0, 1, 0));
    let client = ScriptedClient::default().failing(
        Call::Login,
        u32::MAX,
        RemoteError::Rejected("checkpoint required".to_string()),
    );
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let err = Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .unwrap_err();

    assert!(matches!(err, EngineError::Unrecoverable { attempts: 3, .. }));
    assert_eq!(client.calls(), vec![Call::Login; 3]);
    assert_eq!(sleeper.slept().len(), 2);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, RunStatus::Failure);
    assert!(messages[0].1.contains("checkpoint required"));
}

#[test]
fn final_report_matches_performed_actions() {
    let mut config = base_config();
    config.tags.insert("travel".to_string(), quota(0, 3, 0));
    let client = ScriptedClient::default().with_tag(
        "travel",
        (0..5)
            .map(|i| candidate("travel", &format!("u{i}"), 500))
            .collect(),
    );
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let result = Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .expect("run");
    let body = render_and_notify(&result, &notifier);

    assert_eq!(body, "#travel has been liked 3 times\n");
    assert_eq!(notifier.messages(), vec![(RunStatus::Success, body)]);
}

#[test]
fn empty_run_reports_no_action() {
    let config = base_config();
    let client = ScriptedClient::default();
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let result = Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .expect("run");

    assert_eq!(
        render_and_notify(&result, &notifier),
        "No action has been performed\n"
    );
}

#[test]
fn unfollow_sync_unfollows_only_non_followers() {
    let config = base_config();
    let client = ScriptedClient::default()
        .with_following(&["A", "B", "C"])
        .with_followers(&["B"]);
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let result = Engine::new(&config, &client, &notifier, &sleeper)
        .run_unfollow_sync()
        .expect("sync");

    assert_eq!(result.unfollowed, vec!["A", "C"]);
    assert!(result.report.is_empty());
    assert_eq!(
        render_and_notify(&result, &notifier),
        "2 users have been unfollowed\n"
    );
}

#[test]
fn multi_tag_loop_visits_exactly_amount_distinct_tags() {
    let mut config = base_config();
    for name in ["a", "b", "c", "d", "e"] {
        config.tags.insert(name.to_string(), quota(0, 1, 0));
    }
    let client = ScriptedClient::default();
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let result = Engine::new(&config, &client, &notifier, &sleeper)
        .run_multi_tag_loop(2, &mut StdRng::seed_from_u64(3))
        .expect("run");

    assert_eq!(result.tags.len(), 2);
    assert_ne!(result.tags[0].0, result.tags[1].0);
    let listed = client.calls_of(|call| matches!(call, Call::List(_)));
    assert_eq!(listed.len(), 2);
}

#[test]
fn multi_tag_loop_rejects_zero_amount() {
    let mut config = base_config();
    config.tags.insert("a".to_string(), quota(0, 1, 0));
    let client = ScriptedClient::default();
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let err = Engine::new(&config, &client, &notifier, &sleeper)
        .run_multi_tag_loop(0, &mut StdRng::seed_from_u64(3))
        .unwrap_err();

    assert!(matches!(err, EngineError::Configuration(_)));
    assert!(client.calls().is_empty());
}

#[test]
fn invalid_limits_fail_before_any_remote_call() {
    let mut config = base_config();
    config.limits.comment = LimitRange::new(5, 20_000);
    let client = ScriptedClient::default();
    let notifier = RecordingNotifier::default();
    let sleeper = RecordingSleeper::default();

    let err = Engine::new(&config, &client, &notifier, &sleeper)
        .run_tag_loop(&mut StdRng::seed_from_u64(1))
        .unwrap_err();

    assert!(matches!(err, EngineError::Configuration(_)));
    assert!(client.calls().is_empty());
}
