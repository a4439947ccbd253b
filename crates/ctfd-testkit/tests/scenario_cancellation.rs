//! Scenario: cancellation.
//!
//! # Invariants under test
//!
//! 1. No call is issued once the token is cancelled.
//! 2. Calls already made are kept; nothing is undone.
//! 3. The pass ends with exactly one cancellation error and the partial
//!    state.

use ctfd_gateway::CancelToken;
use ctfd_reconcile::summary;
use ctfd_testkit::fixtures::*;
use ctfd_testkit::{Call, FakeCtfd, MemoryFileSource};

#[test]
fn scenario_cancel_mid_pass_stops_further_calls() {
    let fake = FakeCtfd::new();
    let token = CancelToken::new();
    let trigger = token.clone();
    fake.on_call(move |c| {
        if matches!(c, Call::CreateTag { value, .. } if value == "http") {
            trigger.cancel();
        }
    });

    let files = MemoryFileSource::new().with("/x/a.txt", "a");
    let want = with_files(
        with_topics(with_tags(desired("stop"), &["web", "http", "ctf"]), &["sqli"]),
        &[("a.txt", "/x/a.txt")],
    );
    let out = cancellable_controller(&fake, files, token)
        .create_all(&want)
        .unwrap();

    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics.errors().next().unwrap().summary, summary::CANCELLED);

    let state = out.state.unwrap();
    let id = state.id.unwrap().get();
    assert_eq!(state.tags, vec!["web", "http"]);
    assert!(state.topics.is_empty());
    assert!(state.files.is_empty());

    assert_eq!(
        fake.calls().last(),
        Some(&Call::CreateTag {
            challenge: id,
            value: "http".into()
        })
    );
    assert_eq!(fake.tags_of(id), vec!["web", "http"]);
    assert_eq!(fake.challenge_count(), 1);
}

#[test]
fn scenario_cancel_before_start_issues_nothing() {
    let fake = FakeCtfd::new();
    let token = CancelToken::new();
    token.cancel();

    let out = cancellable_controller(&fake, MemoryFileSource::new(), token)
        .create_all(&with_tags(desired("stop"), &["web"]))
        .unwrap();

    assert_eq!(out.state, None);
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics.errors().next().unwrap().summary, summary::CANCELLED);
    assert!(fake.calls().is_empty());
}

#[test]
fn scenario_cancelled_update_keeps_untouched_kinds() {
    let fake = FakeCtfd::new();
    let old = controller(&fake, MemoryFileSource::new())
        .create_all(&with_topics(with_tags(desired("stop"), &["web"]), &["sqli"]))
        .unwrap()
        .state
        .unwrap();

    let token = CancelToken::new();
    let trigger = token.clone();
    fake.on_call(move |c| {
        if matches!(c, Call::PatchChallenge { .. }) {
            trigger.cancel();
        }
    });
    fake.clear_calls();

    let out = cancellable_controller(&fake, MemoryFileSource::new(), token)
        .update_all(&old, &with_topics(with_tags(desired("stop"), &["pwn"]), &["xss"]))
        .unwrap();

    assert_eq!(out.diagnostics.len(), 1);
    let state = out.state.unwrap();
    assert_eq!(state.tags, old.tags);
    assert_eq!(state.topics, old.topics);
    assert_eq!(fake.calls().len(), 1);
}
