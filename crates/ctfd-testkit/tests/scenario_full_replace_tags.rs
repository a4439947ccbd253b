//! Scenario: tags and topics are replaced wholesale.
//!
//! # Invariants under test
//!
//! 1. Update lists the live values, deletes every one, then creates the
//!    desired list in order.
//! 2. Values are compared as written, so duplicates survive.
//! 3. Topic deletes address the association id, not the topic id.

use ctfd_testkit::fixtures::*;
use ctfd_testkit::{Call, FakeCtfd, MemoryFileSource};

#[test]
fn scenario_shrinking_tags_deletes_all_then_recreates() {
    let fake = FakeCtfd::new();
    let ctl = controller(&fake, MemoryFileSource::new());
    let old = ctl
        .create_all(&with_tags(desired("t"), &["web", "http"]))
        .unwrap()
        .state
        .unwrap();
    let id = old.id.unwrap().get();
    fake.clear_calls();

    let out = ctl
        .update_all(&old, &with_tags(desired("t"), &["web"]))
        .unwrap();
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);

    let muts = fake.mutations();
    assert_eq!(muts.len(), 4, "{muts:?}");
    assert!(matches!(muts[0], Call::PatchChallenge { requirements_only: false, .. }));
    assert!(matches!(muts[1], Call::DeleteTag(_)));
    assert!(matches!(muts[2], Call::DeleteTag(_)));
    assert_eq!(
        muts[3],
        Call::CreateTag {
            challenge: id,
            value: "web".into()
        }
    );

    // the listing precedes the first delete
    let calls = fake.calls();
    let list = calls.iter().position(|c| *c == Call::ListTags(id)).unwrap();
    let first_delete = calls
        .iter()
        .position(|c| matches!(c, Call::DeleteTag(_)))
        .unwrap();
    assert!(list < first_delete);

    assert_eq!(out.state.unwrap().tags, vec!["web"]);
    assert_eq!(fake.tags_of(id), vec!["web"]);
}

#[test]
fn scenario_out_of_band_tags_are_removed_too() {
    let fake = FakeCtfd::new();
    let ctl = controller(&fake, MemoryFileSource::new());
    let old = ctl
        .create_all(&with_tags(desired("t"), &["web"]))
        .unwrap()
        .state
        .unwrap();
    let id = old.id.unwrap().get();
    fake.seed_tag(id, "stray");

    let out = ctl
        .update_all(&old, &with_tags(desired("t"), &["web", "web"]))
        .unwrap();

    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    assert_eq!(fake.tags_of(id), vec!["web", "web"]);
    assert_eq!(out.state.unwrap().tags, vec!["web", "web"]);
}

#[test]
fn scenario_topics_follow_the_same_policy() {
    let fake = FakeCtfd::new();
    let ctl = controller(&fake, MemoryFileSource::new());
    let old = ctl
        .create_all(&with_topics(desired("t"), &["sqli", "xss"]))
        .unwrap()
        .state
        .unwrap();
    let id = old.id.unwrap().get();
    fake.clear_calls();

    let out = ctl
        .update_all(&old, &with_topics(desired("t"), &["ssrf"]))
        .unwrap();

    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    let deletes = fake
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::DeleteTopic(_)))
        .count();
    assert_eq!(deletes, 2);
    assert_eq!(fake.topics_of(id), vec!["ssrf"]);
}

#[test]
fn scenario_failed_listing_keeps_prior_values() {
    let fake = FakeCtfd::new();
    let ctl = controller(&fake, MemoryFileSource::new());
    let old = ctl
        .create_all(&with_tags(desired("t"), &["web"]))
        .unwrap()
        .state
        .unwrap();
    fake.fail_when(|c| matches!(c, Call::ListTags(_)));

    let out = ctl
        .update_all(&old, &with_tags(desired("t"), &["pwn"]))
        .unwrap();

    assert_eq!(out.diagnostics.errors().count(), 1);
    assert_eq!(out.state.unwrap().tags, vec!["web"]);
    assert!(!fake.calls().iter().any(|c| matches!(c, Call::DeleteTag(_))));
}
