//! Scenario: partial failure isolation.
//!
//! # Invariants under test
//!
//! 1. One failing file upload is exactly one error; siblings still land.
//! 2. A failing kind never stops the kinds after it.
//! 3. An aborted full replace returns the values still believed live.
//! 4. A failed scalar patch keeps the last-applied attributes.

use ctfd_schemas::ChallengeAttrs;
use ctfd_testkit::fixtures::*;
use ctfd_testkit::{Call, FakeCtfd, MemoryFileSource};

fn sources() -> MemoryFileSource {
    MemoryFileSource::new()
        .with("/x/a.txt", "a")
        .with("/x/b.txt", "b")
        .with("/x/c.txt", "c")
}

#[test]
fn scenario_one_failed_upload_does_not_affect_siblings() {
    let fake = FakeCtfd::new();
    fake.fail_when(|c| matches!(c, Call::UploadFile { name, .. } if name == "b.txt"));

    let want = with_files(
        desired("iso"),
        &[("a.txt", "/x/a.txt"), ("b.txt", "/x/b.txt"), ("c.txt", "/x/c.txt")],
    );
    let out = controller(&fake, sources()).create_all(&want).unwrap();

    assert_eq!(out.diagnostics.errors().count(), 1);
    assert!(out.diagnostics.errors().next().unwrap().detail.contains("b.txt"));

    let state = out.state.unwrap();
    let names: Vec<&str> = state.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "c.txt"]);
    assert!(state.files.iter().all(|f| f.remote.is_some()));
    assert_eq!(fake.files_of(state.id.unwrap().get()).len(), 2);
}

#[test]
fn scenario_failed_tag_create_does_not_stop_topics_or_files() {
    let fake = FakeCtfd::new();
    fake.fail_when(|c| matches!(c, Call::CreateTag { value, .. } if value == "http"));

    let want = with_files(
        with_topics(with_tags(desired("iso"), &["web", "http", "ctf"]), &["sqli"]),
        &[("a.txt", "/x/a.txt")],
    );
    let out = controller(&fake, sources()).create_all(&want).unwrap();

    assert_eq!(out.diagnostics.errors().count(), 1);
    let state = out.state.unwrap();
    assert_eq!(state.tags, vec!["web"]);
    assert_eq!(state.topics, vec!["sqli"]);
    assert_eq!(state.files.len(), 1);
    assert_eq!(fake.tags_of(state.id.unwrap().get()), vec!["web"]);
}

#[test]
fn scenario_aborted_delete_returns_the_live_remainder() {
    let fake = FakeCtfd::new();
    let ctl = controller(&fake, sources());
    let old = ctl
        .create_all(&with_topics(with_tags(desired("iso"), &["a", "b", "c"]), &["t"]))
        .unwrap()
        .state
        .unwrap();
    let id = old.id.unwrap().get();

    // the second live tag refuses to go
    let second = std::cell::Cell::new(0);
    fake.fail_when(move |c| {
        if matches!(c, Call::DeleteTag(_)) {
            second.set(second.get() + 1);
            second.get() == 2
        } else {
            false
        }
    });

    let new = with_topics(with_tags(desired("iso"), &["z"]), &["u"]);
    let out = ctl.update_all(&old, &new).unwrap();

    assert_eq!(out.diagnostics.errors().count(), 1);
    let state = out.state.unwrap();
    assert_eq!(state.tags, vec!["b", "c"]);
    assert_eq!(fake.tags_of(id), vec!["b", "c"]);
    assert!(!fake
        .calls()
        .iter()
        .any(|c| matches!(c, Call::CreateTag { value, .. } if value == "z")));
    assert_eq!(state.topics, vec!["u"]);
}

#[test]
fn scenario_failed_scalar_patch_keeps_old_attributes() {
    let fake = FakeCtfd::new();
    let ctl = controller(&fake, sources());
    let old = ctl
        .create_all(&with_tags(desired("iso"), &["web"]))
        .unwrap()
        .state
        .unwrap();
    fake.fail_when(|c| {
        matches!(
            c,
            Call::PatchChallenge {
                requirements_only: false,
                ..
            }
        )
    });

    let mut new = with_tags(desired("iso"), &["pwn"]);
    new.attrs = ChallengeAttrs::new("renamed", "web", "a challenge", 500);
    let out = ctl.update_all(&old, &new).unwrap();

    assert_eq!(out.diagnostics.errors().count(), 1);
    let state = out.state.unwrap();
    assert_eq!(state.attrs, old.attrs);
    assert_eq!(state.tags, vec!["pwn"]);
}
