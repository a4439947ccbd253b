//! Ready-made snapshots and controller wiring for scenario tests.

use ctfd_gateway::{CancelToken, Gateway};
use ctfd_reconcile::Controller;
use ctfd_schemas::{Challenge, ChallengeAttrs, FileEntry};

use crate::{FakeCtfd, MemoryFileSource};

/// Controller over a borrowed fake so the test can inspect it afterwards.
pub fn controller(fake: &FakeCtfd, files: MemoryFileSource) -> Controller<&FakeCtfd> {
    Controller::new(Gateway::uncancellable(fake), Box::new(files))
}

pub fn cancellable_controller(
    fake: &FakeCtfd,
    files: MemoryFileSource,
    token: CancelToken,
) -> Controller<&FakeCtfd> {
    Controller::new(Gateway::new(fake, token), Box::new(files))
}

/// Desired challenge with scalars only.
pub fn desired(name: &str) -> Challenge {
    Challenge::new(ChallengeAttrs::new(name, "web", "a challenge", 100))
}

pub fn with_tags(mut c: Challenge, tags: &[&str]) -> Challenge {
    c.tags = tags.iter().map(|t| t.to_string()).collect();
    c
}

pub fn with_topics(mut c: Challenge, topics: &[&str]) -> Challenge {
    c.topics = topics.iter().map(|t| t.to_string()).collect();
    c
}

/// `(name, path)` pairs.
pub fn with_files(mut c: Challenge, files: &[(&str, &str)]) -> Challenge {
    c.files = files
        .iter()
        .map(|(name, path)| FileEntry::new(*name, *path))
        .collect();
    c
}

/// Strip computed fields, turning an applied snapshot back into a
/// declaration.
pub fn declaration(c: &Challenge) -> Challenge {
    let mut d = c.clone();
    d.id = None;
    if let Some(flag) = d.flag.as_mut() {
        flag.remote_id = None;
    }
    for f in d.files.iter_mut() {
        f.remote = None;
    }
    d
}
