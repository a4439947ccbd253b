//! Root resource lifecycle controller.
//!
//! Drives the root challenge and each subresource strategy in a fixed order:
//!
//! - create: root (with requirements) → flag → tags → topics → files
//! - update: root scalars → tags → topics → files → flag (no call) →
//!   requirements
//! - delete: flag (best effort) → root
//! - read: root → requirements → tags → topics → files; flag kept as known
//!
//! A failing kind never stops its siblings. Cancellation stops every
//! further call, adds one error, and returns the partial state.

use ctfd_gateway::wire::{FileQuery, RemoteFile};
use ctfd_gateway::{CtfdApi, Gateway};
use ctfd_schemas::{Challenge, ChallengeId, FileEntry};
use tracing::info;

use crate::codec;
use crate::diagnostics::{summary, Diagnostics, Severity};
use crate::error::InvariantViolation;
use crate::lifecycle::{Lifecycle, LifecycleEvent, LifecycleState, TransitionError};
use crate::source::FileSource;
use crate::strategy::{
    FileSync, FlagOnce, FullReplace, Pass, RequirementsReplace, Strategy, Tags, Topics,
    ValueCollection,
};

/// Result of one caller-facing operation.
///
/// `state` is the best-effort snapshot of what is live remotely. Callers
/// should persist it even when `diagnostics` carries errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub state: Option<Challenge>,
    pub diagnostics: Diagnostics,
}

impl Outcome {
    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }
}

pub struct Controller<A: CtfdApi> {
    gateway: Gateway<A>,
    source: Box<dyn FileSource>,
}

impl<A: CtfdApi> Controller<A> {
    pub fn new(gateway: Gateway<A>, source: Box<dyn FileSource>) -> Self {
        Self { gateway, source }
    }

    pub fn gateway(&self) -> &Gateway<A> {
        &self.gateway
    }

    // -----------------------------------------------------------------------
    // CreateAll
    // -----------------------------------------------------------------------

    pub fn create_all(&self, new: &Challenge) -> Result<Outcome, InvariantViolation> {
        let mut lc = Lifecycle::for_snapshot(new.id.is_some());
        lc.apply(LifecycleEvent::BeginCreate)?;
        let mut pass = Pass::new(&self.gateway);
        info!(name = %new.attrs.name, "challenge/create");

        let req = codec::challenge_create(&new.attrs, new.requirements.as_ref());
        let remote = match self.gateway.create_challenge(&req) {
            Ok(remote) => remote,
            Err(e) => {
                lc.apply(LifecycleEvent::CreateFailed)?;
                pass.remote_failure(
                    Severity::Error,
                    format!("Unable to create challenge '{}'", new.attrs.name),
                    &e,
                );
                return Ok(finish(pass, "create", None));
            }
        };

        let root = ChallengeId(remote.id);
        info!(challenge_id = %root, "challenge/created");
        let mut state = Challenge::new(new.attrs.clone()).with_id(root);

        state.requirements =
            RequirementsReplace.reconcile(&mut pass, root, None, &new.requirements)?;
        if !pass.is_cancelled() {
            state.flag = FlagOnce.reconcile(&mut pass, root, None, &new.flag)?;
        }
        if !pass.is_cancelled() {
            state.tags = FullReplace::<Tags>::new().reconcile(&mut pass, root, None, &new.tags)?;
        }
        if !pass.is_cancelled() {
            state.topics =
                FullReplace::<Topics>::new().reconcile(&mut pass, root, None, &new.topics)?;
        }
        if !pass.is_cancelled() {
            state.files = FileSync::new(self.source.as_ref())
                .reconcile(&mut pass, root, None, &new.files)?;
        }

        lc.apply(LifecycleEvent::Created)?;
        Ok(finish(pass, "create", Some(state)))
    }

    // -----------------------------------------------------------------------
    // UpdateAll
    // -----------------------------------------------------------------------

    pub fn update_all(&self, old: &Challenge, new: &Challenge) -> Result<Outcome, InvariantViolation> {
        let (mut lc, root) = begin(old, LifecycleEvent::BeginUpdate)?;
        let mut pass = Pass::new(&self.gateway);
        info!(challenge_id = %root, "challenge/update");

        // Everything not yet touched stays as last applied.
        let mut state = old.clone();

        match self
            .gateway
            .patch_challenge(root, &codec::challenge_patch(&new.attrs))
        {
            Ok(_) => state.attrs = new.attrs.clone(),
            Err(e) => pass.remote_failure(
                Severity::Error,
                format!("Unable to update challenge {root}"),
                &e,
            ),
        }

        if !pass.is_cancelled() {
            state.tags = FullReplace::<Tags>::new().reconcile(
                &mut pass,
                root,
                Some(&old.tags),
                &new.tags,
            )?;
        }
        if !pass.is_cancelled() {
            state.topics = FullReplace::<Topics>::new().reconcile(
                &mut pass,
                root,
                Some(&old.topics),
                &new.topics,
            )?;
        }
        if !pass.is_cancelled() {
            state.files = FileSync::new(self.source.as_ref()).reconcile(
                &mut pass,
                root,
                Some(&old.files),
                &new.files,
            )?;
        }
        state.flag = FlagOnce.reconcile(&mut pass, root, Some(&old.flag), &new.flag)?;
        if !pass.is_cancelled() {
            state.requirements = RequirementsReplace.reconcile(
                &mut pass,
                root,
                Some(&old.requirements),
                &new.requirements,
            )?;
        }

        lc.apply(LifecycleEvent::Updated)?;
        Ok(finish(pass, "update", Some(state)))
    }

    // -----------------------------------------------------------------------
    // ReadAll
    // -----------------------------------------------------------------------

    /// Re-derive the snapshot from the remote.
    ///
    /// `prior` is the last-applied snapshot, when known. It supplies the
    /// flag (never readable), the write-only file paths, and the set of file
    /// ids this challenge owns.
    pub fn read_all(
        &self,
        id: ChallengeId,
        prior: Option<&Challenge>,
    ) -> Result<Outcome, InvariantViolation> {
        let mut lc = Lifecycle::new(LifecycleState::Present);
        lc.apply(LifecycleEvent::BeginRead)?;
        let mut pass = Pass::new(&self.gateway);
        info!(challenge_id = %id, with_prior = prior.is_some(), "challenge/read");

        let remote = match self.gateway.get_challenge(id) {
            Ok(remote) => remote,
            Err(e) if e.is_not_found() => {
                lc.apply(LifecycleEvent::Vanished)?;
                pass.warn(
                    summary::GONE,
                    format!("Challenge {id} no longer exists remotely"),
                );
                return Ok(finish(pass, "read", None));
            }
            Err(e) => {
                pass.remote_failure(
                    Severity::Error,
                    format!("Unable to read challenge {id}"),
                    &e,
                );
                return Ok(finish(pass, "read", prior.cloned()));
            }
        };

        let mut state = match prior {
            Some(p) => p.clone(),
            None => Challenge::new(codec::attrs_from_remote(&remote)),
        };
        state.id = Some(id);
        state.attrs = codec::attrs_from_remote(&remote);

        if !pass.is_cancelled() {
            match self.gateway.get_requirements(id) {
                Ok(Some(wire)) => state.requirements = codec::requirements_from_wire(&wire)?,
                Ok(None) => state.requirements = None,
                Err(e) => pass.remote_failure(
                    Severity::Error,
                    format!("Unable to read challenge {id} requirements"),
                    &e,
                ),
            }
        }
        if !pass.is_cancelled() {
            if let Some(tags) = read_values::<Tags, A>(&mut pass, id) {
                state.tags = tags;
            }
        }
        if !pass.is_cancelled() {
            if let Some(topics) = read_values::<Topics, A>(&mut pass, id) {
                state.topics = topics;
            }
        }
        if !pass.is_cancelled() {
            if let Some(files) = read_files(&mut pass, id, prior) {
                state.files = files;
            }
        }
        // flag: unreadable, keep what is known

        lc.apply(LifecycleEvent::ReadDone)?;
        Ok(finish(pass, "read", Some(state)))
    }

    // -----------------------------------------------------------------------
    // DeleteAll
    // -----------------------------------------------------------------------

    /// Delete the flag (best effort), then the root. Other subresources are
    /// cascade-deleted by CTFd.
    pub fn delete_all(&self, old: &Challenge) -> Result<Outcome, InvariantViolation> {
        let (mut lc, root) = begin(old, LifecycleEvent::BeginDelete)?;
        let mut pass = Pass::new(&self.gateway);
        info!(challenge_id = %root, "challenge/delete");

        let mut remaining = old.clone();
        if let Some(flag) = &old.flag {
            // without a recorded id, fall back to the challenge id
            let flag_id = flag.remote_id.unwrap_or(root.get());
            match self.gateway.delete_flag(flag_id) {
                Ok(()) => remaining.flag = None,
                Err(e) => pass.remote_failure(
                    Severity::Warning,
                    format!("Unable to delete flag {flag_id} of challenge {root}"),
                    &e,
                ),
            }
        }

        let state = match self.gateway.delete_challenge(root) {
            Ok(()) => {
                lc.apply(LifecycleEvent::Deleted)?;
                None
            }
            Err(e) if e.is_not_found() => {
                lc.apply(LifecycleEvent::Deleted)?;
                pass.warn(
                    summary::GONE,
                    format!("Challenge {root} was already deleted remotely"),
                );
                None
            }
            Err(e) => {
                lc.apply(LifecycleEvent::DeleteFailed)?;
                pass.remote_failure(
                    Severity::Error,
                    format!("Unable to delete challenge {root}"),
                    &e,
                );
                Some(remaining)
            }
        };

        Ok(finish(pass, "delete", state))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Enter `event` from `Present`; the snapshot must carry its remote id.
fn begin(
    existing: &Challenge,
    event: LifecycleEvent,
) -> Result<(Lifecycle, ChallengeId), InvariantViolation> {
    match existing.id {
        Some(id) => {
            let mut lc = Lifecycle::new(LifecycleState::Present);
            lc.apply(event)?;
            Ok((lc, id))
        }
        None => Err(TransitionError {
            from: LifecycleState::Absent,
            event,
        }
        .into()),
    }
}

fn finish<A: CtfdApi>(pass: Pass<'_, A>, op: &'static str, state: Option<Challenge>) -> Outcome {
    let cancelled = pass.is_cancelled();
    let mut diagnostics = pass.into_diagnostics();
    if cancelled {
        diagnostics.error(
            summary::CANCELLED,
            format!("{op} was cancelled; calls already made were kept and no further calls were issued"),
        );
    }
    info!(
        op,
        present = state.is_some(),
        errors = diagnostics.errors().count(),
        warnings = diagnostics.warnings().count(),
        "challenge/done"
    );
    Outcome { state, diagnostics }
}

fn read_values<K: ValueCollection, A: CtfdApi>(
    pass: &mut Pass<'_, A>,
    id: ChallengeId,
) -> Option<Vec<String>> {
    match K::list(pass.gateway(), id) {
        Ok(live) => Some(live.into_iter().map(|v| v.value).collect()),
        Err(e) => {
            pass.remote_failure(
                Severity::Error,
                format!("Unable to read challenge {id} {}s", K::KIND),
                &e,
            );
            None
        }
    }
}

/// Files cannot be listed per challenge.
///
/// With a prior snapshot, one listing per `(type, location)` the snapshot
/// owns is fetched and only the owned ids are kept; an owned file missing
/// from its listing is reported as gone. Without a prior snapshot only
/// challenge files are listed and every one of them is attributed.
fn read_files<A: CtfdApi>(
    pass: &mut Pass<'_, A>,
    id: ChallengeId,
    prior: Option<&Challenge>,
) -> Option<Vec<FileEntry>> {
    let Some(prior) = prior else {
        let query = FileQuery::challenge_files();
        let listed = list_files(pass, id, &[query])?;
        let files: Vec<FileEntry> = listed
            .iter()
            .map(|rf| codec::file_entry_from_remote(id, &query, rf))
            .collect();
        if !files.is_empty() {
            pass.warn(
                summary::IMPRECISE,
                format!(
                    "{} challenge file(s) attributed to challenge {id}; the listing cannot \
                     be filtered by challenge",
                    files.len()
                ),
            );
        }
        return Some(files);
    };

    let mut queries: Vec<FileQuery> = Vec::new();
    for f in prior.files.iter().filter(|f| f.remote.is_some()) {
        let q = FileQuery::new(f.file_type, f.location);
        if !queries.contains(&q) {
            queries.push(q);
        }
    }
    if queries.is_empty() {
        return Some(Vec::new());
    }
    let listed = list_files(pass, id, &queries)?;

    let mut files = Vec::new();
    // entries without a remote id were never uploaded and are not live
    for owned in prior.files.iter() {
        let Some(owned_id) = owned.remote_id() else {
            continue;
        };
        match listed.iter().find(|rf| rf.id == owned_id) {
            Some(rf) => files.push(FileEntry {
                remote: Some(codec::uploaded_file(id, rf)),
                ..owned.clone()
            }),
            None => pass.warn(
                summary::GONE,
                format!(
                    "File '{}' (id {owned_id}) of challenge {id} is no longer listed remotely",
                    owned.name
                ),
            ),
        }
    }
    Some(files)
}

/// Concatenation of every listing. Any failure fails the whole read.
fn list_files<A: CtfdApi>(
    pass: &mut Pass<'_, A>,
    id: ChallengeId,
    queries: &[FileQuery],
) -> Option<Vec<RemoteFile>> {
    let mut listed = Vec::new();
    for query in queries {
        match pass.gateway().list_files(query) {
            Ok(mut batch) => listed.append(&mut batch),
            Err(e) => {
                pass.remote_failure(
                    Severity::Error,
                    format!(
                        "Unable to read challenge {id} files of type '{}'",
                        query.file_type.as_str()
                    ),
                    &e,
                );
                return None;
            }
        }
    }
    Some(listed)
}
