//! Identity-diff policy for files, keyed by logical name.
//!
//! - removed (old only): best-effort delete, dropped from the result
//! - unchanged (same name, same path, known remote): reused, no call
//! - changed or new: read content, delete the stale entry (best effort),
//!   then upload
//!
//! Content is read before the stale entry is deleted, so an unreadable
//! replacement never destroys the live file.

use std::collections::HashSet;

use ctfd_gateway::wire::FileUpload;
use ctfd_gateway::CtfdApi;
use ctfd_schemas::{ChallengeId, FileEntry, SubresourceKind};
use tracing::info;

use super::{Pass, Strategy};
use crate::codec;
use crate::diagnostics::{summary, Severity};
use crate::error::InvariantViolation;
use crate::source::FileSource;

/// Outcome of a best-effort delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Deleted,
    /// The call failed; the entry is still live.
    Failed,
    /// The pass was cancelled before the call went out.
    NotIssued,
}

pub struct FileSync<'s> {
    source: &'s dyn FileSource,
}

impl<'s> FileSync<'s> {
    pub fn new(source: &'s dyn FileSource) -> Self {
        Self { source }
    }

    /// Best-effort delete of a live entry.
    fn remove<A: CtfdApi>(&self, pass: &mut Pass<'_, A>, entry: &FileEntry) -> Removal {
        let Some(id) = entry.remote_id() else {
            return Removal::Deleted;
        };
        match pass.gateway().delete_file(id) {
            Ok(()) => Removal::Deleted,
            Err(e) if e.is_cancelled() => Removal::NotIssued,
            Err(e) => {
                pass.remote_failure(
                    Severity::Warning,
                    format!("Unable to delete file '{}' ({id})", entry.name),
                    &e,
                );
                Removal::Failed
            }
        }
    }

    /// Upload `want`, replacing `prior` when it is live. Returns the entry
    /// believed live afterwards, if any.
    fn replace<A: CtfdApi>(
        &self,
        pass: &mut Pass<'_, A>,
        root: ChallengeId,
        prior: Option<&FileEntry>,
        want: &FileEntry,
    ) -> Option<FileEntry> {
        let live = prior.filter(|p| p.remote.is_some()).cloned();

        let Some(path) = want.path.as_deref() else {
            pass.error(
                summary::CONFIG,
                format!(
                    "File '{}' of challenge {root} has no source path and cannot be uploaded",
                    want.name
                ),
            );
            return live;
        };
        let content = match self.source.read(path) {
            Ok(content) => content,
            Err(e) => {
                pass.error(summary::CONFIG, format!("File '{}': {e}", want.name));
                return live;
            }
        };

        // what stays live if the upload does not go through
        let fallback = match &live {
            Some(stale) => match self.remove(pass, stale) {
                Removal::Deleted => None,
                Removal::Failed => live.clone(),
                Removal::NotIssued => return live,
            },
            None => None,
        };

        let upload = FileUpload {
            challenge: root,
            name: want.name.clone(),
            content,
            file_type: want.file_type,
            location: want.location,
        };
        match pass.gateway().upload_file(&upload) {
            Ok(files) => match files.first() {
                Some(rf) => Some(FileEntry {
                    remote: Some(codec::uploaded_file(root, rf)),
                    ..want.clone()
                }),
                None => {
                    pass.error(
                        summary::UNEXPECTED,
                        format!(
                            "Upload of file '{}' for challenge {root} returned no file entries",
                            want.name
                        ),
                    );
                    fallback
                }
            },
            Err(e) => {
                pass.remote_failure(
                    Severity::Error,
                    format!("Unable to upload file '{}' for challenge {root}", want.name),
                    &e,
                );
                fallback
            }
        }
    }
}

impl Strategy for FileSync<'_> {
    type State = Vec<FileEntry>;

    fn kind(&self) -> SubresourceKind {
        SubresourceKind::File
    }

    fn reconcile<A: CtfdApi>(
        &self,
        pass: &mut Pass<'_, A>,
        root: ChallengeId,
        old: Option<&Vec<FileEntry>>,
        new: &Vec<FileEntry>,
    ) -> Result<Vec<FileEntry>, InvariantViolation> {
        let old: &[FileEntry] = old.map(Vec::as_slice).unwrap_or(&[]);
        let declared: HashSet<&str> = new.iter().map(|f| f.name.as_str()).collect();

        let mut leftovers = Vec::new();
        let mut removed = 0usize;
        for stale in old.iter().filter(|o| !declared.contains(o.name.as_str())) {
            match self.remove(pass, stale) {
                Removal::Deleted => removed += 1,
                // warned; no longer tracked
                Removal::Failed => {}
                Removal::NotIssued => leftovers.push(stale.clone()),
            }
        }

        let mut result = Vec::with_capacity(new.len());
        let mut seen = HashSet::new();
        let mut reused = 0usize;
        for want in new {
            if !seen.insert(want.name.as_str()) {
                pass.error(
                    summary::CONFIG,
                    format!(
                        "File '{}' is declared more than once for challenge {root}",
                        want.name
                    ),
                );
                continue;
            }

            let prior = old.iter().find(|o| o.name == want.name);
            if let Some(p) = prior.filter(|p| p.remote.is_some() && p.path == want.path) {
                result.push(FileEntry {
                    remote: p.remote.clone(),
                    ..want.clone()
                });
                reused += 1;
                continue;
            }

            if let Some(entry) = self.replace(pass, root, prior, want) {
                result.push(entry);
            }
        }
        result.extend(leftovers);

        info!(
            challenge_id = %root,
            removed,
            reused,
            total = result.len(),
            "reconcile/files"
        );
        Ok(result)
    }
}
