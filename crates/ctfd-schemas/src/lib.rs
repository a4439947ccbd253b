//! ctfd-schemas
//!
//! Declarative model of a CTFd challenge and the subresources it owns.
//!
//! A [`Challenge`] is a snapshot. A desired snapshot (read from a
//! declaration) carries no `id` and no computed blocks; a last-applied
//! snapshot (returned by the reconciler) carries the remote identifier and
//! the computed fields of every subresource known to be live.
//!
//! Pure data. No IO.

mod enums;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use enums::{
    Behavior, FileLocation, FileType, FlagCase, FlagType, Logic, SubresourceKind, UnknownValue,
    Visibility,
};

/// Value the remote does not report for files; always `public`.
pub const FILE_ACCESS_PUBLIC: &str = "public";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Remote identifier of a challenge. Assigned by CTFd on create; immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(pub i64);

impl ChallengeId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChallengeId {
    fn from(v: i64) -> Self {
        ChallengeId(v)
    }
}

// ---------------------------------------------------------------------------
// Root resource
// ---------------------------------------------------------------------------

/// Scalar attributes of a challenge, mutated as a whole by one PATCH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeAttrs {
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(default)]
    pub connection_info: String,
    /// `0` means unlimited.
    #[serde(default)]
    pub max_attempts: i64,
    /// Points awarded once solved.
    pub value: i64,
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub state: Visibility,
    /// Suggested next challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<ChallengeId>,
}

impl ChallengeAttrs {
    /// Required attributes only; everything else takes the remote default.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        value: i64,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
            attribution: None,
            connection_info: String::new(),
            max_attempts: 0,
            value,
            logic: Logic::default(),
            state: Visibility::default(),
            next: None,
        }
    }
}

/// Snapshot of one challenge and all of its subresources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ChallengeId>,
    #[serde(flatten)]
    pub attrs: ChallengeAttrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Requirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<Flag>,
    /// Display order is significant; duplicates are allowed.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl Challenge {
    /// Desired snapshot with no subresources.
    pub fn new(attrs: ChallengeAttrs) -> Self {
        Self {
            id: None,
            attrs,
            requirements: None,
            flag: None,
            tags: Vec::new(),
            topics: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: ChallengeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_applied(&self) -> bool {
        self.id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// Prerequisites that must be solved before the challenge unlocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default)]
    pub prerequisites: Vec<ChallengeId>,
}

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

/// The single flag managed per challenge.
///
/// **`content` is redacted in `Debug` output.**
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "type", default)]
    pub flag_type: FlagType,
    #[serde(default)]
    pub case: FlagCase,
    #[serde(rename = "flag")]
    pub content: String,
    /// Remote flag id, recorded when this system created the flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<i64>,
}

impl Flag {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            flag_type: FlagType::default(),
            case: FlagCase::default(),
            content: content.into(),
            remote_id: None,
        }
    }

    /// Compares declared fields only; the computed `remote_id` is ignored.
    pub fn same_declaration(&self, other: &Flag) -> bool {
        self.flag_type == other.flag_type
            && self.case == other.case
            && self.content == other.content
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("flag_type", &self.flag_type)
            .field("case", &self.case)
            .field("content", &"<REDACTED>")
            .field("remote_id", &self.remote_id)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// A file attached to a challenge, identified by its logical `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Identity key across snapshots.
    pub name: String,
    /// Local source path. Write-only: the remote cannot return file bytes,
    /// so a `None` path only ever comes from a prior result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(rename = "type", default)]
    pub file_type: FileType,
    #[serde(default)]
    pub location: FileLocation,
    /// Present only when the file is known to exist remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<UploadedFile>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            file_type: FileType::default(),
            location: FileLocation::default(),
            remote: None,
        }
    }

    pub fn remote_id(&self) -> Option<i64> {
        self.remote.as_ref().map(|r| r.id)
    }
}

/// Computed fields of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: i64,
    /// Canonical type as reported by the remote.
    #[serde(rename = "type")]
    pub file_type: String,
    /// Storage location as reported by the remote (e.g. `"3f2a.../notes.txt"`).
    pub location: String,
    pub challenge_id: ChallengeId,
    pub url: String,
    pub access_type: String,
}
