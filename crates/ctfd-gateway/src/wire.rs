//! CTFd REST request / response shapes.
//!
//! Field names follow the `/api/v1` JSON bodies. Response types only
//! declare the fields the core reads; unknown fields are ignored.

use std::fmt;

use ctfd_schemas::{ChallengeId, FileLocation, FileType, FlagType, Logic, Visibility};
use serde::{Deserialize, Serialize};

/// Remote challenge type used for every challenge this system creates.
pub const CHALLENGE_TYPE_STANDARD: &str = "standard";

/// Topic association namespace for challenge topics.
pub const TOPIC_TYPE_CHALLENGE: &str = "challenge";

// ---------------------------------------------------------------------------
// Challenge
// ---------------------------------------------------------------------------

/// Requirements block as carried by challenge create / patch / read.
///
/// `anonymize` absent or null means hidden; `true` means anonymized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsWire {
    #[serde(default)]
    pub prerequisites: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymize: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeCreate {
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    pub connection_info: String,
    pub max_attempts: i64,
    pub value: i64,
    pub logic: Logic,
    pub state: Visibility,
    #[serde(rename = "type")]
    pub challenge_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<RequirementsWire>,
}

/// Partial update of a challenge. Only populated fields are sent.
///
/// The nullable scalars are doubly optional: `None` leaves the remote value
/// alone, `Some(None)` sends an explicit `null` and clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChallengePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<Logic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<RequirementsWire>,
}

impl ChallengePatch {
    /// A patch that only replaces the requirements block.
    pub fn requirements_only(requirements: RequirementsWire) -> Self {
        Self {
            requirements: Some(requirements),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteChallenge {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub connection_info: Option<String>,
    #[serde(default)]
    pub max_attempts: Option<i64>,
    pub value: i64,
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub state: Visibility,
    #[serde(rename = "type", default)]
    pub challenge_type: String,
    #[serde(default)]
    pub next_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

/// `data` carries the case mode: `"case_insensitive"` or `""`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct FlagCreate {
    pub challenge: i64,
    pub content: String,
    pub data: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
}

impl fmt::Debug for FlagCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagCreate")
            .field("challenge", &self.challenge)
            .field("content", &"<REDACTED>")
            .field("data", &self.data)
            .field("flag_type", &self.flag_type)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFlag {
    pub id: i64,
    #[serde(default)]
    pub challenge_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Tags / topics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCreate {
    pub challenge: i64,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTag {
    pub id: i64,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCreate {
    pub challenge: i64,
    #[serde(rename = "type")]
    pub topic_type: String,
    pub value: String,
}

impl TopicCreate {
    pub fn for_challenge(challenge: ChallengeId, value: impl Into<String>) -> Self {
        Self {
            challenge: challenge.get(),
            topic_type: TOPIC_TYPE_CHALLENGE.to_string(),
            value: value.into(),
        }
    }
}

/// A challenge-topic association. `id` is the association id used for delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTopic {
    pub id: i64,
    /// Absent from the create reply, present in listings.
    #[serde(default)]
    pub value: String,
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// One multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub challenge: ChallengeId,
    /// Logical name; becomes the uploaded file name.
    pub name: String,
    pub content: Vec<u8>,
    pub file_type: FileType,
    pub location: FileLocation,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("challenge", &self.challenge)
            .field("name", &self.name)
            .field("content_len", &self.content.len())
            .field("file_type", &self.file_type)
            .field("location", &self.location)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: i64,
    #[serde(rename = "type")]
    pub file_type: String,
    pub location: String,
}

/// Filter for the file listing. The remote cannot filter by challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileQuery {
    pub file_type: FileType,
    pub location: Option<FileLocation>,
}

impl FileQuery {
    pub fn new(file_type: FileType, location: FileLocation) -> Self {
        Self {
            file_type,
            location: Some(location),
        }
    }

    pub fn challenge_files() -> Self {
        Self::new(FileType::Challenge, FileLocation::Challenge)
    }
}
