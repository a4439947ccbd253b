//! Pure mapping between the declarative model and the wire shapes.

use ctfd_gateway::wire::{
    ChallengeCreate, ChallengePatch, FileQuery, FlagCreate, RemoteChallenge, RemoteFile,
    RequirementsWire, CHALLENGE_TYPE_STANDARD,
};
use ctfd_schemas::{
    Behavior, ChallengeAttrs, ChallengeId, FileEntry, Flag, FlagCase, Requirements, UploadedFile,
    FILE_ACCESS_PUBLIC,
};

use crate::error::InvariantViolation;

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// `hidden` → absent, `anonymized` → `true`.
pub fn anonymize_for(behavior: Behavior) -> Option<bool> {
    match behavior {
        Behavior::Hidden => None,
        Behavior::Anonymized => Some(true),
    }
}

/// Inverse of [`anonymize_for`]. `Some(false)` is an invariant violation.
pub fn behavior_from_anonymize(anonymize: Option<bool>) -> Result<Behavior, InvariantViolation> {
    match anonymize {
        None => Ok(Behavior::Hidden),
        Some(true) => Ok(Behavior::Anonymized),
        Some(false) => Err(InvariantViolation::AnonymizeFalse),
    }
}

pub fn requirements_to_wire(reqs: &Requirements) -> RequirementsWire {
    RequirementsWire {
        prerequisites: reqs.prerequisites.iter().map(|id| id.get()).collect(),
        anonymize: anonymize_for(reqs.behavior),
    }
}

/// A cleared block (no prerequisites, hidden) reads back as `None`.
pub fn requirements_from_wire(
    wire: &RequirementsWire,
) -> Result<Option<Requirements>, InvariantViolation> {
    let behavior = behavior_from_anonymize(wire.anonymize)?;
    if wire.prerequisites.is_empty() && behavior == Behavior::Hidden {
        return Ok(None);
    }
    Ok(Some(Requirements {
        behavior,
        prerequisites: wire.prerequisites.iter().copied().map(ChallengeId).collect(),
    }))
}

// ---------------------------------------------------------------------------
// Challenge scalars
// ---------------------------------------------------------------------------

pub fn challenge_create(attrs: &ChallengeAttrs, reqs: Option<&Requirements>) -> ChallengeCreate {
    ChallengeCreate {
        name: attrs.name.clone(),
        category: attrs.category.clone(),
        description: attrs.description.clone(),
        attribution: attrs.attribution.clone(),
        connection_info: attrs.connection_info.clone(),
        max_attempts: attrs.max_attempts,
        value: attrs.value,
        logic: attrs.logic,
        state: attrs.state,
        challenge_type: CHALLENGE_TYPE_STANDARD.to_string(),
        next_id: attrs.next.map(ChallengeId::get),
        requirements: reqs.map(requirements_to_wire),
    }
}

/// Every scalar, requirements excluded. Absent nullable scalars are sent as
/// `null` so a removed value is cleared remotely.
pub fn challenge_patch(attrs: &ChallengeAttrs) -> ChallengePatch {
    ChallengePatch {
        name: Some(attrs.name.clone()),
        category: Some(attrs.category.clone()),
        description: Some(attrs.description.clone()),
        attribution: Some(attrs.attribution.clone()),
        connection_info: Some(attrs.connection_info.clone()),
        max_attempts: Some(attrs.max_attempts),
        value: Some(attrs.value),
        logic: Some(attrs.logic),
        state: Some(attrs.state),
        next_id: Some(attrs.next.map(ChallengeId::get)),
        requirements: None,
    }
}

pub fn attrs_from_remote(rc: &RemoteChallenge) -> ChallengeAttrs {
    ChallengeAttrs {
        name: rc.name.clone(),
        category: rc.category.clone(),
        description: rc.description.clone(),
        attribution: rc.attribution.clone(),
        connection_info: rc.connection_info.clone().unwrap_or_default(),
        max_attempts: rc.max_attempts.unwrap_or(0),
        value: rc.value,
        logic: rc.logic,
        state: rc.state,
        next: rc.next_id.map(ChallengeId),
    }
}

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

pub fn flag_data(case: FlagCase) -> &'static str {
    match case {
        FlagCase::CaseInsensitive => "case_insensitive",
        FlagCase::CaseSensitive => "",
    }
}

pub fn flag_create(root: ChallengeId, flag: &Flag) -> FlagCreate {
    FlagCreate {
        challenge: root.get(),
        content: flag.content.clone(),
        data: flag_data(flag.case).to_string(),
        flag_type: flag.flag_type,
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub fn file_url(location: &str) -> String {
    format!("/files/{location}")
}

/// Last `/` segment of a storage location (`"3f2a/notes.txt"` → `"notes.txt"`).
pub fn file_name_from_location(location: &str) -> &str {
    location.rsplit('/').next().unwrap_or(location)
}

pub fn uploaded_file(root: ChallengeId, rf: &RemoteFile) -> UploadedFile {
    UploadedFile {
        id: rf.id,
        file_type: rf.file_type.clone(),
        location: rf.location.clone(),
        challenge_id: root,
        url: file_url(&rf.location),
        access_type: FILE_ACCESS_PUBLIC.to_string(),
    }
}

/// A file discovered by listing `query`. The path is unknown (write-only);
/// the declared type and location are the ones the listing was filtered by.
pub fn file_entry_from_remote(
    root: ChallengeId,
    query: &FileQuery,
    rf: &RemoteFile,
) -> FileEntry {
    FileEntry {
        name: file_name_from_location(&rf.location).to_string(),
        path: None,
        file_type: query.file_type,
        location: query.location.unwrap_or_default(),
        remote: Some(uploaded_file(root, rf)),
    }
}
