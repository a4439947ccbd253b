//! Last-applied snapshot on disk.
//!
//! `{ "format_version": 1, "written_at": <RFC3339>, "challenge": {...} }`

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use ctfd_schemas::Challenge;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    pub format_version: u32,
    pub written_at: DateTime<Utc>,
    pub challenge: Challenge,
}

/// `Ok(None)` when no state file exists yet.
pub fn load(path: &Path) -> Result<Option<Challenge>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read state file failed: {}", path.display()))?;
    let file: StateFile = serde_json::from_str(&raw)
        .with_context(|| format!("state file is not valid JSON: {}", path.display()))?;
    if file.format_version != FORMAT_VERSION {
        bail!(
            "STATE_FORMAT_UNSUPPORTED: {} has format_version={}, expected {}",
            path.display(),
            file.format_version,
            FORMAT_VERSION
        );
    }
    if file.challenge.id.is_none() {
        bail!("STATE_INVALID: {} records no challenge id", path.display());
    }
    Ok(Some(file.challenge))
}

/// Like [`load`], but a missing file is an error.
pub fn load_required(path: &Path) -> Result<Challenge> {
    load(path)?.with_context(|| format!("no state file at {}", path.display()))
}

/// Write through a sibling temp file so a crash never leaves a torn file.
pub fn save(path: &Path, challenge: &Challenge) -> Result<()> {
    let file = StateFile {
        format_version: FORMAT_VERSION,
        written_at: Utc::now(),
        challenge: challenge.clone(),
    };
    let json = serde_json::to_string_pretty(&file).context("state serialize failed")?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write failed: {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename failed: {}", path.display()))?;
    Ok(())
}

pub fn remove(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("remove state file failed: {}", path.display()))?;
    }
    Ok(())
}
