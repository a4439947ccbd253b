use anyhow::{Context, Result};
use ctfd_schemas::ChallengeId;
use std::path::Path;
use tracing::info;

use super::{connect, load_desired, report};
use crate::state_file;

/// CreateAll without a state file, UpdateAll with one. The resulting
/// snapshot is persisted even when errors were reported.
pub fn apply(config_paths: &[String], desired_path: &Path, state_path: &Path) -> Result<()> {
    let desired = load_desired(desired_path)?;
    let prior = state_file::load(state_path)?;
    let controller = connect(config_paths, desired_path.parent())?;

    let outcome = match &prior {
        Some(old) => controller.update_all(old, &desired)?,
        None => controller.create_all(&desired)?,
    };

    if let Some(state) = &outcome.state {
        state_file::save(state_path, state)?;
        info!(state = %state_path.display(), "state/saved");
    }
    report("apply", &outcome)
}

/// ReadAll with the recorded snapshot as prior.
pub fn refresh(config_paths: &[String], state_path: &Path) -> Result<()> {
    let prior = state_file::load_required(state_path)?;
    let controller = connect(config_paths, None)?;

    let id = prior.id.context("state file records no challenge id")?;
    let outcome = controller.read_all(id, Some(&prior))?;

    match &outcome.state {
        Some(state) => state_file::save(state_path, state)?,
        // vanished remotely
        None => state_file::remove(state_path)?,
    }
    report("refresh", &outcome)
}

/// ReadAll without a prior snapshot.
pub fn import(config_paths: &[String], id: i64, state_path: &Path) -> Result<()> {
    let controller = connect(config_paths, None)?;
    let outcome = controller.read_all(ChallengeId(id), None)?;

    if let Some(state) = &outcome.state {
        state_file::save(state_path, state)?;
    }
    report("import", &outcome)
}

/// DeleteAll. The state file is removed only when no error was reported.
pub fn destroy(config_paths: &[String], state_path: &Path) -> Result<()> {
    let old = state_file::load_required(state_path)?;
    let controller = connect(config_paths, None)?;
    let outcome = controller.delete_all(&old)?;

    match &outcome.state {
        None if !outcome.has_error() => state_file::remove(state_path)?,
        Some(remaining) => state_file::save(state_path, remaining)?,
        None => {}
    }
    report("destroy", &outcome)
}
