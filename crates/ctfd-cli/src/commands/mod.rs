//! Command handlers for ctfd-sync.
//!
//! Shared wiring (config, token, adapter, file source, reporting) lives
//! here. The caller-facing operations live in [`sync`].

pub mod sync;

use anyhow::{bail, Context, Result};
use ctfd_config::{report_unused_keys, secrets, UnusedKeyPolicy};
use ctfd_gateway::{CancelToken, Gateway};
use ctfd_http::HttpCtfd;
use ctfd_reconcile::{Controller, FsFileSource, Outcome};
use ctfd_schemas::Challenge;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::interrupt;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load config, resolve the token, and build a controller over the live API.
/// Ctrl-C cancels the controller's gateway.
///
/// Relative file paths resolve against `files.base_dir` when configured,
/// otherwise against `default_base_dir`.
pub fn connect(config_paths: &[String], default_base_dir: Option<&Path>) -> Result<Controller<HttpCtfd>> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = ctfd_config::load_layered_yaml(&path_refs)?;

    let unused = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for ptr in &unused.unused_leaf_pointers {
        warn!(pointer = %ptr, "config/unused_key");
    }

    let settings = loaded.settings()?;
    let token = secrets::resolve_token(&settings)?;
    info!(
        url = %settings.url,
        token_env = token.env_var(),
        config_hash = %loaded.config_hash,
        "config/loaded"
    );

    let api = HttpCtfd::new(&settings.url, token.expose(), settings.timeout)
        .context("failed to build CTFd HTTP client")?;

    let source = match settings.files_base_dir.as_deref().or(default_base_dir) {
        Some(base) => FsFileSource::with_base_dir(base),
        None => FsFileSource::new(),
    };

    let cancel = CancelToken::new();
    interrupt::cancel_on_interrupt(cancel.clone())?;

    Ok(Controller::new(Gateway::new(api, cancel), Box::new(source)))
}

/// Read a desired challenge declaration. Remote ids are never declared.
pub fn load_desired(path: &Path) -> Result<Challenge> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read desired file failed: {}", path.display()))?;
    let desired: Challenge = serde_yaml::from_str(&raw)
        .with_context(|| format!("desired file is not a valid challenge: {}", path.display()))?;
    if desired.id.is_some() {
        bail!(
            "DESIRED_INVALID: {} declares an id; ids are assigned by CTFd",
            path.display()
        );
    }
    Ok(desired)
}

/// Print diagnostics and the outcome line. Error diagnostics fail the
/// command after the caller has persisted state.
pub fn report(op: &str, outcome: &Outcome) -> Result<()> {
    for d in outcome.diagnostics.iter() {
        eprintln!("{d}");
    }

    let errors = outcome.diagnostics.errors().count();
    let warnings = outcome.diagnostics.warnings().count();
    match outcome.state.as_ref().and_then(|c| c.id) {
        Some(id) => println!("op={op} challenge_id={id} errors={errors} warnings={warnings}"),
        None => println!("op={op} challenge_id=none errors={errors} warnings={warnings}"),
    }

    if errors > 0 {
        bail!("{op} finished with {errors} error diagnostic(s)");
    }
    Ok(())
}
