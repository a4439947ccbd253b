//! API token resolution.
//!
//! Config stores only the env var NAME (`/ctfd/token_env`). The token is
//! resolved once at startup and passed to the HTTP adapter constructor.
//! Errors name the variable, never the value, and `Debug` redacts it.

use anyhow::{bail, Result};

use crate::CtfdSettings;

/// The CTFd API token. **Redacted in `Debug` output.**
#[derive(Clone)]
pub struct ResolvedToken {
    env_var: String,
    token: String,
}

impl ResolvedToken {
    /// Name of the env var the token came from.
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    pub fn expose(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for ResolvedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedToken")
            .field("env_var", &self.env_var)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// `None` when the variable is unset or blank.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve the token named by `settings.token_env` from the process env.
///
/// # Errors
/// SECRETS_MISSING with the variable NAME when it is unset or blank.
pub fn resolve_token(settings: &CtfdSettings) -> Result<ResolvedToken> {
    resolve_token_with(&settings.token_env, resolve_env)
}

/// As [`resolve_token`], with an explicit lookup.
pub fn resolve_token_with(
    env_var: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedToken> {
    match lookup(env_var).filter(|v| !v.trim().is_empty()) {
        Some(token) => Ok(ResolvedToken {
            env_var: env_var.to_string(),
            token: token.trim().to_string(),
        }),
        None => bail!(
            "SECRETS_MISSING: required env var '{}' (CTFd API token) is not set or empty",
            env_var
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_trimmed_and_redacted() {
        let t = resolve_token_with("X", |_| Some(" ctfd_abc \n".to_string())).unwrap();
        assert_eq!(t.expose(), "ctfd_abc");
        let dbg = format!("{t:?}");
        assert!(dbg.contains("<REDACTED>"));
        assert!(!dbg.contains("ctfd_abc"));
    }

    #[test]
    fn blank_token_is_missing() {
        let err = resolve_token_with("CTFD_BLANK", |_| Some("   ".to_string())).unwrap_err();
        assert!(err.to_string().contains("CTFD_BLANK"));
    }
}
