use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TOKEN_ENV: &str = "CTFD_API_TOKEN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and file settings read from the merged config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtfdSettings {
    /// Instance base URL, without `/api/v1`.
    pub url: String,
    /// NAME of the env var holding the API token.
    pub token_env: String,
    pub timeout: Duration,
    /// Base for relative file paths; `None` means the desired file's dir.
    pub files_base_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    ctfd: RawCtfd,
    #[serde(default)]
    files: RawFiles,
}

#[derive(Debug, Default, Deserialize)]
struct RawCtfd {
    url: Option<String>,
    token_env: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFiles {
    base_dir: Option<PathBuf>,
}

impl CtfdSettings {
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let raw: RawConfig = serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: ctfd/files sections have the wrong shape")?;

        let url = match raw.ctfd.url.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u.trim_end_matches('/').to_string(),
            _ => bail!("CONFIG_MISSING: /ctfd/url is required"),
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("CONFIG_INVALID: /ctfd/url must be an http(s) URL, got '{url}'");
        }

        let token_env = raw
            .ctfd
            .token_env
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string());

        let timeout_secs = raw.ctfd.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("CONFIG_INVALID: /ctfd/timeout_secs must be positive");
        }

        Ok(Self {
            url,
            token_env,
            timeout: Duration::from_secs(timeout_secs),
            files_base_dir: raw.files.base_dir,
        })
    }
}
