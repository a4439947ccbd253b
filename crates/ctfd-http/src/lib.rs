//! ctfd-http
//!
//! Live CTFd REST adapter implementing [`CtfdApi`] over `reqwest::blocking`.
//!
//! All endpoints live under `<base>/api/v1` and answer with the envelope
//! `{ success, data, errors, message }`. Requests authenticate with
//! `Authorization: Token <token>`.
//!
//! Status mapping:
//! - 404 → [`GatewayError::NotFound`]
//! - other non-2xx → [`GatewayError::Http`]
//! - 2xx with `success: false` → [`GatewayError::Rejected`]
//! - unparseable body → [`GatewayError::Decode`]

use std::fmt;
use std::time::Duration;

use ctfd_gateway::wire::{
    ChallengeCreate, ChallengePatch, FileQuery, FileUpload, FlagCreate, RemoteChallenge,
    RemoteFile, RemoteFlag, RemoteTag, RemoteTopic, RequirementsWire, TagCreate, TopicCreate,
    TOPIC_TYPE_CHALLENGE,
};
use ctfd_gateway::{CtfdApi, GatewayError, GatewayResult};
use ctfd_schemas::ChallengeId;
use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const API_PREFIX: &str = "/api/v1";

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn failure_message(&self) -> String {
        match (&self.message, &self.errors) {
            (Some(m), _) => m.clone(),
            (None, Some(e)) => e.to_string(),
            (None, None) => "no message".to_string(),
        }
    }
}

/// Best-effort message extraction from an error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Envelope<serde_json::Value>>(body) {
        Ok(env) if env.message.is_some() || env.errors.is_some() => env.failure_message(),
        _ => body.chars().take(200).collect(),
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

// ---------------------------------------------------------------------------
// HttpCtfd
// ---------------------------------------------------------------------------

/// Blocking CTFd client. **The token is redacted in `Debug` output.**
pub struct HttpCtfd {
    api_base: String,
    token: String,
    client: Client,
}

impl fmt::Debug for HttpCtfd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCtfd")
            .field("api_base", &self.api_base)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl HttpCtfd {
    /// `base_url` is the CTFd root (e.g. `https://ctf.example.org`), with or
    /// without a trailing slash.
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            api_base: format!("{}{}", base_url.trim_end_matches('/'), API_PREFIX),
            token: token.into(),
            client,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send, map status, and decode the envelope. `Ok(None)` when `data` is
    /// absent or null.
    fn exec<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> GatewayResult<Option<T>> {
        let resp = req
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .send()
            .map_err(transport)?;
        let status = resp.status();
        let body = resp.text().map_err(transport)?;
        debug!(what, status = status.as_u16(), "ctfd/response");

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound {
                what: what.to_string(),
            });
        }
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let env: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Decode(format!("{what}: {e}")))?;
        if !env.success {
            return Err(GatewayError::Rejected(env.failure_message()));
        }
        Ok(env.data)
    }

    fn exec_data<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> GatewayResult<T> {
        self.exec(what, req)?
            .ok_or_else(|| GatewayError::Decode(format!("{what}: response carried no data")))
    }

    fn exec_unit(&self, what: &str, req: RequestBuilder) -> GatewayResult<()> {
        self.exec::<serde_json::Value>(what, req).map(|_| ())
    }
}

impl CtfdApi for HttpCtfd {
    fn create_challenge(&self, req: &ChallengeCreate) -> GatewayResult<RemoteChallenge> {
        let rb = self.client.post(self.url("/challenges")).json(req);
        self.exec_data("challenge", rb)
    }

    fn get_challenge(&self, id: ChallengeId) -> GatewayResult<RemoteChallenge> {
        let rb = self.client.get(self.url(&format!("/challenges/{id}")));
        self.exec_data(&format!("challenge {id}"), rb)
    }

    fn patch_challenge(
        &self,
        id: ChallengeId,
        req: &ChallengePatch,
    ) -> GatewayResult<RemoteChallenge> {
        let rb = self
            .client
            .patch(self.url(&format!("/challenges/{id}")))
            .json(req);
        self.exec_data(&format!("challenge {id}"), rb)
    }

    fn delete_challenge(&self, id: ChallengeId) -> GatewayResult<()> {
        let rb = self.client.delete(self.url(&format!("/challenges/{id}")));
        self.exec_unit(&format!("challenge {id}"), rb)
    }

    fn get_requirements(&self, id: ChallengeId) -> GatewayResult<Option<RequirementsWire>> {
        let rb = self
            .client
            .get(self.url(&format!("/challenges/{id}/requirements")));
        self.exec(&format!("challenge {id} requirements"), rb)
    }

    fn create_flag(&self, req: &FlagCreate) -> GatewayResult<RemoteFlag> {
        let rb = self.client.post(self.url("/flags")).json(req);
        self.exec_data("flag", rb)
    }

    fn delete_flag(&self, flag_id: i64) -> GatewayResult<()> {
        let rb = self.client.delete(self.url(&format!("/flags/{flag_id}")));
        self.exec_unit(&format!("flag {flag_id}"), rb)
    }

    fn list_tags(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTag>> {
        let rb = self.client.get(self.url(&format!("/challenges/{id}/tags")));
        Ok(self
            .exec(&format!("challenge {id} tags"), rb)?
            .unwrap_or_default())
    }

    fn create_tag(&self, req: &TagCreate) -> GatewayResult<RemoteTag> {
        let rb = self.client.post(self.url("/tags")).json(req);
        self.exec_data("tag", rb)
    }

    fn delete_tag(&self, tag_id: i64) -> GatewayResult<()> {
        let rb = self.client.delete(self.url(&format!("/tags/{tag_id}")));
        self.exec_unit(&format!("tag {tag_id}"), rb)
    }

    fn list_topics(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTopic>> {
        let rb = self.client.get(self.url(&format!("/challenges/{id}/topics")));
        Ok(self
            .exec(&format!("challenge {id} topics"), rb)?
            .unwrap_or_default())
    }

    fn create_topic(&self, req: &TopicCreate) -> GatewayResult<RemoteTopic> {
        let rb = self.client.post(self.url("/topics")).json(req);
        self.exec_data("topic", rb)
    }

    fn delete_topic(&self, association_id: i64) -> GatewayResult<()> {
        let rb = self.client.delete(self.url("/topics")).query(&[
            ("type", TOPIC_TYPE_CHALLENGE.to_string()),
            ("target_id", association_id.to_string()),
        ]);
        self.exec_unit(&format!("topic {association_id}"), rb)
    }

    fn list_files(&self, query: &FileQuery) -> GatewayResult<Vec<RemoteFile>> {
        let mut params = vec![("type", query.file_type.as_str())];
        if let Some(location) = query.location {
            params.push(("location", location.as_str()));
        }
        let rb = self.client.get(self.url("/files")).query(&params);
        Ok(self.exec("files", rb)?.unwrap_or_default())
    }

    fn upload_file(&self, req: &FileUpload) -> GatewayResult<Vec<RemoteFile>> {
        let part = multipart::Part::bytes(req.content.clone()).file_name(req.name.clone());
        let form = multipart::Form::new()
            .part("file", part)
            .text("challenge", req.challenge.to_string())
            .text("type", req.file_type.as_str())
            .text("location", req.location.as_str());
        let rb = self.client.post(self.url("/files")).multipart(form);
        Ok(self
            .exec(&format!("file upload {}", req.name), rb)?
            .unwrap_or_default())
    }

    fn delete_file(&self, file_id: i64) -> GatewayResult<()> {
        let rb = self.client.delete(self.url(&format!("/files/{file_id}")));
        self.exec_unit(&format!("file {file_id}"), rb)
    }
}
