mod hmac_auth;

// Blocking client for the structurizr admin and workspace APIs.
use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::hmac_auth::HmacContent;

const DEFAULT_CLIENT_AGENT: &str = "landscaper-structurizr";
const X_AUTHORIZATION: &str = "X-Authorization";
const NONCE: &str = "Nonce";
const CONTENT_MD5: &str = "Content-MD5";

/// Errors returned by the client
#[remain::sorted]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Generic HTTP Error
    #[error("HTTP Error. Code: {status}, message: {error}")]
    HttpError {
        status: StatusCode,
        headers: HeaderMap,
        error: String,
    },

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid workspace secret: {0}")]
    InvalidSecret(#[from] hmac::digest::InvalidLength),

    /// Errors returned by reqwest
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// Serde JSON parsing error
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    /// URL Parsing Error
    #[error(transparent)]
    UrlParserError(#[from] url::ParseError),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Identity and credentials of a hosted workspace as returned by the admin API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceMetadata {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkspacesResponse {
    workspaces: Vec<WorkspaceMetadata>,
}

/// Various forms of authentication supported by the structurizr APIs.
#[derive(PartialEq, Clone)]
pub enum Credentials {
    /// Admin API key, sent verbatim in the `X-Authorization` header.
    AdminKey(String),
    /// Per-workspace key/secret pair used to HMAC sign workspace API requests.
    Workspace { api_key: String, api_secret: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AdminKey(value) => f
                .debug_tuple("Credentials::AdminKey")
                .field(&"*".repeat(value.len()))
                .finish(),
            Credentials::Workspace { api_key, .. } => f
                .debug_struct("Credentials::Workspace")
                .field("api_key", api_key)
                .field("api_secret", &"***")
                .finish(),
        }
    }
}

impl From<&WorkspaceMetadata> for Credentials {
    fn from(metadata: &WorkspaceMetadata) -> Self {
        Credentials::Workspace {
            api_key: metadata.api_key.clone(),
            api_secret: metadata.api_secret.clone(),
        }
    }
}

#[derive(Clone, Copy, Default)]
pub enum MediaType {
    /// Return json (the default)
    #[default]
    Json,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MediaType::Json => write!(f, "application/json; charset=UTF-8"),
        }
    }
}

/// Entrypoint for interacting with a structurizr (on-premises or cloud) instance.
#[derive(Clone)]
pub struct Client {
    host: url::Url,
    agent: String,
    client: reqwest::blocking::Client,
    admin_credentials: Option<Credentials>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host.as_str())
            .field("agent", &self.agent)
            .field("admin_credentials", &self.admin_credentials)
            .finish()
    }
}

impl Client {
    /// Creates a client for the instance rooted at `host`. The API lives under `{host}/api`.
    pub fn new<H>(host: H, admin_key: Option<String>) -> ClientResult<Self>
    where
        H: AsRef<str>,
    {
        let http = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let mut host = url::Url::parse(host.as_ref())?;
        if !host.path().ends_with('/') {
            let path = format!("{}/", host.path());
            host.set_path(&path);
        }

        Ok(Self {
            host,
            agent: DEFAULT_CLIENT_AGENT.to_string(),
            client: http,
            admin_credentials: admin_key.map(Credentials::AdminKey),
        })
    }

    pub fn url(&self, path: &str) -> ClientResult<url::Url> {
        Ok(self.host.join(path.trim_start_matches('/'))?)
    }

    /// Lists the metadata of every workspace on the instance.
    pub fn list_workspaces(&self) -> ClientResult<Vec<WorkspaceMetadata>> {
        let url = self.url("api/workspace")?;
        let response: WorkspacesResponse =
            self.request(reqwest::Method::GET, url, None, self.admin_credentials.as_ref())?;
        Ok(response.workspaces)
    }

    /// Creates a new, empty workspace and returns its metadata.
    pub fn create_workspace(&self) -> ClientResult<WorkspaceMetadata> {
        let url = self.url("api/workspace")?;
        self.request(reqwest::Method::POST, url, None, self.admin_credentials.as_ref())
    }

    pub fn get_workspace<D>(&self, metadata: &WorkspaceMetadata) -> ClientResult<D>
    where
        D: DeserializeOwned,
    {
        let url = self.url(&format!("api/workspace/{}", metadata.id))?;
        let credentials = Credentials::from(metadata);
        self.request(reqwest::Method::GET, url, None, Some(&credentials))
    }

    pub fn put_workspace<B>(&self, metadata: &WorkspaceMetadata, workspace: &B) -> ClientResult<()>
    where
        B: Serialize,
    {
        let url = self.url(&format!("api/workspace/{}", metadata.id))?;
        let credentials = Credentials::from(metadata);
        let body = serde_json::to_string(workspace)?;
        let _: serde_json::Value =
            self.request(reqwest::Method::PUT, url, Some(body), Some(&credentials))?;
        Ok(())
    }

    fn request<Out>(
        &self,
        method: reqwest::Method,
        url: url::Url,
        body: Option<String>,
        credentials: Option<&Credentials>,
    ) -> ClientResult<Out>
    where
        Out: DeserializeOwned,
    {
        let headers = self.headers(&method, &url, body.as_deref(), credentials)?;
        debug!(method = %method, url = %url, "sending structurizr request");

        let mut req = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let response_body = response.bytes()?;

        if status.is_success() {
            debug!("Received successful response. Read payload.");
            if status == StatusCode::NO_CONTENT || response_body.is_empty() {
                Ok(serde_json::from_str("null")?)
            } else {
                Ok(serde_json::from_slice::<Out>(&response_body)?)
            }
        } else {
            let error = if response_body.is_empty() {
                "empty response".into()
            } else {
                String::from_utf8_lossy(&response_body).into()
            };
            Err(ClientError::HttpError {
                status,
                headers,
                error,
            })
        }
    }

    fn headers(
        &self,
        method: &reqwest::Method,
        url: &url::Url,
        body: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_str(&self.agent)?,
        );
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_str(&MediaType::Json.to_string())?,
        );

        let content_type = if body.is_some() {
            let content_type = MediaType::Json.to_string();
            headers.insert(
                reqwest::header::CONTENT_TYPE,
                HeaderValue::from_str(&content_type)?,
            );
            content_type
        } else {
            String::new()
        };

        match credentials {
            Some(Credentials::AdminKey(key)) => {
                headers.insert(X_AUTHORIZATION, HeaderValue::from_str(key)?);
            }
            Some(Credentials::Workspace {
                api_key,
                api_secret,
            }) => {
                let content = HmacContent::new(
                    method.as_str(),
                    url.path(),
                    body.unwrap_or_default(),
                    &content_type,
                );
                headers.insert(
                    X_AUTHORIZATION,
                    HeaderValue::from_str(&content.authorization(api_key, api_secret)?)?,
                );
                headers.insert(NONCE, HeaderValue::from_str(&content.nonce)?);
                headers.insert(CONTENT_MD5, HeaderValue::from_str(&content.content_md5())?);
            }
            None => {}
        }

        Ok(headers)
    }
}
