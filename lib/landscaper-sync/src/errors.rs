use landscaper_templating::TemplatingError;
use structurizr_client::ClientError;
use thiserror::Error;

use crate::model::ElementKind;

#[remain::sorted]
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("structurizr client error: {0}")]
    Client(#[from] ClientError),

    #[error("{kind} named `{name}` already exists")]
    DuplicateElement { kind: ElementKind, name: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("workspace `{workspace}` is not valid for its scope: {reason}")]
    ScopeViolation { workspace: String, reason: String },

    #[error("json serialize/deserialize error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Templating(#[from] TemplatingError),

    /// Errors that may occur when deserializing types from TOML format.
    #[error("toml deserialize error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("no element with id `{0}`")]
    UnknownElement(String),

    /// A catalog component or resource names a system that was never registered.
    #[error("No workspace found for software system: {0}")]
    UnknownSoftwareSystem(String),

    #[error("no workspace named `{0}`")]
    UnknownWorkspace(String),
}

pub type SyncResult<T> = Result<T, SyncError>;
