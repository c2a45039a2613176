use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SyncResult;

pub const DEFAULT_CONFIG_NAME: &str = "landscaper.toml";

pub const DEFAULT_STRUCTURIZR_URL: &str = "http://localhost:8080";

pub const DEFAULT_WORKSPACES_DIR: &str = "named-workspaces";

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub structurizr: StructurizrSettings,
    pub catalog: CatalogSettings,
    pub workspaces: WorkspacesSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StructurizrSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// URL of the catalog entity API, or path to a snapshot of it
    pub location: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspacesSettings {
    pub dir: Option<PathBuf>,
    /// Directory holding custom descriptor templates
    pub templates: Option<PathBuf>,
}

/// Values from the command line or the environment. Anything set here wins over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub catalog: Option<String>,
    pub workspaces: Option<PathBuf>,
    pub templates: Option<PathBuf>,
}

impl Settings {
    pub fn from_path(path: &Path) -> SyncResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Reads the settings file at `path`, or `landscaper.toml` in `cwd` when no path is given.
    /// Only an explicitly given file has to exist.
    pub fn load(path: Option<&Path>, cwd: &Path) -> SyncResult<Self> {
        if let Some(path) = path {
            return Self::from_path(path);
        }

        let default_path = cwd.join(DEFAULT_CONFIG_NAME);
        if default_path.is_file() {
            Self::from_path(&default_path)
        } else {
            debug!("no settings file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.url.is_some() {
            self.structurizr.url = overrides.url;
        }
        if overrides.api_key.is_some() {
            self.structurizr.api_key = overrides.api_key;
        }
        if overrides.catalog.is_some() {
            self.catalog.location = overrides.catalog;
        }
        if overrides.workspaces.is_some() {
            self.workspaces.dir = overrides.workspaces;
        }
        if overrides.templates.is_some() {
            self.workspaces.templates = overrides.templates;
        }
        self
    }

    pub fn structurizr_url(&self) -> &str {
        self.structurizr
            .url
            .as_deref()
            .unwrap_or(DEFAULT_STRUCTURIZR_URL)
    }

    pub fn api_key(&self) -> &str {
        self.structurizr.api_key.as_deref().unwrap_or_default()
    }

    pub fn catalog_location(&self) -> Option<&str> {
        self.catalog.location.as_deref()
    }

    pub fn workspaces_dir(&self) -> &Path {
        self.workspaces
            .dir
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_WORKSPACES_DIR))
    }

    pub fn templates_dir(&self) -> Option<&Path> {
        self.workspaces.templates.as_deref()
    }
}
