use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::catalog::entity::CatalogEntity;
use crate::SyncResult;

/// Where catalog entities are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    /// A catalog API endpoint returning a JSON array of entities
    Url(String),
    /// A local snapshot of the same JSON array
    File(PathBuf),
}

impl CatalogSource {
    /// Resolves a location string. Blank locations resolve to nothing.
    pub fn parse(location: &str) -> Option<Self> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }

        if location.starts_with("http://") || location.starts_with("https://") {
            Some(CatalogSource::Url(location.to_string()))
        } else {
            Some(CatalogSource::File(PathBuf::from(location)))
        }
    }

    /// Loads the entities behind this source.
    ///
    /// Network failures are recoverable and produce an empty catalog. A local snapshot is
    /// authoritative, so failing to read or parse it is an error.
    pub fn load(&self) -> SyncResult<Vec<CatalogEntity>> {
        match self {
            CatalogSource::Url(url) => Ok(fetch(url)),
            CatalogSource::File(path) => {
                debug!(path = %path.display(), "reading catalog snapshot");
                let json = fs::read_to_string(path)?;
                Ok(serde_json::from_str(&json)?)
            }
        }
    }
}

/// Reads catalog entities from `location`, which may be a URL or a file path.
///
/// Returns `None` when no location is configured.
pub fn load_entities(location: Option<&str>) -> SyncResult<Option<Vec<CatalogEntity>>> {
    let Some(source) = location.and_then(CatalogSource::parse) else {
        debug!("no catalog location configured");
        return Ok(None);
    };

    let entities = source.load()?;
    info!(count = entities.len(), "loaded catalog entities");
    Ok(Some(entities))
}

fn fetch(url: &str) -> Vec<CatalogEntity> {
    let response = reqwest::blocking::get(url).and_then(|r| r.error_for_status());
    let entities = match response {
        Ok(response) => response.json::<Vec<CatalogEntity>>(),
        Err(e) => {
            warn!(url, error = %e, "unable to reach catalog, continuing with an empty catalog");
            return Vec::new();
        }
    };

    entities.unwrap_or_else(|e| {
        warn!(url, error = %e, "catalog returned an unreadable response, continuing with an empty catalog");
        Vec::new()
    })
}
