use std::path::Path;

use tabled::{Table, Tabled};

use crate::api::WorkspaceApi;
use crate::cmd::pull_store;
use crate::projection::ensure_directory;
use crate::settings::Settings;
use crate::store::WorkspaceStore;
use crate::SyncResult;

#[derive(Tabled)]
struct PulledWorkspace {
    id: i64,
    name: String,
    #[tabled(rename = "last modified")]
    last_modified: String,
}

pub fn invoke(settings: &Settings) -> SyncResult<Option<String>> {
    let store = pull_store(settings)?;
    Ok(Some(describe(&store, settings.workspaces_dir())?))
}

/// Ensures a directory for every pulled workspace and tabulates them.
pub(crate) fn describe<A: WorkspaceApi>(
    store: &WorkspaceStore<A>,
    root: &Path,
) -> SyncResult<String> {
    let mut rows = Vec::new();
    for name in store.workspace_names() {
        let (Some(metadata), Some(workspace)) = (store.metadata(&name), store.hosted(&name)) else {
            continue;
        };
        if !name.is_empty() && ensure_directory(root, &name)?.is_none() {
            continue;
        }

        rows.push(PulledWorkspace {
            id: metadata.id,
            name,
            last_modified: workspace
                .last_modified_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        });
    }

    Ok(Table::new(rows).to_string())
}
