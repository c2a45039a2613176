use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use structurizr_client::WorkspaceMetadata;
use tracing::{debug, info, warn};

use crate::api::WorkspaceApi;
use crate::compiler::{validate_scope, WorkspaceCompiler};
use crate::model::{Workspace, WorkspaceScope};
use crate::projection::workspace_directory;
use crate::SyncResult;

/// Outcome of [`WorkspaceStore::push`], by workspace name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub uploaded: Vec<String>,
    pub up_to_date: Vec<String>,
    pub missing: Vec<String>,
    pub rejected: Vec<String>,
}

/// Session state of one run: what the remote store knows, and the catalog copies the sync
/// writes to. Every collection is keyed by workspace name.
pub struct WorkspaceStore<A> {
    api: A,
    metadata: IndexMap<String, WorkspaceMetadata>,
    hosted: IndexMap<String, Workspace>,
    catalog: IndexMap<String, Workspace>,
}

impl<A: WorkspaceApi> WorkspaceStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            metadata: IndexMap::new(),
            hosted: IndexMap::new(),
            catalog: IndexMap::new(),
        }
    }

    /// Fetches every remote workspace. Names already known are left untouched, so the first pull
    /// of a run wins. Returns the number of workspaces added.
    pub fn pull(&mut self) -> SyncResult<usize> {
        let mut added = 0;
        for metadata in self.api.list_workspaces()? {
            let name = metadata.name.clone();
            if self.metadata.contains_key(&name) {
                debug!(workspace = %name, "already pulled");
                continue;
            }

            if !self.hosted.contains_key(&name) {
                let workspace = self.api.get_workspace(&metadata)?;
                self.hosted.insert(name.clone(), workspace);
            }
            self.metadata.insert(name, metadata);
            added += 1;
        }

        info!(count = added, "pulled workspaces");
        Ok(added)
    }

    pub fn metadata(&self, name: &str) -> Option<&WorkspaceMetadata> {
        self.metadata.get(name)
    }

    pub fn hosted(&self, name: &str) -> Option<&Workspace> {
        self.hosted.get(name)
    }

    pub fn catalog(&self, name: &str) -> Option<&Workspace> {
        self.catalog.get(name)
    }

    pub fn catalog_mut(&mut self, name: &str) -> Option<&mut Workspace> {
        self.catalog.get_mut(name)
    }

    pub fn catalog_workspaces(&self) -> impl Iterator<Item = &Workspace> {
        self.catalog.values()
    }

    /// Names of catalog workspaces with the given scope, in registration order.
    pub fn catalog_names(&self, scope: WorkspaceScope) -> Vec<String> {
        self.catalog
            .iter()
            .filter(|(_, w)| w.scope() == Some(scope))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Every workspace name known to the run, hosted first.
    pub fn workspace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hosted.keys().cloned().collect();
        for name in self.catalog.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Makes sure a workspace called `name` exists, creating the remote record and a shell model
    /// when it does not. Returns `true` if a shell was created.
    pub fn ensure_or_create(
        &mut self,
        name: &str,
        description: Option<&str>,
        scope: WorkspaceScope,
    ) -> SyncResult<bool> {
        if self.hosted.contains_key(name) || self.catalog.contains_key(name) {
            return Ok(false);
        }

        let metadata = self.api.create_workspace()?;
        info!(workspace = name, id = metadata.id, "created remote workspace");
        let shell = Workspace::shell(metadata.id, name, description, scope)?;
        self.metadata.insert(name.to_string(), metadata);
        self.hosted.insert(name.to_string(), shell);
        Ok(true)
    }

    /// Returns the catalog copy of the hosted workspace `name`, cloning it on first use.
    ///
    /// A remote record that has no name yet gets the clone uploaded right away so the name is
    /// published.
    pub fn clone_to_catalog(&mut self, name: &str) -> SyncResult<Option<&mut Workspace>> {
        if !self.catalog.contains_key(name) {
            let Some(hosted) = self.hosted.get(name) else {
                return Ok(None);
            };

            let mut workspace = hosted.clone();
            if let Some(metadata) = self.metadata.get_mut(name) {
                workspace.id = metadata.id;
                if metadata.name.is_empty() {
                    debug!(workspace = name, id = metadata.id, "publishing workspace name");
                    self.api.put_workspace(metadata, &workspace, false)?;
                    metadata.name = workspace.name.clone();
                }
            }

            self.catalog.insert(name.to_string(), workspace);
        }

        Ok(self.catalog.get_mut(name))
    }

    pub(crate) fn take_catalog(&mut self, name: &str) -> Option<Workspace> {
        self.catalog.shift_remove(name)
    }

    pub(crate) fn put_catalog(&mut self, name: &str, workspace: Workspace) {
        self.catalog.insert(name.to_string(), workspace);
    }

    /// Uploads every local workspace under `root` that is newer than its hosted copy.
    ///
    /// Nothing here fails the run except transport errors: missing, stale or invalid local
    /// workspaces are logged and skipped.
    pub fn push(
        &mut self,
        root: &Path,
        compiler: &dyn WorkspaceCompiler,
    ) -> SyncResult<PushSummary> {
        let mut summary = PushSummary::default();
        let names: Vec<String> = self.metadata.keys().cloned().collect();

        for name in names {
            if name.is_empty() {
                debug!("skipping unnamed remote workspace");
                continue;
            }

            let Some(metadata) = self.metadata.get(&name).cloned() else {
                continue;
            };

            let Some(dir) = workspace_directory(root, &name) else {
                summary.rejected.push(name);
                continue;
            };

            let Some(mut local) = compiler.compile(&dir)? else {
                warn!(workspace = %name, "no local workspace found, it may have been renamed");
                summary.missing.push(name);
                continue;
            };

            if let Err(e) = validate_scope(&local) {
                warn!(workspace = %name, error = %e, "skipping invalid workspace");
                summary.rejected.push(name);
                continue;
            }

            let hosted_modified = match self.hosted.get(&name) {
                Some(hosted) => hosted.last_modified_date,
                None => {
                    let hosted = self.api.get_workspace(&metadata)?;
                    let modified = hosted.last_modified_date;
                    self.hosted.insert(name.clone(), hosted);
                    modified
                }
            };

            if !is_newer(local.last_modified_date, hosted_modified) {
                info!(workspace = %name, "hosted workspace is up to date");
                summary.up_to_date.push(name);
                continue;
            }

            info!(workspace = %name, id = metadata.id, "pushing workspace");
            local.id = metadata.id;
            self.api.put_workspace(&metadata, &local, false)?;
            self.hosted.insert(name.clone(), local);
            summary.uploaded.push(name);
        }

        Ok(summary)
    }
}

fn is_newer(local: Option<DateTime<Utc>>, hosted: Option<DateTime<Utc>>) -> bool {
    match (local, hosted) {
        (Some(local), Some(hosted)) => local > hosted,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
