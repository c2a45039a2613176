use structurizr_client::{Client, WorkspaceMetadata};
use tracing::debug;

use crate::model::Workspace;
use crate::SyncResult;

/// Operations the sync needs from the remote model store.
pub trait WorkspaceApi {
    fn list_workspaces(&self) -> SyncResult<Vec<WorkspaceMetadata>>;

    /// Creates an empty remote workspace and returns its identity.
    fn create_workspace(&self) -> SyncResult<WorkspaceMetadata>;

    fn get_workspace(&self, metadata: &WorkspaceMetadata) -> SyncResult<Workspace>;

    /// Uploads `workspace`. With `merge_from_remote` the layout of the stored copy is carried
    /// over into the upload.
    fn put_workspace(
        &self,
        metadata: &WorkspaceMetadata,
        workspace: &Workspace,
        merge_from_remote: bool,
    ) -> SyncResult<()>;
}

impl WorkspaceApi for Client {
    fn list_workspaces(&self) -> SyncResult<Vec<WorkspaceMetadata>> {
        Ok(Client::list_workspaces(self)?)
    }

    fn create_workspace(&self) -> SyncResult<WorkspaceMetadata> {
        Ok(Client::create_workspace(self)?)
    }

    fn get_workspace(&self, metadata: &WorkspaceMetadata) -> SyncResult<Workspace> {
        Ok(Client::get_workspace(self, metadata)?)
    }

    fn put_workspace(
        &self,
        metadata: &WorkspaceMetadata,
        workspace: &Workspace,
        merge_from_remote: bool,
    ) -> SyncResult<()> {
        if !merge_from_remote {
            return Ok(Client::put_workspace(self, metadata, workspace)?);
        }

        debug!(workspace = %metadata.name, "merging layout from remote workspace");
        let remote: Workspace = Client::get_workspace(self, metadata)?;
        let mut merged = workspace.clone();
        merged.views.copy_layout_from(&remote.views);
        Ok(Client::put_workspace(self, metadata, &merged)?)
    }
}
