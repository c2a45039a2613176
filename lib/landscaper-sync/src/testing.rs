use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use structurizr_client::{ClientError, WorkspaceMetadata};

use crate::api::WorkspaceApi;
use crate::model::Workspace;
use crate::SyncResult;

#[derive(Default)]
struct State {
    workspaces: IndexMap<i64, (WorkspaceMetadata, Workspace)>,
    next_id: i64,
    created: usize,
    puts: Vec<(WorkspaceMetadata, Workspace, bool)>,
}

/// In-memory remote store. Clones share state so a test can keep a handle on what the store
/// under test sends.
#[derive(Clone, Default)]
pub(crate) struct FakeApi {
    state: Rc<RefCell<State>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hosts `workspace` under a fresh id and returns its metadata.
    pub(crate) fn host(&self, mut workspace: Workspace) -> WorkspaceMetadata {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        workspace.id = id;
        let metadata = WorkspaceMetadata {
            id,
            name: workspace.name.clone(),
            api_key: format!("key-{id}"),
            api_secret: format!("secret-{id}"),
            ..Default::default()
        };
        state
            .workspaces
            .insert(id, (metadata.clone(), workspace));
        metadata
    }

    /// Replaces the hosted workspace with the same name, keeping its id.
    pub(crate) fn replace(&self, mut workspace: Workspace) {
        let mut state = self.state.borrow_mut();
        if let Some((metadata, hosted)) = state
            .workspaces
            .values_mut()
            .find(|(m, _)| m.name == workspace.name)
        {
            workspace.id = metadata.id;
            *hosted = workspace;
        }
    }

    pub(crate) fn created(&self) -> usize {
        self.state.borrow().created
    }

    pub(crate) fn puts(&self) -> Vec<(WorkspaceMetadata, Workspace, bool)> {
        self.state.borrow().puts.clone()
    }
}

impl WorkspaceApi for FakeApi {
    fn list_workspaces(&self) -> SyncResult<Vec<WorkspaceMetadata>> {
        Ok(self
            .state
            .borrow()
            .workspaces
            .values()
            .map(|(metadata, _)| metadata.clone())
            .collect())
    }

    fn create_workspace(&self) -> SyncResult<WorkspaceMetadata> {
        let metadata = self.host(Workspace::new(0, "", None));
        self.state.borrow_mut().created += 1;
        Ok(metadata)
    }

    fn get_workspace(&self, metadata: &WorkspaceMetadata) -> SyncResult<Workspace> {
        match self.state.borrow().workspaces.get(&metadata.id) {
            Some((_, workspace)) => Ok(workspace.clone()),
            None => Err(ClientError::HttpError {
                status: StatusCode::NOT_FOUND,
                headers: HeaderMap::new(),
                error: format!("workspace {} does not exist", metadata.id),
            }
            .into()),
        }
    }

    fn put_workspace(
        &self,
        metadata: &WorkspaceMetadata,
        workspace: &Workspace,
        merge_from_remote: bool,
    ) -> SyncResult<()> {
        let mut state = self.state.borrow_mut();
        state
            .puts
            .push((metadata.clone(), workspace.clone(), merge_from_remote));
        if let Some((stored_metadata, stored)) = state.workspaces.get_mut(&metadata.id) {
            stored_metadata.name = workspace.name.clone();
            *stored = workspace.clone();
        }
        Ok(())
    }
}
