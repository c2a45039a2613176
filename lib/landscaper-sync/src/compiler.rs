use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::{Workspace, WorkspaceScope};
use crate::{SyncError, SyncResult};

/// File the structurizr tooling exports a compiled workspace to.
pub const COMPILED_WORKSPACE_FILE_NAME: &str = "workspace.json";

/// Turns the descriptor kept in a workspace directory into a model.
pub trait WorkspaceCompiler {
    /// Returns `None` when `dir` holds nothing to compile.
    fn compile(&self, dir: &Path) -> SyncResult<Option<Workspace>>;
}

/// Reads the JSON export produced by compiling `workspace.dsl` with the structurizr tooling.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonExportCompiler;

impl WorkspaceCompiler for JsonExportCompiler {
    fn compile(&self, dir: &Path) -> SyncResult<Option<Workspace>> {
        let path = dir.join(COMPILED_WORKSPACE_FILE_NAME);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no compiled workspace");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut workspace = Workspace::from_json(&json)?;
        if workspace.last_modified_date.is_none() {
            let modified: DateTime<Utc> = fs::metadata(&path)?.modified()?.into();
            workspace.last_modified_date = Some(modified);
        }

        Ok(Some(workspace))
    }
}

/// Rejects models whose structure does not fit their declared scope. A landscape may not
/// describe containers, and a software system workspace may detail at most one software system.
pub fn validate_scope(workspace: &Workspace) -> SyncResult<()> {
    let detailed: Vec<&str> = workspace
        .model
        .software_systems()
        .filter(|s| workspace.model.containers_of(&s.id).next().is_some())
        .map(|s| s.name.as_str())
        .collect();

    let reason = match workspace.scope() {
        Some(WorkspaceScope::Landscape) if !detailed.is_empty() => format!(
            "landscape scoped workspaces cannot define containers (found in {})",
            detailed.join(", ")
        ),
        Some(WorkspaceScope::SoftwareSystem) if detailed.len() > 1 => format!(
            "software system scoped workspaces can define containers for one software system only (found in {})",
            detailed.join(", ")
        ),
        _ => return Ok(()),
    };

    Err(SyncError::ScopeViolation {
        workspace: workspace.name.clone(),
        reason,
    })
}
