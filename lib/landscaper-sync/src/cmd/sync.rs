use chrono::{DateTime, Utc};
use tracing::info;

use crate::api::WorkspaceApi;
use crate::builder::ModelBuilder;
use crate::catalog::load_entities;
use crate::cmd::pull_store;
use crate::cmd::push::describe as describe_push;
use crate::compiler::JsonExportCompiler;
use crate::projection::project;
use crate::settings::Settings;
use crate::store::WorkspaceStore;
use crate::templates::DescriptorTemplates;
use crate::SyncResult;

pub fn invoke(settings: &Settings, push: bool) -> SyncResult<Option<String>> {
    let mut store = pull_store(settings)?;
    Ok(Some(run(&mut store, settings, push, Utc::now())?))
}

/// Builds the catalog workspaces from the configured catalog and writes them below the
/// workspace root, optionally pushing newer local workspaces afterwards.
pub(crate) fn run<A: WorkspaceApi>(
    store: &mut WorkspaceStore<A>,
    settings: &Settings,
    push: bool,
    now: DateTime<Utc>,
) -> SyncResult<String> {
    let entities = load_entities(settings.catalog_location())?.unwrap_or_default();
    let changed = ModelBuilder::new(store).build(&entities, now)?;

    let templates = DescriptorTemplates::load(settings.templates_dir())?;
    let root = settings.workspaces_dir();
    let created = project(store, root, &templates)?;
    info!(root = %root.display(), descriptors = created.len(), "wrote workspaces");

    let mut lines = vec![
        format!("{} catalog entities", entities.len()),
        format!("{} workspaces changed", changed.len()),
    ];
    lines.extend(changed.iter().map(|name| format!("  {name}")));
    lines.push(format!("{} descriptors created", created.len()));

    if push {
        let summary = store.push(root, &JsonExportCompiler)?;
        lines.push(describe_push(&summary));
    }

    Ok(lines.join("\n").trim_end().to_string())
}
