use std::fs;
use std::path::{Component, Path, PathBuf};

use landscaper_templating::{identifier, TemplateContext};
use tracing::{debug, info, warn};

use crate::api::WorkspaceApi;
use crate::model::{Workspace, WorkspaceScope, DSL_IDENTIFIER_PROPERTY_NAME};
use crate::store::WorkspaceStore;
use crate::templates::DescriptorTemplates;
use crate::SyncResult;

pub const CATALOG_WORKSPACE_FILE_NAME: &str = "catalog-workspace.json";
pub const WORKSPACE_DSL_FILE_NAME: &str = "workspace.dsl";

/// Directory of workspace `name` under `root`, or `None` when the name is not a single plain
/// path component and would land elsewhere.
pub fn workspace_directory(root: &Path, name: &str) -> Option<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(root.join(name)),
        _ => {
            warn!(workspace = name, "workspace name is not a plain directory name, skipping");
            None
        }
    }
}

/// Creates the directory of workspace `name` under `root`. Names that do not map to a directory
/// directly below `root` are skipped.
pub fn ensure_directory(root: &Path, name: &str) -> SyncResult<Option<PathBuf>> {
    let Some(dir) = workspace_directory(root, name) else {
        return Ok(None);
    };
    fs::create_dir_all(&dir)?;
    Ok(Some(dir))
}

/// Writes every workspace known to `store` below `root`, one directory per workspace.
///
/// Catalog models are always rewritten. A descriptor is only rendered when none exists yet, so
/// hand edits survive. Returns the descriptors that were created.
pub fn project<A: WorkspaceApi>(
    store: &WorkspaceStore<A>,
    root: &Path,
    templates: &DescriptorTemplates,
) -> SyncResult<Vec<PathBuf>> {
    let mut created = Vec::new();
    for name in store.workspace_names() {
        if name.is_empty() {
            continue;
        }

        let Some(dir) = ensure_directory(root, &name)? else {
            continue;
        };
        let Some(workspace) = store.catalog(&name) else {
            continue;
        };

        fs::write(dir.join(CATALOG_WORKSPACE_FILE_NAME), workspace.to_json()?)?;

        let descriptor = dir.join(WORKSPACE_DSL_FILE_NAME);
        if descriptor.exists() {
            debug!(path = %descriptor.display(), "keeping existing descriptor");
            continue;
        }

        let scope = workspace.scope().unwrap_or(WorkspaceScope::SoftwareSystem);
        fs::write(&descriptor, templates.render(scope, &descriptor_context(workspace)?)?)?;
        info!(path = %descriptor.display(), "created workspace descriptor");
        created.push(descriptor);
    }

    Ok(created)
}

fn descriptor_context(workspace: &Workspace) -> SyncResult<TemplateContext> {
    let dsl_identifier = workspace
        .primary_software_system()
        .and_then(|s| s.property(DSL_IDENTIFIER_PROPERTY_NAME))
        .map(str::to_string)
        .unwrap_or_else(|| identifier(&workspace.name));

    let mut context = TemplateContext::new();
    context.insert("workspace_path", CATALOG_WORKSPACE_FILE_NAME)?;
    context.insert("workspace_name", &workspace.name)?;
    context.insert("dsl_identifier", &dsl_identifier)?;
    Ok(context)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::Utc;
    use tempfile::TempDir;

    use crate::builder::ModelBuilder;
    use crate::catalog::CatalogEntity;
    use crate::model::Workspace;
    use crate::projection::{ensure_directory, project, workspace_directory};
    use crate::store::WorkspaceStore;
    use crate::templates::DescriptorTemplates;
    use crate::testing::FakeApi;

    fn synced_store() -> WorkspaceStore<FakeApi> {
        let api = FakeApi::new();
        api.host(Workspace::new(0, "Hosted Only", None));
        let mut store = WorkspaceStore::new(api);
        store.pull().unwrap();

        let entities: Vec<CatalogEntity> = serde_json::from_str(
            r#"[{"kind": "System", "metadata": {"name": "Order Service"}}]"#,
        )
        .unwrap();
        ModelBuilder::new(&mut store).build(&entities, Utc::now()).unwrap();
        store
    }

    #[test]
    fn writes_models_and_descriptors_per_workspace() {
        let store = synced_store();
        let root = TempDir::new().unwrap();
        let templates = DescriptorTemplates::load(None).unwrap();

        let created = project(&store, root.path(), &templates).unwrap();

        assert_eq!(2, created.len());
        assert!(root.path().join("Hosted Only").is_dir());
        assert!(!root.path().join("Hosted Only/workspace.dsl").exists());

        let system_dir = root.path().join("Order Service");
        let json = fs::read_to_string(system_dir.join("catalog-workspace.json")).unwrap();
        let workspace = Workspace::from_json(&json).unwrap();
        assert_eq!(store.catalog("Order Service").unwrap(), &workspace);

        let dsl = fs::read_to_string(system_dir.join("workspace.dsl")).unwrap();
        assert!(dsl.starts_with("workspace extends catalog-workspace.json {"));
        assert!(dsl.contains("!element OrderService {"));

        let landscape = fs::read_to_string(root.path().join("Landscape/workspace.dsl")).unwrap();
        assert!(landscape.contains("systemLandscape"));
    }

    #[test]
    fn never_overwrites_existing_descriptors() {
        let store = synced_store();
        let root = TempDir::new().unwrap();
        let templates = DescriptorTemplates::load(None).unwrap();
        let descriptor = root.path().join("Order Service/workspace.dsl");
        fs::create_dir_all(descriptor.parent().unwrap()).unwrap();
        fs::write(&descriptor, "// edited by hand\n").unwrap();

        let created = project(&store, root.path(), &templates).unwrap();
        project(&store, root.path(), &templates).unwrap();

        assert_eq!(1, created.len());
        assert_eq!("// edited by hand\n", fs::read_to_string(&descriptor).unwrap());
        assert!(root
            .path()
            .join("Order Service/catalog-workspace.json")
            .is_file());
    }

    #[test]
    fn names_escaping_the_root_get_no_directory() {
        let root = TempDir::new().unwrap();

        for name in ["..", "../outside", "a/b", "/etc", "."] {
            assert_eq!(None, workspace_directory(root.path(), name), "{name}");
            assert_eq!(None, ensure_directory(root.path(), name).unwrap(), "{name}");
        }
        assert!(!root.path().join("a").exists());
        assert!(!root.path().parent().unwrap().join("outside").exists());

        let dir = ensure_directory(root.path(), "Order Service").unwrap().unwrap();
        assert_eq!(root.path().join("Order Service"), dir);
        assert!(dir.is_dir());
    }

    #[test]
    fn projection_skips_workspaces_with_unsafe_names() {
        let api = FakeApi::new();
        api.host(Workspace::new(0, "../escape", None));
        let mut store = WorkspaceStore::new(api);
        store.pull().unwrap();
        store.clone_to_catalog("../escape").unwrap();
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("workspaces");
        let templates = DescriptorTemplates::load(None).unwrap();

        let created = project(&store, &root, &templates).unwrap();

        assert!(created.is_empty());
        assert!(!parent.path().join("escape").exists());
    }
}
