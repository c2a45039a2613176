use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::WorkspaceApi;
use crate::model::{system_context_url, ElementKind, Workspace, WorkspaceScope, THEME_URL};
use crate::store::WorkspaceStore;
use crate::{SyncError, SyncResult};

pub const LANDSCAPE_WORKSPACE_NAME: &str = "Landscape";
pub const LANDSCAPE_VIEW_KEY: &str = "Landscape";

const LANDSCAPE_DESCRIPTION: &str = "The system landscape, imported from the service catalog";
const LANDSCAPE_VIEW_DESCRIPTION: &str = "An automatically generated system landscape view.";

/// Element kinds the landscape relates.
const LANDSCAPE_RELATABLE: &[ElementKind] = &[ElementKind::SoftwareSystem, ElementKind::Person];

/// Folds every software system workspace of the catalog into the landscape workspace.
///
/// Software systems are added before any relationship is cloned so the outcome does not depend
/// on the order workspaces were registered in. Returns `true` if the landscape changed.
pub fn aggregate<A: WorkspaceApi>(
    store: &mut WorkspaceStore<A>,
    now: DateTime<Utc>,
) -> SyncResult<bool> {
    let names = store.catalog_names(WorkspaceScope::SoftwareSystem);
    let (mut landscape, mut dirty) = take_landscape(store)?;

    let mut folded = Vec::new();
    for name in names {
        let Some(workspace) = store.catalog_mut(&name) else {
            continue;
        };
        if workspace.primary_software_system().is_none() {
            warn!(
                workspace = %name,
                "cannot add workspace to the landscape without a primary software system"
            );
            continue;
        }

        workspace.views.configuration.add_theme(THEME_URL);
        dirty |= add_software_system(&mut landscape, workspace)?;
        folded.push(name);
    }

    for name in &folded {
        if let Some(workspace) = store.catalog(name) {
            dirty |= clone_relationships(workspace, &mut landscape)?;
        }
    }

    let (view, created) = landscape
        .views
        .ensure_system_landscape_view(LANDSCAPE_VIEW_KEY, LANDSCAPE_VIEW_DESCRIPTION);
    dirty |= created;
    view.add_all_elements(&landscape.model);

    if dirty || landscape.last_modified_date.is_none() {
        landscape.touch(now);
    }

    info!(workspaces = folded.len(), changed = dirty, "aggregated landscape");
    store.put_catalog(LANDSCAPE_WORKSPACE_NAME, landscape);
    Ok(dirty)
}

/// Removes the catalog landscape from the store for the duration of the fold, creating it from
/// the hosted copy or a new shell on first use. The flag is `true` in the latter two cases.
fn take_landscape<A: WorkspaceApi>(store: &mut WorkspaceStore<A>) -> SyncResult<(Workspace, bool)> {
    if let Some(landscape) = store.take_catalog(LANDSCAPE_WORKSPACE_NAME) {
        return Ok((landscape, false));
    }

    store.ensure_or_create(
        LANDSCAPE_WORKSPACE_NAME,
        Some(LANDSCAPE_DESCRIPTION),
        WorkspaceScope::Landscape,
    )?;
    store.clone_to_catalog(LANDSCAPE_WORKSPACE_NAME)?;

    let landscape = store
        .take_catalog(LANDSCAPE_WORKSPACE_NAME)
        .ok_or_else(|| SyncError::UnknownWorkspace(LANDSCAPE_WORKSPACE_NAME.to_string()))?;
    Ok((landscape, true))
}

/// Adds the primary software system of `source` to the landscape. Descriptive fields are only
/// copied when the landscape element is created; the link back to `source` is refreshed every
/// time. Returns `true` if the element was created.
pub fn add_software_system(landscape: &mut Workspace, source: &Workspace) -> SyncResult<bool> {
    let Some(system) = source.primary_software_system() else {
        return Ok(false);
    };

    let mut created = false;
    let id = match landscape.model.software_system_with_name(&system.name) {
        Some(existing) => existing.id.clone(),
        None => {
            let copy = landscape
                .model
                .add_software_system(&system.name, system.description.as_deref())?;
            for (key, value) in &system.properties {
                copy.set_property(key.as_str(), value.as_str());
            }
            for perspective in &system.perspectives {
                copy.add_perspective(&perspective.name, &perspective.description);
            }
            copy.group = system.group.clone();
            copy.tags.union(system.tags.iter());

            debug!(software_system = %system.name, "added software system to landscape");
            created = true;
            copy.id.clone()
        }
    };

    if let Some(copy) = landscape.model.element_mut(&id) {
        copy.url = Some(system_context_url(source.id));
    }

    Ok(created)
}

/// Clones every person and software system level relationship of `source` whose ends exist in
/// `destination` by name. Container relationships are never cloned, and an existing edge
/// between the same ends blocks the clone. Returns `true` if anything was cloned.
pub fn clone_relationships(source: &Workspace, destination: &mut Workspace) -> SyncResult<bool> {
    let mut cloned_any = false;
    for relationship in source.model.relationships() {
        let (Some(from), Some(to)) = (
            source.model.element(&relationship.source_id),
            source.model.element(&relationship.destination_id),
        ) else {
            continue;
        };
        if !from.is_person_or_software_system() || !to.is_person_or_software_system() {
            continue;
        }

        let model = &mut destination.model;
        let (Some(from_id), Some(to_id)) = (
            model.top_level_with_name(from.kind, &from.name).map(|e| e.id.clone()),
            model.top_level_with_name(to.kind, &to.name).map(|e| e.id.clone()),
        ) else {
            continue;
        };
        if model.has_efferent_relationship(&from_id, &to_id) {
            continue;
        }

        let created = model.connect(
            &from_id,
            &to_id,
            relationship.description.as_deref(),
            LANDSCAPE_RELATABLE,
        )?;
        if let Some(id) = created {
            if let Some(clone) = model.relationship_mut(&id) {
                clone.tags.union(relationship.tags.iter());
            }
            cloned_any = true;
        }
    }

    Ok(cloned_any)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::landscape::{
        add_software_system, aggregate, clone_relationships, LANDSCAPE_VIEW_KEY,
        LANDSCAPE_WORKSPACE_NAME,
    };
    use crate::model::{ElementKind, Workspace, WorkspaceScope, THEME_URL};
    use crate::store::WorkspaceStore;
    use crate::testing::FakeApi;

    const SYSTEM_LEVEL: &[ElementKind] = &[ElementKind::SoftwareSystem, ElementKind::Container];

    fn system_workspace(id: i64, name: &str) -> Workspace {
        Workspace::shell(id, name, Some("from the catalog"), WorkspaceScope::SoftwareSystem)
            .unwrap()
    }

    #[test]
    fn new_landscape_system_copies_descriptive_fields_once() {
        let mut source = system_workspace(7, "Billing");
        {
            let system = source.model.software_system_with_name_mut("Billing").unwrap();
            system.group = Some("Finance".to_string());
            system.set_property("backstage.ref", "system:default/Billing");
            system.add_perspective("Owner", "team-billing");
            system.tags.union(["critical"]);
        }
        let mut landscape =
            Workspace::shell(1, LANDSCAPE_WORKSPACE_NAME, None, WorkspaceScope::Landscape).unwrap();

        assert!(add_software_system(&mut landscape, &source).unwrap());
        let copy = landscape.model.software_system_with_name("Billing").unwrap();
        assert_eq!(Some("Finance"), copy.group.as_deref());
        assert_eq!(Some("system:default/Billing"), copy.property("backstage.ref"));
        assert_eq!(1, copy.perspectives.len());
        assert!(copy.tags.contains("critical"));
        assert_eq!(Some("{workspace:7}/diagrams#SystemContext"), copy.url.as_deref());

        // later passes only refresh the link
        source.id = 8;
        source
            .model
            .software_system_with_name_mut("Billing")
            .unwrap()
            .group = Some("Other".to_string());
        assert!(!add_software_system(&mut landscape, &source).unwrap());
        let copy = landscape.model.software_system_with_name("Billing").unwrap();
        assert_eq!(Some("Finance"), copy.group.as_deref());
        assert_eq!(Some("{workspace:8}/diagrams#SystemContext"), copy.url.as_deref());
    }

    #[test]
    fn clones_only_system_level_relationships_once() {
        let mut source = system_workspace(2, "Billing");
        let billing = source.primary_software_system().unwrap().id.clone();
        let ledger = source.model.add_software_system("Ledger", None).unwrap().id.clone();
        let api = source.model.add_container(&billing, "API", None).unwrap().id.clone();
        source
            .model
            .connect(&api, &ledger, Some("dependsOn"), SYSTEM_LEVEL)
            .unwrap();
        let implied = source
            .model
            .relationships()
            .find(|r| r.source_id == billing)
            .unwrap()
            .id
            .clone();
        source
            .model
            .relationship_mut(&implied)
            .unwrap()
            .tags
            .union(["sync"]);

        let mut landscape =
            Workspace::shell(1, LANDSCAPE_WORKSPACE_NAME, None, WorkspaceScope::Landscape).unwrap();
        landscape.model.add_software_system("Billing", None).unwrap();
        landscape.model.add_software_system("Ledger", None).unwrap();

        assert!(clone_relationships(&source, &mut landscape).unwrap());
        assert!(!clone_relationships(&source, &mut landscape).unwrap());

        assert_eq!(1, landscape.model.relationships().count());
        let cloned = landscape.model.relationships().next().unwrap();
        assert_eq!(Some("dependsOn"), cloned.description.as_deref());
        assert!(cloned.tags.contains("sync"));
        assert!(cloned.tags.contains("Relationship"));
    }

    #[test]
    fn relationships_to_unknown_landscape_elements_are_not_cloned() {
        let mut source = system_workspace(2, "Billing");
        let billing = source.primary_software_system().unwrap().id.clone();
        let clerk = source.model.add_person("Clerk", None).unwrap().id.clone();
        source
            .model
            .connect(
                &clerk,
                &billing,
                Some("uses"),
                &[ElementKind::Person, ElementKind::SoftwareSystem],
            )
            .unwrap();

        let mut landscape =
            Workspace::shell(1, LANDSCAPE_WORKSPACE_NAME, None, WorkspaceScope::Landscape).unwrap();
        landscape.model.add_software_system("Billing", None).unwrap();

        assert!(!clone_relationships(&source, &mut landscape).unwrap());
        assert_eq!(0, landscape.model.relationships().count());
    }

    #[test]
    fn aggregate_creates_landscape_once_and_is_idempotent() {
        let api = FakeApi::new();
        let mut store = WorkspaceStore::new(api.clone());
        for name in ["Billing", "Ledger"] {
            store
                .ensure_or_create(name, None, WorkspaceScope::SoftwareSystem)
                .unwrap();
            store.clone_to_catalog(name).unwrap();
        }

        let first = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert!(aggregate(&mut store, first).unwrap());

        let landscape = store.catalog(LANDSCAPE_WORKSPACE_NAME).unwrap().clone();
        assert_eq!(Some(first), landscape.last_modified_date);
        assert_eq!(2, landscape.model.software_systems().count());
        let view = landscape.views.system_landscape_view(LANDSCAPE_VIEW_KEY).unwrap();
        assert_eq!(2, view.elements.len());
        assert!(store
            .catalog("Billing")
            .unwrap()
            .views
            .configuration
            .themes
            .contains(&THEME_URL.to_string()));

        let second = Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap();
        assert!(!aggregate(&mut store, second).unwrap());
        assert_eq!(&landscape, store.catalog(LANDSCAPE_WORKSPACE_NAME).unwrap());
        assert_eq!(3, api.created());
    }

    #[test]
    fn workspaces_without_primary_system_are_skipped() {
        let api = FakeApi::new();
        api.host(Workspace::new(0, "Orphan", None));
        let mut store = WorkspaceStore::new(api);
        store.pull().unwrap();
        let orphan = store.clone_to_catalog("Orphan").unwrap().unwrap();
        orphan.configuration.scope = Some(WorkspaceScope::SoftwareSystem);

        aggregate(&mut store, Utc::now()).unwrap();

        let landscape = store.catalog(LANDSCAPE_WORKSPACE_NAME).unwrap();
        assert_eq!(0, landscape.model.elements().count());
        assert!(store
            .catalog("Orphan")
            .unwrap()
            .views
            .configuration
            .themes
            .is_empty());
    }
}
