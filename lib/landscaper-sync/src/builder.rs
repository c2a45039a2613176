use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use landscaper_templating::identifier;
use tracing::{debug, info, warn};

use crate::api::WorkspaceApi;
use crate::catalog::{CatalogEntity, EntityKind};
use crate::landscape;
use crate::model::{
    ElementKind, WorkspaceScope, BACKSTAGE_REF_PROPERTY_NAME, DSL_IDENTIFIER_PROPERTY_NAME,
};
use crate::store::WorkspaceStore;
use crate::{SyncError, SyncResult};

/// Element kinds a software system workspace relates.
const SYSTEM_RELATABLE: &[ElementKind] = &[ElementKind::SoftwareSystem, ElementKind::Container];

/// DSL identifier of a container: the owning system's identifier, a dot, and the container name
/// stripped of everything but word characters.
pub fn container_identifier(system_identifier: &str, name: &str) -> String {
    format!("{system_identifier}.{}", identifier(name))
}

/// Folds catalog entities into the catalog workspaces of a [`WorkspaceStore`].
///
/// A pass runs software systems, containers and relationships in that order, stamps every
/// workspace it changed with the time of the pass and finally folds the result into the
/// landscape. Running a pass again over the same entities changes nothing.
pub struct ModelBuilder<'s, A> {
    store: &'s mut WorkspaceStore<A>,
    dirty: IndexSet<String>,
}

impl<'s, A: WorkspaceApi> ModelBuilder<'s, A> {
    pub fn new(store: &'s mut WorkspaceStore<A>) -> Self {
        Self {
            store,
            dirty: IndexSet::new(),
        }
    }

    /// Runs a full pass. Returns the names of the workspaces that changed.
    pub fn build(mut self, entities: &[CatalogEntity], now: DateTime<Utc>) -> SyncResult<Vec<String>> {
        self.build_software_systems(entities)?;
        self.build_containers(entities)?;
        self.build_relationships(entities)?;

        for name in &self.dirty {
            if let Some(workspace) = self.store.catalog_mut(name) {
                workspace.touch(now);
            }
        }

        if landscape::aggregate(self.store, now)? {
            self.dirty.insert(landscape::LANDSCAPE_WORKSPACE_NAME.to_string());
        }

        info!(changed = self.dirty.len(), "built catalog workspaces");
        Ok(self.dirty.into_iter().collect())
    }

    fn build_software_systems(&mut self, entities: &[CatalogEntity]) -> SyncResult<()> {
        for entity in entities.iter().filter(|e| e.kind == EntityKind::System) {
            let name = entity.name();
            let first_use = self.store.catalog(name).is_none();
            if first_use {
                let created = self.store.ensure_or_create(
                    name,
                    entity.metadata.description.as_deref(),
                    WorkspaceScope::SoftwareSystem,
                )?;
                self.store.clone_to_catalog(name)?;
                if created {
                    self.dirty.insert(name.to_string());
                }
            }

            let Some(workspace) = self.store.catalog_mut(name) else {
                continue;
            };
            let Some(software_system) = workspace.model.software_system_with_name_mut(name) else {
                warn!(workspace = name, "workspace has no software system named after it, skipping");
                continue;
            };

            if first_use {
                let mut changed =
                    software_system.set_property(BACKSTAGE_REF_PROPERTY_NAME, entity.backstage_ref());
                changed |= software_system.set_property(DSL_IDENTIFIER_PROPERTY_NAME, identifier(name));
                if changed {
                    self.dirty.insert(name.to_string());
                }
            }

            software_system.tags.union(&entity.metadata.tags);
        }

        Ok(())
    }

    fn build_containers(&mut self, entities: &[CatalogEntity]) -> SyncResult<()> {
        let candidates = entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Component | EntityKind::Resource));

        for entity in candidates {
            let Some(system_name) = entity.system() else {
                continue;
            };

            let workspace = self
                .store
                .catalog_mut(system_name)
                .ok_or_else(|| SyncError::UnknownSoftwareSystem(system_name.to_string()))?;

            let Some(software_system) = workspace.model.software_system_with_name(system_name) else {
                warn!(
                    entity = entity.name(),
                    software_system = system_name,
                    "software system is missing from its workspace, skipping container"
                );
                continue;
            };
            let system_id = software_system.id.clone();
            let system_identifier = software_system
                .property(DSL_IDENTIFIER_PROPERTY_NAME)
                .map(str::to_string)
                .unwrap_or_else(|| identifier(system_name));

            let mut changed = false;
            let container_id = match workspace.model.container_with_name(&system_id, entity.name()) {
                Some(container) => container.id.clone(),
                None => {
                    let container = workspace.model.add_container(
                        &system_id,
                        entity.name(),
                        entity.metadata.description.as_deref(),
                    )?;
                    container.set_property(
                        DSL_IDENTIFIER_PROPERTY_NAME,
                        container_identifier(&system_identifier, entity.name()),
                    );
                    container.set_property(BACKSTAGE_REF_PROPERTY_NAME, entity.backstage_ref());
                    debug!(software_system = system_name, container = entity.name(), "added container");
                    changed = true;
                    container.id.clone()
                }
            };

            if let Some(container) = workspace.model.element_mut(&container_id) {
                changed |= container.tags.union(&entity.metadata.tags);
            }

            if changed {
                self.dirty.insert(system_name.to_string());
            }
        }

        Ok(())
    }

    /// Connects elements whose catalog entities declare a dependency. Both ends have to live in
    /// the same workspace; they are found through the catalog reference stored on each element.
    fn build_relationships(&mut self, entities: &[CatalogEntity]) -> SyncResult<()> {
        for name in self.store.catalog_names(WorkspaceScope::SoftwareSystem) {
            let Some(workspace) = self.store.catalog_mut(&name) else {
                continue;
            };
            let index = workspace.model.index_by_property(BACKSTAGE_REF_PROPERTY_NAME);

            let mut changed = false;
            for (entity_kind, element_kind) in [
                (EntityKind::Component, ElementKind::Container),
                (EntityKind::System, ElementKind::SoftwareSystem),
            ] {
                for entity in entities.iter().filter(|e| e.kind == entity_kind) {
                    let Some(source_id) = index.get(&entity.backstage_ref()) else {
                        continue;
                    };
                    let is_expected_kind = workspace
                        .model
                        .element(source_id)
                        .is_some_and(|e| e.kind == element_kind);
                    if !is_expected_kind {
                        continue;
                    }

                    for relation in entity.dependencies() {
                        let Some(destination_id) = index.get(&relation.target_ref) else {
                            continue;
                        };
                        let created = workspace.model.connect(
                            source_id,
                            destination_id,
                            Some(relation.relation_type.as_str()),
                            SYSTEM_RELATABLE,
                        )?;
                        changed |= created.is_some();
                    }
                }
            }

            if changed {
                self.dirty.insert(name);
            }
        }

        Ok(())
    }
}
