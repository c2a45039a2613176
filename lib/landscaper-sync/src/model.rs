mod element;
mod json;
mod relationship;
mod tags;
mod views;
mod workspace;

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub use crate::model::element::{Element, ElementKind, Perspective, ELEMENT_TAG};
pub use crate::model::relationship::{Interaction, Relationship, RELATIONSHIP_TAG};
pub use crate::model::tags::Tags;
pub use crate::model::views::{
    ElementView, RelationshipView, SystemLandscapeView, ViewConfiguration, Views,
};
pub use crate::model::workspace::{
    system_context_url, Workspace, WorkspaceConfiguration, WorkspaceScope,
};
use crate::{SyncError, SyncResult};

pub const BACKSTAGE_REF_PROPERTY_NAME: &str = "backstage.ref";
pub const DSL_IDENTIFIER_PROPERTY_NAME: &str = "structurizr.dsl.identifier";
pub const GROUP_SEPARATOR_PROPERTY_NAME: &str = "structurizr.groupSeparator";
pub const THEME_URL: &str = "https://static.structurizr.com/themes/default/theme.json";

/// The elements and relationships of one workspace.
///
/// Elements and relationships share one id space of numeric strings. Containers reference their
/// owning software system through [`Element::parent_id`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "json::ModelJson", from = "json::ModelJson")]
pub struct Model {
    elements: IndexMap<String, Element>,
    relationships: IndexMap<String, Relationship>,
    edges: HashSet<(String, String)>,
    pub properties: IndexMap<String, String>,
    pub extra: Map<String, Value>,
    next_id: u64,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    pub fn relationship_mut(&mut self, id: &str) -> Option<&mut Relationship> {
        self.relationships.get_mut(id)
    }

    pub fn software_systems(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .values()
            .filter(|e| e.kind == ElementKind::SoftwareSystem)
    }

    pub fn containers_of<'a, 'b>(
        &'a self,
        software_system_id: &'b str,
    ) -> impl Iterator<Item = &'a Element> + 'b
    where
        'a: 'b,
    {
        self.elements.values().filter(move |e| {
            e.kind == ElementKind::Container && e.parent_id.as_deref() == Some(software_system_id)
        })
    }

    pub fn software_system_with_name(&self, name: &str) -> Option<&Element> {
        self.top_level_with_name(ElementKind::SoftwareSystem, name)
    }

    pub fn software_system_with_name_mut(&mut self, name: &str) -> Option<&mut Element> {
        let id = self.software_system_with_name(name)?.id.clone();
        self.elements.get_mut(&id)
    }

    pub fn person_with_name(&self, name: &str) -> Option<&Element> {
        self.top_level_with_name(ElementKind::Person, name)
    }

    /// Finds a person or software system by kind and name.
    pub fn top_level_with_name(&self, kind: ElementKind, name: &str) -> Option<&Element> {
        self.elements
            .values()
            .find(|e| e.kind == kind && e.parent_id.is_none() && e.name == name)
    }

    pub fn container_with_name(&self, software_system_id: &str, name: &str) -> Option<&Element> {
        self.elements.values().find(|e| {
            e.kind == ElementKind::Container
                && e.parent_id.as_deref() == Some(software_system_id)
                && e.name == name
        })
    }

    pub fn add_software_system(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> SyncResult<&mut Element> {
        if self.software_system_with_name(name).is_some() {
            return Err(SyncError::DuplicateElement {
                kind: ElementKind::SoftwareSystem,
                name: name.to_string(),
            });
        }
        Ok(self.insert_element(ElementKind::SoftwareSystem, None, name, description))
    }

    pub fn add_person(&mut self, name: &str, description: Option<&str>) -> SyncResult<&mut Element> {
        if self.person_with_name(name).is_some() {
            return Err(SyncError::DuplicateElement {
                kind: ElementKind::Person,
                name: name.to_string(),
            });
        }
        Ok(self.insert_element(ElementKind::Person, None, name, description))
    }

    pub fn add_container(
        &mut self,
        software_system_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> SyncResult<&mut Element> {
        match self.element(software_system_id) {
            Some(e) if e.kind == ElementKind::SoftwareSystem => {}
            _ => return Err(SyncError::UnknownElement(software_system_id.to_string())),
        }
        if self.container_with_name(software_system_id, name).is_some() {
            return Err(SyncError::DuplicateElement {
                kind: ElementKind::Container,
                name: name.to_string(),
            });
        }
        Ok(self.insert_element(
            ElementKind::Container,
            Some(software_system_id.to_string()),
            name,
            description,
        ))
    }

    fn insert_element(
        &mut self,
        kind: ElementKind,
        parent_id: Option<String>,
        name: &str,
        description: Option<&str>,
    ) -> &mut Element {
        let id = self.allocate_id();
        let element = Element::new(id.clone(), kind, parent_id, name, description);
        self.elements.entry(id).or_insert(element)
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    /// Whether any relationship goes from `source_id` to `destination_id`.
    pub fn has_efferent_relationship(&self, source_id: &str, destination_id: &str) -> bool {
        self.edges
            .contains(&(source_id.to_string(), destination_id.to_string()))
    }

    /// Connects two elements unless a relationship between them already exists.
    ///
    /// Without a description the edge reads "uses", or "delivers" towards a person.
    /// Only element kinds listed in `relatable` may be connected. Returns the id of the new
    /// relationship, or `None` when nothing was created. Relationships implied for the ancestors
    /// of either end are created alongside.
    pub fn connect(
        &mut self,
        source_id: &str,
        destination_id: &str,
        description: Option<&str>,
        relatable: &[ElementKind],
    ) -> SyncResult<Option<String>> {
        let source = self
            .element(source_id)
            .ok_or_else(|| SyncError::UnknownElement(source_id.to_string()))?;
        let destination = self
            .element(destination_id)
            .ok_or_else(|| SyncError::UnknownElement(destination_id.to_string()))?;

        if !relatable.contains(&source.kind) || !relatable.contains(&destination.kind) {
            debug!(
                source = %source.name,
                destination = %destination.name,
                "element kinds cannot be related at this level"
            );
            return Ok(None);
        }

        if source_id == destination_id || self.has_efferent_relationship(source_id, destination_id) {
            return Ok(None);
        }

        let description = description
            .map(str::to_string)
            .unwrap_or_else(|| Interaction::between(source.kind, destination.kind).to_string());
        debug!(
            source = %source.name,
            destination = %destination.name,
            description = %description,
            "connecting elements"
        );

        let id = self.insert_relationship(source_id, destination_id, Some(&description));
        self.create_implied_relationships(&id);
        Ok(Some(id))
    }

    fn insert_relationship(
        &mut self,
        source_id: &str,
        destination_id: &str,
        description: Option<&str>,
    ) -> String {
        let id = self.allocate_id();
        let relationship = Relationship::new(id.clone(), source_id, destination_id, description);
        self.edges
            .insert((source_id.to_string(), destination_id.to_string()));
        self.relationships.insert(id.clone(), relationship);
        id
    }

    /// Propagates a relationship to every ancestor pair of its ends, unless the pair is already
    /// connected or one end contains the other.
    fn create_implied_relationships(&mut self, relationship_id: &str) {
        let Some(relationship) = self.relationships.get(relationship_id).cloned() else {
            return;
        };

        let sources = self.lineage(&relationship.source_id);
        let destinations = self.lineage(&relationship.destination_id);

        for source in &sources {
            for destination in &destinations {
                if source == destination
                    || (source == &relationship.source_id
                        && destination == &relationship.destination_id)
                    || self.is_ancestor(source, destination)
                    || self.is_ancestor(destination, source)
                    || self.has_efferent_relationship(source, destination)
                {
                    continue;
                }

                let id = self.insert_relationship(
                    source,
                    destination,
                    relationship.description.as_deref(),
                );
                if let Some(implied) = self.relationships.get_mut(&id) {
                    implied.technology = relationship.technology.clone();
                    implied.linked_relationship_id = Some(relationship.id.clone());
                }
            }
        }
    }

    /// The element followed by its ancestors, innermost first.
    fn lineage(&self, id: &str) -> Vec<String> {
        let mut lineage = vec![id.to_string()];
        let mut current = self.element(id).and_then(|e| e.parent_id.clone());
        while let Some(parent) = current {
            current = self.element(&parent).and_then(|e| e.parent_id.clone());
            lineage.push(parent);
        }
        lineage
    }

    fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        self.lineage(id).iter().skip(1).any(|a| a == ancestor)
    }

    /// Maps every value of `property` to the id of the first element carrying it.
    pub fn index_by_property(&self, property: &str) -> HashMap<String, String> {
        let mut index = HashMap::new();
        for element in self.elements.values() {
            if let Some(value) = element.property(property) {
                index
                    .entry(value.to_string())
                    .or_insert_with(|| element.id.clone());
            }
        }
        index
    }

    pub(crate) fn from_parts(
        elements: Vec<Element>,
        relationships: Vec<Relationship>,
        properties: IndexMap<String, String>,
        extra: Map<String, Value>,
        next_id: u64,
    ) -> Self {
        let edges = relationships
            .iter()
            .map(|r| (r.source_id.clone(), r.destination_id.clone()))
            .collect();

        Self {
            elements: elements.into_iter().map(|e| (e.id.clone(), e)).collect(),
            relationships: relationships
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect(),
            edges,
            properties,
            extra,
            next_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{ElementKind, Model};
    use crate::SyncError;

    const SYSTEM_LEVEL: &[ElementKind] = &[ElementKind::SoftwareSystem, ElementKind::Container];

    #[test]
    fn names_are_unique_per_scope() {
        let mut model = Model::new();
        let billing = model.add_software_system("Billing", None).unwrap().id.clone();
        let ledger = model.add_software_system("Ledger", None).unwrap().id.clone();

        assert!(matches!(
            model.add_software_system("Billing", None),
            Err(SyncError::DuplicateElement { .. })
        ));

        model.add_container(&billing, "API", None).unwrap();
        assert!(model.add_container(&billing, "API", None).is_err());
        // same container name under a different owner is fine
        model.add_container(&ledger, "API", None).unwrap();

        assert_eq!(4, model.elements().count());
    }

    #[test]
    fn containers_require_a_software_system_owner() {
        let mut model = Model::new();
        let person = model.add_person("Clerk", None).unwrap().id.clone();

        assert!(matches!(
            model.add_container(&person, "API", None),
            Err(SyncError::UnknownElement(_))
        ));
    }

    #[test]
    fn connect_blocks_duplicate_edges_but_not_reverse_edges() {
        let mut model = Model::new();
        let a = model.add_software_system("A", None).unwrap().id.clone();
        let b = model.add_software_system("B", None).unwrap().id.clone();

        assert!(model.connect(&a, &b, Some("uses"), SYSTEM_LEVEL).unwrap().is_some());
        assert!(model.connect(&a, &b, Some("other"), SYSTEM_LEVEL).unwrap().is_none());
        assert!(model.connect(&b, &a, Some("uses"), SYSTEM_LEVEL).unwrap().is_some());

        assert_eq!(2, model.relationships().count());
    }

    #[test]
    fn connect_respects_relatable_kinds() {
        let mut model = Model::new();
        let person = model.add_person("Clerk", None).unwrap().id.clone();
        let system = model.add_software_system("Billing", None).unwrap().id.clone();

        assert!(model.connect(&person, &system, None, SYSTEM_LEVEL).unwrap().is_none());
        assert!(model
            .connect(
                &person,
                &system,
                None,
                &[ElementKind::Person, ElementKind::SoftwareSystem]
            )
            .unwrap()
            .is_some());
    }

    #[test]
    fn connect_describes_undescribed_edges_by_interaction() {
        let mut model = Model::new();
        let person = model.add_person("Clerk", None).unwrap().id.clone();
        let system = model.add_software_system("Billing", None).unwrap().id.clone();
        let relatable = &[ElementKind::Person, ElementKind::SoftwareSystem];

        let uses = model.connect(&person, &system, None, relatable).unwrap().unwrap();
        let delivers = model.connect(&system, &person, None, relatable).unwrap().unwrap();

        assert_eq!(Some("uses"), model.relationship(&uses).unwrap().description.as_deref());
        assert_eq!(
            Some("delivers"),
            model.relationship(&delivers).unwrap().description.as_deref()
        );
    }

    #[test]
    fn container_lookup_is_scoped_to_its_software_system() {
        let mut model = Model::new();
        let billing = model.add_software_system("Billing", None).unwrap().id.clone();
        let ledger = model.add_software_system("Ledger", None).unwrap().id.clone();
        let api = model.add_container(&billing, "API", None).unwrap().id.clone();

        let found = {
            let system_id = billing.clone();
            model.container_with_name(&system_id, "API")
        };

        assert_eq!(Some(api.as_str()), found.map(|c| c.id.as_str()));
        assert!(model.container_with_name(&ledger, "API").is_none());
        assert!(model.container_with_name(&billing, "Billing").is_none());
        assert_eq!(1, model.containers_of(&billing).count());
    }

    #[test]
    fn container_relationships_imply_system_relationships() {
        let mut model = Model::new();
        let billing = model.add_software_system("Billing", None).unwrap().id.clone();
        let ledger = model.add_software_system("Ledger", None).unwrap().id.clone();
        let api = model.add_container(&billing, "API", None).unwrap().id.clone();
        let db = model.add_container(&billing, "DB", None).unwrap().id.clone();

        let explicit = model
            .connect(&api, &ledger, Some("dependsOn"), SYSTEM_LEVEL)
            .unwrap()
            .unwrap();
        assert!(model.has_efferent_relationship(&billing, &ledger));

        let implied = model
            .relationships()
            .find(|r| r.source_id == billing)
            .unwrap();
        assert_eq!(Some(explicit.as_str()), implied.linked_relationship_id.as_deref());
        assert_eq!(Some("dependsOn"), implied.description.as_deref());

        // containers inside the same system do not imply a self relationship
        model.connect(&api, &db, None, SYSTEM_LEVEL).unwrap();
        assert!(!model.has_efferent_relationship(&billing, &billing));
        assert!(!model.has_efferent_relationship(&billing, &db));
        assert_eq!(3, model.relationships().count());
    }

    #[test]
    fn index_by_property_keeps_first_match() {
        let mut model = Model::new();
        let first = model.add_software_system("A", None).unwrap();
        first.set_property("backstage.ref", "system:default/a");
        let first = first.id.clone();
        model
            .add_software_system("B", None)
            .unwrap()
            .set_property("backstage.ref", "system:default/a");

        let index = model.index_by_property("backstage.ref");
        assert_eq!(Some(&first), index.get("system:default/a"));
    }
}
