// Structurizr JSON layout of a model: people and software systems at the top, containers nested
// in their software system and relationships nested in their source element.
use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Element, ElementKind, Model, Perspective, Relationship, Tags};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelJson {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    people: Vec<ElementJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    software_systems: Vec<ElementJson>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementJson {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    tags: Tags,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    perspectives: Vec<Perspective>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    relationships: Vec<RelationshipJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    containers: Vec<ElementJson>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipJson {
    id: String,
    source_id: String,
    destination_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    technology: Option<String>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    tags: Tags,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_relationship_id: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<Model> for ModelJson {
    fn from(model: Model) -> Self {
        let mut outgoing: HashMap<String, Vec<RelationshipJson>> = HashMap::new();
        for relationship in model.relationships() {
            outgoing
                .entry(relationship.source_id.clone())
                .or_default()
                .push(RelationshipJson::from(relationship));
        }

        let mut to_json = |element: &Element| ElementJson {
            relationships: outgoing.remove(&element.id).unwrap_or_default(),
            ..ElementJson::from(element)
        };

        let people = model
            .elements()
            .filter(|e| e.kind == ElementKind::Person)
            .map(&mut to_json)
            .collect();

        let mut software_systems = Vec::new();
        for system in model.software_systems() {
            let mut json = to_json(system);
            json.containers = model.containers_of(&system.id).map(&mut to_json).collect();
            software_systems.push(json);
        }

        ModelJson {
            properties: model.properties,
            people,
            software_systems,
            extra: model.extra,
        }
    }
}

impl From<ModelJson> for Model {
    fn from(json: ModelJson) -> Self {
        let mut elements = Vec::new();
        let mut relationships = Vec::new();
        let mut max_id = max_numeric_id(&Value::Object(json.extra.clone()));

        let mut collect = |json: ElementJson,
                           kind: ElementKind,
                           parent_id: Option<String>,
                           elements: &mut Vec<Element>,
                           relationships: &mut Vec<Relationship>| {
            max_id = max_id.max(json.id.parse().unwrap_or(0));
            max_id = max_id.max(max_numeric_id(&Value::Object(json.extra.clone())));
            for relationship in json.relationships {
                max_id = max_id.max(relationship.id.parse().unwrap_or(0));
                relationships.push(Relationship::from(relationship));
            }
            elements.push(Element {
                id: json.id,
                kind,
                parent_id,
                name: json.name,
                description: json.description,
                technology: json.technology,
                group: json.group,
                url: json.url,
                tags: json.tags,
                properties: json.properties,
                perspectives: json.perspectives,
                extra: json.extra,
            });
        };

        for mut person in json.people {
            // people have no children
            person.containers.clear();
            collect(person, ElementKind::Person, None, &mut elements, &mut relationships);
        }

        for mut system in json.software_systems {
            let containers = std::mem::take(&mut system.containers);
            let system_id = system.id.clone();
            collect(system, ElementKind::SoftwareSystem, None, &mut elements, &mut relationships);
            for container in containers {
                collect(
                    container,
                    ElementKind::Container,
                    Some(system_id.clone()),
                    &mut elements,
                    &mut relationships,
                );
            }
        }

        Model::from_parts(elements, relationships, json.properties, json.extra, max_id)
    }
}

impl From<&Element> for ElementJson {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            name: element.name.clone(),
            description: element.description.clone(),
            technology: element.technology.clone(),
            group: element.group.clone(),
            url: element.url.clone(),
            tags: element.tags.clone(),
            properties: element.properties.clone(),
            perspectives: element.perspectives.clone(),
            relationships: Vec::new(),
            containers: Vec::new(),
            extra: element.extra.clone(),
        }
    }
}

impl From<&Relationship> for RelationshipJson {
    fn from(relationship: &Relationship) -> Self {
        Self {
            id: relationship.id.clone(),
            source_id: relationship.source_id.clone(),
            destination_id: relationship.destination_id.clone(),
            description: relationship.description.clone(),
            technology: relationship.technology.clone(),
            tags: relationship.tags.clone(),
            properties: relationship.properties.clone(),
            linked_relationship_id: relationship.linked_relationship_id.clone(),
            extra: relationship.extra.clone(),
        }
    }
}

impl From<RelationshipJson> for Relationship {
    fn from(json: RelationshipJson) -> Self {
        Self {
            id: json.id,
            source_id: json.source_id,
            destination_id: json.destination_id,
            description: json.description,
            technology: json.technology,
            tags: json.tags,
            properties: json.properties,
            linked_relationship_id: json.linked_relationship_id,
            extra: json.extra,
        }
    }
}

/// Largest numeric `id` anywhere inside `value`. Ids of things this crate does not model, such
/// as components or deployment nodes, must not be reused.
fn max_numeric_id(value: &Value) -> u64 {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match (key.as_str(), value) {
                ("id", Value::String(id)) => id.parse().unwrap_or(0),
                _ => max_numeric_id(value),
            })
            .max()
            .unwrap_or(0),
        Value::Array(values) => values.iter().map(max_numeric_id).max().unwrap_or(0),
        _ => 0,
    }
}
