use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::Tags;

pub const ELEMENT_TAG: &str = "Element";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum ElementKind {
    Person,
    #[strum(serialize = "Software System")]
    SoftwareSystem,
    Container,
}

impl ElementKind {
    /// Tags every new element of this kind starts with.
    pub fn default_tags(&self) -> Tags {
        [ELEMENT_TAG.to_string(), self.to_string()]
            .into_iter()
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A person, software system or container. Containers always carry the id of the software
/// system that owns them.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub parent_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub technology: Option<String>,
    pub group: Option<String>,
    pub url: Option<String>,
    pub tags: Tags,
    pub properties: IndexMap<String, String>,
    pub perspectives: Vec<Perspective>,
    /// Fields this crate does not model, kept so a load/save cycle is lossless.
    pub extra: Map<String, Value>,
}

impl Element {
    pub(crate) fn new(
        id: String,
        kind: ElementKind,
        parent_id: Option<String>,
        name: &str,
        description: Option<&str>,
    ) -> Self {
        Self {
            id,
            kind,
            parent_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            technology: None,
            group: None,
            url: None,
            tags: kind.default_tags(),
            properties: IndexMap::new(),
            perspectives: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Sets a property, returning `true` when the stored value changed.
    pub fn set_property<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> bool {
        let value = value.into();
        self.properties.insert(key.into(), value.clone()).as_ref() != Some(&value)
    }

    pub fn add_perspective(&mut self, name: &str, description: &str) {
        if !self.perspectives.iter().any(|p| p.name == name) {
            self.perspectives.push(Perspective {
                name: name.to_string(),
                description: description.to_string(),
                value: None,
            });
        }
    }

    pub fn is_person_or_software_system(&self) -> bool {
        matches!(self.kind, ElementKind::Person | ElementKind::SoftwareSystem)
    }
}
