use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::model::{ElementKind, Tags};

pub const RELATIONSHIP_TAG: &str = "Relationship";

/// A directed edge between two elements of the same model.
#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub source_id: String,
    pub destination_id: String,
    pub description: Option<String>,
    pub technology: Option<String>,
    pub tags: Tags,
    pub properties: IndexMap<String, String>,
    /// Set on implied relationships, pointing at the relationship they were derived from.
    pub linked_relationship_id: Option<String>,
    pub extra: Map<String, Value>,
}

impl Relationship {
    pub(crate) fn new(
        id: String,
        source_id: &str,
        destination_id: &str,
        description: Option<&str>,
    ) -> Self {
        Self {
            id,
            source_id: source_id.to_string(),
            destination_id: destination_id.to_string(),
            description: description.map(str::to_string),
            technology: None,
            tags: [RELATIONSHIP_TAG].into_iter().collect(),
            properties: IndexMap::new(),
            linked_relationship_id: None,
            extra: Map::new(),
        }
    }
}

/// How an edge between two element kinds reads: software "uses" software, and anything
/// "delivers" to a person.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Interaction {
    #[strum(serialize = "uses")]
    Uses,
    #[strum(serialize = "delivers")]
    Delivers,
}

impl Interaction {
    pub fn between(source: ElementKind, destination: ElementKind) -> Self {
        match (source, destination) {
            (_, ElementKind::Person) => Interaction::Delivers,
            (_, ElementKind::SoftwareSystem) | (_, ElementKind::Container) => Interaction::Uses,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{ElementKind, Interaction};

    #[test]
    fn dispatch_by_destination_kind() {
        use ElementKind::*;

        assert_eq!(Interaction::Uses, Interaction::between(SoftwareSystem, SoftwareSystem));
        assert_eq!(Interaction::Uses, Interaction::between(Container, SoftwareSystem));
        assert_eq!(Interaction::Uses, Interaction::between(Container, Container));
        assert_eq!(Interaction::Uses, Interaction::between(Person, SoftwareSystem));
        assert_eq!(Interaction::Delivers, Interaction::between(SoftwareSystem, Person));
        assert_eq!(Interaction::Delivers, Interaction::between(Person, Person));
    }
}
