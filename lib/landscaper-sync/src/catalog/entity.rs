use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};

pub const RELATION_TYPE_DEPENDS_ON: &str = "dependsOn";
pub const RELATION_TYPE_CONSUMES_API: &str = "consumesApi";

const DEFAULT_NAMESPACE: &str = "default";

/// Kind of a catalog entity. Kinds the sync does not act on are kept verbatim so their
/// references still render correctly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Domain,
    System,
    Component,
    Resource,
    Other(String),
}

impl From<String> for EntityKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Domain" => EntityKind::Domain,
            "System" => EntityKind::System,
            "Component" => EntityKind::Component,
            "Resource" => EntityKind::Resource,
            _ => EntityKind::Other(value),
        }
    }
}

impl From<EntityKind> for String {
    fn from(value: EntityKind) -> Self {
        value.to_string()
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Domain => write!(f, "Domain"),
            EntityKind::System => write!(f, "System"),
            EntityKind::Component => write!(f, "Component"),
            EntityKind::Resource => write!(f, "Resource"),
            EntityKind::Other(kind) => write!(f, "{kind}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySpec {
    #[serde(default)]
    pub system: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    #[serde(rename = "type")]
    pub relation_type: String,
    pub target_ref: String,
}

impl Relation {
    /// Relation types that become "uses" relationships in the model.
    pub fn is_dependency(&self) -> bool {
        self.relation_type == RELATION_TYPE_DEPENDS_ON
            || self.relation_type == RELATION_TYPE_CONSUMES_API
    }
}

/// A record from the service catalog. Only the fields the sync needs are extracted; everything
/// else in the source document is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity {
    pub kind: EntityKind,
    pub metadata: EntityMetadata,
    #[serde(default)]
    pub spec: EntitySpec,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relations: Vec<Relation>,
}

impl CatalogEntity {
    /// The `kind:namespace/name` reference used to join catalog entities to model elements.
    pub fn backstage_ref(&self) -> String {
        format!(
            "{}:{}/{}",
            self.kind.to_string().to_lowercase(),
            self.metadata.namespace,
            self.metadata.name
        )
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Owning system, if one is set and not blank.
    pub fn system(&self) -> Option<&str> {
        self.spec
            .system
            .as_deref()
            .filter(|system| !system.trim().is_empty())
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(|r| r.is_dependency())
    }
}
