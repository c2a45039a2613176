pub mod entity;
pub mod ingest;

pub use entity::{CatalogEntity, EntityKind, EntityMetadata, EntitySpec, Relation};
pub use ingest::{load_entities, CatalogSource};
