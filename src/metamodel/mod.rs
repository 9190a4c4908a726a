//! The object/relational metamodel consumed by translation.
//!
//! Persisters are defined programmatically through [`MetamodelBuilder`] and
//! looked up by entity name or collection role during semantic analysis.

use std::collections::HashMap;
use std::sync::Arc;

pub mod builder;
pub mod collection;
pub mod entity;
pub mod types;

pub use builder::{CollectionBuilder, ComponentBuilder, EntityBuilder, MetamodelBuilder};
pub use collection::{CollectionElement, CollectionIndex, CollectionPersister};
pub use entity::{
    EntityPersister, InheritanceKind, PropertyMapping, PropertyResolution, TableMapping,
};
pub use types::{BasicType, ComponentProperty, ComponentType, Type};

use crate::core::error::MappingError;

/// Registry of entity and collection persisters.
#[derive(Debug, Default)]
pub struct Metamodel {
    entities: HashMap<String, Arc<EntityPersister>>,
    collections: HashMap<String, Arc<CollectionPersister>>,
}

impl Metamodel {
    pub(crate) fn insert_entity(&mut self, persister: EntityPersister) {
        self.entities
            .insert(persister.entity_name.clone(), Arc::new(persister));
    }

    pub(crate) fn insert_collection(&mut self, persister: CollectionPersister) {
        self.collections
            .insert(persister.role.clone(), Arc::new(persister));
    }

    pub fn entity(&self, name: &str) -> Option<&Arc<EntityPersister>> {
        self.entities.get(name)
    }

    pub fn require_entity(&self, name: &str) -> Result<Arc<EntityPersister>, MappingError> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| MappingError::unknown_entity(name))
    }

    pub fn collection(&self, role: &str) -> Option<&Arc<CollectionPersister>> {
        self.collections.get(role)
    }

    pub fn require_collection(&self, role: &str) -> Result<Arc<CollectionPersister>, MappingError> {
        self.collections
            .get(role)
            .cloned()
            .ok_or_else(|| MappingError::unknown_collection(role))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Arc<EntityPersister>> {
        self.entities.values()
    }

    pub fn collections(&self) -> impl Iterator<Item = &Arc<CollectionPersister>> {
        self.collections.values()
    }
}
