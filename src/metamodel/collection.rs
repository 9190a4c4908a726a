//! Collection persister descriptors.

use crate::metamodel::types::{BasicType, Type};
use crate::metamodel::Metamodel;
use crate::utils::string_utils::unqualify;

#[derive(Debug, Clone)]
pub enum CollectionElement {
    Basic {
        ty: BasicType,
        columns: Vec<String>,
    },
    Entity {
        entity: String,
        /// Columns in the collection table referencing the element entity.
        /// For one-to-many these are the element's own identifier columns.
        columns: Vec<String>,
        many_to_many: bool,
    },
}

#[derive(Debug, Clone)]
pub enum CollectionIndex {
    None,
    Basic { ty: BasicType, columns: Vec<String> },
    Composite { columns: Vec<String> },
}

/// Mapping of one collection role, e.g. `Order.tags`.
#[derive(Debug, Clone)]
pub struct CollectionPersister {
    pub role: String,
    pub owner_entity: String,
    /// The collection table. For one-to-many collections this is the element
    /// entity's root table.
    pub table: String,
    /// Columns in `table` referencing the owner's identifier.
    pub key_columns: Vec<String>,
    pub element: CollectionElement,
    pub index: CollectionIndex,
}

impl CollectionPersister {
    pub fn property_name(&self) -> &str {
        unqualify(&self.role)
    }

    pub fn is_many_to_many(&self) -> bool {
        matches!(
            self.element,
            CollectionElement::Entity {
                many_to_many: true,
                ..
            }
        )
    }

    pub fn is_one_to_many(&self) -> bool {
        matches!(
            self.element,
            CollectionElement::Entity {
                many_to_many: false,
                ..
            }
        )
    }

    pub fn element_entity(&self) -> Option<&str> {
        match &self.element {
            CollectionElement::Entity { entity, .. } => Some(entity),
            CollectionElement::Basic { .. } => None,
        }
    }

    pub fn element_columns(&self) -> &[String] {
        match &self.element {
            CollectionElement::Basic { columns, .. } => columns,
            CollectionElement::Entity { columns, .. } => columns,
        }
    }

    pub fn element_type(&self) -> Type {
        match &self.element {
            CollectionElement::Basic { ty, .. } => Type::Basic(*ty),
            CollectionElement::Entity { entity, .. } => Type::Entity {
                entity: entity.clone(),
            },
        }
    }

    pub fn has_index(&self) -> bool {
        !matches!(self.index, CollectionIndex::None)
    }

    pub fn index_columns(&self) -> Option<&[String]> {
        match &self.index {
            CollectionIndex::None => None,
            CollectionIndex::Basic { columns, .. } => Some(columns),
            CollectionIndex::Composite { columns } => Some(columns),
        }
    }

    pub fn index_type(&self) -> Option<Type> {
        match &self.index {
            CollectionIndex::None => None,
            CollectionIndex::Basic { ty, .. } => Some(Type::Basic(*ty)),
            CollectionIndex::Composite { .. } => None,
        }
    }

    /// Tables touched by queries over this collection.
    pub fn query_spaces(&self, model: &Metamodel) -> Vec<String> {
        let mut spaces = vec![self.table.clone()];
        if let Some(entity) = self.element_entity() {
            if let Some(persister) = model.entity(entity) {
                for name in persister.constraint_ordered_table_names() {
                    if !spaces.contains(&name) {
                        spaces.push(name);
                    }
                }
            }
        }
        spaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> CollectionPersister {
        CollectionPersister {
            role: "Order.tags".to_string(),
            owner_entity: "Order".to_string(),
            table: "ORDER_TAGS".to_string(),
            key_columns: vec!["ORDER_ID".to_string()],
            element: CollectionElement::Entity {
                entity: "Tag".to_string(),
                columns: vec!["TAG_ID".to_string()],
                many_to_many: true,
            },
            index: CollectionIndex::None,
        }
    }

    #[test]
    fn test_many_to_many() {
        let persister = tags();
        assert!(persister.is_many_to_many());
        assert!(!persister.is_one_to_many());
        assert_eq!(persister.property_name(), "tags");
        assert_eq!(persister.element_entity(), Some("Tag"));
    }

    #[test]
    fn test_index_accessors() {
        let mut persister = tags();
        assert!(!persister.has_index());
        assert!(persister.index_type().is_none());

        persister.index = CollectionIndex::Basic {
            ty: BasicType::Integer,
            columns: vec!["IDX".to_string()],
        };
        assert!(persister.has_index());
        assert_eq!(
            persister.index_columns().map(|c| c[0].as_str()),
            Some("IDX")
        );
    }
}
