//! Programmatic metamodel definition.
//!
//! Builders collect raw mapping instructions and `MetamodelBuilder::build`
//! resolves and validates them as a whole, so forward references between
//! entities and collections are allowed in any declaration order.

use crate::core::error::MappingError;
use crate::metamodel::collection::{CollectionElement, CollectionIndex, CollectionPersister};
use crate::metamodel::entity::{EntityPersister, InheritanceKind, PropertyMapping, TableMapping};
use crate::metamodel::types::{BasicType, ComponentProperty, ComponentType, Type};
use crate::metamodel::Metamodel;

/// Builds a component type from named basic fields. Field order is column
/// order.
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    name: String,
    fields: Vec<(String, BasicType, String)>,
}

impl ComponentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        ty: BasicType,
        column: impl Into<String>,
    ) -> Self {
        self.fields.push((name.into(), ty, column.into()));
        self
    }

    fn build(&self) -> (ComponentType, Vec<String>) {
        let properties = self
            .fields
            .iter()
            .map(|(name, ty, _)| ComponentProperty {
                name: name.clone(),
                ty: Type::Basic(*ty),
            })
            .collect();
        let columns = self.fields.iter().map(|(_, _, col)| col.clone()).collect();
        (
            ComponentType {
                name: self.name.clone(),
                properties,
            },
            columns,
        )
    }
}

#[derive(Debug, Clone)]
enum PendingProperty {
    Basic {
        name: String,
        ty: BasicType,
        column: String,
        table: Option<String>,
    },
    Component {
        name: String,
        component: ComponentBuilder,
    },
    ManyToOne {
        name: String,
        entity: String,
        columns: Vec<String>,
    },
    Collection {
        name: String,
    },
}

#[derive(Debug, Clone)]
pub struct EntityBuilder {
    entity_name: String,
    inheritance: InheritanceKind,
    tables: Vec<TableMapping>,
    identifier: Option<(String, Type, Vec<String>)>,
    properties: Vec<PendingProperty>,
}

impl EntityBuilder {
    pub fn new(entity_name: impl Into<String>, root_table: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            inheritance: InheritanceKind::Single,
            tables: vec![TableMapping {
                name: root_table.into(),
                key_columns: Vec::new(),
            }],
            identifier: None,
            properties: Vec::new(),
        }
    }

    pub fn id(
        mut self,
        property: impl Into<String>,
        ty: BasicType,
        column: impl Into<String>,
    ) -> Self {
        self.identifier = Some((property.into(), Type::Basic(ty), vec![column.into()]));
        self
    }

    pub fn composite_id(mut self, property: impl Into<String>, component: ComponentBuilder) -> Self {
        let (ty, columns) = component.build();
        self.identifier = Some((property.into(), Type::Component(ty), columns));
        self
    }

    /// Adds a secondary table joined to the root by `key_columns`.
    pub fn secondary_table(mut self, table: impl Into<String>, key_columns: &[&str]) -> Self {
        self.tables.push(TableMapping {
            name: table.into(),
            key_columns: key_columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Adds a joined-subclass table and switches the inheritance kind.
    pub fn joined_table(mut self, table: impl Into<String>, key_columns: &[&str]) -> Self {
        self.inheritance = InheritanceKind::Joined;
        self.tables.push(TableMapping {
            name: table.into(),
            key_columns: key_columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Declares union-subclass inheritance over the given physical leaf
    /// tables. Replaces the root table declared in `new`.
    pub fn union_tables(mut self, tables: &[&str]) -> Self {
        self.inheritance = InheritanceKind::Union;
        self.tables = tables
            .iter()
            .map(|t| TableMapping {
                name: t.to_string(),
                key_columns: Vec::new(),
            })
            .collect();
        self
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        ty: BasicType,
        column: impl Into<String>,
    ) -> Self {
        self.properties.push(PendingProperty::Basic {
            name: name.into(),
            ty,
            column: column.into(),
            table: None,
        });
        self
    }

    /// A basic property stored in one of the non-root tables.
    pub fn property_in(
        mut self,
        table: impl Into<String>,
        name: impl Into<String>,
        ty: BasicType,
        column: impl Into<String>,
    ) -> Self {
        self.properties.push(PendingProperty::Basic {
            name: name.into(),
            ty,
            column: column.into(),
            table: Some(table.into()),
        });
        self
    }

    pub fn component(mut self, name: impl Into<String>, component: ComponentBuilder) -> Self {
        self.properties.push(PendingProperty::Component {
            name: name.into(),
            component,
        });
        self
    }

    pub fn many_to_one(
        mut self,
        name: impl Into<String>,
        entity: impl Into<String>,
        columns: &[&str],
    ) -> Self {
        self.properties.push(PendingProperty::ManyToOne {
            name: name.into(),
            entity: entity.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Declares a collection property. The role is derived as
    /// `EntityName.property` and must be defined through a
    /// [`CollectionBuilder`] on the same metamodel.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.properties.push(PendingProperty::Collection { name: name.into() });
        self
    }

    fn table_index(&self, table: &Option<String>) -> Result<usize, MappingError> {
        match table {
            None => Ok(0),
            Some(name) => self
                .tables
                .iter()
                .position(|t| &t.name == name)
                .ok_or_else(|| {
                    MappingError::invalid(format!(
                        "entity [{}] declares no table named [{}]",
                        self.entity_name, name
                    ))
                }),
        }
    }

    fn build(&self) -> Result<EntityPersister, MappingError> {
        let (id_property, id_type, id_columns) = self.identifier.clone().ok_or_else(|| {
            MappingError::invalid(format!("entity [{}] defines no identifier", self.entity_name))
        })?;

        let mut tables = self.tables.clone();
        // The root table (and every union leaf) is keyed by the identifier.
        match self.inheritance {
            InheritanceKind::Union => {
                for table in &mut tables {
                    table.key_columns = id_columns.clone();
                }
            }
            _ => tables[0].key_columns = id_columns.clone(),
        }

        let mut properties = Vec::new();
        let mut collection_roles = Vec::new();
        for pending in &self.properties {
            match pending {
                PendingProperty::Basic {
                    name,
                    ty,
                    column,
                    table,
                } => {
                    let table_index = self.table_index(table)?;
                    if self.inheritance == InheritanceKind::Union && table_index != 0 {
                        return Err(MappingError::invalid(format!(
                            "union-subclass entity [{}] cannot map property [{}] outside its leaf tables",
                            self.entity_name, name
                        )));
                    }
                    properties.push(PropertyMapping {
                        name: name.clone(),
                        ty: Type::Basic(*ty),
                        columns: vec![column.clone()],
                        table_index,
                    });
                }
                PendingProperty::Component { name, component } => {
                    let (ty, columns) = component.build();
                    properties.push(PropertyMapping {
                        name: name.clone(),
                        ty: Type::Component(ty),
                        columns,
                        table_index: 0,
                    });
                }
                PendingProperty::ManyToOne {
                    name,
                    entity,
                    columns,
                } => {
                    properties.push(PropertyMapping {
                        name: name.clone(),
                        ty: Type::Entity {
                            entity: entity.clone(),
                        },
                        columns: columns.clone(),
                        table_index: 0,
                    });
                }
                PendingProperty::Collection { name } => {
                    let role = format!("{}.{}", self.entity_name, name);
                    properties.push(PropertyMapping {
                        name: name.clone(),
                        ty: Type::Collection { role: role.clone() },
                        columns: Vec::new(),
                        table_index: 0,
                    });
                    collection_roles.push(role);
                }
            }
        }

        Ok(EntityPersister {
            entity_name: self.entity_name.clone(),
            inheritance: self.inheritance,
            tables,
            identifier_property: id_property,
            identifier_type: id_type,
            identifier_columns: id_columns,
            properties,
            collection_roles,
        })
    }
}

#[derive(Debug, Clone)]
enum PendingElement {
    Basic(BasicType, String),
    ManyToMany { entity: String, columns: Vec<String> },
    OneToMany { entity: String },
}

#[derive(Debug, Clone)]
pub struct CollectionBuilder {
    owner: String,
    property: String,
    table: Option<String>,
    key_columns: Vec<String>,
    element: Option<PendingElement>,
    index: CollectionIndex,
}

impl CollectionBuilder {
    pub fn new(owner: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            property: property.into(),
            table: None,
            key_columns: Vec::new(),
            element: None,
            index: CollectionIndex::None,
        }
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Columns referencing the owner's identifier. For one-to-many these
    /// live in the element entity's table.
    pub fn key(mut self, columns: &[&str]) -> Self {
        self.key_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn element_basic(mut self, ty: BasicType, column: impl Into<String>) -> Self {
        self.element = Some(PendingElement::Basic(ty, column.into()));
        self
    }

    pub fn many_to_many(mut self, entity: impl Into<String>, columns: &[&str]) -> Self {
        self.element = Some(PendingElement::ManyToMany {
            entity: entity.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn one_to_many(mut self, entity: impl Into<String>) -> Self {
        self.element = Some(PendingElement::OneToMany {
            entity: entity.into(),
        });
        self
    }

    pub fn index_basic(mut self, ty: BasicType, column: impl Into<String>) -> Self {
        self.index = CollectionIndex::Basic {
            ty,
            columns: vec![column.into()],
        };
        self
    }

    pub fn index_composite(mut self, columns: &[&str]) -> Self {
        self.index = CollectionIndex::Composite {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        };
        self
    }

    fn role(&self) -> String {
        format!("{}.{}", self.owner, self.property)
    }

    fn build(&self, model: &Metamodel) -> Result<CollectionPersister, MappingError> {
        let role = self.role();
        if model.entity(&self.owner).is_none() {
            return Err(MappingError::unknown_entity(&self.owner));
        }
        if self.key_columns.is_empty() {
            return Err(MappingError::invalid(format!(
                "collection [{}] declares no key columns",
                role
            )));
        }
        let pending = self.element.clone().ok_or_else(|| {
            MappingError::invalid(format!("collection [{}] declares no element", role))
        })?;

        let (table, element) = match pending {
            PendingElement::Basic(ty, column) => {
                let table = self.table.clone().ok_or_else(|| {
                    MappingError::invalid(format!("collection [{}] declares no table", role))
                })?;
                (
                    table,
                    CollectionElement::Basic {
                        ty,
                        columns: vec![column],
                    },
                )
            }
            PendingElement::ManyToMany { entity, columns } => {
                model.require_entity(&entity)?;
                let table = self.table.clone().ok_or_else(|| {
                    MappingError::invalid(format!("collection [{}] declares no table", role))
                })?;
                (
                    table,
                    CollectionElement::Entity {
                        entity,
                        columns,
                        many_to_many: true,
                    },
                )
            }
            PendingElement::OneToMany { entity } => {
                let element_persister = model.require_entity(&entity)?;
                (
                    element_persister.root_table().name.clone(),
                    CollectionElement::Entity {
                        entity: entity.clone(),
                        columns: element_persister.identifier_columns.clone(),
                        many_to_many: false,
                    },
                )
            }
        };

        Ok(CollectionPersister {
            role,
            owner_entity: self.owner.clone(),
            table,
            key_columns: self.key_columns.clone(),
            element,
            index: self.index.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MetamodelBuilder {
    entities: Vec<EntityBuilder>,
    collections: Vec<CollectionBuilder>,
}

impl MetamodelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, builder: EntityBuilder) -> Self {
        self.entities.push(builder);
        self
    }

    pub fn collection(mut self, builder: CollectionBuilder) -> Self {
        self.collections.push(builder);
        self
    }

    pub fn build(self) -> Result<Metamodel, MappingError> {
        let mut model = Metamodel::default();
        for builder in &self.entities {
            model.insert_entity(builder.build()?);
        }
        for builder in &self.collections {
            let persister = builder.build(&model)?;
            model.insert_collection(persister);
        }
        self.validate(&model)?;
        Ok(model)
    }

    fn validate(&self, model: &Metamodel) -> Result<(), MappingError> {
        for persister in model.entities() {
            for property in &persister.properties {
                match &property.ty {
                    Type::Entity { entity } => {
                        let target = model.require_entity(entity)?;
                        if property.columns.len() != target.identifier_columns.len() {
                            return Err(MappingError::invalid(format!(
                                "property [{}.{}] maps {} columns but entity [{}] has {} identifier columns",
                                persister.entity_name,
                                property.name,
                                property.columns.len(),
                                entity,
                                target.identifier_columns.len()
                            )));
                        }
                    }
                    Type::Collection { role } => {
                        model.require_collection(role)?;
                    }
                    _ => {}
                }
            }
        }
        for collection in model.collections() {
            let owner = model.require_entity(&collection.owner_entity)?;
            let has_property = owner.properties.iter().any(|p| {
                matches!(&p.ty, Type::Collection { role } if role == &collection.role)
            });
            if !has_property {
                return Err(MappingError::invalid(format!(
                    "collection role [{}] has no matching property on entity [{}]",
                    collection.role, collection.owner_entity
                )));
            }
        }
        Ok(())
    }
}
