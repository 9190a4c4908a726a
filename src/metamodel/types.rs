//! Mapping types the translator resolves expressions against.
//!
//! A `Type` answers the one question translation keeps asking: how many SQL
//! columns does a value of this type span. Basic types span one column,
//! components span the sum of their parts, entity references span the
//! identifier of the referenced entity.

use crate::metamodel::Metamodel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType {
    Boolean,
    Integer,
    Long,
    Double,
    String,
    Date,
    Timestamp,
}

impl BasicType {
    pub fn name(&self) -> &'static str {
        match self {
            BasicType::Boolean => "boolean",
            BasicType::Integer => "integer",
            BasicType::Long => "long",
            BasicType::Double => "double",
            BasicType::String => "string",
            BasicType::Date => "date",
            BasicType::Timestamp => "timestamp",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentProperty {
    pub name: String,
    pub ty: Type,
}

/// A multi-column value type embedded in an owning entity. Components hold
/// basic and nested component properties only; entity references inside
/// components are rejected by the metamodel builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentType {
    pub name: String,
    pub properties: Vec<ComponentProperty>,
}

impl ComponentType {
    pub fn property(&self, name: &str) -> Option<&ComponentProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Column span without registry access. Valid because components never
    /// contain entity references.
    pub fn local_span(&self) -> usize {
        self.properties.iter().map(|p| p.ty.local_span()).sum()
    }

    pub fn basic_types(&self) -> Vec<BasicType> {
        let mut out = Vec::new();
        for prop in &self.properties {
            match &prop.ty {
                Type::Basic(b) => out.push(*b),
                Type::Component(c) => out.extend(c.basic_types()),
                _ => {}
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Basic(BasicType),
    Component(ComponentType),
    Entity { entity: String },
    Collection { role: String },
}

impl Type {
    pub fn is_basic(&self) -> bool {
        matches!(self, Type::Basic(_))
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Type::Component(_))
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Type::Entity { .. })
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Type::Collection { .. })
    }

    /// Number of SQL columns a value of this type occupies.
    pub fn column_span(&self, model: &Metamodel) -> usize {
        match self {
            Type::Basic(_) => 1,
            Type::Component(c) => c.local_span(),
            Type::Entity { entity } => model
                .entity(entity)
                .map(|p| p.identifier_type.column_span(model))
                .unwrap_or(1),
            Type::Collection { .. } => 0,
        }
    }

    /// Span computable without the registry; entity references count as one
    /// column. Used only inside component slicing where entities cannot
    /// occur.
    fn local_span(&self) -> usize {
        match self {
            Type::Component(c) => c.local_span(),
            Type::Collection { .. } => 0,
            _ => 1,
        }
    }

    /// Columns a bound placeholder expands to in rendered SQL. Entity
    /// references bind through their foreign key as a single value.
    pub fn placeholder_span(&self) -> usize {
        self.local_span().max(1)
    }

    /// Type name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            Type::Basic(b) => b.name().to_string(),
            Type::Component(c) => format!("component[{}]", c.name),
            Type::Entity { entity } => format!("entity[{}]", entity),
            Type::Collection { role } => format!("collection[{}]", role),
        }
    }
}
