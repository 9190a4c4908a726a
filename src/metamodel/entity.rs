//! Entity persister descriptors.
//!
//! An `EntityPersister` records everything translation needs to know about
//! one mapped entity: the constraint-ordered table closure, identifier
//! columns, property-to-column resolution including component sub-paths, and
//! the SQL fragments placing the entity into a FROM clause.

use crate::metamodel::types::{BasicType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritanceKind {
    Single,
    Joined,
    Union,
}

/// One physical table of an entity. `key_columns` are the columns joined to
/// the root identifier when the table participates in a multi-table mapping.
#[derive(Debug, Clone)]
pub struct TableMapping {
    pub name: String,
    pub key_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PropertyMapping {
    pub name: String,
    pub ty: Type,
    pub columns: Vec<String>,
    /// Index into the owning persister's table closure.
    pub table_index: usize,
}

/// Result of resolving a (possibly dotted) property path.
#[derive(Debug, Clone)]
pub struct PropertyResolution {
    pub property_type: Type,
    pub columns: Vec<String>,
    pub table_index: usize,
}

#[derive(Debug, Clone)]
pub struct EntityPersister {
    pub entity_name: String,
    pub inheritance: InheritanceKind,
    /// Constraint-ordered closure, root first. Deletes walk it in reverse.
    /// For union inheritance these are the physical leaf tables.
    pub tables: Vec<TableMapping>,
    pub identifier_property: String,
    pub identifier_type: Type,
    pub identifier_columns: Vec<String>,
    pub properties: Vec<PropertyMapping>,
    /// Roles of collections owned by this entity.
    pub collection_roles: Vec<String>,
}

impl EntityPersister {
    pub fn table_span(&self) -> usize {
        self.tables.len()
    }

    pub fn is_multi_table(&self) -> bool {
        self.tables.len() > 1
    }

    pub fn root_table(&self) -> &TableMapping {
        &self.tables[0]
    }

    /// Base name the dialect derives the id table name from.
    pub fn id_table_base(&self) -> &str {
        match self.inheritance {
            InheritanceKind::Union => &self.entity_name,
            _ => &self.tables[0].name,
        }
    }

    /// Rendering alias of the table at `index`, derived from the element's
    /// base alias. The root table keeps the base alias itself.
    pub fn table_alias(base: &str, index: usize) -> String {
        if index == 0 {
            base.to_string()
        } else {
            format!("{}{}_", base, index)
        }
    }

    pub fn constraint_ordered_table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    /// Columns keying the table at `index` to the entity identifier: the
    /// declared key columns, or the identifier columns themselves for the
    /// root table and union leaf tables.
    pub fn table_key_columns(&self, index: usize) -> &[String] {
        let mapping = &self.tables[index];
        if mapping.key_columns.is_empty() {
            &self.identifier_columns
        } else {
            &mapping.key_columns
        }
    }

    pub fn query_spaces(&self) -> Vec<String> {
        self.constraint_ordered_table_names()
    }

    pub fn property_mapping(&self, name: &str) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Whether `name` starts a resolvable property path on this entity.
    pub fn has_property(&self, name: &str) -> bool {
        name == self.identifier_property || self.property_mapping(name).is_some()
    }

    /// Resolves a dotted property path to its type and columns. Component
    /// sub-paths slice into the flattened column list of the component
    /// property.
    pub fn property(&self, path: &str) -> Option<PropertyResolution> {
        let mut segments = path.split('.');
        let first = segments.next()?;

        if first == self.identifier_property && path == self.identifier_property {
            return Some(PropertyResolution {
                property_type: self.identifier_type.clone(),
                columns: self.identifier_columns.clone(),
                table_index: 0,
            });
        }

        let mapping = self.property_mapping(first)?;
        let mut ty = &mapping.ty;
        let mut offset = 0usize;
        let mut span = mapping.columns.len();

        for segment in segments {
            let component = match ty {
                Type::Component(c) => c,
                _ => return None,
            };
            let mut sub_offset = 0usize;
            let mut found = None;
            for prop in &component.properties {
                let prop_span = match &prop.ty {
                    Type::Component(c) => c.local_span(),
                    Type::Collection { .. } => 0,
                    _ => 1,
                };
                if prop.name == segment {
                    found = Some((&prop.ty, sub_offset, prop_span));
                    break;
                }
                sub_offset += prop_span;
            }
            let (next_ty, sub_offset, prop_span) = found?;
            ty = next_ty;
            offset += sub_offset;
            span = prop_span;
        }

        Some(PropertyResolution {
            property_type: ty.clone(),
            columns: mapping.columns[offset..offset + span].to_vec(),
            table_index: mapping.table_index,
        })
    }

    /// Basic column types of the identifier, in column order. Drives id
    /// table DDL.
    pub fn identifier_basic_types(&self) -> Vec<BasicType> {
        match &self.identifier_type {
            Type::Basic(b) => vec![*b],
            Type::Component(c) => c.basic_types(),
            _ => Vec::new(),
        }
    }

    /// Distinct columns selected by the union fragment of a union-subclass
    /// persister: identifier columns first, then every property column.
    fn union_select_columns(&self) -> Vec<String> {
        let mut out = self.identifier_columns.clone();
        for prop in &self.properties {
            for col in &prop.columns {
                if !out.contains(col) {
                    out.push(col.clone());
                }
            }
        }
        out
    }

    /// The FROM-clause fragment placing this entity's primary table under
    /// `alias`. Union-subclass persisters render a union-all subquery over
    /// their leaf tables.
    pub fn from_table_fragment(&self, alias: &str) -> String {
        if self.inheritance == InheritanceKind::Union && self.tables.len() > 1 {
            let columns = self.union_select_columns().join(", ");
            let selects: Vec<String> = self
                .tables
                .iter()
                .map(|t| format!("select {} from {}", columns, t.name))
                .collect();
            if alias.is_empty() {
                format!("( {} )", selects.join(" union all "))
            } else {
                format!("( {} ) {}", selects.join(" union all "), alias)
            }
        } else if alias.is_empty() {
            self.tables[0].name.clone()
        } else {
            format!("{} {}", self.tables[0].name, alias)
        }
    }

    /// Inner joins attaching the non-root tables of the closure to `alias`.
    /// Empty for single-table and union persisters.
    pub fn from_join_fragment(&self, alias: &str) -> String {
        if self.inheritance == InheritanceKind::Union {
            return String::new();
        }
        let mut out = String::new();
        for (index, table) in self.tables.iter().enumerate().skip(1) {
            let table_alias = Self::table_alias(alias, index);
            let conditions: Vec<String> = self
                .identifier_columns
                .iter()
                .zip(table.key_columns.iter())
                .map(|(id_col, key_col)| {
                    format!("{}.{}={}.{}", alias, id_col, table_alias, key_col)
                })
                .collect();
            out.push_str(&format!(
                " inner join {} {} on {}",
                table.name,
                table_alias,
                conditions.join(" and ")
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::types::{ComponentProperty, ComponentType};

    fn employee() -> EntityPersister {
        EntityPersister {
            entity_name: "Employee".to_string(),
            inheritance: InheritanceKind::Single,
            tables: vec![
                TableMapping {
                    name: "EMPLOYEE".to_string(),
                    key_columns: vec!["ID".to_string()],
                },
                TableMapping {
                    name: "EMPLOYEE_COMP".to_string(),
                    key_columns: vec!["EMP_ID".to_string()],
                },
            ],
            identifier_property: "id".to_string(),
            identifier_type: Type::Basic(BasicType::Long),
            identifier_columns: vec!["ID".to_string()],
            properties: vec![
                PropertyMapping {
                    name: "name".to_string(),
                    ty: Type::Basic(BasicType::String),
                    columns: vec!["NAME".to_string()],
                    table_index: 0,
                },
                PropertyMapping {
                    name: "salary".to_string(),
                    ty: Type::Basic(BasicType::Double),
                    columns: vec!["SALARY".to_string()],
                    table_index: 1,
                },
                PropertyMapping {
                    name: "address".to_string(),
                    ty: Type::Component(ComponentType {
                        name: "address".to_string(),
                        properties: vec![
                            ComponentProperty {
                                name: "city".to_string(),
                                ty: Type::Basic(BasicType::String),
                            },
                            ComponentProperty {
                                name: "zip".to_string(),
                                ty: Type::Basic(BasicType::String),
                            },
                        ],
                    }),
                    columns: vec!["CITY".to_string(), "ZIP".to_string()],
                    table_index: 0,
                },
            ],
            collection_roles: Vec::new(),
        }
    }

    #[test]
    fn test_multi_table_detection() {
        let persister = employee();
        assert!(persister.is_multi_table());
        assert_eq!(persister.table_span(), 2);
        assert_eq!(persister.id_table_base(), "EMPLOYEE");
    }

    #[test]
    fn test_property_resolution() {
        let persister = employee();
        let res = persister.property("salary").unwrap();
        assert_eq!(res.columns, vec!["SALARY".to_string()]);
        assert_eq!(res.table_index, 1);

        let id = persister.property("id").unwrap();
        assert_eq!(id.columns, vec!["ID".to_string()]);
    }

    #[test]
    fn test_component_sub_path() {
        let persister = employee();
        let city = persister.property("address.city").unwrap();
        assert_eq!(city.columns, vec!["CITY".to_string()]);
        let zip = persister.property("address.zip").unwrap();
        assert_eq!(zip.columns, vec!["ZIP".to_string()]);
        let whole = persister.property("address").unwrap();
        assert_eq!(whole.columns.len(), 2);
    }

    #[test]
    fn test_join_fragment() {
        let persister = employee();
        assert_eq!(persister.from_table_fragment("e0_"), "EMPLOYEE e0_");
        assert_eq!(
            persister.from_join_fragment("e0_"),
            " inner join EMPLOYEE_COMP e0_1_ on e0_.ID=e0_1_.EMP_ID"
        );
    }

    #[test]
    fn test_union_fragment() {
        let persister = EntityPersister {
            entity_name: "Payment".to_string(),
            inheritance: InheritanceKind::Union,
            tables: vec![
                TableMapping {
                    name: "CREDIT_PAYMENT".to_string(),
                    key_columns: vec!["ID".to_string()],
                },
                TableMapping {
                    name: "CASH_PAYMENT".to_string(),
                    key_columns: vec!["ID".to_string()],
                },
            ],
            identifier_property: "id".to_string(),
            identifier_type: Type::Basic(BasicType::Long),
            identifier_columns: vec!["ID".to_string()],
            properties: vec![PropertyMapping {
                name: "amount".to_string(),
                ty: Type::Basic(BasicType::Double),
                columns: vec!["AMOUNT".to_string()],
                table_index: 0,
            }],
            collection_roles: Vec::new(),
        };
        assert_eq!(
            persister.from_table_fragment("p0_"),
            "( select ID, AMOUNT from CREDIT_PAYMENT union all select ID, AMOUNT from CASH_PAYMENT ) p0_"
        );
        assert_eq!(persister.from_join_fragment("p0_"), "");
        assert_eq!(persister.id_table_base(), "Payment");
    }
}
