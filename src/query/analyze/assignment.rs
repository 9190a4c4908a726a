//! SET-clause assignments for bulk updates
//!
//! One specification per `property = expression` pair of an UPDATE,
//! carrying the physical tables the write touches, the finished SQL
//! fragment and its placeholders. A property split off to a secondary
//! or joined table affects only that table. Union-subclass persisters
//! mark the whole table closure because the target row may live in any
//! leaf table; deliberately conservative, a narrower choice would need
//! per-row knowledge the translator does not have.

use std::collections::BTreeSet;

use crate::core::error::MappingError;
use crate::core::QueryError;
use crate::metamodel::{EntityPersister, InheritanceKind, Type};
use crate::query::analyze::context::AnalysisContext;
use crate::query::ast::{Ast, NodeId, NodeKind};
use crate::query::param::ParameterSpecification;
use crate::query::sqlgen;

#[derive(Debug, Clone)]
pub struct AssignmentSpecification {
    table_names: BTreeSet<String>,
    sql_fragment: String,
    parameters: Vec<ParameterSpecification>,
}

impl AssignmentSpecification {
    /// Builds the specification for one resolved `=` node of a SET
    /// clause. The fragment is rendered here, once; update handlers
    /// only concatenate finished text.
    pub fn from_set_element(
        ctx: &AnalysisContext,
        ast: &Ast,
        eq: NodeId,
        persister: &EntityPersister,
    ) -> Result<AssignmentSpecification, QueryError> {
        if ast.kind(eq) != NodeKind::Eq {
            return Err(QueryError::semantic(format!(
                "expected an assignment in the SET clause: {}",
                ast.text(eq)
            )));
        }
        let lhs = ast
            .first_child(eq)
            .ok_or_else(|| QueryError::semantic("malformed assignment in the SET clause"))?;
        validate_target(ctx, ast, lhs)?;

        let prop_path = ast.node(lhs).prop_path.clone().ok_or_else(|| {
            QueryError::semantic(format!("not an assignable property: {}", ast.text(lhs)))
        })?;

        let mut table_names = BTreeSet::new();
        if persister.inheritance == InheritanceKind::Union {
            table_names.extend(persister.constraint_ordered_table_names());
        } else {
            let resolution = persister.property(&prop_path).ok_or_else(|| {
                MappingError::unknown_property(&persister.entity_name, &prop_path)
            })?;
            table_names.insert(persister.tables[resolution.table_index].name.clone());
        }

        let mut parameters = Vec::new();
        let sql_fragment = sqlgen::render_expression(ctx, ast, eq, &mut parameters)?;

        Ok(AssignmentSpecification {
            table_names,
            sql_fragment,
            parameters,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(
        tables: &[&str],
        fragment: &str,
        parameters: &[ParameterSpecification],
    ) -> AssignmentSpecification {
        AssignmentSpecification {
            table_names: tables.iter().map(|t| t.to_string()).collect(),
            sql_fragment: fragment.to_string(),
            parameters: parameters.to_vec(),
        }
    }

    /// Whether the update statement against `table` must include this
    /// assignment.
    pub fn affects(&self, table: &str) -> bool {
        self.table_names.contains(table)
    }

    pub fn table_names(&self) -> &BTreeSet<String> {
        &self.table_names
    }

    pub fn sql_fragment(&self) -> &str {
        &self.sql_fragment
    }

    pub fn parameters(&self) -> &[ParameterSpecification] {
        &self.parameters
    }
}

fn validate_target(ctx: &AnalysisContext, ast: &Ast, lhs: NodeId) -> Result<(), QueryError> {
    let node = ast.node(lhs);
    if !node.resolved {
        return Err(QueryError::semantic(format!(
            "assignment target was not resolved: {}",
            node.text
        )));
    }
    match &node.data_type {
        Some(Type::Collection { .. }) => {
            return Err(QueryError::semantic(
                "collections not assignable in update statements",
            ));
        }
        Some(Type::Component(_)) => {
            return Err(QueryError::semantic(
                "Components currently not assignable in update statements",
            ));
        }
        _ => {}
    }

    let element = node.from_element.ok_or_else(|| {
        QueryError::semantic("assignments in the SET clause must target properties of the updated entity")
    })?;
    if element != ctx.statement_root()? {
        return Err(QueryError::semantic(
            "assignments in the SET clause must target properties of the updated entity",
        ));
    }
    Ok(())
}
