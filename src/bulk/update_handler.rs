//! Multi-table UPDATE via id table.
//!
//! One UPDATE per physical table that an assignment actually touches,
//! each keyed on the shared id subselect. Tables without an affecting
//! assignment are skipped entirely.

use crate::bulk::handler::{build_populate, keyed_mutation, BulkPlan};
use crate::bulk::id_table::IdTableInfo;
use crate::bulk::AfterUseAction;
use crate::metamodel::EntityPersister;
use crate::query::analyze::{AssignmentSpecification, StatementKind};
use crate::query::param::ParameterSpecification;
use crate::query::sqlgen::RenderedSql;

pub(crate) fn build_update_plan(
    persister: &EntityPersister,
    id_table: &IdTableInfo,
    root_alias: &str,
    restriction: Option<&RenderedSql>,
    assignments: &[AssignmentSpecification],
    after_use: AfterUseAction,
) -> BulkPlan {
    let subselect = id_table.id_subselect();
    let mut mutations = Vec::new();
    for (index, table) in persister.tables.iter().enumerate() {
        let affecting: Vec<&AssignmentSpecification> = assignments
            .iter()
            .filter(|a| a.affects(&table.name))
            .collect();
        if affecting.is_empty() {
            continue;
        }
        let fragments: Vec<&str> = affecting.iter().map(|a| a.sql_fragment()).collect();
        let mut parameters: Vec<ParameterSpecification> = affecting
            .iter()
            .flat_map(|a| a.parameters().iter().cloned())
            .collect();
        if id_table.session_uid_column.is_some() {
            parameters.push(ParameterSpecification::session_uid());
        }
        mutations.push(keyed_mutation(
            format!("update {} set {}", table.name, fragments.join(", ")),
            persister.table_key_columns(index),
            &subselect,
            parameters,
        ));
    }
    BulkPlan {
        statement_kind: StatementKind::Update,
        populate: build_populate(persister, id_table, root_alias, restriction),
        mutations,
        after_use,
        id_table: id_table.clone(),
    }
}
