//! Multi-table DELETE via id table.
//!
//! Join tables of many-to-many collections are cleared first, then the
//! entity tables in reverse constraint order so referencing rows are
//! gone before the rows they point at.

use crate::bulk::handler::{build_populate, keyed_mutation, BulkPlan};
use crate::bulk::id_table::IdTableInfo;
use crate::bulk::AfterUseAction;
use crate::metamodel::{EntityPersister, Metamodel};
use crate::query::analyze::StatementKind;
use crate::query::param::ParameterSpecification;
use crate::query::sqlgen::RenderedSql;

pub(crate) fn build_delete_plan(
    model: &Metamodel,
    persister: &EntityPersister,
    id_table: &IdTableInfo,
    root_alias: &str,
    restriction: Option<&RenderedSql>,
    after_use: AfterUseAction,
) -> BulkPlan {
    let subselect = id_table.id_subselect();
    let shared_params = || -> Vec<ParameterSpecification> {
        if id_table.session_uid_column.is_some() {
            vec![ParameterSpecification::session_uid()]
        } else {
            Vec::new()
        }
    };

    let mut mutations = Vec::new();
    for role in &persister.collection_roles {
        if let Some(collection) = model.collection(role) {
            if collection.is_many_to_many() {
                mutations.push(keyed_mutation(
                    format!("delete from {}", collection.table),
                    &collection.key_columns,
                    &subselect,
                    shared_params(),
                ));
            }
        }
    }
    for (index, table) in persister.tables.iter().enumerate().rev() {
        mutations.push(keyed_mutation(
            format!("delete from {}", table.name),
            persister.table_key_columns(index),
            &subselect,
            shared_params(),
        ));
    }

    BulkPlan {
        statement_kind: StatementKind::Delete,
        populate: build_populate(persister, id_table, root_alias, restriction),
        mutations,
        after_use,
        id_table: id_table.clone(),
    }
}
