//! From-element construction
//!
//! Builds the from elements the analysis registers while walking a
//! statement: statement roots, explicit joins, implied joins created by
//! path traversal, and collection joins. Join hops are computed here so
//! path resolution and SQL rendering only read finished elements.

use std::sync::Arc;

use crate::core::QueryError;
use crate::metamodel::{CollectionElement, CollectionPersister, PropertyResolution, Type};
use crate::query::analyze::context::{AnalysisContext, AnalysisEnv};
use crate::query::analyze::from_clause::{
    FromBinding, FromClauseId, FromElement, FromElementId, JoinHop,
};
use crate::query::ast::JoinKind;

/// Creates the root element of the current from clause.
pub fn create_root(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    entity_name: &str,
    class_alias: Option<String>,
) -> Result<FromElementId, QueryError> {
    let persister = env.model.require_entity(entity_name)?;
    let clause = ctx.current_from_clause();
    let table_alias = ctx.next_alias(entity_name);
    ctx.register_query_spaces(persister.query_spaces());
    let id = ctx.add_element(FromElement {
        id: FromElementId(0),
        clause,
        binding: FromBinding::Entity { persister },
        class_alias,
        table_alias: table_alias.clone(),
        hops: Vec::new(),
        origin: None,
        join_path: None,
        collection_join_path: None,
        is_implied: false,
        collection_table_alias: None,
        embedded_params: Vec::new(),
    });
    log::debug!(
        "FromClause root: [{}] -> alias [{}]",
        entity_name,
        table_alias
    );
    Ok(id)
}

/// Creates a join to the entity association `path` names. The caller has
/// already resolved the property on the origin's persister and checked
/// that no element for this path exists yet.
pub fn create_entity_join(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    origin_id: FromElementId,
    path: &str,
    resolution: &PropertyResolution,
    join_kind: JoinKind,
    class_alias: Option<String>,
    implied: bool,
) -> Result<FromElementId, QueryError> {
    let target_name = match &resolution.property_type {
        Type::Entity { entity } => entity.clone(),
        _ => {
            return Err(QueryError::semantic(format!(
                "join path does not reference an entity association: {}",
                path
            )))
        }
    };
    let clause = ctx.element(origin_id).clause;
    check_dml_join(ctx, clause)?;

    let target = env.model.require_entity(&target_name)?;
    let lhs_alias = ctx.element(origin_id).alias_for_table(resolution.table_index);
    let alias = ctx.next_alias(&target_name);
    ctx.register_query_spaces(target.query_spaces());

    let hop = JoinHop {
        join_kind,
        table: target.from_table_fragment(""),
        alias: alias.clone(),
        lhs_alias,
        lhs_columns: resolution.columns.clone(),
        rhs_columns: target.identifier_columns.clone(),
        extra_conditions: Vec::new(),
    };
    let id = ctx.add_element(FromElement {
        id: FromElementId(0),
        clause,
        binding: FromBinding::Entity { persister: target },
        class_alias,
        table_alias: alias.clone(),
        hops: vec![hop],
        origin: Some(origin_id),
        join_path: Some(path.to_string()),
        collection_join_path: None,
        is_implied: implied,
        collection_table_alias: None,
        embedded_params: Vec::new(),
    });
    log::debug!(
        "created {} join [{}] -> [{}] alias [{}]",
        if implied { "implied" } else { "explicit" },
        path,
        target_name,
        alias
    );
    Ok(id)
}

/// Creates a collection join for the role `path` dereferences. Basic and
/// one-to-many collections attach with one hop; many-to-many collections
/// attach the join table and then the element table.
pub fn create_collection_join(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    origin_id: FromElementId,
    persister: Arc<CollectionPersister>,
    path: &str,
    join_kind: JoinKind,
) -> Result<FromElementId, QueryError> {
    let clause = ctx.element(origin_id).clause;
    check_dml_join(ctx, clause)?;

    let owner_id_columns = match ctx.element(origin_id).entity_persister() {
        Some(owner) => owner.identifier_columns.clone(),
        None => {
            return Err(QueryError::semantic(format!(
                "collection owner is not an entity reference: {}",
                path
            )))
        }
    };
    let owner_alias = ctx.element(origin_id).alias_for_table(0);
    ctx.register_query_spaces(persister.query_spaces(env.model));

    let mut hops = Vec::new();
    let element_entity;
    let table_alias;
    let collection_table_alias;

    match &persister.element {
        CollectionElement::Basic { .. } => {
            let alias = ctx.next_alias(persister.property_name());
            hops.push(JoinHop {
                join_kind,
                table: persister.table.clone(),
                alias: alias.clone(),
                lhs_alias: owner_alias,
                lhs_columns: owner_id_columns,
                rhs_columns: persister.key_columns.clone(),
                extra_conditions: Vec::new(),
            });
            element_entity = None;
            collection_table_alias = alias.clone();
            table_alias = alias;
        }
        CollectionElement::Entity {
            entity,
            many_to_many: false,
            ..
        } => {
            // One-to-many: the element table is the collection table.
            let target = env.model.require_entity(entity)?;
            let alias = ctx.next_alias(entity);
            hops.push(JoinHop {
                join_kind,
                table: target.from_table_fragment(""),
                alias: alias.clone(),
                lhs_alias: owner_alias,
                lhs_columns: owner_id_columns,
                rhs_columns: persister.key_columns.clone(),
                extra_conditions: Vec::new(),
            });
            element_entity = Some(target);
            collection_table_alias = alias.clone();
            table_alias = alias;
        }
        CollectionElement::Entity {
            entity,
            columns,
            many_to_many: true,
        } => {
            let target = env.model.require_entity(entity)?;
            let link_alias = ctx.next_alias(persister.property_name());
            let elem_alias = ctx.next_alias(entity);
            hops.push(JoinHop {
                join_kind,
                table: persister.table.clone(),
                alias: link_alias.clone(),
                lhs_alias: owner_alias,
                lhs_columns: owner_id_columns,
                rhs_columns: persister.key_columns.clone(),
                extra_conditions: Vec::new(),
            });
            hops.push(JoinHop {
                join_kind,
                table: target.from_table_fragment(""),
                alias: elem_alias.clone(),
                lhs_alias: link_alias.clone(),
                lhs_columns: columns.clone(),
                rhs_columns: target.identifier_columns.clone(),
                extra_conditions: Vec::new(),
            });
            element_entity = Some(target);
            collection_table_alias = link_alias;
            table_alias = elem_alias;
        }
    }

    let id = ctx.add_element(FromElement {
        id: FromElementId(0),
        clause,
        binding: FromBinding::Collection {
            persister,
            element_entity,
        },
        class_alias: None,
        table_alias,
        hops,
        origin: Some(origin_id),
        join_path: None,
        collection_join_path: Some(path.to_string()),
        is_implied: true,
        collection_table_alias: Some(collection_table_alias),
        embedded_params: Vec::new(),
    });
    log::debug!("created collection join for [{}]", path);
    Ok(id)
}

/// Joins may not be added to the top level of an UPDATE or DELETE; the
/// generated SQL targets a single unaliased table. Subqueries inside the
/// statement are free to join.
fn check_dml_join(ctx: &AnalysisContext, clause: FromClauseId) -> Result<(), QueryError> {
    if ctx.statement_kind.is_dml() && clause == ctx.root_clause() {
        return Err(QueryError::semantic(
            "implicit joins are not allowed in UPDATE or DELETE statements",
        ));
    }
    Ok(())
}
