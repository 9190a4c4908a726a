//! Method calls and collection pseudo-properties
//!
//! `size`, `elements`, `indices`, `maxindex`, `minindex`, `maxelement`,
//! `minelement` and `index` evaluate over a collection reference, written
//! either as a call (`size(o.tags)`) or as a dotted pseudo-property
//! (`o.tags.size`). Anything else is looked up in the dialect's function
//! registry; unknown names render as written.

use std::sync::Arc;

use crate::core::QueryError;
use crate::metamodel::{BasicType, CollectionPersister, Type};
use crate::query::analyze::context::{AnalysisContext, AnalysisEnv};
use crate::query::analyze::from_clause::FromElementId;
use crate::query::analyze::path::{self, PathMode};
use crate::query::analyze::{from_factory, walker};
use crate::query::ast::{Ast, JoinKind, NodeId, NodeKind};
use crate::utils::qualify_all;

const COLLECTION_PROPERTIES: [&str; 8] = [
    "size",
    "elements",
    "indices",
    "maxindex",
    "minindex",
    "maxelement",
    "minelement",
    "index",
];

pub(crate) fn is_collection_property(name: &str) -> bool {
    COLLECTION_PROPERTIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
}

fn is_path_kind(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Ident | NodeKind::Dot | NodeKind::Index)
}

/// Resolves a `name(args)` node: collection pseudo-property when the
/// name matches and the sole argument is a collection path, dialect
/// function otherwise.
pub fn resolve_method(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
) -> Result<(), QueryError> {
    if ast.node(node).resolved {
        return Ok(());
    }
    let name = ast.text(node).to_lowercase();
    let display = path::display_text(ast, node);
    let args = ast.child_vec(node);

    if is_collection_property(&name) && args.len() == 1 && is_path_kind(ast.kind(args[0])) {
        path::resolve_path(env, ctx, ast, args[0], PathMode::Collection)?;
        return resolve_collection_property(env, ctx, ast, node, args[0], &name, &display);
    }

    for arg in &args {
        walker::resolve_expression(env, ctx, ast, *arg)?;
    }
    match env.dialect.functions().find(&name) {
        Some(function) => {
            let canonical = function.name.clone();
            let data_type = function
                .return_type
                .map(Type::Basic)
                .or_else(|| args.first().and_then(|a| ast.node(*a).data_type.clone()));
            let n = ast.node_mut(node);
            n.text = canonical;
            n.data_type = data_type;
            n.resolved = true;
        }
        None => {
            log::debug!("no function registered under [{}]; rendering as written", name);
            ast.node_mut(node).resolved = true;
        }
    }
    Ok(())
}

/// Evaluates one collection pseudo-property. `collection_ref` is a
/// resolved collection reference: either bound to the owner element (no
/// join yet) or to an existing collection join element. The result
/// replaces `node` as a raw SQL fragment.
pub(crate) fn resolve_collection_property(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    collection_ref: NodeId,
    property: &str,
    display: &str,
) -> Result<(), QueryError> {
    let ref_element = match ast.node(collection_ref).from_element {
        Some(el) => el,
        None => {
            return Err(QueryError::semantic(format!(
                "collection expected: {}",
                display
            )))
        }
    };

    // Distinguish an already-joined reference (explicit join alias) from
    // an owner-bound one.
    let joined = ctx.element(ref_element).collection_persister().is_some();
    let persister: Arc<CollectionPersister> = if joined {
        match ctx.element(ref_element).collection_persister() {
            Some(p) => Arc::clone(p),
            None => {
                return Err(QueryError::semantic(format!(
                    "collection expected: {}",
                    display
                )))
            }
        }
    } else {
        let role = match &ast.node(collection_ref).data_type {
            Some(Type::Collection { role }) => role.clone(),
            _ => {
                return Err(QueryError::semantic(format!(
                    "collection expected: {}",
                    display
                )))
            }
        };
        env.model.require_collection(&role)?
    };
    let owner = if joined {
        match ctx.element(ref_element).origin {
            Some(origin) => origin,
            None => {
                return Err(QueryError::semantic(format!(
                    "collection join has no owner: {}",
                    display
                )))
            }
        }
    } else {
        ref_element
    };

    match property.to_lowercase().as_str() {
        "size" => {
            let condition = owner_key_condition(ctx, &persister, owner, display)?;
            let text = format!(
                "(select count(*) from {} where {})",
                persister.table, condition
            );
            finish_fragment(ast, node, text, Some(Type::Basic(BasicType::Integer)), owner);
            Ok(())
        }
        agg @ ("maxindex" | "minindex") => {
            let columns = require_index(&persister, display)?;
            let condition = owner_key_condition(ctx, &persister, owner, display)?;
            let text = format!(
                "(select {}({}) from {} where {})",
                &agg[..3],
                columns[0],
                persister.table,
                condition
            );
            finish_fragment(ast, node, text, persister.index_type(), owner);
            Ok(())
        }
        agg @ ("maxelement" | "minelement") => {
            let condition = owner_key_condition(ctx, &persister, owner, display)?;
            let text = format!(
                "(select {}({}) from {} where {})",
                &agg[..3],
                persister.element_columns()[0],
                persister.table,
                condition
            );
            finish_fragment(ast, node, text, Some(persister.element_type()), owner);
            Ok(())
        }
        "elements" => {
            let join = ensure_elements_join(env, ctx, ast, collection_ref, ref_element, joined, &persister)?;
            let alias = collection_alias(ctx, join);
            let cols = qualify_all(&alias, persister.element_columns());
            let text = column_list(&cols);
            finish_fragment(ast, node, text, Some(persister.element_type()), join);
            Ok(())
        }
        "indices" => {
            let columns = require_index(&persister, display)?.to_vec();
            let join = ensure_elements_join(env, ctx, ast, collection_ref, ref_element, joined, &persister)?;
            let alias = collection_alias(ctx, join);
            let cols = qualify_all(&alias, &columns);
            let text = column_list(&cols);
            finish_fragment(ast, node, text, persister.index_type(), join);
            Ok(())
        }
        "index" => {
            if !joined {
                return Err(QueryError::semantic(format!(
                    "index() expects an explicit collection join alias: {}",
                    display
                )));
            }
            let columns = require_index(&persister, display)?.to_vec();
            let alias = collection_alias(ctx, ref_element);
            let cols = qualify_all(&alias, &columns);
            let text = column_list(&cols);
            finish_fragment(ast, node, text, persister.index_type(), ref_element);
            Ok(())
        }
        _ => Err(QueryError::semantic(format!(
            "illegal attempt to dereference collection [{}] with element property reference [{}]",
            ast.text(collection_ref),
            property
        ))),
    }
}

fn finish_fragment(
    ast: &mut Ast,
    node: NodeId,
    text: String,
    data_type: Option<Type>,
    element: FromElementId,
) {
    let n = ast.node_mut(node);
    n.kind = NodeKind::SqlFragment;
    n.text = text;
    n.data_type = data_type;
    n.from_element = Some(element);
    n.resolved = true;
}

fn require_index<'a>(
    persister: &'a CollectionPersister,
    display: &str,
) -> Result<&'a [String], QueryError> {
    persister
        .index_columns()
        .ok_or_else(|| QueryError::semantic(format!("collection has no index: {}", display)))
}

/// Correlation predicate of the aggregate subqueries, matching the
/// collection key against the owner's identifier reference.
fn owner_key_condition(
    ctx: &AnalysisContext,
    persister: &CollectionPersister,
    owner: FromElementId,
    display: &str,
) -> Result<String, QueryError> {
    let id_columns = match ctx.element(owner).entity_persister() {
        Some(p) => p.identifier_columns.clone(),
        None => {
            return Err(QueryError::semantic(format!(
                "collection owner is not an entity reference: {}",
                display
            )))
        }
    };
    let owner_refs = ctx.qualify_columns(owner, 0, display, &id_columns);
    let parts: Vec<String> = persister
        .key_columns
        .iter()
        .zip(owner_refs.iter())
        .map(|(key, owner_ref)| format!("{}.{} = {}", persister.table, key, owner_ref))
        .collect();
    Ok(parts.join(" and "))
}

fn ensure_elements_join(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &Ast,
    collection_ref: NodeId,
    ref_element: FromElementId,
    joined: bool,
    persister: &Arc<CollectionPersister>,
) -> Result<FromElementId, QueryError> {
    if joined {
        return Ok(ref_element);
    }
    let prop = ast
        .node(collection_ref)
        .prop_path
        .clone()
        .unwrap_or_else(|| persister.property_name().to_string());
    let key = path::join_path_key(ctx, ref_element, &prop);
    let clause = ctx.element(ref_element).clause;
    match ctx.find_collection_join(clause, &key) {
        Some(existing) => Ok(existing),
        None => from_factory::create_collection_join(
            env,
            ctx,
            ref_element,
            Arc::clone(persister),
            &key,
            JoinKind::Inner,
        ),
    }
}

fn collection_alias(ctx: &AnalysisContext, element: FromElementId) -> String {
    let el = ctx.element(element);
    el.collection_table_alias
        .clone()
        .unwrap_or_else(|| el.table_alias.clone())
}

fn column_list(columns: &[String]) -> String {
    if columns.len() == 1 {
        columns[0].clone()
    } else {
        format!("({})", columns.join(", "))
    }
}
