//! Path expression resolution
//!
//! Turns aliases, bare properties, dotted paths and indexed collection
//! accesses into column references, creating implied joins where a path
//! traverses an association. Resolution is driven by the consuming
//! context: the same `o.customer` resolves to foreign-key columns in a
//! comparison, to a join when the path continues past the identifier,
//! and to an error when a collection is dereferenced like an entity.

use std::sync::Arc;

use crate::core::error::MappingError;
use crate::core::QueryError;
use crate::metamodel::{CollectionIndex, PropertyResolution, Type};
use crate::query::analyze::context::{AnalysisContext, AnalysisEnv, Clause};
use crate::query::analyze::from_clause::FromElementId;
use crate::query::analyze::{from_factory, methods, operators, walker};
use crate::query::ast::{Ast, JoinKind, NodeId, NodeKind};
use crate::query::sqlgen;
use crate::utils::{join_columns, qualify_all};

/// What the surrounding expression expects a path to produce.
#[derive(Clone, Copy)]
pub enum PathMode<'a> {
    /// A value usable in comparisons and projections.
    Value,
    /// The left-hand side of a further `.property` dereference.
    Deref(&'a str),
    /// A collection reference, for `[]` access and the collection
    /// pseudo-properties.
    Collection,
}

/// Dispatches resolution over the path-shaped node kinds.
pub fn resolve_path(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    mode: PathMode<'_>,
) -> Result<(), QueryError> {
    match ast.kind(node) {
        NodeKind::Ident => resolve_ident(env, ctx, ast, node, mode),
        NodeKind::Dot => resolve_dot(env, ctx, ast, node, mode),
        NodeKind::Index => resolve_index(env, ctx, ast, node),
        NodeKind::Method => methods::resolve_method(env, ctx, ast, node),
        _ => Err(QueryError::semantic(format!(
            "not a path expression: {}",
            display_text(ast, node)
        ))),
    }
}

/// Approximate source text of a subtree, used in error messages and as
/// the dedup key of collection joins. Call before resolution rewrites
/// node texts.
pub(crate) fn display_text(ast: &Ast, node: NodeId) -> String {
    let n = ast.node(node);
    match n.kind {
        NodeKind::Dot => {
            let children = ast.child_vec(node);
            match children.as_slice() {
                [lhs, rhs] => format!("{}.{}", display_text(ast, *lhs), ast.text(*rhs)),
                _ => n.text.clone(),
            }
        }
        NodeKind::Index => {
            let children = ast.child_vec(node);
            match children.as_slice() {
                [lhs, sel] => format!("{}[{}]", display_text(ast, *lhs), display_text(ast, *sel)),
                _ => n.text.clone(),
            }
        }
        NodeKind::Method => {
            let args: Vec<String> = ast.children(node).map(|c| display_text(ast, c)).collect();
            format!("{}({})", n.text, args.join(", "))
        }
        _ => n.text.clone(),
    }
}

/// Dedup key of entity joins: the origin's generated alias plus the
/// traversed property path, so the same association never joins twice
/// regardless of how the query spells the origin.
pub(crate) fn join_path_key(ctx: &AnalysisContext, origin: FromElementId, path: &str) -> String {
    format!("{}.{}", ctx.element(origin).table_alias, path)
}

fn render_column_list(columns: &[String]) -> String {
    if columns.len() == 1 {
        columns[0].clone()
    } else {
        format!("({})", join_columns(columns))
    }
}

// ----------------------------------------------------------------------
// Identifiers
// ----------------------------------------------------------------------

pub fn resolve_ident(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    mode: PathMode<'_>,
) -> Result<(), QueryError> {
    if ast.node(node).resolved {
        return Ok(());
    }
    let name = ast.text(node).to_string();
    let clause = ctx.current_from_clause();

    if let Some(element_id) = ctx.find_by_alias(clause, &name) {
        return resolve_alias_ref(ctx, ast, node, element_id, &name, mode);
    }

    match ctx.find_property_owner(clause, &name) {
        Some(owner) => resolve_property_on_element(env, ctx, ast, node, owner, &name, &name, mode),
        None => {
            let entity = ctx
                .from_clause(clause)
                .root_element()
                .and_then(|id| ctx.element(id).entity_persister().map(|p| p.entity_name.clone()));
            match entity {
                Some(entity) => Err(MappingError::unknown_property(entity, &name).into()),
                None => Err(QueryError::semantic(format!(
                    "could not resolve property: {}",
                    name
                ))),
            }
        }
    }
}

fn resolve_alias_ref(
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    element_id: FromElementId,
    name: &str,
    mode: PathMode<'_>,
) -> Result<(), QueryError> {
    if let PathMode::Collection = mode {
        let role = ctx
            .element(element_id)
            .collection_persister()
            .map(|c| c.role.clone());
        return match role {
            Some(role) => {
                let n = ast.node_mut(node);
                n.from_element = Some(element_id);
                n.data_type = Some(Type::Collection { role });
                n.resolved = true;
                Ok(())
            }
            None => Err(QueryError::semantic(format!("collection expected: {}", name))),
        };
    }

    let entity = ctx
        .element(element_id)
        .entity_persister()
        .map(|p| (p.entity_name.clone(), p.identifier_columns.clone()));
    match entity {
        Some((entity, id_columns)) => {
            let text = match mode {
                PathMode::Value => {
                    let cols = ctx.qualify_columns(element_id, 0, name, &id_columns);
                    render_column_list(&cols)
                }
                _ => name.to_string(),
            };
            let n = ast.node_mut(node);
            n.text = text;
            n.from_element = Some(element_id);
            n.data_type = Some(Type::Entity { entity });
            n.resolved = true;
            Ok(())
        }
        None => {
            // Alias of a basic-element collection join: the reference is
            // the element column itself.
            let element = ctx.element(element_id);
            let persister = match element.collection_persister() {
                Some(p) => p,
                None => {
                    return Err(QueryError::semantic(format!(
                        "could not resolve alias: {}",
                        name
                    )))
                }
            };
            let ty = persister.element_type();
            let columns = persister.element_columns().to_vec();
            let alias = element
                .collection_table_alias
                .clone()
                .unwrap_or_else(|| element.table_alias.clone());
            let cols = qualify_all(&alias, &columns);
            let n = ast.node_mut(node);
            n.text = render_column_list(&cols);
            n.from_element = Some(element_id);
            n.data_type = Some(ty);
            n.resolved = true;
            Ok(())
        }
    }
}

// ----------------------------------------------------------------------
// Dotted paths
// ----------------------------------------------------------------------

pub fn resolve_dot(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    mode: PathMode<'_>,
) -> Result<(), QueryError> {
    if ast.node(node).resolved {
        return Ok(());
    }
    let display = display_text(ast, node);
    let children = ast.child_vec(node);
    let (lhs, rhs) = match children.as_slice() {
        [lhs, rhs] => (*lhs, *rhs),
        _ => return Err(QueryError::semantic(format!("malformed path: {}", display))),
    };
    let prop = ast.text(rhs).to_string();

    resolve_path(env, ctx, ast, lhs, PathMode::Deref(&prop))?;

    let lhs_type = ast.node(lhs).data_type.clone();
    let lhs_element = ast.node(lhs).from_element;
    let lhs_prop_path = ast.node(lhs).prop_path.clone();

    // A collection on the left only admits the pseudo-properties; the
    // deref error for anything else was raised while resolving the lhs.
    if matches!(lhs_type, Some(Type::Collection { .. })) {
        return methods::resolve_collection_property(env, ctx, ast, node, lhs, &prop, &display);
    }

    // Pending component path: extend it and resolve against the owner.
    if let (Some(element_id), Some(base)) = (lhs_element, &lhs_prop_path) {
        if matches!(lhs_type, Some(Type::Component(_))) {
            let full = format!("{}.{}", base, prop);
            return resolve_property_on_element(env, ctx, ast, node, element_id, &full, &display, mode);
        }
    }

    match (lhs_type, lhs_element) {
        (Some(Type::Entity { entity }), Some(element_id)) => {
            let via_element = ctx
                .element(element_id)
                .entity_persister()
                .map(|p| p.entity_name == entity)
                .unwrap_or(false);
            if via_element {
                // Pseudo-properties shadow element properties on aliases
                // bound to a collection join.
                if ctx.element(element_id).collection_persister().is_some()
                    && methods::is_collection_property(&prop)
                {
                    return methods::resolve_collection_property(
                        env, ctx, ast, node, lhs, &prop, &display,
                    );
                }
                resolve_property_on_element(env, ctx, ast, node, element_id, &prop, &display, mode)
            } else {
                // The lhs is an unjoined entity-valued property; only its
                // identifier can be reached without a join, reusing the
                // foreign-key columns the lhs already rendered.
                let target = env.model.require_entity(&entity)?;
                if prop != target.identifier_property {
                    return Err(MappingError::unknown_property(entity, prop).into());
                }
                let text = ast.text(lhs).to_string();
                let id_type = target.identifier_type.clone();
                let n = ast.node_mut(node);
                n.text = text;
                n.data_type = Some(id_type);
                n.from_element = lhs_element;
                n.prop_path = lhs_prop_path;
                n.resolved = true;
                Ok(())
            }
        }
        _ => Err(QueryError::semantic(format!(
            "cannot dereference: {}",
            display
        ))),
    }
}

/// Resolves a property path relative to one from element, applying the
/// join decision table for entity-valued properties.
fn resolve_property_on_element(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    element_id: FromElementId,
    path: &str,
    display: &str,
    mode: PathMode<'_>,
) -> Result<(), QueryError> {
    let persister = match ctx.element(element_id).entity_persister() {
        Some(p) => Arc::clone(p),
        None => {
            return Err(QueryError::semantic(format!(
                "could not resolve property: {}",
                display
            )))
        }
    };
    let resolution = persister
        .property(path)
        .ok_or_else(|| MappingError::unknown_property(&persister.entity_name, path))?;

    match &resolution.property_type {
        Type::Collection { role } => {
            let role = role.clone();
            resolve_collection_ref(ctx, ast, node, element_id, &role, path, display, mode)
        }
        Type::Entity { .. } => {
            resolve_entity_ref(env, ctx, ast, node, element_id, &resolution, path, display, mode)
        }
        _ => resolve_value_ref(ctx, ast, node, element_id, &resolution, path, display, mode),
    }
}

fn resolve_value_ref(
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    element_id: FromElementId,
    resolution: &PropertyResolution,
    path: &str,
    display: &str,
    mode: PathMode<'_>,
) -> Result<(), QueryError> {
    match mode {
        PathMode::Deref(_) => {
            if resolution.property_type.is_component() {
                let n = ast.node_mut(node);
                n.prop_path = Some(path.to_string());
                n.from_element = Some(element_id);
                n.data_type = Some(resolution.property_type.clone());
                n.resolved = true;
                Ok(())
            } else {
                Err(QueryError::semantic(format!(
                    "cannot dereference a value of type {}: {}",
                    resolution.property_type.name(),
                    display
                )))
            }
        }
        PathMode::Collection => Err(QueryError::semantic(format!(
            "collection expected: {}",
            display
        ))),
        PathMode::Value => {
            let cols =
                ctx.qualify_columns(element_id, resolution.table_index, display, &resolution.columns);
            let n = ast.node_mut(node);
            n.text = render_column_list(&cols);
            n.data_type = Some(resolution.property_type.clone());
            n.from_element = Some(element_id);
            n.prop_path = Some(path.to_string());
            n.resolved = true;
            Ok(())
        }
    }
}

fn resolve_entity_ref(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    element_id: FromElementId,
    resolution: &PropertyResolution,
    path: &str,
    display: &str,
    mode: PathMode<'_>,
) -> Result<(), QueryError> {
    let target_entity = match &resolution.property_type {
        Type::Entity { entity } => entity.clone(),
        _ => {
            return Err(QueryError::semantic(format!(
                "not an entity association: {}",
                display
            )))
        }
    };
    match mode {
        PathMode::Collection => Err(QueryError::semantic(format!(
            "collection expected: {}",
            display
        ))),
        PathMode::Deref(next) => {
            let target = env.model.require_entity(&target_entity)?;
            if next == target.identifier_property {
                // Identifier shortcut: the foreign key answers without a
                // join; the consuming dot keeps these columns.
                let cols = ctx.qualify_columns(
                    element_id,
                    resolution.table_index,
                    display,
                    &resolution.columns,
                );
                let n = ast.node_mut(node);
                n.text = render_column_list(&cols);
                n.data_type = Some(resolution.property_type.clone());
                n.from_element = Some(element_id);
                n.prop_path = Some(path.to_string());
                n.resolved = true;
                Ok(())
            } else {
                let join = ensure_entity_join(env, ctx, element_id, path, resolution, display)?;
                let n = ast.node_mut(node);
                n.text = display.to_string();
                n.data_type = Some(resolution.property_type.clone());
                n.from_element = Some(join);
                n.prop_path = Some(path.to_string());
                n.resolved = true;
                Ok(())
            }
        }
        PathMode::Value => {
            if ctx.current_clause == Clause::Select {
                // Projected entity references join and select the target's
                // identifier.
                let join = ensure_entity_join(env, ctx, element_id, path, resolution, display)?;
                let target = env.model.require_entity(&target_entity)?;
                let alias = ctx.element(join).alias_for_table(0);
                let cols = qualify_all(&alias, &target.identifier_columns);
                let n = ast.node_mut(node);
                n.text = render_column_list(&cols);
                n.data_type = Some(resolution.property_type.clone());
                n.from_element = Some(join);
                n.prop_path = Some(path.to_string());
                n.resolved = true;
                Ok(())
            } else {
                // Comparisons against an entity use its foreign key.
                let cols = ctx.qualify_columns(
                    element_id,
                    resolution.table_index,
                    display,
                    &resolution.columns,
                );
                let n = ast.node_mut(node);
                n.text = render_column_list(&cols);
                n.data_type = Some(resolution.property_type.clone());
                n.from_element = Some(element_id);
                n.prop_path = Some(path.to_string());
                n.resolved = true;
                Ok(())
            }
        }
    }
}

fn resolve_collection_ref(
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
    element_id: FromElementId,
    role: &str,
    path: &str,
    display: &str,
    mode: PathMode<'_>,
) -> Result<(), QueryError> {
    let bind = |ast: &mut Ast| {
        let n = ast.node_mut(node);
        n.text = display.to_string();
        n.data_type = Some(Type::Collection {
            role: role.to_string(),
        });
        n.from_element = Some(element_id);
        n.prop_path = Some(path.to_string());
        n.resolved = true;
    };
    match mode {
        PathMode::Collection => {
            bind(ast);
            Ok(())
        }
        PathMode::Deref(next) => {
            if methods::is_collection_property(next) {
                // The consuming node evaluates the pseudo-property; no
                // join happens here.
                bind(ast);
                Ok(())
            } else {
                Err(QueryError::semantic(format!(
                    "illegal attempt to dereference collection [{}] with element property reference [{}]",
                    display, next
                )))
            }
        }
        PathMode::Value => Err(QueryError::semantic(format!(
            "invalid collection reference: {}",
            display
        ))),
    }
}

fn ensure_entity_join(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    origin: FromElementId,
    path: &str,
    resolution: &PropertyResolution,
    display: &str,
) -> Result<FromElementId, QueryError> {
    let key = join_path_key(ctx, origin, path);
    let clause = ctx.element(origin).clause;
    if let Some(existing) = ctx.find_join_by_path(clause, &key) {
        log::trace!("reusing join [{}] for [{}]", key, display);
        return Ok(existing);
    }
    from_factory::create_entity_join(
        env,
        ctx,
        origin,
        &key,
        resolution,
        JoinKind::Inner,
        None,
        true,
    )
}

// ----------------------------------------------------------------------
// Indexed access
// ----------------------------------------------------------------------

pub fn resolve_index(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
) -> Result<(), QueryError> {
    if ast.node(node).resolved {
        return Ok(());
    }
    let display = display_text(ast, node);
    let children = ast.child_vec(node);
    let (lhs, selector) = match children.as_slice() {
        [lhs, selector] => (*lhs, *selector),
        _ => return Err(QueryError::semantic(format!("malformed path: {}", display))),
    };
    let selector_display = display_text(ast, selector);

    resolve_path(env, ctx, ast, lhs, PathMode::Collection)?;
    let (role, lhs_element) = match (&ast.node(lhs).data_type, ast.node(lhs).from_element) {
        (Some(Type::Collection { role }), Some(el)) => (role.clone(), el),
        _ => {
            return Err(QueryError::semantic(format!(
                "unindexed fromElement before []: {}",
                display
            )))
        }
    };
    let persister = env.model.require_collection(&role)?;
    let (index_type, index_column) = match &persister.index {
        CollectionIndex::None => {
            return Err(QueryError::semantic(format!(
                "unindexed fromElement before []: {}",
                display
            )))
        }
        CollectionIndex::Composite { .. } => {
            return Err(QueryError::semantic(format!(
                "composite-index appears in []: {}",
                display
            )))
        }
        CollectionIndex::Basic { ty, columns } => (Type::Basic(*ty), columns[0].clone()),
    };

    // The selector is an arbitrary expression, rendered through a nested
    // generator pass; its parameters bind with the FROM clause.
    walker::resolve_expression(env, ctx, ast, selector)?;
    operators::propagate_expected_type(ast, selector, &index_type);
    let mut selector_params = Vec::new();
    let rendered = sqlgen::render_fragment(ast, selector, &mut selector_params)?;

    let already_joined = ctx.element(lhs_element).collection_persister().is_some();
    let join = if already_joined {
        lhs_element
    } else {
        let prop = ast.node(lhs).prop_path.clone().unwrap_or_default();
        let key = format!(
            "{}.{}[{}]",
            ctx.element(lhs_element).table_alias,
            prop,
            selector_display
        );
        let clause = ctx.element(lhs_element).clause;
        match ctx.find_collection_join(clause, &key) {
            Some(existing) => existing,
            None => from_factory::create_collection_join(
                env,
                ctx,
                lhs_element,
                Arc::clone(&persister),
                &key,
                JoinKind::Inner,
            )?,
        }
    };

    let collection_alias = ctx
        .element(join)
        .collection_table_alias
        .clone()
        .unwrap_or_else(|| ctx.element(join).table_alias.clone());
    let condition = format!("{}.{} = {}", collection_alias, index_column, rendered);
    let element = ctx.element_mut(join);
    let attached = element
        .hops
        .first()
        .map(|h| h.extra_conditions.contains(&condition))
        .unwrap_or(false);
    if !attached {
        if let Some(hop) = element.hops.first_mut() {
            hop.extra_conditions.push(condition);
        }
        element.embedded_params.extend(selector_params);
    }

    let cols = qualify_all(&collection_alias, persister.element_columns());
    let n = ast.node_mut(node);
    n.text = render_column_list(&cols);
    n.data_type = Some(persister.element_type());
    n.from_element = Some(join);
    n.resolved = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::metamodel::{
        BasicType, CollectionBuilder, ComponentBuilder, EntityBuilder, Metamodel, MetamodelBuilder,
    };
    use crate::query::analyze::context::StatementKind;
    use crate::query::ast::Ast;
    use crate::query::param::{ParamKind, ParameterSpecification};
    use crate::query::parser::token::Position;

    fn model() -> Metamodel {
        MetamodelBuilder::new()
            .entity(
                EntityBuilder::new("Customer", "CUSTOMER")
                    .id("id", BasicType::Long, "ID")
                    .property("name", BasicType::String, "NAME")
                    .component(
                        "address",
                        ComponentBuilder::new("address")
                            .field("city", BasicType::String, "CITY")
                            .field("zip", BasicType::String, "ZIP"),
                    ),
            )
            .entity(
                EntityBuilder::new("Purchase", "PURCHASE")
                    .id("id", BasicType::Long, "ID")
                    .property("status", BasicType::String, "STATUS")
                    .many_to_one("customer", "Customer", &["CUST_ID"])
                    .collection("tags")
                    .collection("items"),
            )
            .entity(
                EntityBuilder::new("Tag", "TAG")
                    .id("id", BasicType::Long, "ID")
                    .property("name", BasicType::String, "NAME"),
            )
            .collection(
                CollectionBuilder::new("Purchase", "tags")
                    .table("PURCHASE_TAGS")
                    .key(&["PURCHASE_ID"])
                    .many_to_many("Tag", &["TAG_ID"]),
            )
            .collection(
                CollectionBuilder::new("Purchase", "items")
                    .table("PURCHASE_ITEMS")
                    .key(&["PURCHASE_ID"])
                    .element_basic(BasicType::String, "SKU")
                    .index_basic(BasicType::Integer, "POSITION"),
            )
            .build()
            .expect("model should build")
    }

    struct Fixture {
        model: Metamodel,
        dialect: GenericDialect,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                model: model(),
                dialect: GenericDialect::new(),
            }
        }

        fn env(&self) -> AnalysisEnv<'_> {
            AnalysisEnv {
                model: &self.model,
                dialect: &self.dialect,
            }
        }
    }

    fn dotted(ast: &mut Ast, parts: &[&str]) -> NodeId {
        let mut current = ast.add_node(NodeKind::Ident, parts[0], Position::default());
        for part in &parts[1..] {
            let rhs = ast.add_node(NodeKind::Ident, *part, Position::default());
            let dot = ast.add_node(NodeKind::Dot, ".", Position::default());
            ast.append_child(dot, current);
            ast.append_child(dot, rhs);
            current = dot;
        }
        current
    }

    fn select_ctx(env: &AnalysisEnv<'_>) -> (AnalysisContext, FromElementId) {
        let mut ctx = AnalysisContext::new(StatementKind::Select);
        ctx.current_clause = Clause::Where;
        let root = from_factory::create_root(env, &mut ctx, "Purchase", Some("o".to_string()))
            .expect("root should resolve");
        (ctx, root)
    }

    #[test]
    fn test_basic_property_renders_qualified_column() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let path = dotted(&mut ast, &["o", "status"]);

        resolve_dot(&env, &mut ctx, &mut ast, path, PathMode::Value).unwrap();
        assert_eq!(ast.text(path), "p0_.STATUS");
        assert_eq!(
            ast.node(path).data_type,
            Some(Type::Basic(BasicType::String))
        );
    }

    #[test]
    fn test_identifier_shortcut_skips_join() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, root) = select_ctx(&env);
        let mut ast = Ast::new();
        let path = dotted(&mut ast, &["o", "customer", "id"]);

        resolve_dot(&env, &mut ctx, &mut ast, path, PathMode::Value).unwrap();
        assert_eq!(ast.text(path), "p0_.CUST_ID");
        // no join element was added
        assert_eq!(ctx.elements_of(ctx.root_clause()).count(), 1);
        assert_eq!(ast.node(path).from_element, Some(root));
    }

    #[test]
    fn test_association_dereference_creates_implied_join() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let path = dotted(&mut ast, &["o", "customer", "name"]);

        resolve_dot(&env, &mut ctx, &mut ast, path, PathMode::Value).unwrap();
        assert_eq!(ast.text(path), "c1_.NAME");
        let joins: Vec<_> = ctx
            .elements_of(ctx.root_clause())
            .filter(|e| e.is_implied)
            .collect();
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].hops[0].on_conditions(), "p0_.CUST_ID=c1_.ID");
    }

    #[test]
    fn test_implied_joins_deduplicate_per_path() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let first = dotted(&mut ast, &["o", "customer", "name"]);
        let second = dotted(&mut ast, &["o", "customer", "id"]);
        let third = dotted(&mut ast, &["o", "customer", "address", "city"]);

        resolve_dot(&env, &mut ctx, &mut ast, first, PathMode::Value).unwrap();
        resolve_dot(&env, &mut ctx, &mut ast, second, PathMode::Value).unwrap();
        resolve_dot(&env, &mut ctx, &mut ast, third, PathMode::Value).unwrap();

        // one root plus exactly one join, shared by both dereferences
        assert_eq!(ctx.elements_of(ctx.root_clause()).count(), 2);
        assert_eq!(ast.text(third), "c1_.CITY");
        // the identifier shortcut still avoided the join
        assert_eq!(ast.text(second), "p0_.CUST_ID");
    }

    #[test]
    fn test_component_path_resolves_sliced_columns() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let mut ctx = AnalysisContext::new(StatementKind::Select);
        ctx.current_clause = Clause::Where;
        from_factory::create_root(&env, &mut ctx, "Customer", Some("c".to_string())).unwrap();
        let mut ast = Ast::new();
        let city = dotted(&mut ast, &["c", "address", "city"]);
        let whole = dotted(&mut ast, &["c", "address"]);

        resolve_dot(&env, &mut ctx, &mut ast, city, PathMode::Value).unwrap();
        assert_eq!(ast.text(city), "c0_.CITY");

        resolve_dot(&env, &mut ctx, &mut ast, whole, PathMode::Value).unwrap();
        assert_eq!(ast.text(whole), "(c0_.CITY, c0_.ZIP)");
    }

    #[test]
    fn test_collection_dereference_rejected() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let path = dotted(&mut ast, &["o", "tags", "name"]);

        let err = resolve_dot(&env, &mut ctx, &mut ast, path, PathMode::Value).unwrap_err();
        let message = err.to_string();
        assert!(
            message.contains("illegal attempt to dereference collection [o.tags]"),
            "unexpected message: {}",
            message
        );
        assert!(message.contains("[name]"));
    }

    #[test]
    fn test_dml_where_columns_unqualified() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let mut ctx = AnalysisContext::new(StatementKind::Update);
        ctx.current_clause = Clause::Where;
        from_factory::create_root(&env, &mut ctx, "Purchase", None).unwrap();
        let mut ast = Ast::new();
        let path = ast.add_node(NodeKind::Ident, "status", Position::default());

        resolve_ident(&env, &mut ctx, &mut ast, path, PathMode::Value).unwrap();
        assert_eq!(ast.text(path), "STATUS");
    }

    #[test]
    fn test_unknown_property_reports_entity() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let path = dotted(&mut ast, &["o", "wage"]);

        let err = resolve_dot(&env, &mut ctx, &mut ast, path, PathMode::Value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not resolve property: wage of: Purchase"
        );
    }

    #[test]
    fn test_resolved_node_is_not_reresolved() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let path = dotted(&mut ast, &["o", "customer", "name"]);

        resolve_dot(&env, &mut ctx, &mut ast, path, PathMode::Value).unwrap();
        let elements_before = ctx.elements_of(ctx.root_clause()).count();
        resolve_dot(&env, &mut ctx, &mut ast, path, PathMode::Value).unwrap();
        assert_eq!(ctx.elements_of(ctx.root_clause()).count(), elements_before);
    }

    fn index_access(ast: &mut Ast, lhs: NodeId, selector: NodeId) -> NodeId {
        let access = ast.add_node(NodeKind::Index, "[", Position::default());
        ast.append_child(access, lhs);
        ast.append_child(access, selector);
        access
    }

    #[test]
    fn test_index_access_joins_collection_on_selector() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let lhs = dotted(&mut ast, &["o", "items"]);
        let selector = ast.add_node(NodeKind::IntLiteral, "0", Position::default());
        let access = index_access(&mut ast, lhs, selector);

        resolve_index(&env, &mut ctx, &mut ast, access).unwrap();

        assert_eq!(ast.text(access), "i1_.SKU");
        assert_eq!(
            ast.node(access).data_type,
            Some(Type::Basic(BasicType::String))
        );
        let join = ctx
            .elements_of(ctx.root_clause())
            .find(|e| e.collection_persister().is_some())
            .expect("collection join");
        assert_eq!(join.hops[0].extra_conditions, vec!["i1_.POSITION = 0"]);
    }

    #[test]
    fn test_index_selector_parameter_rides_on_the_join() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let lhs = dotted(&mut ast, &["o", "items"]);
        let selector = ast.add_node(NodeKind::Param, ":pos", Position::default());
        ast.node_mut(selector).param = Some(ParameterSpecification::named("pos"));
        let access = index_access(&mut ast, lhs, selector);

        resolve_index(&env, &mut ctx, &mut ast, access).unwrap();

        let join = ctx
            .elements_of(ctx.root_clause())
            .find(|e| e.collection_persister().is_some())
            .expect("collection join");
        assert_eq!(join.hops[0].extra_conditions, vec!["i1_.POSITION = ?"]);
        assert_eq!(join.embedded_params.len(), 1);
        assert_eq!(join.embedded_params[0].kind, ParamKind::Named("pos".to_string()));
        assert_eq!(
            join.embedded_params[0].expected_type,
            Some(Type::Basic(BasicType::Integer))
        );
    }

    #[test]
    fn test_repeated_index_access_reuses_the_join() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let first_lhs = dotted(&mut ast, &["o", "items"]);
        let first_sel = ast.add_node(NodeKind::IntLiteral, "0", Position::default());
        let first = index_access(&mut ast, first_lhs, first_sel);
        let second_lhs = dotted(&mut ast, &["o", "items"]);
        let second_sel = ast.add_node(NodeKind::IntLiteral, "0", Position::default());
        let second = index_access(&mut ast, second_lhs, second_sel);

        resolve_index(&env, &mut ctx, &mut ast, first).unwrap();
        resolve_index(&env, &mut ctx, &mut ast, second).unwrap();

        assert_eq!(ctx.elements_of(ctx.root_clause()).count(), 2);
        let join = ctx
            .elements_of(ctx.root_clause())
            .find(|e| e.collection_persister().is_some())
            .expect("collection join");
        assert_eq!(join.hops[0].extra_conditions.len(), 1);
        assert_eq!(ast.text(second), "i1_.SKU");
    }

    #[test]
    fn test_unindexed_collection_rejected_before_brackets() {
        let fixture = Fixture::new();
        let env = fixture.env();
        let (mut ctx, _) = select_ctx(&env);
        let mut ast = Ast::new();
        let lhs = dotted(&mut ast, &["o", "tags"]);
        let selector = ast.add_node(NodeKind::IntLiteral, "0", Position::default());
        let access = index_access(&mut ast, lhs, selector);

        let err = resolve_index(&env, &mut ctx, &mut ast, access).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unindexed fromElement before []: o.tags[0]"
        );
    }
}
