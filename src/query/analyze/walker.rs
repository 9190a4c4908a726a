//! Statement walker
//!
//! Drives one semantic-analysis pass over a parsed statement: the FROM
//! clause first so every alias and root element exists, then the
//! remaining clauses in declaration order. Expression resolution
//! bottoms out in [`path`] for references, [`methods`] for calls and
//! [`operators`] for predicate typing; subqueries recurse through the
//! same entry points under a pushed from-clause level.

use crate::core::error::MappingError;
use crate::core::QueryError;
use crate::metamodel::{BasicType, Type};
use crate::query::analyze::assignment::AssignmentSpecification;
use crate::query::analyze::context::{AnalysisContext, AnalysisEnv, Clause, StatementKind};
use crate::query::analyze::from_factory;
use crate::query::analyze::methods;
use crate::query::analyze::path::{self, PathMode};
use crate::query::analyze::operators;
use crate::query::ast::{Ast, JoinKind, NodeId, NodeKind};

/// Resolves the whole statement in place and returns the analysis
/// context the generator reads from.
pub fn analyze(env: &AnalysisEnv<'_>, ast: &mut Ast) -> Result<AnalysisContext, QueryError> {
    let statement = ast.root();
    let kind = match ast.kind(statement) {
        NodeKind::SelectStatement => StatementKind::Select,
        NodeKind::UpdateStatement => StatementKind::Update,
        NodeKind::DeleteStatement => StatementKind::Delete,
        other => {
            return Err(QueryError::translation(format!(
                "not a translatable statement: {:?}",
                other
            )));
        }
    };

    let mut ctx = AnalysisContext::new(kind);
    resolve_statement_clauses(env, &mut ctx, ast, statement)?;
    ast.node_mut(statement).from_clause = Some(ctx.root_clause());
    log::trace!("resolved statement:\n{}", ast.tree_string(statement));
    Ok(ctx)
}

/// Resolves one expression node, dispatching on kind. Called for
/// select items, restriction trees, grouping keys and order keys.
pub(crate) fn resolve_expression(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    node: NodeId,
) -> Result<(), QueryError> {
    match ast.kind(node) {
        NodeKind::Ident | NodeKind::Dot | NodeKind::Index => {
            path::resolve_path(env, ctx, ast, node, PathMode::Value)
        }
        NodeKind::Method => methods::resolve_method(env, ctx, ast, node),
        NodeKind::SelectStatement => resolve_subquery(env, ctx, ast, node),
        NodeKind::IntLiteral => {
            ast.node_mut(node).data_type = Some(Type::Basic(BasicType::Long));
            Ok(())
        }
        NodeKind::FloatLiteral => {
            ast.node_mut(node).data_type = Some(Type::Basic(BasicType::Double));
            Ok(())
        }
        NodeKind::StringLiteral => {
            ast.node_mut(node).data_type = Some(Type::Basic(BasicType::String));
            Ok(())
        }
        NodeKind::BoolLiteral => {
            ast.node_mut(node).data_type = Some(Type::Basic(BasicType::Boolean));
            Ok(())
        }
        NodeKind::ExprList => {
            for child in ast.child_vec(node) {
                resolve_expression(env, ctx, ast, child)?;
            }
            Ok(())
        }
        kind if kind.is_binary_comparison()
            || kind.is_arithmetic()
            || matches!(
                kind,
                NodeKind::And
                    | NodeKind::Or
                    | NodeKind::Not
                    | NodeKind::Between
                    | NodeKind::NotBetween
                    | NodeKind::In
                    | NodeKind::NotIn
                    | NodeKind::IsNull
                    | NodeKind::IsNotNull
                    | NodeKind::Exists
                    | NodeKind::UnaryMinus
            ) =>
        {
            for child in ast.child_vec(node) {
                resolve_expression(env, ctx, ast, child)?;
            }
            operators::initialize_operator(env, ast, node)
        }
        // Parameters type through their context; literals NULL and *
        // and already-generated fragments carry everything they need.
        _ => Ok(()),
    }
}

/// Clause loop shared by the statement root and subqueries. The FROM
/// clause runs first regardless of position, everything else in child
/// order, which the parser lays out as SELECT, WHERE, GROUP BY,
/// HAVING, ORDER BY for selects and SET, WHERE for updates.
fn resolve_statement_clauses(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    statement: NodeId,
) -> Result<(), QueryError> {
    let clauses = ast.child_vec(statement);
    let from = clauses
        .iter()
        .copied()
        .find(|&c| ast.kind(c) == NodeKind::FromClause)
        .ok_or_else(|| QueryError::translation("statement has no FROM clause"))?;
    resolve_from_clause(env, ctx, ast, from)?;

    for clause in clauses {
        match ast.kind(clause) {
            NodeKind::FromClause => {}
            NodeKind::SelectClause => {
                ctx.current_clause = Clause::Select;
                for item in ast.child_vec(clause) {
                    resolve_expression(env, ctx, ast, item)?;
                }
            }
            NodeKind::WhereClause => {
                ctx.current_clause = Clause::Where;
                for predicate in ast.child_vec(clause) {
                    resolve_expression(env, ctx, ast, predicate)?;
                }
            }
            NodeKind::GroupClause => {
                ctx.current_clause = Clause::GroupBy;
                for key in ast.child_vec(clause) {
                    resolve_expression(env, ctx, ast, key)?;
                }
            }
            NodeKind::HavingClause => {
                ctx.current_clause = Clause::Having;
                for predicate in ast.child_vec(clause) {
                    resolve_expression(env, ctx, ast, predicate)?;
                }
            }
            NodeKind::OrderClause => {
                ctx.current_clause = Clause::OrderBy;
                for key in ast.child_vec(clause) {
                    resolve_expression(env, ctx, ast, key)?;
                }
            }
            NodeKind::SetClause => {
                resolve_set_clause(env, ctx, ast, clause)?;
            }
            other => {
                return Err(QueryError::translation(format!(
                    "unexpected clause node: {:?}",
                    other
                )));
            }
        }
    }

    if ast.kind(statement) == NodeKind::SelectStatement {
        if let Some(select) = ast.child_of_kind(statement, NodeKind::SelectClause) {
            if let Some(first) = ast.first_child(select) {
                ast.node_mut(statement).data_type = ast.node(first).data_type.clone();
            }
        }
    }
    ast.node_mut(statement).resolved = true;
    Ok(())
}

fn resolve_from_clause(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    from_clause: NodeId,
) -> Result<(), QueryError> {
    ctx.current_clause = Clause::From;
    for entry in ast.child_vec(from_clause) {
        match ast.kind(entry) {
            NodeKind::Range => {
                let entity = ast.text(entry).to_string();
                let class_alias = ast.node(entry).class_alias.clone();
                let element = from_factory::create_root(env, ctx, &entity, class_alias)?;
                let node = ast.node_mut(entry);
                node.from_element = Some(element);
                node.resolved = true;
            }
            NodeKind::Join => resolve_join(env, ctx, ast, entry)?,
            other => {
                return Err(QueryError::translation(format!(
                    "unexpected from-clause entry: {:?}",
                    other
                )));
            }
        }
    }
    Ok(())
}

/// Explicit `join a.b [alias]`. The origin part of the path resolves
/// like any other reference (creating implied joins for intermediate
/// hops), the terminal property must be an association. An existing
/// implied join for the same path is promoted instead of duplicated.
fn resolve_join(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    join: NodeId,
) -> Result<(), QueryError> {
    let path_node = ast
        .first_child(join)
        .ok_or_else(|| QueryError::semantic("join entry has no path"))?;
    let join_kind = ast.node(join).join_kind.unwrap_or(JoinKind::Inner);
    let class_alias = ast.node(join).class_alias.clone();

    if ast.kind(path_node) != NodeKind::Dot {
        return Err(QueryError::semantic(format!(
            "path expected for join: {}",
            ast.text(path_node)
        )));
    }
    let display = path::display_text(ast, path_node);
    let parts = ast.child_vec(path_node);
    let (lhs, rhs) = match parts.as_slice() {
        [lhs, rhs] => (*lhs, *rhs),
        _ => return Err(QueryError::semantic(format!("path expected for join: {}", display))),
    };
    let property = ast.text(rhs).to_string();

    path::resolve_path(env, ctx, ast, lhs, PathMode::Deref(&property))?;
    let origin = ast.node(lhs).from_element.ok_or_else(|| {
        QueryError::semantic(format!("could not resolve join origin: {}", display))
    })?;
    let full_property = match &ast.node(lhs).prop_path {
        Some(prefix) => format!("{}.{}", prefix, property),
        None => property,
    };

    let persister = ctx
        .element(origin)
        .entity_persister()
        .cloned()
        .ok_or_else(|| {
            QueryError::semantic(format!("could not resolve join origin: {}", display))
        })?;
    let resolution = persister.property(&full_property).ok_or_else(|| {
        MappingError::unknown_property(&persister.entity_name, &full_property)
    })?;

    let clause = ctx.element(origin).clause;
    let key = path::join_path_key(ctx, origin, &full_property);
    let element = match &resolution.property_type {
        Type::Collection { role } => {
            if let Some(existing) = ctx.find_collection_join(clause, &key) {
                log::trace!("reusing collection join for [{}]", key);
                existing
            } else {
                let collection = env.model.require_collection(role)?;
                from_factory::create_collection_join(env, ctx, origin, collection, &key, join_kind)?
            }
        }
        Type::Entity { .. } => {
            if let Some(existing) = ctx.find_join_by_path(clause, &key) {
                log::trace!("promoting implied join for [{}]", key);
                existing
            } else {
                from_factory::create_entity_join(
                    env,
                    ctx,
                    origin,
                    &key,
                    &resolution,
                    join_kind,
                    None,
                    false,
                )?
            }
        }
        _ => {
            return Err(QueryError::semantic(format!(
                "join path does not reference an entity association: {}",
                full_property
            )));
        }
    };

    {
        let resolved = ctx.element_mut(element);
        resolved.is_implied = false;
        if resolved.class_alias.is_none() {
            resolved.class_alias = class_alias;
        }
    }
    let node = ast.node_mut(join);
    node.from_element = Some(element);
    node.resolved = true;
    Ok(())
}

/// Subqueries analyze like statements under their own from-clause
/// level; the statement node takes the type of its first select item,
/// so enclosing comparisons can type against it.
fn resolve_subquery(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    statement: NodeId,
) -> Result<(), QueryError> {
    let outer_clause = ctx.current_clause;
    let level = ctx.push_from_clause();
    resolve_statement_clauses(env, ctx, ast, statement)?;
    ctx.pop_from_clause();
    ctx.current_clause = outer_clause;
    ast.node_mut(statement).from_clause = Some(level);
    Ok(())
}

/// Resolves every `property = expression` pair of an UPDATE, types the
/// value side against the target property and collects the assignment
/// specifications the executors consume.
fn resolve_set_clause(
    env: &AnalysisEnv<'_>,
    ctx: &mut AnalysisContext,
    ast: &mut Ast,
    set_clause: NodeId,
) -> Result<(), QueryError> {
    ctx.current_clause = Clause::Set;
    let root = ctx.statement_root()?;
    let persister = ctx
        .element(root)
        .entity_persister()
        .cloned()
        .ok_or_else(|| QueryError::translation("update target is not an entity"))?;

    for eq in ast.child_vec(set_clause) {
        let operands = ast.child_vec(eq);
        for operand in &operands {
            resolve_expression(env, ctx, ast, *operand)?;
        }
        if let [lhs, rhs] = operands.as_slice() {
            if let Some(ty) = ast.node(*lhs).data_type.clone() {
                operators::propagate_expected_type(ast, *rhs, &ty);
            }
        }
        let specification = AssignmentSpecification::from_set_element(ctx, ast, eq, &persister)?;
        ctx.assignments.push(specification);
    }
    Ok(())
}
