//! SQL rendering over resolved syntax trees.
//!
//! Resolution leaves every reference node carrying its final column
//! text, so rendering is a single traversal that concatenates those
//! texts, spaces keywords and collects parameter specifications in
//! placeholder order. From-clauses render from the analysis context
//! rather than the tree: each root emits its table fragment followed by
//! the ANSI joins that hang off it, so cross products and join chains
//! stay syntactically separate.

use crate::core::error::QueryError;
use crate::query::analyze::context::AnalysisContext;
use crate::query::analyze::from_clause::{FromClauseId, FromElement, FromElementId};
use crate::query::ast::{Ast, NodeId, NodeKind};
use crate::query::param::ParameterSpecification;
use crate::utils::string_utils::{split_columns, strip_outer_parens};

/// Final SQL for a statement along with its parameters in placeholder
/// order.
#[derive(Debug, Clone)]
pub struct RenderedSql {
    pub sql: String,
    pub parameters: Vec<ParameterSpecification>,
}

/// Renders a resolved SELECT statement. Scalar select items are
/// aliased `col_<item>_<column>_` so result-set readers can address
/// them positionally.
pub fn render_select(
    ctx: &AnalysisContext,
    ast: &Ast,
    statement: NodeId,
) -> Result<RenderedSql, QueryError> {
    if ast.kind(statement) != NodeKind::SelectStatement {
        return Err(QueryError::translation(format!(
            "not a select statement: {:?}",
            ast.kind(statement)
        )));
    }
    let mut sql = String::new();
    let mut parameters = Vec::new();
    write_select_body(ctx, ast, statement, true, &mut sql, &mut parameters)?;
    log::debug!("rendered SQL: {}", sql);
    Ok(RenderedSql { sql, parameters })
}

/// Renders a resolved expression subtree that stands on its own, such
/// as an index selector. Subqueries need from-clause context and are
/// rejected here.
pub fn render_fragment(
    ast: &Ast,
    node: NodeId,
    params: &mut Vec<ParameterSpecification>,
) -> Result<String, QueryError> {
    let mut out = String::new();
    write_expr(None, ast, node, &mut out, params)?;
    Ok(out)
}

/// Renders a resolved expression subtree, including any embedded
/// subqueries, against the statement's analysis context.
pub fn render_expression(
    ctx: &AnalysisContext,
    ast: &Ast,
    node: NodeId,
    params: &mut Vec<ParameterSpecification>,
) -> Result<String, QueryError> {
    let mut out = String::new();
    write_expr(Some(ctx), ast, node, &mut out, params)?;
    Ok(out)
}

fn write_select_body(
    ctx: &AnalysisContext,
    ast: &Ast,
    statement: NodeId,
    alias_items: bool,
    out: &mut String,
    params: &mut Vec<ParameterSpecification>,
) -> Result<(), QueryError> {
    let clause = ast
        .node(statement)
        .from_clause
        .ok_or_else(|| QueryError::translation("select statement was not analyzed"))?;
    let select = ast
        .child_of_kind(statement, NodeKind::SelectClause)
        .ok_or_else(|| QueryError::translation("select statement has no select clause"))?;

    out.push_str("select ");
    if ast.node(select).distinct {
        out.push_str("distinct ");
    }
    for (index, item) in ast.child_vec(select).into_iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        write_select_item(ctx, ast, item, index, alias_items, out, params)?;
    }

    out.push_str(" from ");
    write_from_clause(ctx, clause, out, params)?;

    // Remaining clauses sit in source order behind SELECT and FROM.
    for child in ast.child_vec(statement) {
        match ast.kind(child) {
            NodeKind::SelectClause | NodeKind::FromClause => {}
            NodeKind::WhereClause => {
                let expr = ast
                    .first_child(child)
                    .ok_or_else(|| QueryError::translation("empty where clause"))?;
                out.push_str(" where ");
                write_expr(Some(ctx), ast, expr, out, params)?;
            }
            NodeKind::GroupClause => {
                out.push_str(" group by ");
                for (i, key) in ast.child_vec(child).into_iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_expr(Some(ctx), ast, key, out, params)?;
                }
            }
            NodeKind::HavingClause => {
                let expr = ast
                    .first_child(child)
                    .ok_or_else(|| QueryError::translation("empty having clause"))?;
                out.push_str(" having ");
                write_expr(Some(ctx), ast, expr, out, params)?;
            }
            NodeKind::OrderClause => {
                out.push_str(" order by ");
                for (i, key) in ast.child_vec(child).into_iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_expr(Some(ctx), ast, key, out, params)?;
                    if ast.node(key).descending {
                        out.push_str(" desc");
                    }
                }
            }
            other => {
                return Err(QueryError::translation(format!(
                    "unexpected clause node: {:?}",
                    other
                )));
            }
        }
    }
    Ok(())
}

/// Multi-column references carry their columns as one parenthesized
/// text; aliasing splits them so each column gets its own label.
fn write_select_item(
    ctx: &AnalysisContext,
    ast: &Ast,
    item: NodeId,
    index: usize,
    alias_items: bool,
    out: &mut String,
    params: &mut Vec<ParameterSpecification>,
) -> Result<(), QueryError> {
    if !alias_items {
        return write_expr(Some(ctx), ast, item, out, params);
    }
    let node = ast.node(item);
    let is_reference = matches!(
        node.kind,
        NodeKind::Ident | NodeKind::Dot | NodeKind::Index | NodeKind::SqlFragment
    );
    // Correlated-subquery fragments are parenthesized too but are not
    // column lists.
    let is_column_list =
        node.resolved && node.text.starts_with('(') && !node.text.starts_with("(select");
    if is_reference && is_column_list {
        let columns = split_columns(strip_outer_parens(&node.text));
        for (j, column) in columns.iter().enumerate() {
            if j > 0 {
                out.push_str(", ");
            }
            out.push_str(column);
            out.push_str(&format!(" as col_{}_{}_", index, j));
        }
        return Ok(());
    }
    write_expr(Some(ctx), ast, item, out, params)?;
    out.push_str(&format!(" as col_{}_0_", index));
    Ok(())
}

fn write_from_clause(
    ctx: &AnalysisContext,
    clause: FromClauseId,
    out: &mut String,
    params: &mut Vec<ParameterSpecification>,
) -> Result<(), QueryError> {
    let elements: Vec<&FromElement> = ctx.elements_of(clause).collect();
    let mut first_root = true;
    for root in elements.iter().filter(|e| e.origin.is_none()) {
        if !first_root {
            out.push_str(", ");
        }
        first_root = false;
        let persister = root.entity_persister().ok_or_else(|| {
            QueryError::translation(format!(
                "from element [{}] has no table binding",
                root.table_alias
            ))
        })?;
        out.push_str(&persister.from_table_fragment(&root.table_alias));
        out.push_str(&persister.from_join_fragment(&root.table_alias));

        // Joins attach behind their transitive root so the ON
        // conditions only see tables already in scope.
        for join in elements
            .iter()
            .filter(|e| e.origin.is_some() && transitive_root(ctx, e.id) == root.id)
        {
            write_join_element(join, out, params);
        }
    }
    if first_root {
        return Err(QueryError::translation("from clause has no root element"));
    }
    Ok(())
}

fn write_join_element(
    element: &FromElement,
    out: &mut String,
    params: &mut Vec<ParameterSpecification>,
) {
    for hop in &element.hops {
        out.push_str(&format!(
            " {} {} {} on {}",
            hop.join_kind.sql_text(),
            hop.table,
            hop.alias,
            hop.on_conditions()
        ));
    }
    params.extend(element.embedded_params.iter().cloned());
    if let Some(persister) = element.entity_persister() {
        out.push_str(&persister.from_join_fragment(&element.table_alias));
    }
}

fn transitive_root(ctx: &AnalysisContext, element: FromElementId) -> FromElementId {
    let mut current = element;
    while let Some(origin) = ctx.element(current).origin {
        current = origin;
    }
    current
}

fn write_expr(
    ctx: Option<&AnalysisContext>,
    ast: &Ast,
    node: NodeId,
    out: &mut String,
    params: &mut Vec<ParameterSpecification>,
) -> Result<(), QueryError> {
    match ast.kind(node) {
        NodeKind::Param => {
            let spec = ast.node(node).param.clone().ok_or_else(|| {
                QueryError::parameter("parameter node carries no specification")
            })?;
            write_placeholder(&spec, out);
            params.push(spec);
        }
        NodeKind::SqlFragment => {
            let data = ast.node(node);
            out.push_str(&data.text);
            if let Some(spec) = &data.param {
                params.push(spec.clone());
            }
        }
        NodeKind::Ident | NodeKind::Dot | NodeKind::Index => {
            let data = ast.node(node);
            if !data.resolved {
                return Err(QueryError::translation(format!(
                    "unresolved reference: {}",
                    data.text
                )));
            }
            out.push_str(&data.text);
        }
        NodeKind::IntLiteral
        | NodeKind::FloatLiteral
        | NodeKind::StringLiteral
        | NodeKind::BoolLiteral
        | NodeKind::NullLiteral => {
            out.push_str(&ast.text(node));
        }
        NodeKind::Method => write_method(ctx, ast, node, out, params)?,
        NodeKind::SelectStatement => {
            let ctx = ctx.ok_or_else(|| {
                QueryError::translation("cannot render a subquery in this context")
            })?;
            out.push('(');
            write_select_body(ctx, ast, node, false, out, params)?;
            out.push(')');
        }
        NodeKind::Eq
        | NodeKind::Ne
        | NodeKind::Lt
        | NodeKind::Le
        | NodeKind::Gt
        | NodeKind::Ge
        | NodeKind::Plus
        | NodeKind::Minus
        | NodeKind::Mul
        | NodeKind::Div => {
            let (lhs, rhs) = binary_operands(ast, node)?;
            write_expr(ctx, ast, lhs, out, params)?;
            out.push_str(&ast.text(node));
            write_expr(ctx, ast, rhs, out, params)?;
        }
        NodeKind::Like | NodeKind::NotLike | NodeKind::Or => {
            let (lhs, rhs) = binary_operands(ast, node)?;
            write_expr(ctx, ast, lhs, out, params)?;
            out.push(' ');
            out.push_str(&ast.text(node));
            out.push(' ');
            write_expr(ctx, ast, rhs, out, params)?;
        }
        NodeKind::And => {
            let (lhs, rhs) = binary_operands(ast, node)?;
            write_and_operand(ctx, ast, lhs, out, params)?;
            out.push_str(" and ");
            write_and_operand(ctx, ast, rhs, out, params)?;
        }
        NodeKind::Not => {
            let operand = ast
                .first_child(node)
                .ok_or_else(|| QueryError::translation("negation has no operand"))?;
            out.push_str("not (");
            write_expr(ctx, ast, operand, out, params)?;
            out.push(')');
        }
        NodeKind::Between | NodeKind::NotBetween => {
            let children = ast.child_vec(node);
            let [fixture, low, high] = children.as_slice() else {
                return Err(QueryError::translation(
                    "between operator expects three operands",
                ));
            };
            write_expr(ctx, ast, *fixture, out, params)?;
            out.push(' ');
            out.push_str(&ast.text(node));
            out.push(' ');
            write_expr(ctx, ast, *low, out, params)?;
            out.push_str(" and ");
            write_expr(ctx, ast, *high, out, params)?;
        }
        NodeKind::In | NodeKind::NotIn => {
            let (lhs, rhs) = binary_operands(ast, node)?;
            write_expr(ctx, ast, lhs, out, params)?;
            out.push(' ');
            out.push_str(&ast.text(node));
            out.push_str(" (");
            write_in_rhs(ctx, ast, rhs, out, params)?;
            out.push(')');
        }
        NodeKind::IsNull | NodeKind::IsNotNull => {
            let operand = ast
                .first_child(node)
                .ok_or_else(|| QueryError::translation("nullness check has no operand"))?;
            write_expr(ctx, ast, operand, out, params)?;
            out.push(' ');
            out.push_str(&ast.text(node));
        }
        NodeKind::Exists => {
            let subquery = ast
                .first_child(node)
                .ok_or_else(|| QueryError::translation("exists has no subquery"))?;
            let ctx = ctx.ok_or_else(|| {
                QueryError::translation("cannot render a subquery in this context")
            })?;
            out.push_str("exists (");
            write_select_body(ctx, ast, subquery, false, out, params)?;
            out.push(')');
        }
        NodeKind::UnaryMinus => {
            let operand = ast
                .first_child(node)
                .ok_or_else(|| QueryError::translation("unary minus has no operand"))?;
            out.push('-');
            write_expr(ctx, ast, operand, out, params)?;
        }
        NodeKind::ExprList => {
            out.push('(');
            for (i, child) in ast.child_vec(node).into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(ctx, ast, child, out, params)?;
            }
            out.push(')');
        }
        NodeKind::Star => out.push('*'),
        other => {
            return Err(QueryError::translation(format!(
                "unexpected node in expression position: {:?}",
                other
            )));
        }
    }
    Ok(())
}

/// Multi-column parameters expand to one placeholder per column; a
/// component-sliced specification stays a single placeholder.
fn write_placeholder(spec: &ParameterSpecification, out: &mut String) {
    let span = spec
        .expected_type
        .as_ref()
        .map(|t| t.placeholder_span())
        .unwrap_or(1);
    if span > 1 && spec.component_index.is_none() {
        out.push('(');
        for i in 0..span {
            if i > 0 {
                out.push_str(", ");
            }
            out.push('?');
        }
        out.push(')');
    } else {
        out.push('?');
    }
}

/// OR binds weaker than AND, so OR operands of a conjunction keep
/// their grouping parentheses.
fn write_and_operand(
    ctx: Option<&AnalysisContext>,
    ast: &Ast,
    node: NodeId,
    out: &mut String,
    params: &mut Vec<ParameterSpecification>,
) -> Result<(), QueryError> {
    if ast.kind(node) == NodeKind::Or {
        out.push('(');
        write_expr(ctx, ast, node, out, params)?;
        out.push(')');
        return Ok(());
    }
    write_expr(ctx, ast, node, out, params)
}

fn write_in_rhs(
    ctx: Option<&AnalysisContext>,
    ast: &Ast,
    rhs: NodeId,
    out: &mut String,
    params: &mut Vec<ParameterSpecification>,
) -> Result<(), QueryError> {
    match ast.kind(rhs) {
        NodeKind::ExprList => {
            for (i, child) in ast.child_vec(rhs).into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(ctx, ast, child, out, params)?;
            }
            Ok(())
        }
        NodeKind::SelectStatement => {
            let ctx = ctx.ok_or_else(|| {
                QueryError::translation("cannot render a subquery in this context")
            })?;
            write_select_body(ctx, ast, rhs, false, out, params)
        }
        _ => write_expr(ctx, ast, rhs, out, params),
    }
}

fn write_method(
    ctx: Option<&AnalysisContext>,
    ast: &Ast,
    node: NodeId,
    out: &mut String,
    params: &mut Vec<ParameterSpecification>,
) -> Result<(), QueryError> {
    let args = ast.child_vec(node);
    out.push_str(&ast.text(node));
    if args.is_empty() {
        // Zero-argument functions such as current_date render bare.
        return Ok(());
    }
    out.push('(');
    if ast.node(node).distinct {
        out.push_str("distinct ");
    }
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(ctx, ast, arg, out, params)?;
    }
    out.push(')');
    Ok(())
}

fn binary_operands(ast: &Ast, node: NodeId) -> Result<(NodeId, NodeId), QueryError> {
    let children = ast.child_vec(node);
    let [lhs, rhs] = children.as_slice() else {
        return Err(QueryError::translation(format!(
            "{:?} operator expects two operands",
            ast.kind(node)
        )));
    };
    Ok((*lhs, *rhs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, MySqlDialect};
    use crate::metamodel::{
        BasicType, CollectionBuilder, ComponentBuilder, EntityBuilder, Metamodel,
        MetamodelBuilder, Type,
    };
    use crate::query::analyze::context::AnalysisEnv;
    use crate::query::analyze::walker;
    use crate::query::param::ParamKind;
    use crate::query::parser::Parser;

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
                    .collection("tags"),
            )
            .entity(
                EntityBuilder::new("Tag", "TAG")
                    .id("id", BasicType::Long, "ID")
                    .property("name", BasicType::String, "NAME"),
            )
            .entity(
                EntityBuilder::new("Employee", "EMPLOYEE")
                    .id("id", BasicType::Long, "ID")
                    .property("name", BasicType::String, "NAME")
                    .secondary_table("EMPLOYEE_COMP", &["EMP_ID"])
                    .property_in("EMPLOYEE_COMP", "salary", BasicType::Long, "SALARY"),
            )
            .entity(
                EntityBuilder::new("Payment", "PAYMENT")
                    .id("id", BasicType::Long, "ID")
                    .property("amount", BasicType::Long, "AMOUNT")
                    .union_tables(&["CREDIT_PAYMENT", "CASH_PAYMENT"]),
            )
            .collection(
                CollectionBuilder::new("Purchase", "tags")
                    .table("PURCHASE_TAGS")
                    .key(&["PURCHASE_ID"])
                    .many_to_many("Tag", &["TAG_ID"]),
            )
            .build()
            .expect("model should build")
    }

    fn render(hql: &str) -> RenderedSql {
        render_with(hql, &GenericDialect::new())
    }

    fn render_with(hql: &str, dialect: &dyn crate::dialect::Dialect) -> RenderedSql {
        let model = model();
        let env = AnalysisEnv {
            model: &model,
            dialect,
        };
        let mut ast = Parser::parse(hql).unwrap();
        let ctx = walker::analyze(&env, &mut ast).unwrap();
        render_select(&ctx, &ast, ast.root()).unwrap()
    }

    #[test]
    fn test_render_simple_select() {
        let rendered = render("select o.status from Purchase o where o.status = :s");
        assert_eq!(
            rendered.sql,
            "select p0_.STATUS as col_0_0_ from PURCHASE p0_ where p0_.STATUS=?"
        );
        assert_eq!(rendered.parameters.len(), 1);
        assert_eq!(
            rendered.parameters[0].kind,
            ParamKind::Named("s".to_string())
        );
    }

    #[test]
    fn test_render_explicit_join() {
        let rendered =
            render("select c.name from Purchase o join o.customer c where o.status = 'open'");
        assert_eq!(
            rendered.sql,
            "select c1_.NAME as col_0_0_ from PURCHASE p0_ \
             inner join CUSTOMER c1_ on p0_.CUST_ID=c1_.ID where p0_.STATUS='open'"
        );
    }

    #[test]
    fn test_render_collection_join_spans_association_table() {
        let rendered = render("select t.name from Purchase o join o.tags t where t.name = 'new'");
        assert_eq!(
            rendered.sql,
            "select t2_.NAME as col_0_0_ from PURCHASE p0_ \
             inner join PURCHASE_TAGS t1_ on p0_.ID=t1_.PURCHASE_ID \
             inner join TAG t2_ on t1_.TAG_ID=t2_.ID where t2_.NAME='new'"
        );
    }

    #[test]
    fn test_render_secondary_table_joined_for_root() {
        let rendered = render("select e.salary from Employee e where e.salary > 50000");
        assert_eq!(
            rendered.sql,
            "select e0_1_.SALARY as col_0_0_ from EMPLOYEE e0_ \
             inner join EMPLOYEE_COMP e0_1_ on e0_.ID=e0_1_.EMP_ID where e0_1_.SALARY>50000"
        );
    }

    #[test]
    fn test_render_union_root_as_subselect() {
        let rendered = render("select p.amount from Payment p");
        assert_eq!(
            rendered.sql,
            "select p0_.AMOUNT as col_0_0_ from \
             ( select ID, AMOUNT from CREDIT_PAYMENT union all \
             select ID, AMOUNT from CASH_PAYMENT ) p0_"
        );
    }

    #[test]
    fn test_render_group_having_order() {
        let rendered = render(
            "select o.status, count(o.id) from Purchase o \
             group by o.status having count(o.id) > 5 order by o.status desc",
        );
        assert_eq!(
            rendered.sql,
            "select p0_.STATUS as col_0_0_, count(p0_.ID) as col_1_0_ from PURCHASE p0_ \
             group by p0_.STATUS having count(p0_.ID)>5 order by p0_.STATUS desc"
        );
    }

    #[test]
    fn test_render_subquery_keeps_placeholder_order() {
        let rendered = render(
            "select o.id from Purchase o \
             where o.id in (select p.id from Purchase p where p.status = ?) and o.status <> :s",
        );
        assert_eq!(
            rendered.sql,
            "select p0_.ID as col_0_0_ from PURCHASE p0_ \
             where p0_.ID in (select p1_.ID from PURCHASE p1_ where p1_.STATUS=?) \
             and p0_.STATUS<>?"
        );
        assert_eq!(rendered.parameters.len(), 2);
        assert_eq!(rendered.parameters[0].kind, ParamKind::Positional(0));
        assert_eq!(
            rendered.parameters[1].kind,
            ParamKind::Named("s".to_string())
        );
    }

    #[test]
    fn test_render_exists_subquery() {
        let rendered = render(
            "select o.id from Purchase o \
             where exists (select t.id from Tag t where t.id = o.id)",
        );
        assert_eq!(
            rendered.sql,
            "select p0_.ID as col_0_0_ from PURCHASE p0_ \
             where exists (select t1_.ID from TAG t1_ where t1_.ID=p0_.ID)"
        );
    }

    #[test]
    fn test_render_component_select_item_splits_columns() {
        let rendered = render("select c.address from Customer c");
        assert_eq!(
            rendered.sql,
            "select c0_.CITY as col_0_0_, c0_.ZIP as col_0_1_ from CUSTOMER c0_"
        );
    }

    #[test]
    fn test_render_size_in_select_position_stays_one_item() {
        let rendered = render("select size(o.tags) from Purchase o");
        assert_eq!(
            rendered.sql,
            "select (select count(*) from PURCHASE_TAGS \
             where PURCHASE_TAGS.PURCHASE_ID = p0_.ID) as col_0_0_ from PURCHASE p0_"
        );
    }

    #[test]
    fn test_render_expanded_tuple_comparison() {
        let rendered = render("select c.id from Customer c where c.address = :addr");
        assert_eq!(
            rendered.sql,
            "select c0_.ID as col_0_0_ from CUSTOMER c0_ where c0_.CITY=? and c0_.ZIP=?"
        );
        assert_eq!(rendered.parameters.len(), 2);
        assert_eq!(rendered.parameters[0].component_index, Some(0));
        assert_eq!(rendered.parameters[1].component_index, Some(1));
    }

    #[test]
    fn test_render_row_value_comparison_on_supporting_dialect() {
        let rendered = render_with(
            "select c.id from Customer c where c.address = :addr",
            &MySqlDialect::new(),
        );
        assert_eq!(
            rendered.sql,
            "select c0_.ID as col_0_0_ from CUSTOMER c0_ \
             where (c0_.CITY, c0_.ZIP)=(?, ?)"
        );
        assert_eq!(rendered.parameters.len(), 1);
        let expected = rendered.parameters[0].expected_type.as_ref().unwrap();
        assert!(matches!(expected, Type::Component(_)));
        assert_eq!(expected.placeholder_span(), 2);
    }

    #[test]
    fn test_render_parenthesized_or_under_and() {
        let rendered = render(
            "select o.id from Purchase o \
             where (o.status = 'a' or o.status = 'b') and o.id > 1",
        );
        assert_eq!(
            rendered.sql,
            "select p0_.ID as col_0_0_ from PURCHASE p0_ \
             where (p0_.STATUS='a' or p0_.STATUS='b') and p0_.ID>1"
        );
    }

    #[test]
    fn test_render_between_and_nullness() {
        let rendered = render(
            "select o.id from Purchase o \
             where o.id between :lo and :hi and o.status is not null",
        );
        assert_eq!(
            rendered.sql,
            "select p0_.ID as col_0_0_ from PURCHASE p0_ \
             where p0_.ID between ? and ? and p0_.STATUS is not null"
        );
        assert_eq!(rendered.parameters.len(), 2);
    }

    #[test]
    fn test_render_distinct_aggregate() {
        let rendered = render("select count(distinct o.status) from Purchase o");
        assert_eq!(
            rendered.sql,
            "select count(distinct p0_.STATUS) as col_0_0_ from PURCHASE p0_"
        );
    }

    #[test]
    fn test_render_in_list() {
        let rendered = render("select o.id from Purchase o where o.status in ('a', 'b', :c)");
        assert_eq!(
            rendered.sql,
            "select p0_.ID as col_0_0_ from PURCHASE p0_ where p0_.STATUS in ('a', 'b', ?)"
        );
        assert_eq!(rendered.parameters.len(), 1);
    }

    #[test]
    fn test_render_fragment_rejects_subquery() {
        let model = model();
        let dialect = GenericDialect::new();
        let env = AnalysisEnv {
            model: &model,
            dialect: &dialect,
        };
        let mut ast = Parser::parse(
            "select o.id from Purchase o \
             where o.id in (select p.id from Purchase p)",
        )
        .unwrap();
        walker::analyze(&env, &mut ast).unwrap();

        let where_clause = ast.child_of_kind(ast.root(), NodeKind::WhereClause).unwrap();
        let predicate = ast.first_child(where_clause).unwrap();
        let mut params = Vec::new();
        let err = render_fragment(&ast, predicate, &mut params).unwrap_err();
        assert!(err
            .to_string()
            .contains("cannot render a subquery in this context"));
    }
}
