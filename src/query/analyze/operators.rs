//! Operator typing and tuple expansion
//!
//! Runs after the operands of a predicate or arithmetic node have been
//! resolved. Comparison operators propagate expected types into
//! parameters and null literals, check column spans, and expand
//! composite comparisons into column-wise junctions when the dialect
//! cannot express row value constructors. Nullness checks on
//! composites expand the same way regardless of dialect.

use crate::core::QueryError;
use crate::metamodel::{BasicType, Type};
use crate::query::analyze::context::AnalysisEnv;
use crate::query::ast::{Ast, NodeId, NodeKind};
use crate::query::param::ParameterSpecification;
use crate::query::parser::token::Position;
use crate::utils::strip_outer_parens;

/// Types and, where necessary, rewrites one operator node. Operands
/// must already be resolved.
pub(crate) fn initialize_operator(
    env: &AnalysisEnv<'_>,
    ast: &mut Ast,
    node: NodeId,
) -> Result<(), QueryError> {
    match ast.kind(node) {
        kind if kind.is_binary_comparison() => initialize_comparison(env, ast, node),
        NodeKind::Between | NodeKind::NotBetween => initialize_between(ast, node),
        NodeKind::In | NodeKind::NotIn => initialize_in(ast, node),
        NodeKind::IsNull | NodeKind::IsNotNull => initialize_nullness(env, ast, node),
        NodeKind::And | NodeKind::Or | NodeKind::Not | NodeKind::Exists => {
            ast.node_mut(node).data_type = Some(Type::Basic(BasicType::Boolean));
            Ok(())
        }
        kind if kind.is_arithmetic() => initialize_arithmetic(ast, node),
        NodeKind::UnaryMinus => initialize_unary_minus(ast, node),
        _ => Ok(()),
    }
}

/// Pushes `expected` into nodes that cannot type themselves:
/// parameters take it as their expected type, null literals as their
/// data type, expression lists distribute it over their elements.
pub(crate) fn propagate_expected_type(ast: &mut Ast, node: NodeId, expected: &Type) {
    match ast.kind(node) {
        NodeKind::Param => {
            if let Some(spec) = ast.node_mut(node).param.as_mut() {
                if spec.expected_type.is_none() {
                    spec.expected_type = Some(expected.clone());
                }
            }
        }
        NodeKind::NullLiteral => {
            if ast.node(node).data_type.is_none() {
                ast.node_mut(node).data_type = Some(expected.clone());
            }
        }
        NodeKind::ExprList => {
            for child in ast.child_vec(node) {
                propagate_expected_type(ast, child, expected);
            }
        }
        _ => {}
    }
}

/// Resolved type of an operand as seen by its enclosing operator.
/// Parameters report their expected type once one has been assigned.
fn operand_type(ast: &Ast, node: NodeId) -> Option<Type> {
    match ast.kind(node) {
        NodeKind::Param => ast
            .node(node)
            .param
            .as_ref()
            .and_then(|spec| spec.expected_type.clone())
            .or_else(|| ast.node(node).data_type.clone()),
        _ => ast.node(node).data_type.clone(),
    }
}

/// Column span of an operand, when known. Expression lists span one
/// column per element; everything else answers through its type.
fn operand_span(env: &AnalysisEnv<'_>, ast: &Ast, node: NodeId) -> Option<usize> {
    if ast.kind(node) == NodeKind::ExprList {
        return Some(ast.children(node).count());
    }
    operand_type(ast, node).map(|ty| ty.column_span(env.model))
}

fn operand_type_name(ast: &Ast, node: NodeId) -> String {
    match operand_type(ast, node) {
        Some(ty) => ty.name(),
        None => "unknown".to_string(),
    }
}

fn initialize_comparison(
    env: &AnalysisEnv<'_>,
    ast: &mut Ast,
    node: NodeId,
) -> Result<(), QueryError> {
    let (lhs, rhs) = binary_operands(ast, node)?;

    let lhs_type = operand_type(ast, lhs);
    let rhs_type = operand_type(ast, rhs);
    if let Some(ty) = &rhs_type {
        propagate_expected_type(ast, lhs, ty);
    }
    if let Some(ty) = &lhs_type {
        propagate_expected_type(ast, rhs, ty);
    }

    let lhs_span = operand_span(env, ast, lhs);
    let rhs_span = operand_span(env, ast, rhs);
    if let (Some(left), Some(right)) = (lhs_span, rhs_span) {
        if left != right {
            return Err(QueryError::semantic(format!(
                "left and right hand sides of a binary logic operator were incompatible [{} : {}]",
                operand_type_name(ast, lhs),
                operand_type_name(ast, rhs)
            )));
        }
        if left > 1 && !env.dialect.supports_row_value_constructor_syntax() {
            expand_tuple_comparison(ast, node, lhs, rhs, left)?;
        }
    }

    ast.node_mut(node).data_type = Some(Type::Basic(BasicType::Boolean));
    Ok(())
}

/// Rewrites `(a, b) = (x, y)` into `a = x and b = y` in place: the
/// comparison node becomes the junction container and keeps growing
/// nested containers for spans above two. Equality expands to a
/// conjunction, inequality to a disjunction; ordering comparisons have
/// no column-wise equivalent.
fn expand_tuple_comparison(
    ast: &mut Ast,
    node: NodeId,
    lhs: NodeId,
    rhs: NodeId,
    span: usize,
) -> Result<(), QueryError> {
    let comparison_kind = ast.kind(node);
    let (container_kind, container_text) = match comparison_kind {
        NodeKind::Eq => (NodeKind::And, "and"),
        NodeKind::Ne => (NodeKind::Or, "or"),
        _ => {
            return Err(QueryError::translation(format!(
                "{} operator not supported on composite types",
                ast.text(node)
            )));
        }
    };
    let comparison_text = ast.text(node).to_string();
    let lhs_fragments = extract_mutation_texts(ast, lhs, span)?;
    let rhs_fragments = extract_mutation_texts(ast, rhs, span)?;

    expand_into_junction(
        ast,
        node,
        span,
        container_kind,
        container_text,
        |ast, index| {
            let pos = ast.node(node).pos;
            let op = ast.add_node(comparison_kind, comparison_text.as_str(), pos);
            let left = fragment_node(ast, pos, &lhs_fragments[index]);
            let right = fragment_node(ast, pos, &rhs_fragments[index]);
            ast.node_mut(op).first_child = Some(left);
            ast.node_mut(left).next_sibling = Some(right);
            op
        },
    );
    Ok(())
}

fn initialize_between(ast: &mut Ast, node: NodeId) -> Result<(), QueryError> {
    let children = ast.child_vec(node);
    let fixture = children.first().copied().ok_or_else(|| {
        QueryError::semantic("fixture operand of a between operator was null")
    })?;
    let low = children
        .get(1)
        .copied()
        .ok_or_else(|| QueryError::semantic("low operand of a between operator was null"))?;
    let high = children
        .get(2)
        .copied()
        .ok_or_else(|| QueryError::semantic("high operand of a between operator was null"))?;

    propagate_from_peers(ast, fixture, low, high);
    propagate_from_peers(ast, low, high, fixture);
    propagate_from_peers(ast, high, fixture, low);

    ast.node_mut(node).data_type = Some(Type::Basic(BasicType::Boolean));
    Ok(())
}

fn propagate_from_peers(ast: &mut Ast, target: NodeId, first: NodeId, second: NodeId) {
    let expected = operand_type(ast, first).or_else(|| operand_type(ast, second));
    if let Some(ty) = expected {
        propagate_expected_type(ast, target, &ty);
    }
}

fn initialize_in(ast: &mut Ast, node: NodeId) -> Result<(), QueryError> {
    let (lhs, rhs) = binary_operands(ast, node)?;
    if let Some(ty) = operand_type(ast, lhs) {
        propagate_expected_type(ast, rhs, &ty);
    }
    ast.node_mut(node).data_type = Some(Type::Basic(BasicType::Boolean));
    Ok(())
}

/// `(a, b) is null` has no direct SQL form on any dialect; composite
/// operands always expand column by column, `is null` joining with
/// `and` and `is not null` with `or`.
fn initialize_nullness(
    env: &AnalysisEnv<'_>,
    ast: &mut Ast,
    node: NodeId,
) -> Result<(), QueryError> {
    let operand = ast
        .first_child(node)
        .ok_or_else(|| QueryError::semantic("null check has no operand"))?;

    let span = operand_span(env, ast, operand).unwrap_or(1);
    if span > 1 {
        let check_kind = ast.kind(node);
        let check_text = ast.text(node).to_string();
        let (container_kind, container_text) = match check_kind {
            NodeKind::IsNull => (NodeKind::And, "and"),
            _ => (NodeKind::Or, "or"),
        };
        let fragments = extract_mutation_texts(ast, operand, span)?;
        expand_into_junction(
            ast,
            node,
            span,
            container_kind,
            container_text,
            |ast, index| {
                let pos = ast.node(node).pos;
                let op = ast.add_node(check_kind, check_text.as_str(), pos);
                let column = fragment_node(ast, pos, &fragments[index]);
                ast.node_mut(op).first_child = Some(column);
                op
            },
        );
    }

    ast.node_mut(node).data_type = Some(Type::Basic(BasicType::Boolean));
    Ok(())
}

fn initialize_arithmetic(ast: &mut Ast, node: NodeId) -> Result<(), QueryError> {
    let (lhs, rhs) = binary_operands(ast, node)?;
    let lhs_type = operand_type(ast, lhs);
    let rhs_type = operand_type(ast, rhs);
    if let Some(ty) = &rhs_type {
        propagate_expected_type(ast, lhs, ty);
    }
    if let Some(ty) = &lhs_type {
        propagate_expected_type(ast, rhs, ty);
    }
    ast.node_mut(node).data_type = lhs_type.or(rhs_type);
    Ok(())
}

fn initialize_unary_minus(ast: &mut Ast, node: NodeId) -> Result<(), QueryError> {
    let operand = ast
        .first_child(node)
        .ok_or_else(|| QueryError::semantic("unary minus has no operand"))?;
    ast.node_mut(node).data_type = operand_type(ast, operand);
    Ok(())
}

fn binary_operands(ast: &Ast, node: NodeId) -> Result<(NodeId, NodeId), QueryError> {
    match ast.child_vec(node).as_slice() {
        [lhs, rhs] => Ok((*lhs, *rhs)),
        _ => Err(QueryError::semantic(format!(
            "operator {} requires two operands",
            ast.text(node)
        ))),
    }
}

/// One rendered column of an expanded composite operand, with the
/// parameter specification to re-attach when the column came from a
/// placeholder.
struct MutationFragment {
    text: String,
    param: Option<ParameterSpecification>,
}

/// Splits a composite operand into per-column fragments. Parameters
/// expand into `span` placeholders bound to single components;
/// expression lists contribute their element texts; everything else is
/// split on the rendered column list.
fn extract_mutation_texts(
    ast: &Ast,
    operand: NodeId,
    span: usize,
) -> Result<Vec<MutationFragment>, QueryError> {
    match ast.kind(operand) {
        NodeKind::Param => {
            let spec = ast.node(operand).param.clone().ok_or_else(|| {
                QueryError::parameter("parameter node carries no specification")
            })?;
            Ok((0..span)
                .map(|index| MutationFragment {
                    text: "?".to_string(),
                    param: Some(spec.clone().with_component_index(index)),
                })
                .collect())
        }
        NodeKind::ExprList => {
            let children = ast.child_vec(operand);
            let mut fragments = Vec::with_capacity(children.len());
            for child in children {
                if ast.kind(child) == NodeKind::Param {
                    fragments.push(MutationFragment {
                        text: "?".to_string(),
                        param: ast.node(child).param.clone(),
                    });
                } else {
                    fragments.push(MutationFragment {
                        text: ast.text(child).to_string(),
                        param: None,
                    });
                }
            }
            if fragments.len() != span {
                return Err(QueryError::translation(
                    "operand text did not reference the expected number of columns",
                ));
            }
            Ok(fragments)
        }
        _ => {
            let text = strip_outer_parens(ast.text(operand)).to_string();
            let parts: Vec<&str> = text.split(", ").collect();
            if parts.len() != span {
                return Err(QueryError::translation(
                    "operand text did not reference the expected number of columns",
                ));
            }
            Ok(parts
                .into_iter()
                .map(|part| MutationFragment {
                    text: part.to_string(),
                    param: None,
                })
                .collect())
        }
    }
}

fn fragment_node(ast: &mut Ast, pos: Position, fragment: &MutationFragment) -> NodeId {
    let id = ast.add_node(NodeKind::SqlFragment, fragment.text.as_str(), pos);
    let node = ast.node_mut(id);
    node.resolved = true;
    node.param = fragment.param.clone();
    id
}

/// Turns `node` into a `container_kind` junction over `span` operator
/// nodes built by `make_op`. Spans above two nest a fresh container as
/// the first child at each step, so the tree stays binary the way the
/// generator expects.
fn expand_into_junction(
    ast: &mut Ast,
    node: NodeId,
    span: usize,
    container_kind: NodeKind,
    container_text: &str,
    mut make_op: impl FnMut(&mut Ast, usize) -> NodeId,
) {
    let pos = ast.node(node).pos;
    {
        let container = ast.node_mut(node);
        container.kind = container_kind;
        container.text = container_text.to_string();
        container.first_child = None;
    }

    let mut container = node;
    let mut index = span - 1;
    while index > 0 {
        if index == 1 {
            let op1 = make_op(ast, 0);
            let op2 = make_op(ast, 1);
            ast.node_mut(container).first_child = Some(op1);
            ast.node_mut(op1).next_sibling = Some(op2);
        } else {
            let op = make_op(ast, index);
            let nested = ast.add_node(container_kind, container_text, pos);
            ast.node_mut(container).first_child = Some(nested);
            ast.node_mut(nested).next_sibling = Some(op);
            container = nested;
        }
        index -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, MySqlDialect};
    use crate::metamodel::{
        BasicType, ComponentBuilder, EntityBuilder, Metamodel, MetamodelBuilder,
    };
    use crate::query::param::ParamKind;

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
            .build()
            .expect("model should build")
    }

    fn address_type(model: &Metamodel) -> Type {
        model
            .entity("Customer")
            .unwrap()
            .property("address")
            .unwrap()
            .property_type
    }

    fn resolved_node(ast: &mut Ast, text: &str, ty: Option<Type>) -> NodeId {
        let id = ast.add_node(NodeKind::Ident, text, Position::default());
        let node = ast.node_mut(id);
        node.resolved = true;
        node.data_type = ty;
        id
    }

    fn named_param(ast: &mut Ast, name: &str) -> NodeId {
        let id = ast.add_node(NodeKind::Param, "?", Position::default());
        ast.node_mut(id).param = Some(ParameterSpecification::named(name));
        id
    }

    fn binary(ast: &mut Ast, kind: NodeKind, text: &str, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = ast.add_node(kind, text, Position::default());
        ast.append_child(id, lhs);
        ast.append_child(id, rhs);
        id
    }

    #[test]
    fn test_tuple_equality_expands_to_conjunction() {
        let model = model();
        let dialect = GenericDialect::new();
        let env = AnalysisEnv {
            model: &model,
            dialect: &dialect,
        };
        let mut ast = Ast::new();
        let component = address_type(&model);
        let lhs = resolved_node(&mut ast, "(c0_.CITY, c0_.ZIP)", Some(component.clone()));
        let rhs = named_param(&mut ast, "addr");
        let node = binary(&mut ast, NodeKind::Eq, "=", lhs, rhs);

        initialize_operator(&env, &mut ast, node).unwrap();

        assert_eq!(ast.kind(node), NodeKind::And);
        assert_eq!(ast.text(node), "and");
        let legs = ast.child_vec(node);
        assert_eq!(legs.len(), 2);
        for (index, (leg, column)) in legs.iter().zip(["c0_.CITY", "c0_.ZIP"]).enumerate() {
            assert_eq!(ast.kind(*leg), NodeKind::Eq);
            assert_eq!(ast.text(*leg), "=");
            let operands = ast.child_vec(*leg);
            assert_eq!(ast.text(operands[0]), column);
            assert_eq!(ast.text(operands[1]), "?");
            let spec = ast.node(operands[1]).param.clone().unwrap();
            assert_eq!(spec.kind, ParamKind::Named("addr".to_string()));
            assert_eq!(spec.component_index, Some(index));
            assert_eq!(spec.expected_type, Some(component.clone()));
        }
    }

    #[test]
    fn test_tuple_inequality_expands_to_disjunction() {
        let model = model();
        let dialect = GenericDialect::new();
        let env = AnalysisEnv {
            model: &model,
            dialect: &dialect,
        };
        let mut ast = Ast::new();
        let lhs = resolved_node(&mut ast, "(c0_.CITY, c0_.ZIP)", Some(address_type(&model)));
        let list = ast.add_node(NodeKind::ExprList, "", Position::default());
        let first = ast.add_node(NodeKind::StringLiteral, "'Linz'", Position::default());
        let second = ast.add_node(NodeKind::StringLiteral, "'4020'", Position::default());
        ast.append_child(list, first);
        ast.append_child(list, second);
        let node = binary(&mut ast, NodeKind::Ne, "<>", lhs, list);

        initialize_operator(&env, &mut ast, node).unwrap();

        assert_eq!(ast.kind(node), NodeKind::Or);
        let legs = ast.child_vec(node);
        assert_eq!(legs.len(), 2);
        assert_eq!(ast.text(legs[0]), "<>");
        let first_leg = ast.child_vec(legs[0]);
        assert_eq!(ast.text(first_leg[0]), "c0_.CITY");
        assert_eq!(ast.text(first_leg[1]), "'Linz'");
        let second_leg = ast.child_vec(legs[1]);
        assert_eq!(ast.text(second_leg[0]), "c0_.ZIP");
        assert_eq!(ast.text(second_leg[1]), "'4020'");
    }

    #[test]
    fn test_ordering_comparison_rejected_on_composites() {
        let model = model();
        let dialect = GenericDialect::new();
        let env = AnalysisEnv {
            model: &model,
            dialect: &dialect,
        };
        let mut ast = Ast::new();
        let lhs = resolved_node(&mut ast, "(c0_.CITY, c0_.ZIP)", Some(address_type(&model)));
        let rhs = named_param(&mut ast, "addr");
        let node = binary(&mut ast, NodeKind::Lt, "<", lhs, rhs);

        let err = initialize_operator(&env, &mut ast, node).unwrap_err();
        assert_eq!(
            err.to_string(),
            "< operator not supported on composite types"
        );
    }

    #[test]
    fn test_span_mismatch_rejected() {
        let model = model();
        let dialect = GenericDialect::new();
        let env = AnalysisEnv {
            model: &model,
            dialect: &dialect,
        };
        let mut ast = Ast::new();
        let lhs = resolved_node(&mut ast, "(c0_.CITY, c0_.ZIP)", Some(address_type(&model)));
        let rhs = resolved_node(&mut ast, "c0_.NAME", Some(Type::Basic(BasicType::String)));
        let node = binary(&mut ast, NodeKind::Eq, "=", lhs, rhs);

        let err = initialize_operator(&env, &mut ast, node).unwrap_err();
        assert!(err
            .to_string()
            .contains("incompatible [component[address] : string]"));
    }

    #[test]
    fn test_row_value_dialect_keeps_tuple_comparison() {
        let model = model();
        let dialect = MySqlDialect::new();
        let env = AnalysisEnv {
            model: &model,
            dialect: &dialect,
        };
        let mut ast = Ast::new();
        let lhs = resolved_node(&mut ast, "(c0_.CITY, c0_.ZIP)", Some(address_type(&model)));
        let rhs = named_param(&mut ast, "addr");
        let node = binary(&mut ast, NodeKind::Eq, "=", lhs, rhs);

        initialize_operator(&env, &mut ast, node).unwrap();

        assert_eq!(ast.kind(node), NodeKind::Eq);
        assert_eq!(ast.child_vec(node), vec![lhs, rhs]);
    }

    #[test]
    fn test_between_propagates_expected_types() {
        let mut ast = Ast::new();
        let fixture = resolved_node(&mut ast, "e0_.SALARY", Some(Type::Basic(BasicType::Long)));
        let low = named_param(&mut ast, "lo");
        let high = named_param(&mut ast, "hi");
        let node = ast.add_node(NodeKind::Between, "between", Position::default());
        ast.append_child(node, fixture);
        ast.append_child(node, low);
        ast.append_child(node, high);

        initialize_between(&mut ast, node).unwrap();

        for param in [low, high] {
            let spec = ast.node(param).param.clone().unwrap();
            assert_eq!(spec.expected_type, Some(Type::Basic(BasicType::Long)));
        }
        assert_eq!(
            ast.node(node).data_type,
            Some(Type::Basic(BasicType::Boolean))
        );
    }

    #[test]
    fn test_in_list_propagates_lhs_type() {
        let mut ast = Ast::new();
        let lhs = resolved_node(&mut ast, "e0_.ID", Some(Type::Basic(BasicType::Long)));
        let list = ast.add_node(NodeKind::ExprList, "", Position::default());
        let first = named_param(&mut ast, "a");
        let second = named_param(&mut ast, "b");
        ast.append_child(list, first);
        ast.append_child(list, second);
        let node = binary(&mut ast, NodeKind::In, "in", lhs, list);

        initialize_in(&mut ast, node).unwrap();

        for param in [first, second] {
            let spec = ast.node(param).param.clone().unwrap();
            assert_eq!(spec.expected_type, Some(Type::Basic(BasicType::Long)));
        }
    }

    #[test]
    fn test_composite_null_check_expands() {
        let model = model();
        let dialect = GenericDialect::new();
        let env = AnalysisEnv {
            model: &model,
            dialect: &dialect,
        };
        let mut ast = Ast::new();
        let operand = resolved_node(&mut ast, "(c0_.CITY, c0_.ZIP)", Some(address_type(&model)));
        let node = ast.add_node(NodeKind::IsNotNull, "is not null", Position::default());
        ast.append_child(node, operand);

        initialize_operator(&env, &mut ast, node).unwrap();

        assert_eq!(ast.kind(node), NodeKind::Or);
        let legs = ast.child_vec(node);
        assert_eq!(legs.len(), 2);
        for (leg, column) in legs.iter().zip(["c0_.CITY", "c0_.ZIP"]) {
            assert_eq!(ast.kind(*leg), NodeKind::IsNotNull);
            assert_eq!(ast.text(*leg), "is not null");
            let operands = ast.child_vec(*leg);
            assert_eq!(operands.len(), 1);
            assert_eq!(ast.text(operands[0]), column);
        }
    }

    #[test]
    fn test_three_column_expansion_nests_containers() {
        let model = MetamodelBuilder::new()
            .entity(
                EntityBuilder::new("Shipment", "SHIPMENT")
                    .id("id", BasicType::Long, "ID")
                    .component(
                        "route",
                        ComponentBuilder::new("route")
                            .field("origin", BasicType::String, "ORIGIN")
                            .field("hub", BasicType::String, "HUB")
                            .field("target", BasicType::String, "TARGET"),
                    ),
            )
            .build()
            .expect("model should build");
        let dialect = GenericDialect::new();
        let env = AnalysisEnv {
            model: &model,
            dialect: &dialect,
        };
        let route = model
            .entity("Shipment")
            .unwrap()
            .property("route")
            .unwrap()
            .property_type;
        let mut ast = Ast::new();
        let lhs = resolved_node(
            &mut ast,
            "(s0_.ORIGIN, s0_.HUB, s0_.TARGET)",
            Some(route),
        );
        let rhs = named_param(&mut ast, "r");
        let node = binary(&mut ast, NodeKind::Eq, "=", lhs, rhs);

        initialize_operator(&env, &mut ast, node).unwrap();

        // and(and(=, =), =) with the highest column in the outer leg
        assert_eq!(ast.kind(node), NodeKind::And);
        let outer = ast.child_vec(node);
        assert_eq!(outer.len(), 2);
        assert_eq!(ast.kind(outer[0]), NodeKind::And);
        assert_eq!(ast.kind(outer[1]), NodeKind::Eq);
        let outer_leg = ast.child_vec(outer[1]);
        assert_eq!(ast.text(outer_leg[0]), "s0_.TARGET");
        let inner = ast.child_vec(outer[0]);
        assert_eq!(ast.text(ast.child_vec(inner[0])[0]), "s0_.ORIGIN");
        assert_eq!(ast.text(ast.child_vec(inner[1])[0]), "s0_.HUB");
        let spec = ast.node(ast.child_vec(inner[0])[1]).param.clone().unwrap();
        assert_eq!(spec.component_index, Some(0));
    }
}
