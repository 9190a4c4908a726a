//! Arena-backed HQL syntax tree
//!
//! Nodes live in a flat `Vec` inside [`Ast`] and address each other by
//! [`NodeId`]. Tree shape is encoded as first-child/next-sibling links,
//! which keeps structural rewrites (splicing a comparison into a
//! conjunction, grafting generated SQL fragments) cheap and local.
//! Semantic analysis mutates nodes in place; SQL generation reads the
//! finished tree.

use crate::metamodel::Type;
use crate::query::analyze::from_clause::{FromClauseId, FromElementId};
use crate::query::param::ParameterSpecification;
use crate::query::parser::token::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl JoinKind {
    pub fn sql_text(self) -> &'static str {
        match self {
            JoinKind::Inner => "inner join",
            JoinKind::LeftOuter => "left outer join",
            JoinKind::RightOuter => "right outer join",
            JoinKind::FullOuter => "full outer join",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    // Statements
    SelectStatement,
    UpdateStatement,
    DeleteStatement,

    // Clauses
    SelectClause,
    FromClause,
    WhereClause,
    GroupClause,
    HavingClause,
    OrderClause,
    SetClause,

    // From-clause entries
    Range,
    Join,

    // Paths and calls
    Ident,
    Dot,
    Index,
    Method,

    // Literals and parameters
    Param,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BoolLiteral,
    NullLiteral,

    // Comparison and predicate operators
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    Between,
    NotBetween,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Exists,

    // Logic operators
    And,
    Or,
    Not,

    // Arithmetic operators
    Plus,
    Minus,
    Mul,
    Div,
    UnaryMinus,

    // Structural helpers
    ExprList,
    Star,
    SqlFragment,
}

impl NodeKind {
    /// Binary comparison operators subject to tuple expansion.
    pub fn is_binary_comparison(self) -> bool {
        matches!(
            self,
            NodeKind::Eq
                | NodeKind::Ne
                | NodeKind::Lt
                | NodeKind::Le
                | NodeKind::Gt
                | NodeKind::Ge
                | NodeKind::Like
                | NodeKind::NotLike
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            NodeKind::Plus | NodeKind::Minus | NodeKind::Mul | NodeKind::Div
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::SelectStatement | NodeKind::UpdateStatement | NodeKind::DeleteStatement
        )
    }
}

/// One syntax-tree node plus the semantic annotations the analysis pass
/// fills in.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: NodeKind,
    /// Source text at parse time; replaced by rendered SQL text for path
    /// nodes during resolution.
    pub text: String,
    pub pos: Position,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,

    /// Resolved data type, filled during analysis.
    pub data_type: Option<Type>,
    /// Set once the node has been resolved; a second resolve call is a no-op.
    pub resolved: bool,
    /// DISTINCT marker on select clauses and aggregate calls.
    pub distinct: bool,
    /// Descending marker on ORDER BY elements.
    pub descending: bool,
    /// Join type on explicit join entries.
    pub join_kind: Option<JoinKind>,
    /// From element this node resolved against.
    pub from_element: Option<FromElementId>,
    /// From clause owned by this node; set on statement nodes.
    pub from_clause: Option<FromClauseId>,
    /// Parameter specification on `Param` nodes and on generated `?`
    /// fragments that stand in for one column of an expanded tuple.
    pub param: Option<ParameterSpecification>,
    /// Property path accumulated across component dereferences, pending
    /// resolution by the consuming node.
    pub prop_path: Option<String>,
    /// Declared alias on `Range` and `Join` entries.
    pub class_alias: Option<String>,
}

impl AstNode {
    fn new(kind: NodeKind, text: String, pos: Position) -> Self {
        AstNode {
            kind,
            text,
            pos,
            first_child: None,
            next_sibling: None,
            data_type: None,
            resolved: false,
            distinct: false,
            descending: false,
            join_kind: None,
            from_element: None,
            from_clause: None,
            param: None,
            prop_path: None,
            class_alias: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Ast {
            nodes: Vec::new(),
            root: None,
        }
    }

    pub fn add_node(&mut self, kind: NodeKind, text: impl Into<String>, pos: Position) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AstNode::new(kind, text.into(), pos));
        id
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> NodeId {
        match self.root {
            Some(id) => id,
            None => NodeId(0),
        }
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].text
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].first_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].next_sibling
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        match self.nodes[parent.index()].first_child {
            None => self.nodes[parent.index()].first_child = Some(child),
            Some(first) => {
                let mut cursor = first;
                while let Some(next) = self.nodes[cursor.index()].next_sibling {
                    cursor = next;
                }
                self.nodes[cursor.index()].next_sibling = Some(child);
            }
        }
    }

    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            ast: self,
            next: self.nodes[parent.index()].first_child,
        }
    }

    pub fn child_vec(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).collect()
    }

    pub fn nth_child(&self, parent: NodeId, n: usize) -> Option<NodeId> {
        self.children(parent).nth(n)
    }

    /// Finds the direct child of `parent` with the given kind.
    pub fn child_of_kind(&self, parent: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(parent).find(|&c| self.kind(c) == kind)
    }

    /// Indented tree dump for trace logging and test diagnostics.
    pub fn tree_string(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_tree(id, 0, &mut out);
        out
    }

    fn write_tree(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&format!("{:?} [{}]\n", node.kind, node.text));
        let mut child = node.first_child;
        while let Some(c) = child {
            self.write_tree(c, depth + 1, out);
            child = self.node(c).next_sibling;
        }
    }
}

impl Default for Ast {
    fn default() -> Self {
        Ast::new()
    }
}

pub struct Children<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ast.next_sibling(current);
        Some(current)
    }
}
