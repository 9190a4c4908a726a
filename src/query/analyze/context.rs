//! Analysis context
//!
//! Carries all mutable state of one semantic-analysis pass: the
//! from-element arena, the from-clause stack, the alias generator,
//! collected query spaces and assignment specifications. Node
//! resolution functions receive the context explicitly instead of
//! holding back-pointers into a walker.

use std::collections::BTreeSet;

use crate::core::QueryError;
use crate::dialect::Dialect;
use crate::metamodel::Metamodel;
use crate::query::analyze::assignment::AssignmentSpecification;
use crate::query::analyze::from_clause::{FromClause, FromClauseId, FromElement, FromElementId};
use crate::utils::{qualify_all, AliasGenerator};

/// Read-only collaborators of one analysis pass.
pub struct AnalysisEnv<'a> {
    pub model: &'a Metamodel,
    pub dialect: &'a dyn Dialect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Update,
    Delete,
}

impl StatementKind {
    pub fn is_dml(self) -> bool {
        matches!(self, StatementKind::Update | StatementKind::Delete)
    }
}

/// Clause currently being analyzed; drives position-dependent path
/// semantics (joins for entity references in the select list, column
/// qualification, collection expectations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Set,
}

#[derive(Debug)]
pub struct AnalysisContext {
    pub statement_kind: StatementKind,
    from_clauses: Vec<FromClause>,
    from_elements: Vec<FromElement>,
    clause_stack: Vec<FromClauseId>,
    pub current_clause: Clause,
    alias_gen: AliasGenerator,
    pub query_spaces: BTreeSet<String>,
    pub assignments: Vec<AssignmentSpecification>,
}

impl AnalysisContext {
    pub fn new(statement_kind: StatementKind) -> Self {
        let root = FromClause::new(FromClauseId(0), None);
        AnalysisContext {
            statement_kind,
            from_clauses: vec![root],
            from_elements: Vec::new(),
            clause_stack: vec![FromClauseId(0)],
            current_clause: Clause::From,
            alias_gen: AliasGenerator::new(),
            query_spaces: BTreeSet::new(),
            assignments: Vec::new(),
        }
    }

    // --------------------------------------------------------------
    // From-clause stack
    // --------------------------------------------------------------

    pub fn root_clause(&self) -> FromClauseId {
        FromClauseId(0)
    }

    pub fn current_from_clause(&self) -> FromClauseId {
        *self
            .clause_stack
            .last()
            .unwrap_or(&FromClauseId(0))
    }

    /// Enters a subquery level; the new clause's parent is the current
    /// one, so alias lookups stay correlated.
    pub fn push_from_clause(&mut self) -> FromClauseId {
        let id = FromClauseId(self.from_clauses.len() as u32);
        let parent = Some(self.current_from_clause());
        self.from_clauses.push(FromClause::new(id, parent));
        self.clause_stack.push(id);
        id
    }

    pub fn pop_from_clause(&mut self) {
        if self.clause_stack.len() > 1 {
            self.clause_stack.pop();
        }
    }

    /// True while analyzing below the statement's own level.
    pub fn in_subquery(&self) -> bool {
        self.current_from_clause() != self.root_clause()
    }

    pub fn from_clause(&self, id: FromClauseId) -> &FromClause {
        &self.from_clauses[id.index()]
    }

    // --------------------------------------------------------------
    // Element arena
    // --------------------------------------------------------------

    pub fn add_element(&mut self, mut element: FromElement) -> FromElementId {
        let id = FromElementId(self.from_elements.len() as u32);
        element.id = id;
        let clause = element.clause;
        self.from_elements.push(element);
        self.from_clauses[clause.index()].elements.push(id);
        id
    }

    pub fn element(&self, id: FromElementId) -> &FromElement {
        &self.from_elements[id.index()]
    }

    pub fn element_mut(&mut self, id: FromElementId) -> &mut FromElement {
        &mut self.from_elements[id.index()]
    }

    pub fn elements_of(&self, clause: FromClauseId) -> impl Iterator<Item = &FromElement> {
        self.from_clauses[clause.index()]
            .elements
            .iter()
            .map(move |id| &self.from_elements[id.index()])
    }

    /// Root element of the whole statement; the only legal assignment
    /// target in an UPDATE.
    pub fn statement_root(&self) -> Result<FromElementId, QueryError> {
        self.from_clauses[0]
            .root_element()
            .ok_or_else(|| QueryError::semantic("statement has no from-clause root"))
    }

    pub fn next_alias(&mut self, name: &str) -> String {
        self.alias_gen.next_alias(name)
    }

    // --------------------------------------------------------------
    // Lookups
    // --------------------------------------------------------------

    /// Finds the element declared under `alias`, walking outward
    /// through parent clauses for correlated subqueries.
    pub fn find_by_alias(&self, clause: FromClauseId, alias: &str) -> Option<FromElementId> {
        let mut cursor = Some(clause);
        while let Some(id) = cursor {
            let from_clause = &self.from_clauses[id.index()];
            for element_id in &from_clause.elements {
                let element = &self.from_elements[element_id.index()];
                if element.class_alias.as_deref() == Some(alias) {
                    return Some(*element_id);
                }
            }
            cursor = from_clause.parent;
        }
        None
    }

    /// Finds the element owning a bare property reference. The nearest
    /// clause wins; within a clause the first declared element wins.
    pub fn find_property_owner(&self, clause: FromClauseId, property: &str) -> Option<FromElementId> {
        let mut cursor = Some(clause);
        while let Some(id) = cursor {
            let from_clause = &self.from_clauses[id.index()];
            for element_id in &from_clause.elements {
                let element = &self.from_elements[element_id.index()];
                if let Some(persister) = element.entity_persister() {
                    if persister.has_property(property) {
                        return Some(*element_id);
                    }
                }
            }
            cursor = from_clause.parent;
        }
        None
    }

    /// Finds an existing join element for `path` within one clause;
    /// implied joins are deduplicated through this lookup.
    pub fn find_join_by_path(&self, clause: FromClauseId, path: &str) -> Option<FromElementId> {
        self.from_clauses[clause.index()]
            .elements
            .iter()
            .copied()
            .find(|id| self.from_elements[id.index()].join_path.as_deref() == Some(path))
    }

    pub fn find_collection_join(&self, clause: FromClauseId, path: &str) -> Option<FromElementId> {
        self.from_clauses[clause.index()]
            .elements
            .iter()
            .copied()
            .find(|id| {
                self.from_elements[id.index()].collection_join_path.as_deref() == Some(path)
            })
    }

    // --------------------------------------------------------------
    // Query spaces
    // --------------------------------------------------------------

    pub fn register_query_spaces<I>(&mut self, spaces: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.query_spaces.extend(spaces);
    }

    // --------------------------------------------------------------
    // Column qualification
    // --------------------------------------------------------------

    /// Qualifies property columns for rendering. Select statements and
    /// subqueries qualify by table alias; the top level of an UPDATE or
    /// DELETE renders bare column names because the generated SQL has
    /// no alias to offer.
    pub fn qualify_columns(
        &self,
        element_id: FromElementId,
        table_index: usize,
        path: &str,
        columns: &[String],
    ) -> Vec<String> {
        let element = self.element(element_id);
        let element_in_root = element.clause == self.root_clause();
        if self.statement_kind.is_dml() && element_in_root {
            log::debug!(
                "Using non-qualified column reference [{} -> ({})]",
                path,
                columns.join(", ")
            );
            return columns.to_vec();
        }
        let alias = element.alias_for_table(table_index);
        qualify_all(&alias, columns)
    }
}
