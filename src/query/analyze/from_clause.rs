//! From-clause and from-element model
//!
//! Every SQL FROM item the translation produces is a [`FromElement`]:
//! the root range of a statement, an explicit join, an implied join
//! created while resolving a path, or a collection join. Elements live
//! in one arena owned by the analysis context; each [`FromClause`]
//! (one per query level, nested for subqueries) lists its members in
//! creation order, which is also SQL rendering order.

use std::sync::Arc;

use crate::metamodel::{CollectionPersister, EntityPersister};
use crate::query::ast::JoinKind;
use crate::query::param::ParameterSpecification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FromElementId(pub(crate) u32);

impl FromElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FromClauseId(pub(crate) u32);

impl FromClauseId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a from element selects from.
#[derive(Debug, Clone)]
pub enum FromBinding {
    Entity {
        persister: Arc<EntityPersister>,
    },
    /// A collection reached through its owner. For entity-valued
    /// collections the element persister is carried along so property
    /// dereferences continue into the element entity.
    Collection {
        persister: Arc<CollectionPersister>,
        element_entity: Option<Arc<EntityPersister>>,
    },
}

/// One step in the join sequence attaching an element to its origin.
/// Many-to-many collections need two hops: the join table, then the
/// element table.
#[derive(Debug, Clone)]
pub struct JoinHop {
    pub join_kind: JoinKind,
    /// Table expression without alias; may be a parenthesized union
    /// subquery for union-subclass persisters.
    pub table: String,
    pub alias: String,
    pub lhs_alias: String,
    pub lhs_columns: Vec<String>,
    pub rhs_columns: Vec<String>,
    /// Extra ON conditions, e.g. an index selector equality.
    pub extra_conditions: Vec<String>,
}

impl JoinHop {
    /// The ON fragment of this hop, extra conditions last.
    pub fn on_conditions(&self) -> String {
        let mut parts: Vec<String> = self
            .lhs_columns
            .iter()
            .zip(self.rhs_columns.iter())
            .map(|(lhs, rhs)| format!("{}.{}={}.{}", self.lhs_alias, lhs, self.alias, rhs))
            .collect();
        parts.extend(self.extra_conditions.iter().cloned());
        parts.join(" and ")
    }
}

#[derive(Debug, Clone)]
pub struct FromElement {
    pub id: FromElementId,
    pub clause: FromClauseId,
    pub binding: FromBinding,
    /// Alias declared in the query text, if any.
    pub class_alias: Option<String>,
    /// Generated SQL alias. For collection elements this is the alias
    /// of the table properties resolve against (the element table).
    pub table_alias: String,
    /// Join steps from the origin element; empty for roots.
    pub hops: Vec<JoinHop>,
    pub origin: Option<FromElementId>,
    /// Traversed path that produced this element, the dedup key for
    /// implied joins.
    pub join_path: Option<String>,
    /// Dedup key for collection joins created by `[]` and `elements()`.
    pub collection_join_path: Option<String>,
    pub is_implied: bool,
    /// Alias of the collection table itself; differs from `table_alias`
    /// only for many-to-many collections.
    pub collection_table_alias: Option<String>,
    /// Parameters embedded in this element's join conditions, collected
    /// when the FROM clause renders.
    pub embedded_params: Vec<ParameterSpecification>,
}

impl FromElement {
    pub fn entity_persister(&self) -> Option<&Arc<EntityPersister>> {
        match &self.binding {
            FromBinding::Entity { persister } => Some(persister),
            FromBinding::Collection { element_entity, .. } => element_entity.as_ref(),
        }
    }

    pub fn collection_persister(&self) -> Option<&Arc<CollectionPersister>> {
        match &self.binding {
            FromBinding::Collection { persister, .. } => Some(persister),
            FromBinding::Entity { .. } => None,
        }
    }

    /// Alias qualifying columns stored at `table_index` of the entity
    /// persister's table closure.
    pub fn alias_for_table(&self, table_index: usize) -> String {
        EntityPersister::table_alias(&self.table_alias, table_index)
    }
}

/// One query level's membership list. Lookups walk the parent chain so
/// correlated subqueries see outer aliases.
#[derive(Debug, Clone)]
pub struct FromClause {
    pub id: FromClauseId,
    pub parent: Option<FromClauseId>,
    pub elements: Vec<FromElementId>,
}

impl FromClause {
    pub fn new(id: FromClauseId, parent: Option<FromClauseId>) -> Self {
        FromClause {
            id,
            parent,
            elements: Vec::new(),
        }
    }

    pub fn root_element(&self) -> Option<FromElementId> {
        self.elements.first().copied()
    }
}
