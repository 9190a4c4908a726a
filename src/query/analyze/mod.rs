//! Semantic analysis over parsed query trees.
//!
//! A single walk resolves entity names and property paths against the
//! metamodel, registers from-clause elements and joins, types operators
//! and rewrites composite comparisons, leaving a tree whose reference
//! nodes carry final SQL text. The [`AnalysisContext`] produced
//! alongside the tree holds everything rendering and execution need:
//! from-clause registries, query spaces and SET-clause assignments.

pub mod assignment;
pub mod context;
pub mod from_clause;
pub mod from_factory;
pub mod methods;
pub mod operators;
pub mod path;
pub mod walker;

pub use assignment::AssignmentSpecification;
pub use context::{AnalysisContext, AnalysisEnv, Clause, StatementKind};
pub use from_clause::{FromClause, FromClauseId, FromElement, FromElementId, JoinHop};
pub use walker::analyze;
