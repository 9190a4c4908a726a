//! Relmap - an HQL-to-SQL query translation engine implemented in Rust
//!
//! This crate parses HQL statements, resolves identifiers, paths, joins and
//! types against an object/relational metamodel, and renders dialect-correct
//! SQL together with ordered bind parameter specifications. Bulk UPDATE and
//! DELETE statements against entities spanning several tables are rewritten
//! through intermediate id tables.

pub mod bulk;
pub mod config;
pub mod core;
pub mod dialect;
pub mod engine;
pub mod metamodel;
pub mod query;
pub mod session;
pub mod utils;
