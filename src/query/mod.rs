//! Query translation pipeline.
//!
//! Object-query strings pass through three stages: the recursive
//! descent parser builds an arena tree, semantic analysis resolves it
//! against the metamodel, and SQL generation renders text plus an
//! ordered parameter list. [`QueryTranslator`] drives the stages and
//! holds the finished plan.

pub mod analyze;
pub mod ast;
pub mod param;
pub mod parser;
pub mod sqlgen;
pub mod translator;

pub use param::{ParamKind, ParameterSpecification};
pub use parser::Parser;
pub use translator::QueryTranslator;
