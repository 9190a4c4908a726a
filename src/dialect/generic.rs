//! Lowest-common-denominator dialect.
//!
//! Assumes nothing beyond entry-level SQL: no row value constructor
//! syntax, plain `create table` id tables that stick around until dropped.

use crate::dialect::function::{standard_functions, FunctionRegistry};
use crate::dialect::Dialect;

pub struct GenericDialect {
    functions: FunctionRegistry,
}

impl GenericDialect {
    pub fn new() -> Self {
        Self {
            functions: standard_functions(),
        }
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
