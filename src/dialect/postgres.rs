//! PostgreSQL dialect.

use crate::dialect::function::{standard_functions, FunctionRegistry, SqlFunction};
use crate::dialect::Dialect;
use crate::metamodel::types::BasicType;

pub struct PostgresDialect {
    functions: FunctionRegistry,
}

impl PostgresDialect {
    pub fn new() -> Self {
        let mut functions = standard_functions();
        functions.register("random", SqlFunction::new("random", Some(BasicType::Double)));
        functions.register(
            "to_char",
            SqlFunction::new("to_char", Some(BasicType::String)),
        );
        Self { functions }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn supports_row_value_constructor_syntax(&self) -> bool {
        true
    }

    fn create_id_table_command(&self) -> &'static str {
        "create temporary table"
    }

    fn create_id_table_postfix(&self) -> &'static str {
        "on commit drop"
    }

    fn column_type(&self, ty: BasicType) -> &'static str {
        match ty {
            BasicType::Double => "float8",
            other => crate::dialect::default_column_type(other),
        }
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_table_syntax() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.create_id_table_command(), "create temporary table");
        assert_eq!(dialect.create_id_table_postfix(), "on commit drop");
        assert!(dialect.supports_row_value_constructor_syntax());
    }

    #[test]
    fn test_column_types() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.column_type(BasicType::Double), "float8");
        assert_eq!(dialect.column_type(BasicType::Long), "bigint");
    }
}
