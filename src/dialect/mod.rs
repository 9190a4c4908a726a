//! SQL dialect abstraction.
//!
//! A `Dialect` carries the per-database knobs translation depends on: row
//! value constructor support, id table DDL syntax, column type names and the
//! SQL function registry. Execution errors pass through
//! `convert_exec_error` so a dialect can enrich them before they surface.

pub mod function;
pub mod generic;
pub mod mysql;
pub mod postgres;

pub use function::{standard_functions, FunctionRegistry, SqlFunction};
pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;

use crate::core::error::{EngineError, SessionError};
use crate::metamodel::types::BasicType;

pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the database accepts `(a, b) = (c, d)` comparisons natively.
    /// When it does not, multi-column comparisons are rewritten into
    /// conjunctions of per-column comparisons.
    fn supports_row_value_constructor_syntax(&self) -> bool {
        false
    }

    /// Name of the id table mirroring `base` during bulk mutations.
    fn generate_id_table_name(&self, base: &str) -> String {
        format!("HT_{}", base)
    }

    fn create_id_table_command(&self) -> &'static str {
        "create table"
    }

    /// Appended verbatim after the column list of an id table CREATE.
    fn create_id_table_postfix(&self) -> &'static str {
        ""
    }

    fn drop_id_table_command(&self) -> &'static str {
        "drop table"
    }

    /// Appended after a nullable column's type in generated DDL. Most
    /// databases leave nullability implicit; some want an explicit `null`.
    fn null_column_string(&self) -> &'static str {
        ""
    }

    fn column_type(&self, ty: BasicType) -> &'static str {
        default_column_type(ty)
    }

    fn functions(&self) -> &FunctionRegistry;

    /// Wraps a session failure into the engine error reported to callers.
    fn convert_exec_error(&self, source: SessionError, sql: &str, message: &str) -> EngineError {
        EngineError::execution(sql, message, source)
    }
}

/// Column type names used when a dialect does not override them.
pub(crate) fn default_column_type(ty: BasicType) -> &'static str {
    match ty {
        BasicType::Boolean => "boolean",
        BasicType::Integer => "integer",
        BasicType::Long => "bigint",
        BasicType::Double => "double precision",
        BasicType::String => "varchar(255)",
        BasicType::Date => "date",
        BasicType::Timestamp => "timestamp",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_id_table_hooks() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.generate_id_table_name("EMPLOYEE"), "HT_EMPLOYEE");
        assert_eq!(dialect.create_id_table_command(), "create table");
        assert_eq!(dialect.drop_id_table_command(), "drop table");
        assert!(!dialect.supports_row_value_constructor_syntax());
    }

    #[test]
    fn test_exec_error_conversion() {
        let dialect = GenericDialect::new();
        let err = dialect.convert_exec_error(
            SessionError::sql("deadlock"),
            "delete from T",
            "could not execute bulk delete",
        );
        assert!(matches!(err, EngineError::Execution { .. }));
    }
}
