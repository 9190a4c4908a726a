//! MySQL dialect.

use crate::dialect::function::{standard_functions, FunctionRegistry, SqlFunction};
use crate::dialect::Dialect;
use crate::metamodel::types::BasicType;

pub struct MySqlDialect {
    functions: FunctionRegistry,
}

impl MySqlDialect {
    pub fn new() -> Self {
        let mut functions = standard_functions();
        functions.register("rand", SqlFunction::new("rand", Some(BasicType::Double)));
        functions.register(
            "datediff",
            SqlFunction::new("datediff", Some(BasicType::Integer)),
        );
        Self { functions }
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn supports_row_value_constructor_syntax(&self) -> bool {
        true
    }

    fn create_id_table_command(&self) -> &'static str {
        "create temporary table if not exists"
    }

    fn drop_id_table_command(&self) -> &'static str {
        "drop temporary table"
    }

    fn column_type(&self, ty: BasicType) -> &'static str {
        match ty {
            BasicType::Boolean => "bit",
            BasicType::Timestamp => "datetime",
            other => crate::dialect::default_column_type(other),
        }
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
