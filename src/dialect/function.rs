//! SQL function registry.

use std::collections::HashMap;

use crate::metamodel::types::BasicType;

/// One registered SQL function. `return_type` of `None` means the call
/// takes the type of its first argument.
#[derive(Debug, Clone)]
pub struct SqlFunction {
    pub name: String,
    pub return_type: Option<BasicType>,
}

impl SqlFunction {
    pub fn new(name: impl Into<String>, return_type: Option<BasicType>) -> Self {
        Self {
            name: name.into(),
            return_type,
        }
    }
}

/// Dialect function registry. Lookups are case-insensitive; registration
/// keys are stored lower-cased.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, SqlFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hql_name: &str, function: SqlFunction) {
        self.functions.insert(hql_name.to_lowercase(), function);
    }

    pub fn find(&self, name: &str) -> Option<&SqlFunction> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn has(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

/// Functions every dialect understands.
pub fn standard_functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.register("count", SqlFunction::new("count", Some(BasicType::Long)));
    registry.register("avg", SqlFunction::new("avg", Some(BasicType::Double)));
    registry.register("sum", SqlFunction::new("sum", None));
    registry.register("max", SqlFunction::new("max", None));
    registry.register("min", SqlFunction::new("min", None));
    registry.register("abs", SqlFunction::new("abs", None));
    registry.register("sqrt", SqlFunction::new("sqrt", Some(BasicType::Double)));
    registry.register("mod", SqlFunction::new("mod", Some(BasicType::Integer)));
    registry.register("upper", SqlFunction::new("upper", Some(BasicType::String)));
    registry.register("lower", SqlFunction::new("lower", Some(BasicType::String)));
    registry.register("length", SqlFunction::new("length", Some(BasicType::Integer)));
    registry.register("trim", SqlFunction::new("trim", Some(BasicType::String)));
    registry.register("concat", SqlFunction::new("concat", Some(BasicType::String)));
    registry.register("substring", SqlFunction::new("substring", Some(BasicType::String)));
    registry.register("coalesce", SqlFunction::new("coalesce", None));
    registry.register(
        "current_date",
        SqlFunction::new("current_date", Some(BasicType::Date)),
    );
    registry.register(
        "current_timestamp",
        SqlFunction::new("current_timestamp", Some(BasicType::Timestamp)),
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let registry = standard_functions();
        assert!(registry.has("UPPER"));
        assert!(registry.has("upper"));
        assert_eq!(registry.find("Lower").map(|f| f.name.as_str()), Some("lower"));
    }

    #[test]
    fn test_return_types() {
        let registry = standard_functions();
        assert_eq!(
            registry.find("count").and_then(|f| f.return_type),
            Some(BasicType::Long)
        );
        // max takes the type of its argument
        assert_eq!(registry.find("max").and_then(|f| f.return_type), None);
    }
}
