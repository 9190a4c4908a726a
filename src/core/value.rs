//! Runtime parameter values.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::error::{EngineResult, QueryError};

/// A value bound to a query parameter. `Composite` carries the flattened
/// parts of a multi-column value (component identifiers, embedded values) in
/// mapping column order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Composite(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Composite(_) => "composite",
        }
    }

    /// Number of SQL columns the value occupies.
    pub fn span(&self) -> usize {
        match self {
            Value::Composite(parts) => parts.iter().map(Value::span).sum(),
            _ => 1,
        }
    }

    /// Appends the single-column parts of the value to `out` in column order.
    pub fn flatten_into(&self, out: &mut Vec<Value>) {
        match self {
            Value::Composite(parts) => {
                for part in parts {
                    part.flatten_into(out);
                }
            }
            other => out.push(other.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
            Value::Composite(parts) => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The values a caller supplies for one execution of a translated query.
#[derive(Debug, Clone, Default)]
pub struct QueryParameters {
    positional: Vec<Value>,
    named: HashMap<String, Value>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next positional value. Ordinals follow append order.
    pub fn push_positional(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    pub fn set_named(mut self, name: impl Into<String>, value: Value) -> Self {
        self.named.insert(name.into(), value);
        self
    }

    pub fn positional(&self, ordinal: usize) -> EngineResult<&Value> {
        self.positional.get(ordinal).ok_or_else(|| {
            QueryError::parameter(format!("no value supplied for positional parameter {}", ordinal + 1)).into()
        })
    }

    pub fn named(&self, name: &str) -> EngineResult<&Value> {
        self.named.get(name).ok_or_else(|| {
            QueryError::parameter(format!("no value supplied for named parameter :{}", name)).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_and_flatten() {
        let value = Value::Composite(vec![
            Value::Integer(1),
            Value::Composite(vec![Value::Text("a".into()), Value::Text("b".into())]),
        ]);
        assert_eq!(value.span(), 3);
        let mut flat = Vec::new();
        value.flatten_into(&mut flat);
        assert_eq!(
            flat,
            vec![
                Value::Integer(1),
                Value::Text("a".into()),
                Value::Text("b".into())
            ]
        );
    }

    #[test]
    fn test_missing_named_parameter() {
        let params = QueryParameters::new().set_named("dept", Value::Text("sales".into()));
        assert!(params.named("dept").is_ok());
        assert!(params.named("region").is_err());
    }

    #[test]
    fn test_positional_lookup() {
        let params = QueryParameters::new()
            .push_positional(Value::Integer(7))
            .push_positional(Value::Text("x".into()));
        assert_eq!(params.positional(0).ok(), Some(&Value::Integer(7)));
        assert!(params.positional(2).is_err());
    }
}
