//! Parameter specifications collected during SQL generation
//!
//! Every `?` placeholder in the generated SQL is backed by exactly one
//! [`ParameterSpecification`], in placeholder order. Binding expands
//! composite values into their flattened column values, so the value
//! list lines up with the placeholders without further bookkeeping.

use uuid::Uuid;

use crate::core::{EngineError, EngineResult, QueryError, QueryParameters, Value};
use crate::metamodel::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Named(String),
    Positional(usize),
    /// Discriminator value inserted when shared id tables are in use.
    SessionUid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpecification {
    pub kind: ParamKind,
    pub expected_type: Option<Type>,
    /// When set, this placeholder stands for a single column of a
    /// composite value: bind only that component instead of the whole
    /// flattened value. Used by tuple comparisons expanded column by
    /// column.
    pub component_index: Option<usize>,
}

impl ParameterSpecification {
    pub fn named(name: impl Into<String>) -> Self {
        ParameterSpecification {
            kind: ParamKind::Named(name.into()),
            expected_type: None,
            component_index: None,
        }
    }

    pub fn positional(index: usize) -> Self {
        ParameterSpecification {
            kind: ParamKind::Positional(index),
            expected_type: None,
            component_index: None,
        }
    }

    pub fn session_uid() -> Self {
        ParameterSpecification {
            kind: ParamKind::SessionUid,
            expected_type: None,
            component_index: None,
        }
    }

    pub fn with_component_index(mut self, index: usize) -> Self {
        self.component_index = Some(index);
        self
    }

    /// Label used in error messages, matching the source spelling.
    pub fn display_name(&self) -> String {
        match &self.kind {
            ParamKind::Named(name) => format!(":{}", name),
            ParamKind::Positional(index) => format!("?{}", index + 1),
            ParamKind::SessionUid => "<session uid>".to_string(),
        }
    }

    /// Appends the bound value(s) for this placeholder to `out` and
    /// returns how many values were pushed.
    pub fn bind(
        &self,
        params: &QueryParameters,
        session_uid: Option<&Uuid>,
        out: &mut Vec<Value>,
    ) -> EngineResult<usize> {
        let value = match &self.kind {
            ParamKind::Named(name) => params.named(name)?.clone(),
            ParamKind::Positional(index) => params.positional(*index)?.clone(),
            ParamKind::SessionUid => {
                let uid = session_uid.ok_or_else(|| {
                    EngineError::internal("no session uid available for shared id table binding")
                })?;
                out.push(Value::Text(uid.to_string()));
                return Ok(1);
            }
        };

        match self.component_index {
            Some(index) => {
                let mut flattened = Vec::new();
                value.flatten_into(&mut flattened);
                let component = flattened.into_iter().nth(index).ok_or_else(|| {
                    QueryError::parameter(format!(
                        "value for parameter {} has too few columns for component {}",
                        self.display_name(),
                        index
                    ))
                })?;
                out.push(component);
                Ok(1)
            }
            None => {
                let before = out.len();
                value.flatten_into(out);
                Ok(out.len() - before)
            }
        }
    }
}

/// Binds an ordered specification list into one flat positional value
/// list, ready to hand to a session.
pub fn bind_all(
    specs: &[ParameterSpecification],
    params: &QueryParameters,
    session_uid: Option<&Uuid>,
) -> EngineResult<Vec<Value>> {
    let mut out = Vec::with_capacity(specs.len());
    for spec in specs {
        spec.bind(params, session_uid, &mut out)?;
    }
    Ok(out)
}
