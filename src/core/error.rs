//! Unified error handling for the translation engine.
//!
//! Layered design: each subsystem owns a focused error enum and the
//! top-level `EngineError` aggregates them through `#[from]` conversions.
//! Parse failures carry structured position information and are wrapped
//! into `QueryError::Parse` before they cross the query layer boundary.

use thiserror::Error;

use crate::query::parser::error::ParseError;

/// Top-level error type of the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("error executing [{sql}]: {message}: {source}")]
    Execution {
        message: String,
        sql: String,
        source: SessionError,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Unified result type.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    pub fn execution(sql: impl Into<String>, message: impl Into<String>, source: SessionError) -> Self {
        EngineError::Execution {
            message: message.into(),
            sql: sql.into(),
            source,
        }
    }
}

/// Query layer errors raised during parsing, semantic analysis and SQL
/// generation. Any of these aborts the translation before SQL is produced.
#[derive(Error, Debug, Clone)]
pub enum QueryError {
    #[error("parse error: {0}")]
    Parse(ParseError),

    #[error("{0}")]
    Semantic(String),

    #[error("{0}")]
    Translation(String),

    #[error("parameter error: {0}")]
    Parameter(String),
}

impl QueryError {
    pub fn semantic(msg: impl Into<String>) -> Self {
        QueryError::Semantic(msg.into())
    }

    pub fn translation(msg: impl Into<String>) -> Self {
        QueryError::Translation(msg.into())
    }

    pub fn parameter(msg: impl Into<String>) -> Self {
        QueryError::Parameter(msg.into())
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        QueryError::Parse(err)
    }
}

impl From<MappingError> for QueryError {
    fn from(err: MappingError) -> Self {
        QueryError::Semantic(err.to_string())
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::Query(QueryError::Parse(err))
    }
}

/// Metamodel lookup errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("{0} is not mapped")]
    UnknownEntity(String),

    #[error("could not resolve property: {property} of: {entity}")]
    UnknownProperty { entity: String, property: String },

    #[error("collection role is not mapped: {0}")]
    UnknownCollection(String),

    #[error("invalid mapping: {0}")]
    Invalid(String),
}

impl MappingError {
    pub fn unknown_entity(name: impl Into<String>) -> Self {
        MappingError::UnknownEntity(name.into())
    }

    pub fn unknown_property(entity: impl Into<String>, property: impl Into<String>) -> Self {
        MappingError::UnknownProperty {
            entity: entity.into(),
            property: property.into(),
        }
    }

    pub fn unknown_collection(role: impl Into<String>) -> Self {
        MappingError::UnknownCollection(role.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        MappingError::Invalid(msg.into())
    }
}

/// Errors surfaced by the session seam while executing SQL or DDL.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("sql error: {0}")]
    Sql(String),

    #[error("could not obtain connection: {0}")]
    ConnectionUnavailable(String),
}

impl SessionError {
    pub fn sql(msg: impl Into<String>) -> Self {
        SessionError::Sql(msg.into())
    }

    pub fn connection_unavailable(msg: impl Into<String>) -> Self {
        SessionError::ConnectionUnavailable(msg.into())
    }
}

/// Configuration load/save errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialize error: {0}")]
    Serialize(String),
}
