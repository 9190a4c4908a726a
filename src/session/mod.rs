//! Execution seam between translation and a database.
//!
//! The engine hands finished SQL and flattened positional values to a
//! [`SqlSession`]; it never sees statement handles or result sets.
//! [`ScriptCollectingSession`] records everything it is asked to run and
//! answers with scripted row counts. Integration tests inspect the
//! generated SQL through it, and the recorded log doubles as a script
//! export.

use std::collections::VecDeque;

use uuid::Uuid;

use crate::core::error::SessionError;
use crate::core::value::Value;

pub trait SqlSession {
    /// Stable identifier of this session, bound into the session-uid
    /// discriminator column of shared id tables.
    fn session_uid(&self) -> Uuid;

    /// Executes one DML statement with positional values, returning the
    /// affected row count.
    fn execute_update(&mut self, sql: &str, values: &[Value]) -> Result<usize, SessionError>;

    fn execute_ddl(&mut self, sql: &str) -> Result<(), SessionError>;
}

/// Bootstrap-time connection access for id table DDL. Kept separate from
/// [`SqlSession`] because factory build and shutdown run outside any
/// user session.
pub trait ConnectionAccess {
    fn connection(&mut self) -> Result<&mut dyn SqlSession, SessionError>;
}

/// One statement as the session received it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub sql: String,
    pub values: Vec<Value>,
    pub ddl: bool,
}

/// In-memory [`SqlSession`] recording executed statements. Update counts
/// are served from a scripted queue, then fall back to zero.
pub struct ScriptCollectingSession {
    uid: Uuid,
    statements: Vec<ExecutedStatement>,
    counts: VecDeque<usize>,
    fail_on: Option<String>,
}

impl ScriptCollectingSession {
    pub fn new() -> Self {
        ScriptCollectingSession {
            uid: Uuid::new_v4(),
            statements: Vec::new(),
            counts: VecDeque::new(),
            fail_on: None,
        }
    }

    /// Queues the row counts returned by subsequent `execute_update`
    /// calls, in order.
    pub fn with_counts(counts: &[usize]) -> Self {
        let mut session = Self::new();
        session.counts.extend(counts.iter().copied());
        session
    }

    pub fn push_count(&mut self, count: usize) {
        self.counts.push_back(count);
    }

    /// Makes any statement containing `pattern` fail with a SQL error.
    pub fn fail_on(mut self, pattern: impl Into<String>) -> Self {
        self.fail_on = Some(pattern.into());
        self
    }

    pub fn statements(&self) -> &[ExecutedStatement] {
        &self.statements
    }

    /// Recorded SQL texts in execution order, DDL included.
    pub fn sql_log(&self) -> Vec<&str> {
        self.statements.iter().map(|s| s.sql.as_str()).collect()
    }

    fn check_failure(&self, sql: &str) -> Result<(), SessionError> {
        if let Some(pattern) = &self.fail_on {
            if sql.contains(pattern.as_str()) {
                return Err(SessionError::sql(format!(
                    "scripted failure for [{}]",
                    pattern
                )));
            }
        }
        Ok(())
    }
}

impl Default for ScriptCollectingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlSession for ScriptCollectingSession {
    fn session_uid(&self) -> Uuid {
        self.uid
    }

    fn execute_update(&mut self, sql: &str, values: &[Value]) -> Result<usize, SessionError> {
        self.check_failure(sql)?;
        self.statements.push(ExecutedStatement {
            sql: sql.to_string(),
            values: values.to_vec(),
            ddl: false,
        });
        Ok(self.counts.pop_front().unwrap_or(0))
    }

    fn execute_ddl(&mut self, sql: &str) -> Result<(), SessionError> {
        self.check_failure(sql)?;
        self.statements.push(ExecutedStatement {
            sql: sql.to_string(),
            values: Vec::new(),
            ddl: true,
        });
        Ok(())
    }
}

impl ConnectionAccess for ScriptCollectingSession {
    fn connection(&mut self) -> Result<&mut dyn SqlSession, SessionError> {
        Ok(self)
    }
}

/// [`ConnectionAccess`] that never yields a connection. Exercises the
/// tolerant bootstrap paths.
pub struct UnavailableConnectionAccess;

impl ConnectionAccess for UnavailableConnectionAccess {
    fn connection(&mut self) -> Result<&mut dyn SqlSession, SessionError> {
        Err(SessionError::connection_unavailable(
            "no connection configured",
        ))
    }
}
