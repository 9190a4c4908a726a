//! Engine facade.
//!
//! Owns the metamodel, dialect, id-table strategy and the translated-plan
//! cache. Translation itself is pure; the engine layers caching and
//! statement execution on top of [`QueryTranslator`].

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::bulk::{MultiTableBulkIdStrategy, TempTableBulkIdStrategy};
use crate::config::Config;
use crate::core::{EngineResult, QueryError, QueryParameters};
use crate::dialect::Dialect;
use crate::metamodel::Metamodel;
use crate::query::analyze::{AnalysisEnv, StatementKind};
use crate::query::param;
use crate::query::QueryTranslator;
use crate::session::{ConnectionAccess, SqlSession};

pub struct Engine {
    model: Metamodel,
    dialect: Box<dyn Dialect>,
    strategy: TempTableBulkIdStrategy,
    config: Config,
    plan_cache: Mutex<LruCache<String, Arc<QueryTranslator>>>,
}

impl Engine {
    /// Builds the engine: provisions id tables for every multi-table
    /// persister and sizes the plan cache from the configuration.
    pub fn build(
        model: Metamodel,
        dialect: Box<dyn Dialect>,
        config: Config,
        access: &mut dyn ConnectionAccess,
    ) -> Engine {
        let mut strategy = TempTableBulkIdStrategy::new(config.bulk.clone());
        strategy.prepare(&model, dialect.as_ref(), access);
        let capacity =
            NonZeroUsize::new(config.query.plan_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        log::info!("translation engine ready, dialect [{}]", dialect.name());
        Engine {
            model,
            dialect,
            strategy,
            config,
            plan_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn env(&self) -> AnalysisEnv<'_> {
        AnalysisEnv {
            model: &self.model,
            dialect: self.dialect.as_ref(),
        }
    }

    /// Returns the translation of `hql`, reusing a cached plan when the
    /// same query text was translated before.
    pub fn translate(&self, hql: &str) -> EngineResult<Arc<QueryTranslator>> {
        if let Some(plan) = self.plan_cache.lock().get(hql) {
            log::trace!("plan cache hit: {}", hql);
            return Ok(Arc::clone(plan));
        }
        let translator = QueryTranslator::translate(&self.env(), &self.strategy, hql)?;
        let plan = Arc::new(translator);
        self.plan_cache
            .lock()
            .put(hql.to_string(), Arc::clone(&plan));
        Ok(plan)
    }

    /// Executes an HQL UPDATE or DELETE on `session` and returns the
    /// affected row count. For bulk plans this is the number of matched
    /// identifiers, counted when the id table is populated.
    pub fn execute_update(
        &self,
        session: &mut dyn SqlSession,
        hql: &str,
        params: &QueryParameters,
    ) -> EngineResult<usize> {
        let translator = self.translate(hql)?;
        if translator.statement_kind() == StatementKind::Select {
            return Err(QueryError::semantic("not an update or delete statement").into());
        }
        if let Some(plan) = translator.bulk_plan() {
            return plan.execute(session, params, self.dialect.as_ref());
        }
        let uid = session.session_uid();
        for statement in translator.pre_statements() {
            let values = param::bind_all(&statement.parameters, params, Some(&uid))?;
            session.execute_update(&statement.sql, &values).map_err(|e| {
                self.dialect.convert_exec_error(
                    e,
                    &statement.sql,
                    "could not execute update statement",
                )
            })?;
        }
        let values = param::bind_all(translator.collected_parameters(), params, Some(&uid))?;
        session
            .execute_update(translator.sql_string(), &values)
            .map_err(|e| {
                self.dialect.convert_exec_error(
                    e,
                    translator.sql_string(),
                    "could not execute update statement",
                )
            })
    }

    /// Releases the id tables and drops all cached plans.
    pub fn shutdown(&mut self, access: &mut dyn ConnectionAccess) {
        self.strategy.release(self.dialect.as_ref(), access);
        self.plan_cache.lock().clear();
        log::info!("translation engine shut down");
    }

    pub fn model(&self) -> &Metamodel {
        &self.model
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::dialect::GenericDialect;
    use crate::metamodel::{BasicType, EntityBuilder, MetamodelBuilder};
    use crate::session::{ScriptCollectingSession, UnavailableConnectionAccess};

    fn engine() -> Engine {
        let model = MetamodelBuilder::new()
            .entity(
                EntityBuilder::new("Customer", "CUSTOMER")
                    .id("id", BasicType::Long, "ID")
                    .property("name", BasicType::String, "NAME"),
            )
            .entity(
                EntityBuilder::new("Employee", "EMPLOYEE")
                    .id("id", BasicType::Long, "ID")
                    .property("department", BasicType::String, "DEPARTMENT")
                    .secondary_table("EMPLOYEE_COMP", &["EMP_ID"])
                    .property_in("EMPLOYEE_COMP", "salary", BasicType::Long, "SALARY"),
            )
            .build()
            .expect("model should build");
        Engine::build(
            model,
            Box::new(GenericDialect::new()),
            Config::default(),
            &mut UnavailableConnectionAccess,
        )
    }

    #[test]
    fn test_translate_reuses_cached_plan() {
        let engine = engine();
        let hql = "select c.name from Customer c";
        let first = engine.translate(hql).unwrap();
        let second = engine.translate(hql).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_execute_single_table_update_binds_values() {
        let engine = engine();
        let mut session = ScriptCollectingSession::with_counts(&[3]);
        let params = QueryParameters::new().set_named("n", Value::Text("kiki".to_string()));

        let count = engine
            .execute_update(&mut session, "update Customer set name = :n", &params)
            .unwrap();

        assert_eq!(count, 3);
        let statement = &session.statements()[0];
        assert_eq!(statement.sql, "update CUSTOMER set NAME=?");
        assert_eq!(statement.values, vec![Value::Text("kiki".to_string())]);
    }

    #[test]
    fn test_execute_bulk_update_runs_whole_plan() {
        let engine = engine();
        let mut session = ScriptCollectingSession::with_counts(&[5, 5]);
        let params = QueryParameters::new().set_named("d", Value::Text("ops".to_string()));

        let count = engine
            .execute_update(
                &mut session,
                "update Employee set salary = 0 where department = :d",
                &params,
            )
            .unwrap();

        assert_eq!(count, 5);
        let log = session.sql_log();
        assert!(log[0].starts_with("insert into HT_EMPLOYEE"));
        assert!(log[1].starts_with("update EMPLOYEE_COMP"));
        assert_eq!(log[2], "delete from HT_EMPLOYEE");
    }

    #[test]
    fn test_execute_rejects_select_statements() {
        let engine = engine();
        let mut session = ScriptCollectingSession::new();
        let err = engine
            .execute_update(
                &mut session,
                "select c.name from Customer c",
                &QueryParameters::new(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("not an update or delete statement"));
    }

    #[test]
    fn test_shutdown_clears_cached_plans() {
        let mut engine = engine();
        let hql = "select c.name from Customer c";
        let first = engine.translate(hql).unwrap();
        engine.shutdown(&mut UnavailableConnectionAccess);
        let second = engine.translate(hql).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
