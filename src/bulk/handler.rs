//! Shared machinery of the table-based bulk handlers.
//!
//! A translated multi-table mutation becomes a [`BulkPlan`]: the
//! populate INSERT-SELECT filling the id table from the restricted
//! query, the per-table mutation statements keyed on the id subselect,
//! and the after-use cleanup. Populate runs first and its row count is
//! the authoritative result of the whole operation.

use uuid::Uuid;

use crate::bulk::id_table::IdTableInfo;
use crate::bulk::AfterUseAction;
use crate::core::{EngineResult, QueryParameters, Value};
use crate::dialect::Dialect;
use crate::metamodel::EntityPersister;
use crate::query::analyze::StatementKind;
use crate::query::param::{self, ParameterSpecification};
use crate::query::sqlgen::RenderedSql;
use crate::session::SqlSession;

/// One SQL statement of a bulk plan with its placeholders in order.
#[derive(Debug, Clone)]
pub struct BulkStatement {
    pub sql: String,
    pub parameters: Vec<ParameterSpecification>,
}

/// The fully assembled statement sequence for one multi-table mutation.
/// Built during translation, immutable afterwards.
#[derive(Debug, Clone)]
pub struct BulkPlan {
    pub statement_kind: StatementKind,
    pub populate: BulkStatement,
    pub mutations: Vec<BulkStatement>,
    pub after_use: AfterUseAction,
    pub id_table: IdTableInfo,
}

/// `insert into <id table> select <id cols> from <root closure> where
/// <restriction>`. Shared tables select the session uid alongside the
/// identifier so cleanup can tell executions apart.
pub(crate) fn build_populate(
    persister: &EntityPersister,
    id_table: &IdTableInfo,
    root_alias: &str,
    restriction: Option<&RenderedSql>,
) -> BulkStatement {
    let id_columns: Vec<String> = persister
        .identifier_columns
        .iter()
        .map(|c| format!("{}.{}", root_alias, c))
        .collect();

    let mut sql = format!("insert into {} select {}", id_table.name, id_columns.join(", "));
    let mut parameters = Vec::new();
    if id_table.session_uid_column.is_some() {
        sql.push_str(", ?");
        parameters.push(ParameterSpecification::session_uid());
    }
    sql.push_str(" from ");
    sql.push_str(&persister.from_table_fragment(root_alias));
    sql.push_str(&persister.from_join_fragment(root_alias));
    if let Some(fragment) = restriction {
        sql.push_str(" where ");
        sql.push_str(&fragment.sql);
        parameters.extend(fragment.parameters.iter().cloned());
    }
    BulkStatement { sql, parameters }
}

pub(crate) fn keyed_mutation(
    prefix: String,
    key_columns: &[String],
    id_subselect: &str,
    parameters: Vec<ParameterSpecification>,
) -> BulkStatement {
    BulkStatement {
        sql: format!(
            "{} where ({}) in ({})",
            prefix,
            key_columns.join(", "),
            id_subselect
        ),
        parameters,
    }
}

impl BulkPlan {
    fn label(&self) -> &'static str {
        match self.statement_kind {
            StatementKind::Update => "update",
            _ => "delete",
        }
    }

    /// Runs the plan on `session`: populate, mutations in order, then the
    /// after-use hook. Returns the populate row count.
    pub fn execute(
        &self,
        session: &mut dyn SqlSession,
        params: &QueryParameters,
        dialect: &dyn Dialect,
    ) -> EngineResult<usize> {
        let uid = session.session_uid();

        let values = param::bind_all(&self.populate.parameters, params, Some(&uid))?;
        let count = session
            .execute_update(&self.populate.sql, &values)
            .map_err(|e| {
                dialect.convert_exec_error(
                    e,
                    &self.populate.sql,
                    &format!("could not insert/select ids for bulk {}", self.label()),
                )
            })?;
        log::debug!("bulk {} matched {} row(s)", self.label(), count);

        for statement in &self.mutations {
            let values = param::bind_all(&statement.parameters, params, Some(&uid))?;
            session.execute_update(&statement.sql, &values).map_err(|e| {
                dialect.convert_exec_error(
                    e,
                    &statement.sql,
                    &format!("could not execute bulk {}", self.label()),
                )
            })?;
        }

        self.cleanup(session, dialect, &uid);
        Ok(count)
    }

    /// After-use hook. Failures are logged and swallowed; the mutation
    /// already succeeded and stale id rows only waste space.
    fn cleanup(&self, session: &mut dyn SqlSession, dialect: &dyn Dialect, uid: &Uuid) {
        match self.after_use {
            AfterUseAction::None => {}
            AfterUseAction::Clean => {
                let sql = self.id_table.clean_sql();
                let values = if self.id_table.session_uid_column.is_some() {
                    vec![Value::Text(uid.to_string())]
                } else {
                    Vec::new()
                };
                if let Err(e) = session.execute_update(&sql, &values) {
                    log::warn!("unable to clean up id table [{}]: {}", self.id_table.name, e);
                }
            }
            AfterUseAction::Drop => {
                let sql = self.id_table.drop_ddl(dialect);
                if let Err(e) = session.execute_ddl(&sql) {
                    log::warn!("unable to drop id table [{}]: {}", self.id_table.name, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::metamodel::{BasicType, EntityBuilder, MetamodelBuilder};
    use crate::query::param::ParamKind;
    use crate::session::ScriptCollectingSession;
    use std::sync::Arc;

    fn employee() -> Arc<EntityPersister> {
        let model = MetamodelBuilder::new()
            .entity(
                EntityBuilder::new("Employee", "EMPLOYEE")
                    .id("id", BasicType::Long, "ID")
                    .property("department", BasicType::String, "DEPARTMENT")
                    .secondary_table("EMPLOYEE_COMP", &["EMP_ID"])
                    .property_in("EMPLOYEE_COMP", "salary", BasicType::Long, "SALARY"),
            )
            .build()
            .expect("model should build");
        model.require_entity("Employee").expect("employee persister")
    }

    fn restriction() -> RenderedSql {
        RenderedSql {
            sql: "DEPARTMENT=?".to_string(),
            parameters: vec![ParameterSpecification::named("dept")],
        }
    }

    #[test]
    fn test_populate_joins_closure_and_keeps_restriction() {
        let persister = employee();
        let dialect = GenericDialect::new();
        let info = IdTableInfo::synthesize(&persister, &dialect, None);
        let restriction = restriction();

        let populate = build_populate(&persister, &info, "e0_", Some(&restriction));
        assert_eq!(
            populate.sql,
            "insert into HT_EMPLOYEE select e0_.ID from EMPLOYEE e0_ \
             inner join EMPLOYEE_COMP e0_1_ on e0_.ID=e0_1_.EMP_ID where DEPARTMENT=?"
        );
        assert_eq!(
            populate.parameters[0].kind,
            ParamKind::Named("dept".to_string())
        );
    }

    #[test]
    fn test_populate_shared_table_selects_session_uid_first() {
        let persister = employee();
        let dialect = GenericDialect::new();
        let info = IdTableInfo::synthesize(&persister, &dialect, Some("sess_uid"));
        let restriction = restriction();

        let populate = build_populate(&persister, &info, "e0_", Some(&restriction));
        assert_eq!(
            populate.sql,
            "insert into HT_EMPLOYEE select e0_.ID, ? from EMPLOYEE e0_ \
             inner join EMPLOYEE_COMP e0_1_ on e0_.ID=e0_1_.EMP_ID where DEPARTMENT=?"
        );
        assert_eq!(populate.parameters[0].kind, ParamKind::SessionUid);
        assert_eq!(
            populate.parameters[1].kind,
            ParamKind::Named("dept".to_string())
        );
    }

    #[test]
    fn test_execute_reports_populate_count_and_cleans_up() {
        let persister = employee();
        let dialect = GenericDialect::new();
        let info = IdTableInfo::synthesize(&persister, &dialect, None);
        let plan = BulkPlan {
            statement_kind: StatementKind::Update,
            populate: build_populate(&persister, &info, "e0_", None),
            mutations: vec![keyed_mutation(
                "update EMPLOYEE_COMP set SALARY=SALARY+1".to_string(),
                &["EMP_ID".to_string()],
                &info.id_subselect(),
                Vec::new(),
            )],
            after_use: AfterUseAction::Clean,
            id_table: info,
        };

        let mut session = ScriptCollectingSession::with_counts(&[4, 2]);
        let params = QueryParameters::new();
        let count = plan.execute(&mut session, &params, &dialect).unwrap();

        assert_eq!(count, 4);
        let log = session.sql_log();
        assert_eq!(log.len(), 3);
        assert!(log[0].starts_with("insert into HT_EMPLOYEE"));
        assert_eq!(
            log[1],
            "update EMPLOYEE_COMP set SALARY=SALARY+1 \
             where (EMP_ID) in (select ID from HT_EMPLOYEE)"
        );
        assert_eq!(log[2], "delete from HT_EMPLOYEE");
    }

    #[test]
    fn test_execute_drop_after_use() {
        let persister = employee();
        let dialect = GenericDialect::new();
        let info = IdTableInfo::synthesize(&persister, &dialect, None);
        let plan = BulkPlan {
            statement_kind: StatementKind::Delete,
            populate: build_populate(&persister, &info, "e0_", None),
            mutations: Vec::new(),
            after_use: AfterUseAction::Drop,
            id_table: info,
        };

        let mut session = ScriptCollectingSession::new();
        let params = QueryParameters::new();
        plan.execute(&mut session, &params, &dialect).unwrap();

        let last = session.statements().last().unwrap();
        assert!(last.ddl);
        assert_eq!(last.sql, "drop table HT_EMPLOYEE");
    }

    #[test]
    fn test_execute_converts_mutation_failure() {
        let persister = employee();
        let dialect = GenericDialect::new();
        let info = IdTableInfo::synthesize(&persister, &dialect, None);
        let plan = BulkPlan {
            statement_kind: StatementKind::Delete,
            populate: build_populate(&persister, &info, "e0_", None),
            mutations: vec![keyed_mutation(
                "delete from EMPLOYEE".to_string(),
                &["ID".to_string()],
                &info.id_subselect(),
                Vec::new(),
            )],
            after_use: AfterUseAction::None,
            id_table: info,
        };

        let mut session = ScriptCollectingSession::new().fail_on("delete from EMPLOYEE");
        let params = QueryParameters::new();
        let err = plan.execute(&mut session, &params, &dialect).unwrap_err();
        assert!(err.to_string().contains("could not execute bulk delete"));
    }
}
