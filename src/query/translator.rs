//! Statement translation front door.
//!
//! Couples the pipeline stages together: parse, semantic analysis, SQL
//! generation and, for multi-table mutations, bulk plan assembly. A
//! translator is immutable once built, so cached instances can be
//! shared between executions; only parameter binding happens per run.

use std::collections::BTreeSet;

use crate::bulk::{delete_handler, handler, update_handler, BulkPlan, BulkStatement, MultiTableBulkIdStrategy};
use crate::core::QueryError;
use crate::metamodel::{EntityPersister, Metamodel};
use crate::query::analyze::{analyze, AnalysisContext, AnalysisEnv, StatementKind};
use crate::query::ast::{Ast, NodeId, NodeKind};
use crate::query::param::ParameterSpecification;
use crate::query::parser::Parser;
use crate::query::sqlgen::{self, RenderedSql};

#[derive(Debug)]
pub struct QueryTranslator {
    hql: String,
    statement_kind: StatementKind,
    sql: String,
    parameters: Vec<ParameterSpecification>,
    pre_statements: Vec<BulkStatement>,
    context: AnalysisContext,
    bulk_plan: Option<BulkPlan>,
}

impl QueryTranslator {
    /// Translates one HQL statement. For SELECTs the result carries the
    /// final SQL; for mutations against a multi-table persister it
    /// carries the populate statement plus the bulk plan behind it.
    pub fn translate(
        env: &AnalysisEnv<'_>,
        strategy: &dyn MultiTableBulkIdStrategy,
        hql: &str,
    ) -> Result<QueryTranslator, QueryError> {
        log::debug!("translating: {}", hql);
        let mut ast = Parser::parse(hql)?;
        let ctx = analyze(env, &mut ast)?;
        let statement = ast.root();
        let statement_kind = ctx.statement_kind;

        let (sql, parameters, pre_statements, bulk_plan) = match statement_kind {
            StatementKind::Select => {
                let rendered = sqlgen::render_select(&ctx, &ast, statement)?;
                (rendered.sql, rendered.parameters, Vec::new(), None)
            }
            _ => mutation_statements(env, strategy, &ctx, &ast, statement)?,
        };

        Ok(QueryTranslator {
            hql: hql.to_string(),
            statement_kind,
            sql,
            parameters,
            pre_statements,
            context: ctx,
            bulk_plan,
        })
    }

    pub fn query_string(&self) -> &str {
        &self.hql
    }

    pub fn statement_kind(&self) -> StatementKind {
        self.statement_kind
    }

    /// The generated SQL: the SELECT itself, a single-table mutation, or
    /// the id-table populate statement of a bulk plan.
    pub fn sql_string(&self) -> &str {
        &self.sql
    }

    pub fn collected_parameters(&self) -> &[ParameterSpecification] {
        &self.parameters
    }

    /// Statements executed ahead of the main SQL. A delete against an
    /// entity owning many-to-many collections clears the join tables
    /// first, keyed by an inline id select repeating the restriction.
    pub fn pre_statements(&self) -> &[BulkStatement] {
        &self.pre_statements
    }

    pub fn analysis(&self) -> &AnalysisContext {
        &self.context
    }

    /// Tables this statement reads or writes, for cache invalidation.
    pub fn query_spaces(&self) -> &BTreeSet<String> {
        &self.context.query_spaces
    }

    pub fn bulk_plan(&self) -> Option<&BulkPlan> {
        self.bulk_plan.as_ref()
    }
}

type MutationSql = (
    String,
    Vec<ParameterSpecification>,
    Vec<BulkStatement>,
    Option<BulkPlan>,
);

fn mutation_statements(
    env: &AnalysisEnv<'_>,
    strategy: &dyn MultiTableBulkIdStrategy,
    ctx: &AnalysisContext,
    ast: &Ast,
    statement: NodeId,
) -> Result<MutationSql, QueryError> {
    let root = ctx.statement_root()?;
    let element = ctx.element(root);
    let persister = element
        .entity_persister()
        .cloned()
        .ok_or_else(|| QueryError::semantic("mutation target is not an entity"))?;
    let restriction = render_restriction(ctx, ast, statement)?;

    if persister.is_multi_table() {
        let id_table = strategy
            .id_table_info(&persister.entity_name)
            .ok_or_else(|| {
                QueryError::translation(format!(
                    "no id table prepared for entity {}",
                    persister.entity_name
                ))
            })?;
        let plan = match ctx.statement_kind {
            StatementKind::Update => update_handler::build_update_plan(
                &persister,
                id_table,
                &element.table_alias,
                restriction.as_ref(),
                &ctx.assignments,
                strategy.after_use_action(),
            ),
            _ => delete_handler::build_delete_plan(
                env.model,
                &persister,
                id_table,
                &element.table_alias,
                restriction.as_ref(),
                strategy.after_use_action(),
            ),
        };
        let sql = plan.populate.sql.clone();
        let parameters = plan.populate.parameters.clone();
        return Ok((sql, parameters, Vec::new(), Some(plan)));
    }

    let table = &persister.tables[0].name;
    let mut parameters = Vec::new();
    let mut pre_statements = Vec::new();
    let mut sql = match ctx.statement_kind {
        StatementKind::Update => {
            let fragments: Vec<&str> = ctx
                .assignments
                .iter()
                .map(|a| a.sql_fragment())
                .collect();
            for assignment in &ctx.assignments {
                parameters.extend(assignment.parameters().iter().cloned());
            }
            format!("update {} set {}", table, fragments.join(", "))
        }
        _ => {
            pre_statements = m2m_join_table_deletes(env.model, &persister, restriction.as_ref());
            format!("delete from {}", table)
        }
    };
    if let Some(restriction) = restriction {
        sql.push_str(" where ");
        sql.push_str(&restriction.sql);
        parameters.extend(restriction.parameters);
    }
    Ok((sql, parameters, pre_statements, None))
}

/// Single-table deletes have no id table, so join tables of owned
/// many-to-many collections are keyed by an inline select against the
/// entity table, restriction included.
fn m2m_join_table_deletes(
    model: &Metamodel,
    persister: &EntityPersister,
    restriction: Option<&RenderedSql>,
) -> Vec<BulkStatement> {
    let mut id_select = format!(
        "select {} from {}",
        persister.identifier_columns.join(", "),
        persister.tables[0].name
    );
    let mut parameters = Vec::new();
    if let Some(fragment) = restriction {
        id_select.push_str(" where ");
        id_select.push_str(&fragment.sql);
        parameters.extend(fragment.parameters.iter().cloned());
    }

    let mut statements = Vec::new();
    for role in &persister.collection_roles {
        if let Some(collection) = model.collection(role) {
            if collection.is_many_to_many() {
                statements.push(handler::keyed_mutation(
                    format!("delete from {}", collection.table),
                    &collection.key_columns,
                    &id_select,
                    parameters.clone(),
                ));
            }
        }
    }
    statements
}

fn render_restriction(
    ctx: &AnalysisContext,
    ast: &Ast,
    statement: NodeId,
) -> Result<Option<RenderedSql>, QueryError> {
    let clause = match ast.child_of_kind(statement, NodeKind::WhereClause) {
        Some(clause) => clause,
        None => return Ok(None),
    };
    let root = ast
        .first_child(clause)
        .ok_or_else(|| QueryError::translation("empty where clause"))?;
    let mut parameters = Vec::new();
    let sql = sqlgen::render_expression(ctx, ast, root, &mut parameters)?;
    Ok(Some(RenderedSql { sql, parameters }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::TempTableBulkIdStrategy;
    use crate::config::Config;
    use crate::dialect::GenericDialect;
    use crate::metamodel::{
        BasicType, CollectionBuilder, EntityBuilder, Metamodel, MetamodelBuilder,
    };
    use crate::query::param::ParamKind;
    use crate::session::UnavailableConnectionAccess;

    fn model() -> Metamodel {
        MetamodelBuilder::new()
            .entity(
                EntityBuilder::new("Customer", "CUSTOMER")
                    .id("id", BasicType::Long, "ID")
                    .property("name", BasicType::String, "NAME"),
            )
            .entity(
                EntityBuilder::new("Purchase", "PURCHASE")
                    .id("id", BasicType::Long, "ID")
                    .property("status", BasicType::String, "STATUS")
                    .many_to_one("customer", "Customer", &["CUST_ID"])
                    .collection("tags"),
            )
            .entity(
                EntityBuilder::new("Tag", "TAG")
                    .id("id", BasicType::Long, "ID")
                    .property("name", BasicType::String, "NAME"),
            )
            .entity(
                EntityBuilder::new("Employee", "EMPLOYEE")
                    .id("id", BasicType::Long, "ID")
                    .property("name", BasicType::String, "NAME")
                    .secondary_table("EMPLOYEE_COMP", &["EMP_ID"])
                    .property_in("EMPLOYEE_COMP", "salary", BasicType::Long, "SALARY"),
            )
            .collection(
                CollectionBuilder::new("Purchase", "tags")
                    .table("PURCHASE_TAGS")
                    .key(&["PURCHASE_ID"])
                    .many_to_many("Tag", &["TAG_ID"]),
            )
            .build()
            .expect("model should build")
    }

    struct Fixture {
        model: Metamodel,
        dialect: GenericDialect,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                model: model(),
                dialect: GenericDialect::new(),
            }
        }

        fn env(&self) -> AnalysisEnv<'_> {
            AnalysisEnv {
                model: &self.model,
                dialect: &self.dialect,
            }
        }

        fn strategy(&self) -> TempTableBulkIdStrategy {
            let mut strategy = TempTableBulkIdStrategy::new(Config::default().bulk);
            let mut access = UnavailableConnectionAccess;
            strategy.prepare(&self.model, &self.dialect, &mut access);
            strategy
        }
    }

    #[test]
    fn test_select_translates_to_final_sql() {
        let fixture = Fixture::new();
        let strategy = fixture.strategy();
        let translator = QueryTranslator::translate(
            &fixture.env(),
            &strategy,
            "select o.status from Purchase o where o.customer.name = :n",
        )
        .unwrap();

        assert_eq!(translator.statement_kind(), StatementKind::Select);
        assert_eq!(
            translator.sql_string(),
            "select p0_.STATUS as col_0_0_ from PURCHASE p0_ \
             inner join CUSTOMER c1_ on p0_.CUST_ID=c1_.ID where c1_.NAME=?"
        );
        assert_eq!(
            translator.collected_parameters()[0].kind,
            ParamKind::Named("n".to_string())
        );
        assert!(translator.bulk_plan().is_none());
        assert!(translator.query_spaces().contains("PURCHASE"));
        assert!(translator.query_spaces().contains("CUSTOMER"));
    }

    #[test]
    fn test_single_table_update_keeps_set_then_where_param_order() {
        let fixture = Fixture::new();
        let strategy = fixture.strategy();
        let translator = QueryTranslator::translate(
            &fixture.env(),
            &strategy,
            "update Customer set name = :fresh where name = :stale",
        )
        .unwrap();

        assert_eq!(translator.sql_string(), "update CUSTOMER set NAME=? where NAME=?");
        let kinds: Vec<&ParamKind> = translator
            .collected_parameters()
            .iter()
            .map(|p| &p.kind)
            .collect();
        assert_eq!(kinds[0], &ParamKind::Named("fresh".to_string()));
        assert_eq!(kinds[1], &ParamKind::Named("stale".to_string()));
        assert!(translator.bulk_plan().is_none());
    }

    #[test]
    fn test_single_table_delete_renders_bare_columns() {
        let fixture = Fixture::new();
        let strategy = fixture.strategy();
        let translator = QueryTranslator::translate(
            &fixture.env(),
            &strategy,
            "delete from Customer where name = 'gone'",
        )
        .unwrap();

        assert_eq!(
            translator.sql_string(),
            "delete from CUSTOMER where NAME='gone'"
        );
        assert!(translator.collected_parameters().is_empty());
        assert!(translator.pre_statements().is_empty());
    }

    #[test]
    fn test_single_table_delete_clears_m2m_join_tables_first() {
        let fixture = Fixture::new();
        let strategy = fixture.strategy();
        let translator = QueryTranslator::translate(
            &fixture.env(),
            &strategy,
            "delete from Purchase where status = :s",
        )
        .unwrap();

        assert_eq!(translator.sql_string(), "delete from PURCHASE where STATUS=?");
        let pre: Vec<&str> = translator
            .pre_statements()
            .iter()
            .map(|s| s.sql.as_str())
            .collect();
        assert_eq!(
            pre,
            vec![
                "delete from PURCHASE_TAGS where (PURCHASE_ID) in \
                 (select ID from PURCHASE where STATUS=?)"
            ]
        );
        assert_eq!(
            translator.pre_statements()[0].parameters[0].kind,
            ParamKind::Named("s".to_string())
        );
        assert!(translator.bulk_plan().is_none());
    }

    #[test]
    fn test_multi_table_update_builds_bulk_plan() {
        let fixture = Fixture::new();
        let strategy = fixture.strategy();
        let translator = QueryTranslator::translate(
            &fixture.env(),
            &strategy,
            "update Employee set salary = :s where name = :n",
        )
        .unwrap();

        assert_eq!(
            translator.sql_string(),
            "insert into HT_EMPLOYEE select e0_.ID from EMPLOYEE e0_ \
             inner join EMPLOYEE_COMP e0_1_ on e0_.ID=e0_1_.EMP_ID where NAME=?"
        );
        let plan = translator.bulk_plan().unwrap();
        assert_eq!(plan.mutations.len(), 1);
        assert_eq!(
            plan.mutations[0].sql,
            "update EMPLOYEE_COMP set SALARY=? where (EMP_ID) in (select ID from HT_EMPLOYEE)"
        );
        assert_eq!(
            plan.mutations[0].parameters[0].kind,
            ParamKind::Named("s".to_string())
        );
    }

    #[test]
    fn test_multi_table_delete_walks_closure_in_reverse() {
        let fixture = Fixture::new();
        let strategy = fixture.strategy();
        let translator = QueryTranslator::translate(
            &fixture.env(),
            &strategy,
            "delete from Employee where name = :n",
        )
        .unwrap();

        let plan = translator.bulk_plan().unwrap();
        let sql: Vec<&str> = plan.mutations.iter().map(|m| m.sql.as_str()).collect();
        assert_eq!(
            sql,
            vec![
                "delete from EMPLOYEE_COMP where (EMP_ID) in (select ID from HT_EMPLOYEE)",
                "delete from EMPLOYEE where (ID) in (select ID from HT_EMPLOYEE)",
            ]
        );
    }

    #[test]
    fn test_missing_id_table_is_reported() {
        let fixture = Fixture::new();
        let unprepared = TempTableBulkIdStrategy::new(Config::default().bulk);
        let err = QueryTranslator::translate(
            &fixture.env(),
            &unprepared,
            "delete from Employee",
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "no id table prepared for entity Employee"
        );
    }

    #[test]
    fn test_update_query_spaces_cover_the_closure() {
        let fixture = Fixture::new();
        let strategy = fixture.strategy();
        let translator = QueryTranslator::translate(
            &fixture.env(),
            &strategy,
            "update Employee set salary = 0",
        )
        .unwrap();

        assert!(translator.query_spaces().contains("EMPLOYEE"));
        assert!(translator.query_spaces().contains("EMPLOYEE_COMP"));
    }
}
