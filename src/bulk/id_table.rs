//! Id table synthesis.
//!
//! Every multi-table persister gets one id table mirroring its
//! identifier columns. Shared (cross-session) tables carry an extra
//! session-uid discriminator column; populate, subselect and cleanup
//! all filter on it so concurrent executions stay isolated.

use crate::dialect::Dialect;
use crate::metamodel::{BasicType, EntityPersister};

#[derive(Debug, Clone)]
pub struct IdTableColumn {
    pub name: String,
    pub ty: BasicType,
}

/// Physical description of the id table backing bulk mutations of one
/// entity.
#[derive(Debug, Clone)]
pub struct IdTableInfo {
    pub entity_name: String,
    pub name: String,
    /// Mirrors the target entity's identifier columns, in order.
    pub columns: Vec<IdTableColumn>,
    pub session_uid_column: Option<String>,
}

impl IdTableInfo {
    pub fn synthesize(
        persister: &EntityPersister,
        dialect: &dyn Dialect,
        session_uid_column: Option<&str>,
    ) -> IdTableInfo {
        let columns = persister
            .identifier_columns
            .iter()
            .cloned()
            .zip(persister.identifier_basic_types())
            .map(|(name, ty)| IdTableColumn { name, ty })
            .collect();
        IdTableInfo {
            entity_name: persister.entity_name.clone(),
            name: dialect.generate_id_table_name(persister.id_table_base()),
            columns,
            session_uid_column: session_uid_column.map(|c| c.to_string()),
        }
    }

    pub fn create_ddl(&self, dialect: &dyn Dialect) -> String {
        let mut columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {} not null", c.name, dialect.column_type(c.ty)))
            .collect();
        if let Some(uid) = &self.session_uid_column {
            // Only the engine writes the uid; nullability follows the dialect.
            columns.push(format!("{} char(36){}", uid, dialect.null_column_string()));
        }
        let mut ddl = format!(
            "{} {} ({})",
            dialect.create_id_table_command(),
            self.name,
            columns.join(", ")
        );
        let postfix = dialect.create_id_table_postfix();
        if !postfix.is_empty() {
            ddl.push(' ');
            ddl.push_str(postfix);
        }
        ddl
    }

    pub fn drop_ddl(&self, dialect: &dyn Dialect) -> String {
        format!("{} {}", dialect.drop_id_table_command(), self.name)
    }

    /// `select <id cols> from <id table>`, filtered to this session's
    /// rows when the table is shared. Embedded in mutation statements.
    pub fn id_subselect(&self) -> String {
        let columns: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        match &self.session_uid_column {
            Some(uid) => format!(
                "select {} from {} where {}=?",
                columns.join(", "),
                self.name,
                uid
            ),
            None => format!("select {} from {}", columns.join(", "), self.name),
        }
    }

    /// Statement removing this execution's rows after use.
    pub fn clean_sql(&self) -> String {
        match &self.session_uid_column {
            Some(uid) => format!("delete from {} where {}=?", self.name, uid),
            None => format!("delete from {}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::metamodel::{BasicType, ComponentBuilder, EntityBuilder, MetamodelBuilder};

    fn persister_for(builder: EntityBuilder) -> std::sync::Arc<EntityPersister> {
        let model = MetamodelBuilder::new()
            .entity(builder)
            .build()
            .expect("model should build");
        let persister = model.entities().next().cloned().expect("one entity");
        persister
    }

    #[test]
    fn test_synthesize_local_table() {
        let persister = persister_for(
            EntityBuilder::new("Employee", "EMPLOYEE")
                .id("id", BasicType::Long, "ID")
                .secondary_table("EMPLOYEE_COMP", &["EMP_ID"])
                .property_in("EMPLOYEE_COMP", "salary", BasicType::Long, "SALARY"),
        );
        let dialect = GenericDialect::new();
        let info = IdTableInfo::synthesize(&persister, &dialect, None);

        assert_eq!(info.name, "HT_EMPLOYEE");
        assert_eq!(info.create_ddl(&dialect), "create table HT_EMPLOYEE (ID bigint not null)");
        assert_eq!(info.drop_ddl(&dialect), "drop table HT_EMPLOYEE");
        assert_eq!(info.id_subselect(), "select ID from HT_EMPLOYEE");
        assert_eq!(info.clean_sql(), "delete from HT_EMPLOYEE");
    }

    #[test]
    fn test_synthesize_shared_table_adds_uid_column() {
        let persister = persister_for(
            EntityBuilder::new("Employee", "EMPLOYEE")
                .id("id", BasicType::Long, "ID")
                .secondary_table("EMPLOYEE_COMP", &["EMP_ID"])
                .property_in("EMPLOYEE_COMP", "salary", BasicType::Long, "SALARY"),
        );
        let dialect = GenericDialect::new();
        let info = IdTableInfo::synthesize(&persister, &dialect, Some("sess_uid"));

        assert_eq!(
            info.create_ddl(&dialect),
            "create table HT_EMPLOYEE (ID bigint not null, sess_uid char(36))"
        );
        assert_eq!(
            info.id_subselect(),
            "select ID from HT_EMPLOYEE where sess_uid=?"
        );
        assert_eq!(info.clean_sql(), "delete from HT_EMPLOYEE where sess_uid=?");
    }

    #[test]
    fn test_synthesize_composite_identifier() {
        let persister = persister_for(
            EntityBuilder::new("Shipment", "SHIPMENT")
                .composite_id(
                    "key",
                    ComponentBuilder::new("key")
                        .field("region", BasicType::String, "REGION")
                        .field("seq", BasicType::Long, "SEQ"),
                )
                .property("state", BasicType::String, "STATE")
                .secondary_table("SHIPMENT_EXT", &["EXT_REGION", "EXT_SEQ"])
                .property_in("SHIPMENT_EXT", "notes", BasicType::String, "NOTES"),
        );
        let dialect = GenericDialect::new();
        let info = IdTableInfo::synthesize(&persister, &dialect, None);

        assert_eq!(
            info.create_ddl(&dialect),
            "create table HT_SHIPMENT (REGION varchar(255) not null, SEQ bigint not null)"
        );
        assert_eq!(info.id_subselect(), "select REGION, SEQ from HT_SHIPMENT");
    }
}
