//! Up-front id table provisioning.
//!
//! Every multi-table persister gets its id table synthesized and, when a
//! connection is available, created during engine startup. Creation and
//! teardown failures are tolerated: a table that already exists or a
//! connection that is not there yet only surfaces later, when a bulk
//! statement actually needs the table.

use std::collections::HashMap;

use crate::bulk::id_table::IdTableInfo;
use crate::bulk::{AfterUseAction, MultiTableBulkIdStrategy};
use crate::config::BulkConfig;
use crate::dialect::Dialect;
use crate::metamodel::Metamodel;
use crate::session::ConnectionAccess;

pub struct TempTableBulkIdStrategy {
    config: BulkConfig,
    tables: HashMap<String, IdTableInfo>,
    created: Vec<IdTableInfo>,
}

impl TempTableBulkIdStrategy {
    pub fn new(config: BulkConfig) -> Self {
        Self {
            config,
            tables: HashMap::new(),
            created: Vec::new(),
        }
    }
}

impl MultiTableBulkIdStrategy for TempTableBulkIdStrategy {
    fn prepare(
        &mut self,
        model: &Metamodel,
        dialect: &dyn Dialect,
        access: &mut dyn ConnectionAccess,
    ) {
        let uid_column = self
            .config
            .shared_id_tables
            .then(|| self.config.session_uid_column.clone());

        let mut infos: Vec<(String, IdTableInfo)> = model
            .entities()
            .filter(|p| p.is_multi_table())
            .map(|p| {
                let info = IdTableInfo::synthesize(p, dialect, uid_column.as_deref());
                (p.entity_name.clone(), info)
            })
            .collect();
        infos.sort_by(|a, b| a.0.cmp(&b.0));
        for (entity, info) in &infos {
            self.tables.insert(entity.clone(), info.clone());
        }
        if infos.is_empty() {
            return;
        }

        let session = match access.connection() {
            Ok(session) => session,
            Err(e) => {
                log::info!("deferring id table creation, no connection available: {}", e);
                return;
            }
        };
        for (_, info) in &infos {
            match session.execute_ddl(&info.create_ddl(dialect)) {
                Ok(()) => self.created.push(info.clone()),
                Err(e) => log::warn!("unable to create id table [{}]: {}", info.name, e),
            }
        }
        log::debug!("created {} id table(s)", self.created.len());
    }

    fn release(&mut self, dialect: &dyn Dialect, access: &mut dyn ConnectionAccess) {
        if !self.created.is_empty() {
            match access.connection() {
                Ok(session) => {
                    for info in &self.created {
                        if let Err(e) = session.execute_ddl(&info.drop_ddl(dialect)) {
                            log::warn!("unable to drop id table [{}]: {}", info.name, e);
                        }
                    }
                }
                Err(e) => {
                    log::info!("leaving id tables behind, no connection available: {}", e)
                }
            }
        }
        self.created.clear();
        self.tables.clear();
    }

    fn id_table_info(&self, entity: &str) -> Option<&IdTableInfo> {
        self.tables.get(entity)
    }

    fn after_use_action(&self) -> AfterUseAction {
        self.config.after_use
    }
}
