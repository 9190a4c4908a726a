//! Multi-table bulk mutation support.
//!
//! An HQL UPDATE or DELETE against an entity spanning several tables
//! runs as a statement sequence: collect the matching identifiers into
//! an id table, mutate each physical table keyed on that id set, then
//! clean up. The strategy owns the id table lifecycle; the handlers
//! assemble per-statement plans during translation.

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::metamodel::Metamodel;
use crate::session::ConnectionAccess;

pub mod delete_handler;
pub mod handler;
pub mod id_table;
pub mod temp_table;
pub mod update_handler;

pub use handler::{BulkPlan, BulkStatement};
pub use id_table::{IdTableColumn, IdTableInfo};
pub use temp_table::TempTableBulkIdStrategy;

/// What happens to an id table after the bulk statement that used it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterUseAction {
    /// Leave the rows in place.
    None,
    /// Delete the rows this execution inserted.
    Clean,
    /// Drop the table.
    Drop,
}

/// Lifecycle and lookup of the id tables bulk statements run against.
pub trait MultiTableBulkIdStrategy {
    /// Called once at engine startup, before any statement translates.
    fn prepare(
        &mut self,
        model: &Metamodel,
        dialect: &dyn Dialect,
        access: &mut dyn ConnectionAccess,
    );

    /// Called once at engine shutdown.
    fn release(&mut self, dialect: &dyn Dialect, access: &mut dyn ConnectionAccess);

    fn id_table_info(&self, entity: &str) -> Option<&IdTableInfo>;

    fn after_use_action(&self) -> AfterUseAction;
}
