//! The persisted ledger of applied change sets.
//!
//! One row per applied change set: `(module_name, changeset_id,
//! applied_at)`. The ledger is append-only and queried by module name;
//! the engine never deletes from it. Durability of the whole mechanism
//! lives entirely here; the in-memory applied state is rebuilt from
//! this table on every run.

use crate::change_set::ChangeSet;
use crate::definition::{Column, ColumnType, Table};
use crate::dialect::Dialect;
use crate::errors::SchevoResult;
use crate::script::{Script, SqlStatement, SqlValue};
use crate::session::SqlSession;

/// Name of the ledger table used by [`DefaultLogTable`] unless configured
/// otherwise.
pub const DEFAULT_LOG_TABLE_NAME: &str = "schema_evolution_log";

/// Boundary trait for the persisted applied-change ledger.
///
/// Implementations must guarantee that [`insert_script`](LogTable::insert_script)
/// produces exactly one durable append row and that rows are never
/// removed.
pub trait LogTable {
    /// Makes the ledger usable before the first query of a run. The
    /// default implementation does nothing; [`DefaultLogTable`] creates
    /// its table when absent.
    fn prepare(&self, _dialect: &dyn Dialect, _session: &mut dyn SqlSession) -> SchevoResult<()> {
        Ok(())
    }

    /// Loads the ids of all change sets recorded as applied for a module.
    fn applied_change_set_ids(
        &self,
        session: &mut dyn SqlSession,
        module_name: &str,
    ) -> SchevoResult<Vec<String>>;

    /// Returns a script that appends one row marking the given change set
    /// as applied.
    fn insert_script(&self, change_set: &ChangeSet) -> SchevoResult<Script>;
}

/// Default single-table ledger.
///
/// The bookkeeping statements use plain lower-case identifiers without
/// dialect quoting so the same text works across all supported databases;
/// only the one-time CREATE TABLE goes through the dialect.
pub struct DefaultLogTable {
    table_name: String,
}

impl DefaultLogTable {
    pub fn new() -> Self {
        DefaultLogTable {
            table_name: DEFAULT_LOG_TABLE_NAME.to_string(),
        }
    }

    /// Uses a custom ledger table name.
    pub fn with_table_name(table_name: &str) -> Self {
        DefaultLogTable {
            table_name: table_name.to_string(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn table_definition(&self) -> Table {
        Table::new(
            &self.table_name,
            vec![
                Column::new("module_name", ColumnType::Varchar)
                    .with_length(64)
                    .not_null(),
                Column::new("changeset_id", ColumnType::Varchar)
                    .with_length(128)
                    .not_null(),
                Column::new("applied_at", ColumnType::Timestamp).not_null(),
            ],
        )
    }
}

impl Default for DefaultLogTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LogTable for DefaultLogTable {
    fn prepare(&self, dialect: &dyn Dialect, session: &mut dyn SqlSession) -> SchevoResult<()> {
        let definition = self.table_definition();
        if session.table_exists(&definition)? {
            return Ok(());
        }
        log::info!("Creating evolution log table '{}'", self.table_name);
        let script = dialect.create_table(&definition)?;
        for statement in script.statements() {
            session.execute(statement)?;
        }
        Ok(())
    }

    fn applied_change_set_ids(
        &self,
        session: &mut dyn SqlSession,
        module_name: &str,
    ) -> SchevoResult<Vec<String>> {
        let statement = SqlStatement::with_parameters(
            &format!(
                "SELECT changeset_id FROM {} WHERE module_name = ?",
                self.table_name
            ),
            vec![SqlValue::Text(module_name.to_string())],
        );
        session.query_strings(&statement)
    }

    fn insert_script(&self, change_set: &ChangeSet) -> SchevoResult<Script> {
        // applied_at is evaluated by the database at execution time;
        // binding a timestamp here would make recomputed scripts compare
        // unequal.
        let mut script = Script::new();
        script.push(SqlStatement::with_parameters(
            &format!(
                "INSERT INTO {} (module_name, changeset_id, applied_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
                self.table_name
            ),
            vec![
                SqlValue::Text(change_set.module_name().to_string()),
                SqlValue::Text(change_set.id().to_string()),
            ],
        ));
        Ok(script)
    }
}
