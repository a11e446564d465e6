//! Per-module evolution state and script computation.
//!
//! The lifecycle is split in two stages. [`EvolutionHistory`] is the
//! immutable configuration value: module name, ordered change sets,
//! declared dependencies, optional check table. Calling
//! [`EvolutionHistory::init`] loads the applied-id set from the ledger
//! and produces a [`HistoryState`], the mutable per-run value that
//! computes scripts and tracks what has been applied. Script computation
//! is only available on the initialized state, so there is no hidden
//! "must call init first" coupling.

use indexmap::IndexSet;

use crate::change_set::ChangeSet;
use crate::definition::Table;
use crate::dialect::Dialect;
use crate::errors::{ErrorKind, SchevoError, SchevoResult};
use crate::log::LogTable;
use crate::script::Script;
use crate::session::SqlSession;

/// Immutable migration configuration for one logical module.
///
/// Built once at configuration time; the shape never changes afterwards.
/// All mutable state lives in the [`HistoryState`] produced by
/// [`init`](EvolutionHistory::init).
#[derive(Debug, Clone)]
pub struct EvolutionHistory {
    module_name: String,
    change_sets: Vec<ChangeSet>,
    depends: Vec<String>,
    check_table_name: Option<String>,
}

impl EvolutionHistory {
    /// Registers a module with its ordered change sets.
    ///
    /// Sequence numbers are assigned from the registration index and each
    /// change set is bound to this module. A duplicate change-set id
    /// within the module is a configuration error.
    pub fn new(module_name: &str, mut change_sets: Vec<ChangeSet>) -> SchevoResult<Self> {
        let mut seen: IndexSet<String> = IndexSet::new();
        for (index, change_set) in change_sets.iter_mut().enumerate() {
            if !seen.insert(change_set.id().to_string()) {
                return Err(SchevoError::new(
                    &format!(
                        "Duplicate change-set id '{}' in module '{}'",
                        change_set.id(),
                        module_name
                    ),
                    ErrorKind::Configuration,
                ));
            }
            change_set.attach(module_name, index);
        }
        Ok(EvolutionHistory {
            module_name: module_name.to_string(),
            change_sets,
            depends: Vec::new(),
            check_table_name: None,
        })
    }

    /// Declares the modules this one depends on. Dependencies order
    /// execution across modules; they are not transitive.
    pub fn with_dependencies(mut self, depends: Vec<&str>) -> Self {
        self.depends = depends.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Sets the name of a table that, if it exists, indicates the module
    /// is already installed.
    ///
    /// Use the name of a table that exists *before* any change set is
    /// applied; it is fine if that table is renamed or dropped by a later
    /// change set. When no check table is set and the ledger is empty,
    /// the module is treated as a fresh install.
    pub fn with_check_table(mut self, check_table_name: &str) -> Self {
        self.check_table_name = Some(check_table_name.to_string());
        self
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn change_sets(&self) -> &[ChangeSet] {
        &self.change_sets
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends
    }

    pub fn check_table_name(&self) -> Option<&str> {
        self.check_table_name.as_deref()
    }

    /// Whether this module directly depends on the other one. The check
    /// is deliberately non-transitive.
    pub fn depends_on(&self, other: &EvolutionHistory) -> bool {
        self.depends.iter().any(|d| d == other.module_name())
    }

    /// Loads the applied-id set for this module from the ledger and
    /// returns the per-run state.
    pub fn init<'a>(
        &'a self,
        log_table: &dyn LogTable,
        session: &mut dyn SqlSession,
    ) -> SchevoResult<HistoryState<'a>> {
        let ids = log_table.applied_change_set_ids(session, &self.module_name)?;
        let applied_ids: IndexSet<String> = ids.into_iter().collect();
        log::debug!(
            "Module '{}': {} of {} change sets already applied",
            self.module_name,
            applied_ids.len(),
            self.change_sets.len()
        );
        Ok(HistoryState {
            history: self,
            applied_ids,
        })
    }
}

/// Mutable per-run state of one module's history.
///
/// Holds the applied-id set loaded at init. The set grows as the
/// orchestrator commits change sets; ids are never removed (there is no
/// rollback). Script computation itself is a pure function of the current
/// applied state: computing twice without executing in between yields
/// identical statements.
#[derive(Debug)]
pub struct HistoryState<'a> {
    history: &'a EvolutionHistory,
    applied_ids: IndexSet<String>,
}

impl<'a> HistoryState<'a> {
    pub fn history(&self) -> &EvolutionHistory {
        self.history
    }

    pub fn applied_ids(&self) -> &IndexSet<String> {
        &self.applied_ids
    }

    /// Whether the module's schema already exists in the target database.
    ///
    /// A non-empty ledger is authoritative. An empty ledger with an
    /// existing check table signals a database that reached its current
    /// shape by means other than this engine (bundled bootstrap DDL, for
    /// example): already installed but never logged. An empty ledger with
    /// no check table configured means a genuinely new database; the
    /// engine does not introspect the schema beyond the documented check
    /// table.
    pub fn is_already_installed(&self, session: &mut dyn SqlSession) -> SchevoResult<bool> {
        if !self.applied_ids.is_empty() {
            // Some changes have already been applied
            return Ok(true);
        }
        match self.history.check_table_name() {
            Some(name) => session.table_exists(&Table::by_name(name)),
            None => Ok(false),
        }
    }

    /// Computes the script that brings this module up to date.
    ///
    /// Already installed: for each change set in sequence order, skip it
    /// if its id is applied, otherwise append its refactoring script
    /// followed by the ledger insert for that id. Later change sets in
    /// the same computation see earlier ones as applied.
    ///
    /// Fresh install: the schema is assumed to already exist in its final
    /// form, so only the ledger inserts are emitted, never the
    /// refactorings.
    pub fn to_script(
        &self,
        dialect: &dyn Dialect,
        log_table: &dyn LogTable,
        session: &mut dyn SqlSession,
    ) -> SchevoResult<Script> {
        let mut script = Script::new();
        for (_, part) in self.pending_scripts(dialect, log_table, session)? {
            script.append(part);
        }
        Ok(script)
    }

    /// Like [`to_script`](Self::to_script), but keeps change-set
    /// boundaries: one `(id, script)` pair per unapplied change set, in
    /// sequence order. The orchestrator uses this to execute and record
    /// change sets one at a time.
    pub fn pending_scripts(
        &self,
        dialect: &dyn Dialect,
        log_table: &dyn LogTable,
        session: &mut dyn SqlSession,
    ) -> SchevoResult<Vec<(String, Script)>> {
        let installed = self.is_already_installed(session)?;
        let mut scripts = Vec::new();
        for change_set in self.history.change_sets() {
            if self.applied_ids.contains(change_set.id()) {
                continue;
            }
            let mut script = Script::new();
            if installed {
                script.append(change_set.to_script(dialect)?);
            }
            script.append(log_table.insert_script(change_set)?);
            scripts.push((change_set.id().to_string(), script));
        }
        Ok(scripts)
    }

    /// Ids of the change sets a run of the current script would apply, in
    /// sequence order.
    pub fn pending_change_set_ids(&self) -> Vec<String> {
        self.history
            .change_sets()
            .iter()
            .filter(|cs| !self.applied_ids.contains(cs.id()))
            .map(|cs| cs.id().to_string())
            .collect()
    }

    /// Records a change set as applied after its statements committed.
    /// The applied set only ever grows.
    pub fn mark_applied(&mut self, id: &str) {
        self.applied_ids.insert(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Column, ColumnType, Index};
    use crate::dialect::HsqlDialect;
    use crate::log::DefaultLogTable;
    use crate::refactor::Refactoring;
    use crate::script::{SqlStatement, SqlValue};
    use crate::session::DatabaseInfo;
    use std::collections::HashSet;

    struct FakeSession {
        tables: HashSet<String>,
        ledger: Vec<(String, String)>,
    }

    impl FakeSession {
        fn new() -> Self {
            FakeSession {
                tables: HashSet::new(),
                ledger: Vec::new(),
            }
        }

        fn with_table(mut self, name: &str) -> Self {
            self.tables.insert(name.to_string());
            self
        }

        fn with_applied(mut self, module: &str, id: &str) -> Self {
            self.ledger.push((module.to_string(), id.to_string()));
            self
        }
    }

    impl SqlSession for FakeSession {
        fn database_info(&self) -> DatabaseInfo {
            DatabaseInfo::new("HSQL Database Engine", 2, 7)
        }

        fn table_exists(&mut self, table: &Table) -> SchevoResult<bool> {
            Ok(self.tables.contains(&table.name))
        }

        fn execute(&mut self, _statement: &SqlStatement) -> SchevoResult<()> {
            Ok(())
        }

        fn query_strings(&mut self, statement: &SqlStatement) -> SchevoResult<Vec<String>> {
            let module = match &statement.parameters()[0] {
                SqlValue::Text(m) => m.clone(),
                _ => String::new(),
            };
            Ok(self
                .ledger
                .iter()
                .filter(|(m, _)| *m == module)
                .map(|(_, id)| id.clone())
                .collect())
        }
    }

    fn orders_history() -> EvolutionHistory {
        EvolutionHistory::new(
            "orders",
            vec![
                ChangeSet::new(
                    "add-status-col",
                    vec![Refactoring::AddColumn {
                        table: "legacy_orders".to_string(),
                        column: Column::new("status", ColumnType::Varchar).with_length(16),
                    }],
                ),
                ChangeSet::new(
                    "add-index",
                    vec![Refactoring::CreateIndex {
                        table: "legacy_orders".to_string(),
                        index: Index::new("idx_orders_status", vec!["status"]),
                    }],
                ),
            ],
        )
        .unwrap()
        .with_check_table("legacy_orders")
    }

    fn log_inserts(script: &Script) -> usize {
        script
            .statements()
            .iter()
            .filter(|s| s.sql().starts_with("INSERT INTO schema_evolution_log"))
            .count()
    }

    // ==================== Registration Tests ====================

    #[test]
    fn registration_assigns_sequence_numbers() {
        let history = orders_history();
        assert_eq!(history.change_sets()[0].sequence_number(), 0);
        assert_eq!(history.change_sets()[1].sequence_number(), 1);
        assert_eq!(history.change_sets()[0].module_name(), "orders");
    }

    #[test]
    fn duplicate_change_set_id_is_a_configuration_error() {
        let result = EvolutionHistory::new(
            "orders",
            vec![ChangeSet::new("same", vec![]), ChangeSet::new("same", vec![])],
        );
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Configuration);
    }

    #[test]
    fn depends_on_is_direct_only() {
        let a = EvolutionHistory::new("a", vec![]).unwrap().with_dependencies(vec!["b"]);
        let b = EvolutionHistory::new("b", vec![]).unwrap().with_dependencies(vec!["c"]);
        let c = EvolutionHistory::new("c", vec![]).unwrap();

        assert!(a.depends_on(&b));
        assert!(b.depends_on(&c));
        // Not transitive: a declares only b.
        assert!(!a.depends_on(&c));
        assert!(!c.depends_on(&a));
    }

    // ==================== Installation Detection Tests ====================

    #[test]
    fn non_empty_ledger_means_installed() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new().with_applied("orders", "add-status-col");

        let state = history.init(&log_table, &mut session).unwrap();
        assert!(state.is_already_installed(&mut session).unwrap());
    }

    #[test]
    fn empty_ledger_with_existing_check_table_means_installed() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new().with_table("legacy_orders");

        let state = history.init(&log_table, &mut session).unwrap();
        assert!(state.is_already_installed(&mut session).unwrap());
    }

    #[test]
    fn empty_ledger_without_check_table_means_fresh_install() {
        let history = EvolutionHistory::new("orders", vec![ChangeSet::new("a", vec![])]).unwrap();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new();

        let state = history.init(&log_table, &mut session).unwrap();
        assert!(!state.is_already_installed(&mut session).unwrap());
    }

    #[test]
    fn empty_ledger_with_missing_check_table_means_fresh_install() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new();

        let state = history.init(&log_table, &mut session).unwrap();
        assert!(!state.is_already_installed(&mut session).unwrap());
    }

    // ==================== Script Computation Tests ====================

    #[test]
    fn migration_script_interleaves_ddl_and_log_inserts() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new().with_table("legacy_orders");

        let state = history.init(&log_table, &mut session).unwrap();
        let script = state
            .to_script(&HsqlDialect::new(), &log_table, &mut session)
            .unwrap();

        let sql: Vec<&str> = script.statements().iter().map(|s| s.sql()).collect();
        assert_eq!(sql.len(), 4);
        assert!(sql[0].starts_with("ALTER TABLE \"legacy_orders\" ADD COLUMN"));
        assert!(sql[1].starts_with("INSERT INTO schema_evolution_log"));
        assert!(sql[2].starts_with("CREATE INDEX"));
        assert!(sql[3].starts_with("INSERT INTO schema_evolution_log"));
    }

    #[test]
    fn fresh_install_script_contains_only_log_inserts() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new();

        let state = history.init(&log_table, &mut session).unwrap();
        let script = state
            .to_script(&HsqlDialect::new(), &log_table, &mut session)
            .unwrap();

        assert_eq!(script.len(), 2);
        assert_eq!(log_inserts(&script), 2);
    }

    #[test]
    fn applied_change_sets_are_skipped() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new().with_applied("orders", "add-status-col");

        let state = history.init(&log_table, &mut session).unwrap();
        let script = state
            .to_script(&HsqlDialect::new(), &log_table, &mut session)
            .unwrap();

        let sql: Vec<&str> = script.statements().iter().map(|s| s.sql()).collect();
        assert_eq!(sql.len(), 2);
        assert!(sql[0].starts_with("CREATE INDEX"));
        assert!(sql[1].starts_with("INSERT INTO schema_evolution_log"));
    }

    #[test]
    fn computing_the_script_twice_yields_identical_statements() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new().with_table("legacy_orders");

        let state = history.init(&log_table, &mut session).unwrap();
        let dialect = HsqlDialect::new();

        let first = state.to_script(&dialect, &log_table, &mut session).unwrap();
        let second = state.to_script(&dialect, &log_table, &mut session).unwrap();

        // Whole-value comparison: SQL text and bound parameters alike.
        assert_eq!(first, second);
    }

    #[test]
    fn marked_change_sets_never_reappear() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new().with_table("legacy_orders");

        let mut state = history.init(&log_table, &mut session).unwrap();
        state.mark_applied("add-status-col");

        let script = state
            .to_script(&HsqlDialect::new(), &log_table, &mut session)
            .unwrap();
        for statement in script.statements() {
            assert!(!statement.sql().contains("ADD COLUMN"));
        }
    }

    #[test]
    fn pending_ids_track_the_applied_set() {
        let history = orders_history();
        let log_table = DefaultLogTable::new();
        let mut session = FakeSession::new().with_table("legacy_orders");

        let mut state = history.init(&log_table, &mut session).unwrap();
        assert_eq!(
            state.pending_change_set_ids(),
            vec!["add-status-col".to_string(), "add-index".to_string()]
        );

        state.mark_applied("add-status-col");
        assert_eq!(state.pending_change_set_ids(), vec!["add-index".to_string()]);
    }
}
