//! The evolution orchestrator.
//!
//! [`Evolution`] owns the registered module histories, the dialect pool,
//! and the ledger implementation. A run resolves the dialect from the
//! session's database info, prepares the ledger, and then brings every
//! module up to date in dependency order. Any error aborts the run; the
//! next run resumes from whatever the ledger says was committed.

use std::fmt;

use itertools::Itertools;

use crate::dialect::{resolve_dialect, Dialect};
use crate::errors::{ErrorKind, SchevoError, SchevoResult};
use crate::history::EvolutionHistory;
use crate::log::{DefaultLogTable, LogTable};
use crate::session::SqlSession;

/// A fully configured evolution engine.
///
/// Built through [`Evolution::builder`]; histories are validated and
/// dependency-sorted at build time, so a constructed `Evolution` always
/// has a consistent module graph. Call [`evolve`](Evolution::evolve) once
/// per target database at startup.
pub struct Evolution {
    histories: Vec<EvolutionHistory>,
    dialects: Vec<Box<dyn Dialect>>,
    log_table: Box<dyn LogTable>,
}

impl Evolution {
    pub fn builder() -> EvolutionBuilder {
        EvolutionBuilder::new()
    }

    /// The registered histories in execution order.
    pub fn histories(&self) -> &[EvolutionHistory] {
        &self.histories
    }

    /// Brings every registered module up to date on the given database.
    ///
    /// Change sets execute one at a time and are recorded as applied as
    /// soon as their statements succeed, so an aborted run never repeats
    /// committed work. A statement failure is wrapped with the offending
    /// change set and module and stops the run immediately.
    pub fn evolve(&self, session: &mut dyn SqlSession) -> SchevoResult<()> {
        let info = session.database_info();
        let dialect = resolve_dialect(&self.dialects, &info)?;
        log::info!(
            "Evolving schema of {} {}.{} using dialect '{}'",
            info.product_name,
            info.major_version,
            info.minor_version,
            dialect.name()
        );

        self.log_table.prepare(dialect, session)?;

        for history in &self.histories {
            let mut state = history.init(self.log_table.as_ref(), session)?;
            let pending = state.pending_scripts(dialect, self.log_table.as_ref(), session)?;
            if pending.is_empty() {
                log::debug!("Module '{}' is up to date", history.module_name());
                continue;
            }
            log::info!(
                "Module '{}': applying {} change set(s)",
                history.module_name(),
                pending.len()
            );
            for (id, script) in pending {
                for statement in script.statements() {
                    log::debug!("Executing: {}", statement.sql());
                    session.execute(statement).map_err(|err| {
                        SchevoError::new_with_cause(
                            &format!(
                                "Failed to apply change set '{}' of module '{}' at statement: {}",
                                id,
                                history.module_name(),
                                statement.sql()
                            ),
                            ErrorKind::StatementExecution,
                            err,
                        )
                    })?;
                }
                state.mark_applied(&id);
            }
        }
        Ok(())
    }
}

// The boxed log table is not Debug; report the configured modules and
// dialects instead.
impl fmt::Debug for Evolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evolution")
            .field(
                "modules",
                &self
                    .histories
                    .iter()
                    .map(|h| h.module_name())
                    .collect::<Vec<_>>(),
            )
            .field("dialects", &self.dialects)
            .finish()
    }
}

/// Builder for [`Evolution`].
///
/// Dialects and histories accumulate in registration order; all graph
/// validation happens in [`build`](EvolutionBuilder::build) so partial
/// configurations can be assembled freely.
#[derive(Default)]
pub struct EvolutionBuilder {
    histories: Vec<EvolutionHistory>,
    dialects: Vec<Box<dyn Dialect>>,
    log_table: Option<Box<dyn LogTable>>,
}

impl EvolutionBuilder {
    pub fn new() -> Self {
        EvolutionBuilder::default()
    }

    /// Registers a dialect. During a run the first registered dialect
    /// that supports the target database wins.
    pub fn add_dialect<D: Dialect + 'static>(mut self, dialect: D) -> Self {
        self.dialects.push(Box::new(dialect));
        self
    }

    /// Registers the built-in HSQL, PostgreSQL, and MySQL dialects.
    pub fn with_default_dialects(mut self) -> Self {
        self.dialects.push(Box::new(crate::dialect::HsqlDialect::new()));
        self.dialects.push(Box::new(crate::dialect::PostgresDialect::new()));
        self.dialects.push(Box::new(crate::dialect::MysqlDialect::new()));
        self
    }

    /// Registers a module history.
    pub fn add_history(mut self, history: EvolutionHistory) -> Self {
        self.histories.push(history);
        self
    }

    /// Replaces the default ledger implementation.
    pub fn log_table<L: LogTable + 'static>(mut self, log_table: L) -> Self {
        self.log_table = Some(Box::new(log_table));
        self
    }

    /// Validates the configuration and returns the engine.
    ///
    /// Duplicate module names and dependencies on unregistered modules
    /// are configuration errors. A dependency cycle is reported as such
    /// before any database is touched.
    pub fn build(self) -> SchevoResult<Evolution> {
        if self.dialects.is_empty() {
            return Err(SchevoError::new(
                "No dialect registered",
                ErrorKind::Configuration,
            ));
        }

        let mut module_names = Vec::new();
        for history in &self.histories {
            if module_names.contains(&history.module_name()) {
                return Err(SchevoError::new(
                    &format!("Module '{}' is registered twice", history.module_name()),
                    ErrorKind::Configuration,
                ));
            }
            module_names.push(history.module_name());
        }
        for history in &self.histories {
            for dep in history.dependencies() {
                if !module_names.contains(&dep.as_str()) {
                    return Err(SchevoError::new(
                        &format!(
                            "Module '{}' depends on unregistered module '{}'",
                            history.module_name(),
                            dep
                        ),
                        ErrorKind::Configuration,
                    ));
                }
            }
        }

        let histories = sort_by_dependencies(self.histories)?;
        Ok(Evolution {
            histories,
            dialects: self.dialects,
            log_table: self
                .log_table
                .unwrap_or_else(|| Box::new(DefaultLogTable::new())),
        })
    }
}

/// Topological sort of the module graph.
///
/// Among modules whose dependencies are all satisfied, registration
/// order is preserved, so the result is deterministic for a given
/// configuration.
fn sort_by_dependencies(
    histories: Vec<EvolutionHistory>,
) -> SchevoResult<Vec<EvolutionHistory>> {
    let mut remaining = histories;
    let mut sorted: Vec<EvolutionHistory> = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let next = remaining.iter().position(|history| {
            history
                .dependencies()
                .iter()
                .all(|dep| sorted.iter().any(|s| s.module_name() == dep))
        });
        match next {
            Some(index) => sorted.push(remaining.remove(index)),
            None => {
                let stuck = remaining.iter().map(|h| h.module_name()).join(", ");
                return Err(SchevoError::new(
                    &format!("Dependency cycle among modules: {}", stuck),
                    ErrorKind::DependencyCycle,
                ));
            }
        }
    }
    Ok(sorted)
}
