use std::collections::HashSet;

use schevo::definition::Table;
use schevo::errors::{ErrorKind, SchevoError, SchevoResult};
use schevo::log::DEFAULT_LOG_TABLE_NAME;
use schevo::script::{SqlStatement, SqlValue};
use schevo::session::{DatabaseInfo, SqlSession};

/// An in-memory stand-in for a real database connection.
///
/// Tracks which tables exist, records every executed statement, and
/// replays ledger inserts so that applied-id queries on later runs see
/// what earlier runs committed. Statements are not otherwise interpreted;
/// the tests assert on the recorded SQL text.
pub struct MockSession {
    info: DatabaseInfo,
    log_table_name: String,
    tables: HashSet<String>,
    ledger: Vec<(String, String)>,
    executed: Vec<SqlStatement>,
    fail_on: Option<String>,
}

impl MockSession {
    pub fn new(info: DatabaseInfo) -> Self {
        MockSession {
            info,
            log_table_name: DEFAULT_LOG_TABLE_NAME.to_string(),
            tables: HashSet::new(),
            ledger: Vec::new(),
            executed: Vec::new(),
            fail_on: None,
        }
    }

    pub fn hsql() -> Self {
        MockSession::new(DatabaseInfo::new("HSQL Database Engine", 2, 7))
    }

    pub fn postgres() -> Self {
        MockSession::new(DatabaseInfo::new("PostgreSQL", 16, 2))
    }

    pub fn mysql() -> Self {
        MockSession::new(DatabaseInfo::new("MySQL", 8, 4))
    }

    /// Pretends the named table already exists before any run.
    pub fn with_table(mut self, name: &str) -> Self {
        self.tables.insert(name.to_string());
        self
    }

    /// Pre-seeds the ledger, as if an earlier run applied the change set.
    pub fn with_applied(mut self, module: &str, change_set_id: &str) -> Self {
        self.ledger
            .push((module.to_string(), change_set_id.to_string()));
        self
    }

    /// Changes the ledger table name the session replays inserts for.
    pub fn with_log_table_name(mut self, name: &str) -> Self {
        self.log_table_name = name.to_string();
        self
    }

    /// Makes every statement whose SQL contains the fragment fail.
    pub fn fail_on(&mut self, fragment: &str) {
        self.fail_on = Some(fragment.to_string());
    }

    /// Clears a previously set failure, as if the operator fixed the
    /// database between runs.
    pub fn clear_failure(&mut self) {
        self.fail_on = None;
    }

    pub fn executed_sql(&self) -> Vec<&str> {
        self.executed.iter().map(|s| s.sql()).collect()
    }

    /// Change-set ids recorded for a module, in insertion order.
    pub fn applied(&self, module: &str) -> Vec<&str> {
        self.ledger
            .iter()
            .filter(|(m, _)| m == module)
            .map(|(_, id)| id.as_str())
            .collect()
    }

    pub fn table_names(&self) -> &HashSet<String> {
        &self.tables
    }

    fn created_table_name(sql: &str) -> Option<String> {
        let rest = sql.strip_prefix("CREATE TABLE ")?;
        let name = rest
            .split_whitespace()
            .next()?
            .trim_matches(|c| c == '"' || c == '`');
        Some(name.to_string())
    }
}

impl SqlSession for MockSession {
    fn database_info(&self) -> DatabaseInfo {
        self.info.clone()
    }

    fn table_exists(&mut self, table: &Table) -> SchevoResult<bool> {
        Ok(self.tables.contains(&table.name))
    }

    fn execute(&mut self, statement: &SqlStatement) -> SchevoResult<()> {
        if let Some(fragment) = &self.fail_on {
            if statement.sql().contains(fragment.as_str()) {
                return Err(SchevoError::new(
                    &format!("simulated failure at: {}", statement.sql()),
                    ErrorKind::StatementExecution,
                ));
            }
        }
        if let Some(name) = Self::created_table_name(statement.sql()) {
            self.tables.insert(name);
        }
        let ledger_insert = format!("INSERT INTO {} ", self.log_table_name);
        if statement.sql().starts_with(&ledger_insert) {
            if let [SqlValue::Text(module), SqlValue::Text(id)] = statement.parameters() {
                self.ledger.push((module.clone(), id.clone()));
            }
        }
        self.executed.push(statement.clone());
        Ok(())
    }

    fn query_strings(&mut self, statement: &SqlStatement) -> SchevoResult<Vec<String>> {
        let module = match statement.parameters().first() {
            Some(SqlValue::Text(m)) => m.clone(),
            _ => {
                return Err(SchevoError::new(
                    "expected a module name parameter",
                    ErrorKind::InvalidOperation,
                ))
            }
        };
        Ok(self
            .ledger
            .iter()
            .filter(|(m, _)| *m == module)
            .map(|(_, id)| id.clone())
            .collect())
    }
}
