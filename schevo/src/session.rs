//! The SQL-execution boundary.
//!
//! The engine never opens connections itself. Callers hand it a
//! [`SqlSession`], the minimal contract the engine needs: report what
//! database it is talking to, check whether a table exists, execute a
//! statement, and read a single string column. Everything else
//! (connection pooling, transaction scoping) stays on the caller's side.
//!
//! # Transaction scoping
//!
//! Restart safety requires that a change set's structural statements and
//! its ledger insert are never split across a commit boundary. The
//! recommended scoping is one transaction per change set. The engine does
//! not enforce this; it is a hard requirement on the session implementor.

use crate::definition::Table;
use crate::errors::SchevoResult;
use crate::script::SqlStatement;

/// Product name and version reported by the target connection, used to
/// resolve a dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub product_name: String,
    pub major_version: u32,
    pub minor_version: u32,
}

impl DatabaseInfo {
    pub fn new(product_name: &str, major_version: u32, minor_version: u32) -> Self {
        DatabaseInfo {
            product_name: product_name.to_string(),
            major_version,
            minor_version,
        }
    }
}

/// A handle for executing SQL against the target database.
///
/// # Implementations
///
/// Production implementations wrap a live connection (JDBC-style template,
/// `rusqlite`, `postgres`, ...). Tests use a recording double; see the
/// integration-test crate.
///
/// # Error handling
///
/// Implementors report failures with their own messages; the engine wraps
/// them as `ErrorKind::StatementExecution` and aborts the run. No retry
/// happens at this layer.
pub trait SqlSession {
    /// Returns the product name and version of the target database.
    fn database_info(&self) -> DatabaseInfo;

    /// Checks whether the given table currently exists in the target schema.
    fn table_exists(&mut self, table: &Table) -> SchevoResult<bool>;

    /// Executes one statement. The engine calls this for DDL and for
    /// ledger inserts; the first failure aborts the run.
    fn execute(&mut self, statement: &SqlStatement) -> SchevoResult<()>;

    /// Runs a query returning a single string column, one entry per row.
    /// Used by the ledger to load applied change-set ids.
    fn query_strings(&mut self, statement: &SqlStatement) -> SchevoResult<Vec<String>>;
}
