//! Executable SQL scripts.
//!
//! A [`Script`] is an ordered, appendable sequence of [`SqlStatement`]s.
//! Scripts are pure values with no identity of their own: dialects and
//! change sets produce them, the orchestrator executes them. Once a
//! statement is appended it is never removed.

use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

/// A bound parameter value.
///
/// Statements carry positional parameters only for data-insert operations
/// and ledger appends; all DDL is rendered as plain SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Double(d) => write!(f, "{}", d),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Timestamp(ts) => write!(f, "'{}'", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Int(i)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

/// One executable statement: SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    sql: String,
    parameters: Vec<SqlValue>,
}

impl SqlStatement {
    /// Creates a statement with no bound parameters.
    pub fn new(sql: &str) -> Self {
        SqlStatement {
            sql: sql.to_string(),
            parameters: Vec::new(),
        }
    }

    /// Creates a statement with positional parameters.
    pub fn with_parameters(sql: &str, parameters: Vec<SqlValue>) -> Self {
        SqlStatement {
            sql: sql.to_string(),
            parameters,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[SqlValue] {
        &self.parameters
    }
}

impl Display for SqlStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.parameters.is_empty() {
            write!(f, "{}", self.sql)
        } else {
            let rendered: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
            write!(f, "{} [{}]", self.sql, rendered.join(", "))
        }
    }
}

/// An ordered, appendable sequence of SQL statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    statements: Vec<SqlStatement>,
}

impl Script {
    /// Creates an empty script.
    pub fn new() -> Self {
        Script {
            statements: Vec::new(),
        }
    }

    /// Creates a script containing a single plain SQL statement.
    pub fn single(sql: &str) -> Self {
        let mut script = Script::new();
        script.push(SqlStatement::new(sql));
        script
    }

    /// Appends one statement to the end of the script.
    pub fn push(&mut self, statement: SqlStatement) {
        self.statements.push(statement);
    }

    /// Concatenates another script onto this one, preserving order.
    pub fn append(&mut self, other: Script) {
        self.statements.extend(other.statements);
    }

    /// Returns the statements in execution order.
    pub fn statements(&self) -> &[SqlStatement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
