use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::{atomic, Atomic};

/// Error kinds for schema evolution operations.
///
/// Each kind describes one category of failure. All of them are fatal for
/// the current run: the engine performs no internal retry and reports no
/// partial success. Correctness after a failure relies entirely on the
/// ledger reflecting exactly what committed, which makes a restart
/// idempotent.
///
/// # Examples
///
/// ```rust,ignore
/// use schevo::errors::{ErrorKind, SchevoError, SchevoResult};
///
/// fn example() -> SchevoResult<()> {
///     Err(SchevoError::new("no dialect matched", ErrorKind::DialectResolution))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// No configured dialect supports the target database; detected at
    /// startup, nothing executes
    DialectResolution,
    /// The module dependency graph is cyclic; detected before any script
    /// runs
    DependencyCycle,
    /// A SQL statement failed during execution; remaining statements in
    /// the script and all subsequent modules are not attempted
    StatementExecution,
    /// Invalid registration: duplicate change-set id within a module,
    /// duplicate module name, or a dependency referencing an unknown module
    Configuration,
    /// Invalid argument or definition data (empty identifier, malformed
    /// column definition)
    Validation,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Internal error (usually indicates a bug)
    Internal,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::DialectResolution => write!(f, "Dialect resolution error"),
            ErrorKind::DependencyCycle => write!(f, "Dependency cycle error"),
            ErrorKind::StatementExecution => write!(f, "Statement execution error"),
            ErrorKind::Configuration => write!(f, "Configuration error"),
            ErrorKind::Validation => write!(f, "Validation error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::Internal => write!(f, "Internal error"),
        }
    }
}

/// Custom error type for the evolution engine.
///
/// `SchevoError` encapsulates the error message, kind, and an optional
/// cause. It supports error chaining and backtraces for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use schevo::errors::{ErrorKind, SchevoError};
///
/// // Create a simple error
/// let err = SchevoError::new("cycle detected", ErrorKind::DependencyCycle);
///
/// // Create an error with a cause
/// let cause = SchevoError::new("connection reset", ErrorKind::StatementExecution);
/// let err = SchevoError::new_with_cause("migration aborted", ErrorKind::StatementExecution, cause);
/// ```
#[derive(Clone)]
pub struct SchevoError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<SchevoError>>,
    backtrace: Atomic<Backtrace>,
}

impl SchevoError {
    /// Creates a new `SchevoError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        SchevoError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `SchevoError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: SchevoError) -> Self {
        SchevoError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&SchevoError> {
        self.cause.as_deref()
    }
}

impl Display for SchevoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for SchevoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for SchevoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for evolution engine operations.
///
/// `SchevoResult<T>` is shorthand for `Result<T, SchevoError>`.
/// All fallible operations in this crate return this type.
pub type SchevoResult<T> = Result<T, SchevoError>;

impl From<String> for SchevoError {
    fn from(msg: String) -> Self {
        SchevoError::new(&msg, ErrorKind::Internal)
    }
}

impl From<&str> for SchevoError {
    fn from(msg: &str) -> Self {
        SchevoError::new(msg, ErrorKind::Internal)
    }
}

impl From<std::fmt::Error> for SchevoError {
    fn from(err: std::fmt::Error) -> Self {
        SchevoError::new(&format!("Formatting error: {}", err), ErrorKind::Internal)
    }
}
