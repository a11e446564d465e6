//! # Schevo - Schema Evolution Engine
//!
//! Schevo manages incremental SQL schema changes for applications that
//! ship database migrations alongside their code. Each logical module
//! declares an ordered history of change sets; at startup the engine
//! works out which change sets the target database is missing, renders
//! them through a database-specific dialect, executes them, and records
//! every applied change set in a ledger table so later runs skip it.
//!
//! ## Key Features
//!
//! - **Change-set histories**: Ordered, append-only migration lists per module
//! - **Durable ledger**: Applied change sets recorded in a log table for idempotent replay
//! - **Dialects**: Pluggable SQL rendering with built-in HSQL, PostgreSQL, and MySQL support
//! - **Module dependencies**: Histories run in dependency order, cycles rejected up front
//! - **Fresh-install detection**: Pre-existing schemas are adopted without replaying DDL
//! - **Session abstraction**: Bring your own connection; the engine never opens one itself
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schevo::change_set::ChangeSet;
//! use schevo::definition::{Column, ColumnType, Table};
//! use schevo::evolution::Evolution;
//! use schevo::history::EvolutionHistory;
//! use schevo::refactor::Refactoring;
//!
//! # fn main() -> schevo::errors::SchevoResult<()> {
//! let users = Table::new(
//!     "users",
//!     vec![
//!         Column::new("id", ColumnType::BigInt).primary_key().auto_increment(),
//!         Column::new("name", ColumnType::Varchar).with_length(128).not_null(),
//!     ],
//! );
//!
//! let history = EvolutionHistory::new(
//!     "accounts",
//!     vec![ChangeSet::new(
//!         "create-users-table",
//!         vec![Refactoring::CreateTable { table: users }],
//!     )],
//! )?
//! .with_check_table("users");
//!
//! let evolution = Evolution::builder()
//!     .with_default_dialects()
//!     .add_history(history)
//!     .build()?;
//!
//! // `session` wraps whatever connection the application already holds.
//! evolution.evolve(&mut session)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`change_set`] - The unit of migration: an id plus ordered refactorings
//! - [`definition`] - Dialect-agnostic schema definitions (tables, columns, indexes)
//! - [`dialect`] - SQL rendering per database product
//! - [`errors`] - Error types and result definitions
//! - [`evolution`] - The orchestrator and its builder
//! - [`history`] - Per-module histories and applied-state tracking
//! - [`log`] - The durable ledger of applied change sets
//! - [`refactor`] - The schema refactoring vocabulary
//! - [`script`] - Rendered SQL statements with bound parameters
//! - [`session`] - The database access abstraction implemented by callers

use std::sync::Arc;

use parking_lot::RwLock;

pub mod change_set;
pub mod definition;
pub mod dialect;
pub mod errors;
pub mod evolution;
pub mod history;
pub mod log;
pub mod refactor;
pub mod script;
pub mod session;

pub(crate) type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub(crate) fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}
