//! The closed catalog of schema and data refactorings.
//!
//! A [`Refactoring`] carries dialect-agnostic data and knows how to ask a
//! [`Dialect`] to render itself. The single `to_script` seam lets a
//! change set hold a heterogeneous ordered list of operations and compile
//! them against an arbitrary dialect without conditional branching in the
//! calling code.

use crate::definition::{Column, ForeignKey, Index, RecordEntry, Table, UniqueConstraint};
use crate::dialect::Dialect;
use crate::errors::SchevoResult;
use crate::script::Script;

/// One schema or data change operation.
///
/// The variant set and the [`Dialect`] method set are deliberately kept
/// in lockstep; adding a kind means one variant here and one method on
/// every dialect implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum Refactoring {
    CreateTable {
        table: Table,
    },
    RenameTable {
        name: String,
        rename_to: String,
    },
    DropTable {
        name: String,
        cascade: bool,
    },
    AddColumn {
        table: String,
        column: Column,
    },
    RenameColumn {
        table: String,
        name: String,
        rename_to: String,
    },
    ModifyColumn {
        table: String,
        column: Column,
    },
    DropColumn {
        table: String,
        name: String,
    },
    CreateIndex {
        table: String,
        index: Index,
    },
    DropIndex {
        table: String,
        name: String,
    },
    AddUniqueConstraint {
        table: String,
        constraint: UniqueConstraint,
    },
    DropConstraint {
        table: String,
        name: String,
    },
    AddForeignKey {
        table: String,
        foreign_key: ForeignKey,
    },
    DropForeignKey {
        table: String,
        name: String,
    },
    InsertData {
        table: String,
        data: Vec<RecordEntry>,
    },
    CreateAutoIncrementSequence {
        name: String,
    },
}

impl Refactoring {
    /// Compiles this operation into a script by forwarding to the
    /// matching dialect method.
    pub fn to_script(&self, dialect: &dyn Dialect) -> SchevoResult<Script> {
        match self {
            Refactoring::CreateTable { table } => dialect.create_table(table),
            Refactoring::RenameTable { name, rename_to } => dialect.rename_table(name, rename_to),
            Refactoring::DropTable { name, cascade } => dialect.drop_table(name, *cascade),
            Refactoring::AddColumn { table, column } => dialect.add_column(table, column),
            Refactoring::RenameColumn {
                table,
                name,
                rename_to,
            } => dialect.rename_column(table, name, rename_to),
            Refactoring::ModifyColumn { table, column } => dialect.modify_column(table, column),
            Refactoring::DropColumn { table, name } => dialect.drop_column(table, name),
            Refactoring::CreateIndex { table, index } => dialect.create_index(table, index),
            Refactoring::DropIndex { table, name } => dialect.drop_index(table, name),
            Refactoring::AddUniqueConstraint { table, constraint } => {
                dialect.add_unique_constraint(table, constraint)
            }
            Refactoring::DropConstraint { table, name } => dialect.drop_constraint(table, name),
            Refactoring::AddForeignKey { table, foreign_key } => {
                dialect.add_foreign_key(table, foreign_key)
            }
            Refactoring::DropForeignKey { table, name } => dialect.drop_foreign_key(table, name),
            Refactoring::InsertData { table, data } => dialect.insert(table, data),
            Refactoring::CreateAutoIncrementSequence { name } => {
                dialect.create_auto_increment_sequence(name)
            }
        }
    }
}
