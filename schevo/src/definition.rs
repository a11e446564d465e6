//! Dialect-agnostic schema definitions.
//!
//! These types carry the data a [`Refactoring`](crate::refactor::Refactoring)
//! needs; rendering them into SQL is entirely the job of a
//! [`Dialect`](crate::dialect::Dialect).

use crate::script::SqlValue;

/// A database-neutral column type.
///
/// Dialects map each variant to their native type name; see
/// [`Dialect::type_name`](crate::dialect::Dialect::type_name). Length and
/// precision information lives on the [`Column`], not here, except for
/// `Numeric` where precision and scale are part of the type itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Char,
    Varchar,
    Text,
    SmallInt,
    Integer,
    BigInt,
    Numeric { precision: u32, scale: u32 },
    Double,
    Boolean,
    Date,
    Timestamp,
    Binary,
}

/// A column definition used by create-table, add-column, and
/// modify-column refactorings.
///
/// Columns are built fluently:
///
/// ```rust,ignore
/// use schevo::definition::{Column, ColumnType};
///
/// let col = Column::new("status", ColumnType::Varchar)
///     .with_length(32)
///     .not_null();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub length: Option<u32>,
    pub not_null: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub default_value: Option<SqlValue>,
}

impl Column {
    /// Creates a nullable column with no length, default, or constraints.
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Column {
            name: name.to_string(),
            column_type,
            length: None,
            not_null: false,
            primary_key: false,
            auto_increment: false,
            default_value: None,
        }
    }

    /// Sets the length for character and binary types.
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Marks the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the column as part of the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as auto-incrementing. Dialects that use sequences
    /// instead ignore this flag; see `create_auto_increment_sequence`.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets a literal default value.
    pub fn with_default(mut self, value: SqlValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// A table definition: a name plus an ordered list of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        Table {
            name: name.to_string(),
            columns,
        }
    }

    /// A table reference without column definitions, used where only the
    /// name matters (existence checks, drops).
    pub fn by_name(name: &str) -> Self {
        Table {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    /// Returns the columns flagged as primary key, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }
}

/// An index over one or more columns of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn new(name: &str, columns: Vec<&str>) -> Self {
        Index {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A named UNIQUE constraint over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

impl UniqueConstraint {
    pub fn new(name: &str, columns: Vec<&str>) -> Self {
        UniqueConstraint {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// A named foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    pub fn new(
        name: &str,
        columns: Vec<&str>,
        referenced_table: &str,
        referenced_columns: Vec<&str>,
    ) -> Self {
        ForeignKey {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referenced_table: referenced_table.to_string(),
            referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// One column/value pair of a data-insert refactoring.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEntry {
    pub column: String,
    pub value: SqlValue,
}

impl RecordEntry {
    pub fn new(column: &str, value: SqlValue) -> Self {
        RecordEntry {
            column: column.to_string(),
            value,
        }
    }
}
