//! Dialect-specific SQL generation.
//!
//! A [`Dialect`] turns dialect-agnostic refactoring data into a
//! [`Script`] of database-correct statements: identifier quoting, type
//! mapping, and constraint syntax all live here. The trait ships SQL-92
//! default renderings; concrete dialects override only what their
//! database does differently.
//!
//! The set of rendering methods is deliberately kept in lockstep with the
//! [`Refactoring`](crate::refactor::Refactoring) variant catalog: adding
//! an operation kind means one new variant and one new method on every
//! dialect. The two sets are coupled on purpose, not independently
//! pluggable.

mod hsql;
mod mysql;
mod postgres;

pub use hsql::HsqlDialect;
pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;

use std::fmt::Debug;

use itertools::Itertools;

use crate::definition::{Column, ColumnType, ForeignKey, Index, RecordEntry, Table, UniqueConstraint};
use crate::errors::{ErrorKind, SchevoError, SchevoResult};
use crate::script::{Script, SqlStatement};
use crate::session::DatabaseInfo;

/// Capability-based SQL generator for one database family.
///
/// # Purpose
/// Renders each refactoring kind into dialect-correct SQL. A dialect is
/// stateless and shared by all histories; exactly one dialect is active
/// per run, chosen by [`resolve_dialect`].
///
/// # Default renderings
/// The provided method bodies produce plain SQL-92. [`HsqlDialect`] uses
/// them nearly unchanged; [`PostgresDialect`] and [`MysqlDialect`]
/// override quoting, type mapping, and the statements their databases
/// spell differently.
pub trait Dialect: Debug + Send + Sync {
    /// A short identifier for logging and diagnostics.
    fn name(&self) -> &str;

    /// Pure capability check against the target connection's reported
    /// product name and version.
    fn supports(&self, product_name: &str, major_version: u32, minor_version: u32) -> bool;

    /// Quotes an identifier. SQL-92 double quotes by default.
    fn quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier)
    }

    /// Maps a neutral column type to this dialect's native type name.
    fn type_name(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Char => "CHAR".to_string(),
            ColumnType::Varchar => "VARCHAR".to_string(),
            ColumnType::Text => "CLOB".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Numeric { precision, scale } => {
                format!("NUMERIC({}, {})", precision, scale)
            }
            ColumnType::Double => "DOUBLE PRECISION".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
        }
    }

    /// The column suffix that makes a column auto-incrementing, if this
    /// dialect expresses identity inline. Dialects that rely on sequences
    /// return `None` and the flag is ignored.
    fn identity_clause(&self) -> Option<&str> {
        None
    }

    /// Renders a full column definition: name, type, default, nullability.
    fn column_definition(&self, column: &Column) -> String {
        let mut definition = format!("{} {}", self.quote(&column.name), self.rendered_type(column));
        if let Some(default) = &column.default_value {
            definition.push_str(&format!(" DEFAULT {}", default));
        }
        if column.not_null {
            definition.push_str(" NOT NULL");
        }
        if column.auto_increment {
            if let Some(clause) = self.identity_clause() {
                definition.push(' ');
                definition.push_str(clause);
            }
        }
        definition
    }

    /// Renders the type of a column including its length where one is set.
    fn rendered_type(&self, column: &Column) -> String {
        match column.length {
            Some(length) => format!("{}({})", self.type_name(&column.column_type), length),
            None => self.type_name(&column.column_type),
        }
    }

    fn create_table(&self, table: &Table) -> SchevoResult<Script> {
        if table.columns.is_empty() {
            return Err(SchevoError::new(
                &format!("Cannot create table {} without columns", table.name),
                ErrorKind::Validation,
            ));
        }
        let mut parts: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        let pk = table.primary_key_columns();
        if !pk.is_empty() {
            let names = pk.iter().map(|c| self.quote(&c.name)).join(", ");
            parts.push(format!("PRIMARY KEY ({})", names));
        }
        Ok(Script::single(&format!(
            "CREATE TABLE {} ({})",
            self.quote(&table.name),
            parts.join(", ")
        )))
    }

    fn rename_table(&self, name: &str, rename_to: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote(name),
            self.quote(rename_to)
        )))
    }

    fn drop_table(&self, name: &str, cascade: bool) -> SchevoResult<Script> {
        let mut sql = format!("DROP TABLE {}", self.quote(name));
        if cascade {
            sql.push_str(" CASCADE");
        }
        Ok(Script::single(&sql))
    }

    fn add_column(&self, table: &str, column: &Column) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote(table),
            self.column_definition(column)
        )))
    }

    fn rename_column(&self, table: &str, name: &str, rename_to: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote(table),
            self.quote(name),
            self.quote(rename_to)
        )))
    }

    fn modify_column(&self, table: &str, column: &Column) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.quote(table),
            self.column_definition(column)
        )))
    }

    fn drop_column(&self, table: &str, name: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote(table),
            self.quote(name)
        )))
    }

    fn create_index(&self, table: &str, index: &Index) -> SchevoResult<Script> {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let columns = index.columns.iter().map(|c| self.quote(c)).join(", ");
        Ok(Script::single(&format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.quote(&index.name),
            self.quote(table),
            columns
        )))
    }

    fn drop_index(&self, _table: &str, name: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!("DROP INDEX {}", self.quote(name))))
    }

    fn add_unique_constraint(
        &self,
        table: &str,
        constraint: &UniqueConstraint,
    ) -> SchevoResult<Script> {
        let columns = constraint.columns.iter().map(|c| self.quote(c)).join(", ");
        Ok(Script::single(&format!(
            "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
            self.quote(table),
            self.quote(&constraint.name),
            columns
        )))
    }

    fn drop_constraint(&self, table: &str, name: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote(table),
            self.quote(name)
        )))
    }

    fn add_foreign_key(&self, table: &str, foreign_key: &ForeignKey) -> SchevoResult<Script> {
        let local = foreign_key.columns.iter().map(|c| self.quote(c)).join(", ");
        let referenced = foreign_key
            .referenced_columns
            .iter()
            .map(|c| self.quote(c))
            .join(", ");
        Ok(Script::single(&format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote(table),
            self.quote(&foreign_key.name),
            local,
            self.quote(&foreign_key.referenced_table),
            referenced
        )))
    }

    fn drop_foreign_key(&self, table: &str, name: &str) -> SchevoResult<Script> {
        self.drop_constraint(table, name)
    }

    fn insert(&self, table: &str, data: &[RecordEntry]) -> SchevoResult<Script> {
        if data.is_empty() {
            return Err(SchevoError::new(
                &format!("Cannot insert an empty record into {}", table),
                ErrorKind::Validation,
            ));
        }
        let columns = data.iter().map(|e| self.quote(&e.column)).join(", ");
        let placeholders = data.iter().map(|_| "?").join(", ");
        let parameters = data.iter().map(|e| e.value.clone()).collect();
        let mut script = Script::new();
        script.push(SqlStatement::with_parameters(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.quote(table),
                columns,
                placeholders
            ),
            parameters,
        ));
        Ok(script)
    }

    fn create_auto_increment_sequence(&self, name: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "CREATE SEQUENCE {} START WITH 1",
            self.quote(name)
        )))
    }
}

/// Resolves the active dialect for a run.
///
/// Iterates the configured dialects in declaration order and returns the
/// first whose `supports()` matches the reported product name and version.
/// No match is a fatal configuration problem: nothing executes.
pub fn resolve_dialect<'a>(
    dialects: &'a [Box<dyn Dialect>],
    info: &DatabaseInfo,
) -> SchevoResult<&'a dyn Dialect> {
    for dialect in dialects {
        if dialect.supports(&info.product_name, info.major_version, info.minor_version) {
            log::debug!(
                "Resolved dialect '{}' for {} {}.{}",
                dialect.name(),
                info.product_name,
                info.major_version,
                info.minor_version
            );
            return Ok(dialect.as_ref());
        }
    }
    Err(SchevoError::new(
        &format!(
            "No configured dialect supports {} {}.{}",
            info.product_name, info.major_version, info.minor_version
        ),
        ErrorKind::DialectResolution,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SqlValue;

    fn first_sql(script: &Script) -> &str {
        script.statements()[0].sql()
    }

    // ==================== Default Rendering Tests ====================

    #[test]
    fn create_table_renders_columns_and_primary_key() {
        let dialect = HsqlDialect::new();
        let table = Table::new(
            "users",
            vec![
                Column::new("id", ColumnType::BigInt).primary_key().not_null(),
                Column::new("name", ColumnType::Varchar).with_length(64),
            ],
        );
        let script = dialect.create_table(&table).unwrap();
        assert_eq!(
            first_sql(&script),
            "CREATE TABLE \"users\" (\"id\" BIGINT NOT NULL, \"name\" VARCHAR(64), PRIMARY KEY (\"id\"))"
        );
    }

    #[test]
    fn create_table_without_columns_is_a_validation_error() {
        let dialect = HsqlDialect::new();
        let result = dialect.create_table(&Table::by_name("empty"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Validation);
    }

    #[test]
    fn column_definition_includes_default_before_not_null() {
        let dialect = HsqlDialect::new();
        let column = Column::new("status", ColumnType::Varchar)
            .with_length(16)
            .with_default(SqlValue::Text("new".to_string()))
            .not_null();
        assert_eq!(
            dialect.column_definition(&column),
            "\"status\" VARCHAR(16) DEFAULT 'new' NOT NULL"
        );
    }

    #[test]
    fn drop_table_with_cascade() {
        let dialect = HsqlDialect::new();
        let script = dialect.drop_table("orders", true).unwrap();
        assert_eq!(first_sql(&script), "DROP TABLE \"orders\" CASCADE");
    }

    #[test]
    fn create_unique_index() {
        let dialect = HsqlDialect::new();
        let index = Index::new("idx_users_email", vec!["email"]).unique();
        let script = dialect.create_index("users", &index).unwrap();
        assert_eq!(
            first_sql(&script),
            "CREATE UNIQUE INDEX \"idx_users_email\" ON \"users\" (\"email\")"
        );
    }

    #[test]
    fn add_foreign_key_references_other_table() {
        let dialect = HsqlDialect::new();
        let fk = ForeignKey::new("fk_orders_user", vec!["user_id"], "users", vec!["id"]);
        let script = dialect.add_foreign_key("orders", &fk).unwrap();
        assert_eq!(
            first_sql(&script),
            "ALTER TABLE \"orders\" ADD CONSTRAINT \"fk_orders_user\" FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\")"
        );
    }

    #[test]
    fn insert_binds_positional_parameters() {
        let dialect = HsqlDialect::new();
        let data = vec![
            RecordEntry::new("name", SqlValue::Text("default".to_string())),
            RecordEntry::new("rank", SqlValue::Int(1)),
        ];
        let script = dialect.insert("roles", &data).unwrap();
        let statement = &script.statements()[0];
        assert_eq!(
            statement.sql(),
            "INSERT INTO \"roles\" (\"name\", \"rank\") VALUES (?, ?)"
        );
        assert_eq!(statement.parameters().len(), 2);
    }

    #[test]
    fn insert_without_data_is_a_validation_error() {
        let dialect = HsqlDialect::new();
        let result = dialect.insert("roles", &[]);
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Validation);
    }

    // ==================== Resolution Tests ====================

    fn configured_dialects() -> Vec<Box<dyn Dialect>> {
        vec![
            Box::new(PostgresDialect::new()),
            Box::new(MysqlDialect::new()),
            Box::new(HsqlDialect::new()),
        ]
    }

    #[test]
    fn resolve_picks_first_supporting_dialect() {
        let dialects = configured_dialects();
        let info = DatabaseInfo::new("PostgreSQL", 15, 2);
        let resolved = resolve_dialect(&dialects, &info).unwrap();
        assert_eq!(resolved.name(), "postgresql");
    }

    #[test]
    fn resolve_honours_declaration_order() {
        // Two dialects both match HSQLDB-like names; the first wins.
        let dialects: Vec<Box<dyn Dialect>> =
            vec![Box::new(HsqlDialect::new()), Box::new(HsqlDialect::new())];
        let info = DatabaseInfo::new("HSQL Database Engine", 2, 7);
        let resolved = resolve_dialect(&dialects, &info).unwrap();
        assert_eq!(resolved.name(), "hsql");
    }

    #[test]
    fn resolve_without_match_is_fatal() {
        let dialects = configured_dialects();
        let info = DatabaseInfo::new("Oracle", 19, 0);
        let err = resolve_dialect(&dialects, &info).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DialectResolution);
    }

    #[test]
    fn resolve_respects_version_capability() {
        let dialects = configured_dialects();
        // MySQL 5.7 predates RENAME COLUMN support and is rejected.
        let info = DatabaseInfo::new("MySQL", 5, 7);
        assert!(resolve_dialect(&dialects, &info).is_err());
    }
}
