use crate::definition::{Column, ColumnType};
use crate::dialect::Dialect;
use crate::errors::SchevoResult;
use crate::script::{Script, SqlStatement, SqlValue};

/// Dialect for MySQL 8.0 and later.
///
/// Diverges from the SQL-92 defaults in most of the places MySQL
/// traditionally does: backtick quoting, `RENAME TABLE`, `MODIFY` for
/// column changes, `DROP INDEX ... ON table`, `DROP FOREIGN KEY`, and a
/// handful of type-map overrides. MySQL has no sequences, so
/// `create_auto_increment_sequence` renders a single-row counter table
/// instead.
///
/// Versions before 8.0 are rejected by `supports()` because the engine
/// relies on `RENAME COLUMN`.
#[derive(Debug, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    pub fn new() -> Self {
        MysqlDialect
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn supports(&self, product_name: &str, major_version: u32, _minor_version: u32) -> bool {
        product_name.eq_ignore_ascii_case("mysql") && major_version >= 8
    }

    fn quote(&self, identifier: &str) -> String {
        format!("`{}`", identifier)
    }

    fn type_name(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Char => "CHAR".to_string(),
            ColumnType::Varchar => "VARCHAR".to_string(),
            ColumnType::Text => "LONGTEXT".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::Integer => "INT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Numeric { precision, scale } => {
                format!("DECIMAL({}, {})", precision, scale)
            }
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Timestamp => "DATETIME".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
        }
    }

    fn identity_clause(&self) -> Option<&str> {
        Some("AUTO_INCREMENT")
    }

    fn rename_table(&self, name: &str, rename_to: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "RENAME TABLE {} TO {}",
            self.quote(name),
            self.quote(rename_to)
        )))
    }

    fn modify_column(&self, table: &str, column: &Column) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "ALTER TABLE {} MODIFY {}",
            self.quote(table),
            self.column_definition(column)
        )))
    }

    fn drop_index(&self, table: &str, name: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "DROP INDEX {} ON {}",
            self.quote(name),
            self.quote(table)
        )))
    }

    fn drop_foreign_key(&self, table: &str, name: &str) -> SchevoResult<Script> {
        Ok(Script::single(&format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.quote(table),
            self.quote(name)
        )))
    }

    fn create_auto_increment_sequence(&self, name: &str) -> SchevoResult<Script> {
        // Emulated: one counter row in a dedicated table.
        let mut script = Script::single(&format!(
            "CREATE TABLE {} (`seq_value` BIGINT NOT NULL)",
            self.quote(name)
        ));
        script.push(SqlStatement::with_parameters(
            &format!("INSERT INTO {} (`seq_value`) VALUES (?)", self.quote(name)),
            vec![SqlValue::Int(0)],
        ));
        Ok(script)
    }
}
