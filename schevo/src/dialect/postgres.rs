use crate::definition::{Column, ColumnType};
use crate::dialect::Dialect;
use crate::errors::SchevoResult;
use crate::script::Script;

/// Dialect for PostgreSQL 9 and later.
///
/// The one real divergence from the defaults is `modify_column`:
/// PostgreSQL cannot redefine a column in a single clause, so the change
/// is decomposed into `ALTER COLUMN ... TYPE`, a nullability statement,
/// and a default statement. Auto-increment is handled via sequences, not
/// an inline identity clause.
#[derive(Debug, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    pub fn new() -> Self {
        PostgresDialect
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgresql"
    }

    fn supports(&self, product_name: &str, major_version: u32, _minor_version: u32) -> bool {
        product_name.eq_ignore_ascii_case("postgresql") && major_version >= 9
    }

    fn type_name(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Char => "CHAR".to_string(),
            ColumnType::Varchar => "VARCHAR".to_string(),
            ColumnType::Text => "TEXT".to_string(),
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
            ColumnType::Binary => "BYTEA".to_string(),
        }
    }

    fn modify_column(&self, table: &str, column: &Column) -> SchevoResult<Script> {
        let table_ref = self.quote(table);
        let column_ref = self.quote(&column.name);

        let mut script = Script::single(&format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            table_ref,
            column_ref,
            self.rendered_type(column)
        ));
        let nullability = if column.not_null { "SET NOT NULL" } else { "DROP NOT NULL" };
        script.append(Script::single(&format!(
            "ALTER TABLE {} ALTER COLUMN {} {}",
            table_ref, column_ref, nullability
        )));
        match &column.default_value {
            Some(default) => script.append(Script::single(&format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}",
                table_ref, column_ref, default
            ))),
            None => script.append(Script::single(&format!(
                "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
                table_ref, column_ref
            ))),
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SqlValue;

    #[test]
    fn supports_postgres_nine_and_later() {
        let dialect = PostgresDialect::new();
        assert!(dialect.supports("PostgreSQL", 15, 2));
        assert!(dialect.supports("postgresql", 9, 6));
        assert!(!dialect.supports("PostgreSQL", 8, 4));
        assert!(!dialect.supports("MySQL", 8, 0));
    }

    #[test]
    fn modify_column_decomposes_into_three_statements() {
        let dialect = PostgresDialect::new();
        let column = Column::new("status", ColumnType::Varchar)
            .with_length(32)
            .not_null()
            .with_default(SqlValue::Text("new".to_string()));
        let script = dialect.modify_column("orders", &column).unwrap();
        let sql: Vec<&str> = script.statements().iter().map(|s| s.sql()).collect();
        assert_eq!(
            sql,
            vec![
                "ALTER TABLE \"orders\" ALTER COLUMN \"status\" TYPE VARCHAR(32)",
                "ALTER TABLE \"orders\" ALTER COLUMN \"status\" SET NOT NULL",
                "ALTER TABLE \"orders\" ALTER COLUMN \"status\" SET DEFAULT 'new'",
            ]
        );
    }

    #[test]
    fn modify_nullable_column_drops_not_null_and_default() {
        let dialect = PostgresDialect::new();
        let column = Column::new("notes", ColumnType::Text);
        let script = dialect.modify_column("orders", &column).unwrap();
        let sql: Vec<&str> = script.statements().iter().map(|s| s.sql()).collect();
        assert_eq!(
            sql,
            vec![
                "ALTER TABLE \"orders\" ALTER COLUMN \"notes\" TYPE TEXT",
                "ALTER TABLE \"orders\" ALTER COLUMN \"notes\" DROP NOT NULL",
                "ALTER TABLE \"orders\" ALTER COLUMN \"notes\" DROP DEFAULT",
            ]
        );
    }

    #[test]
    fn text_and_binary_map_to_native_types() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.type_name(&ColumnType::Text), "TEXT");
        assert_eq!(dialect.type_name(&ColumnType::Binary), "BYTEA");
    }
}
