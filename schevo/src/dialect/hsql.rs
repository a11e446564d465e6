use crate::dialect::Dialect;

/// Dialect for HSQLDB 2.x.
///
/// HSQLDB tracks SQL-92 closely, so this dialect is essentially the trait
/// defaults plus an inline identity clause.
#[derive(Debug, Default)]
pub struct HsqlDialect;

impl HsqlDialect {
    pub fn new() -> Self {
        HsqlDialect
    }
}

impl Dialect for HsqlDialect {
    fn name(&self) -> &str {
        "hsql"
    }

    fn supports(&self, product_name: &str, major_version: u32, _minor_version: u32) -> bool {
        product_name.starts_with("HSQL") && major_version >= 2
    }

    fn identity_clause(&self) -> Option<&str> {
        Some("GENERATED BY DEFAULT AS IDENTITY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Column, ColumnType};

    #[test]
    fn supports_hsqldb_two_and_later() {
        let dialect = HsqlDialect::new();
        assert!(dialect.supports("HSQL Database Engine", 2, 7));
        assert!(!dialect.supports("HSQL Database Engine", 1, 8));
        assert!(!dialect.supports("PostgreSQL", 15, 0));
    }

    #[test]
    fn auto_increment_uses_identity() {
        let dialect = HsqlDialect::new();
        let column = Column::new("id", ColumnType::BigInt).not_null().auto_increment();
        assert_eq!(
            dialect.column_definition(&column),
            "\"id\" BIGINT NOT NULL GENERATED BY DEFAULT AS IDENTITY"
        );
    }
}
