//! Embedded DDL for each supported backend.

/// PostgreSQL schema, created under the `regstat` schema.
pub const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

/// SQLite schema.
pub const SQLITE_SCHEMA: &str = include_str!("sqlite_schema.sql");

/// Database backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
}

impl Backend {
    /// Returns the DDL for this backend.
    #[must_use]
    pub const fn schema(self) -> &'static str {
        match self {
            Self::Postgres => POSTGRES_SCHEMA,
            Self::Sqlite => SQLITE_SCHEMA,
        }
    }
}

/// Splits a schema into individual statements, dropping comment-only chunks.
///
/// Prepared statements accept a single statement, so the DDL is applied one
/// statement at a time.
#[must_use]
pub fn statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}
