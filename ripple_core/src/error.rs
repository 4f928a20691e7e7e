use sea_orm::{DbErr, SqlErr};

/// True when the storage layer rejected a duplicate row.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// True when a unique violation names the given column.
///
/// SQLite reports the failing column as `table.column`, so callers can tell
/// which of several unique indexes fired.
pub fn unique_violation_on(err: &DbErr, column: &str) -> bool {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => message.contains(column),
        _ => false,
    }
}

/// True when the storage layer rejected a dangling foreign key reference.
pub fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
