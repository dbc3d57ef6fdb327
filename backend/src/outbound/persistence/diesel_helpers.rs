//! Shared helpers for the Diesel adapters: error mapping, counts and page
//! windows.

use pagination::PageRequest;
use tracing::debug;

use crate::domain::ports::PersistenceError;

/// Map a Diesel failure onto [`PersistenceError`].
///
/// Unique violations become [`PersistenceError::Duplicate`] so services can
/// report conflicts; a closed connection is a connection failure; everything
/// else is a query failure.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> PersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => PersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PersistenceError::duplicate(info.message().to_owned())
        }
        DieselError::DatabaseError(_, _) => PersistenceError::query("database error"),
        _ => PersistenceError::query("database error"),
    }
}

/// Convert a row count reported by SQLite into the port's unsigned count.
pub(crate) fn affected(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}

/// Convert a `COUNT(*)` result into the port's unsigned count.
pub(crate) fn count(total: i64) -> u64 {
    u64::try_from(total).unwrap_or_default()
}

/// `LIMIT` and `OFFSET` values for a page request.
pub(crate) fn page_window(page: PageRequest) -> (i64, i64) {
    (i64::from(page.limit()), i64::from(page.offset()))
}

/// `LIKE` pattern matching `term` anywhere in a column.
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    #[case(DieselError::NotFound, "record not found")]
    #[case(DieselError::RollbackTransaction, "database error")]
    fn non_database_errors_are_query_failures(
        #[case] error: DieselError,
        #[case] expected: &str,
    ) {
        let mapped = map_diesel_error(error);
        assert_eq!(mapped, PersistenceError::query(expected));
    }

    #[test]
    fn closed_connections_are_connection_failures() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("connection closed".to_owned()),
        );
        assert!(matches!(
            map_diesel_error(error),
            PersistenceError::Connection { .. }
        ));
    }

    #[test]
    fn unique_violations_are_duplicates() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("UNIQUE constraint failed: users.email".to_owned()),
        );
        assert_eq!(
            map_diesel_error(error),
            PersistenceError::duplicate("UNIQUE constraint failed: users.email")
        );
    }

    #[test]
    fn page_window_uses_the_clamped_limit() {
        assert_eq!(page_window(PageRequest::new(500, 40)), (100, 40));
    }

    #[rstest]
    #[case("phone", "%phone%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    fn like_patterns_escape_wildcards(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(term), expected);
    }

    #[rstest]
    #[case(-1, 0)]
    #[case(0, 0)]
    #[case(42, 42)]
    fn counts_never_go_negative(#[case] total: i64, #[case] expected: u64) {
        assert_eq!(count(total), expected);
    }
}
