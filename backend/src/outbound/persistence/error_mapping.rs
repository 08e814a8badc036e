//! Diesel and pool error mapping shared by every repository.
//!
//! Each port error enum exposes `connection` and `query` constructors, so the
//! helpers take those constructors instead of naming a concrete error type.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::RowConversionError;
use super::pool::PoolError;

/// Map a pool failure through the port's connection constructor.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.into_message())
}

/// Map a Diesel failure to the port's connection or query constructor.
///
/// A closed connection counts as a connection failure; everything else is a
/// query failure carrying the database's message.
pub(crate) fn map_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => query(info.message().to_owned()),
        DieselError::NotFound => query("record not found".to_owned()),
        other => query(other.to_string()),
    }
}

/// Map a corrupt row to the port's query constructor.
pub(crate) fn map_row_error<E>(error: RowConversionError, query: impl FnOnce(String) -> E) -> E {
    query(error.to_string())
}

/// Whether `error` is a unique violation of the named constraint.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

#[cfg(test)]
mod tests {
    //! Regression coverage for repository error mapping.
    use rstest::rstest;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(String),
        Connection(String),
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        let mapped = map_diesel_error(DieselError::NotFound, Mapped::Query, Mapped::Connection);
        assert_eq!(mapped, Mapped::Query("record not found".to_owned()));
    }

    #[rstest]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(
            &DieselError::NotFound,
            "quote_responses_order_key"
        ));
    }
}
