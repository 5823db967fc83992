//! Shared Diesel error mapping for store adapters.
//!
//! Adapter error types implement `From<diesel::result::Error>` so that `?`
//! inside a transaction block aborts the transaction and surfaces a
//! domain-port error. Unique and foreign-key violations are classified as
//! conflicts; everything else degrades to a query or connection failure.

use tracing::debug;

use crate::domain::ports::{
    BatchStoreError, CourseStoreError, SyllabusStoreError, UserStoreError,
};

use super::pool::PoolError;

/// Backend-agnostic classification of a Diesel failure.
pub(crate) enum StoreFailure {
    Conflict(String),
    Connection(String),
    Query(String),
}

/// Classify a Diesel error, logging the underlying cause at debug level.
pub(crate) fn classify_diesel_error(error: diesel::result::Error) -> StoreFailure {
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
        DieselError::NotFound => StoreFailure::Query("record not found".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreFailure::Conflict(match info.constraint_name() {
                Some(constraint) => format!("unique constraint {constraint} violated"),
                None => "unique constraint violated".to_owned(),
            })
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreFailure::Conflict(match info.constraint_name() {
                Some(constraint) => format!("foreign key constraint {constraint} violated"),
                None => "foreign key constraint violated".to_owned(),
            })
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFailure::Connection("database connection error".to_owned())
        }
        DieselError::QueryBuilderError(_) => StoreFailure::Query("database query error".to_owned()),
        _ => StoreFailure::Query("database error".to_owned()),
    }
}

fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

impl From<PoolError> for UserStoreError {
    fn from(error: PoolError) -> Self {
        Self::connection(pool_error_message(error))
    }
}

impl From<diesel::result::Error> for UserStoreError {
    fn from(error: diesel::result::Error) -> Self {
        match classify_diesel_error(error) {
            // The only unique constraint on the user aggregate is the email.
            StoreFailure::Conflict(constraint) if constraint.contains("email") => {
                Self::conflict("email already registered")
            }
            StoreFailure::Conflict(message) => Self::conflict(message),
            StoreFailure::Connection(message) => Self::connection(message),
            StoreFailure::Query(message) => Self::query(message),
        }
    }
}

impl From<PoolError> for CourseStoreError {
    fn from(error: PoolError) -> Self {
        Self::connection(pool_error_message(error))
    }
}

impl From<diesel::result::Error> for CourseStoreError {
    fn from(error: diesel::result::Error) -> Self {
        match classify_diesel_error(error) {
            StoreFailure::Conflict(message) => Self::conflict(message),
            StoreFailure::Connection(message) => Self::connection(message),
            StoreFailure::Query(message) => Self::query(message),
        }
    }
}

impl From<PoolError> for BatchStoreError {
    fn from(error: PoolError) -> Self {
        Self::connection(pool_error_message(error))
    }
}

impl From<diesel::result::Error> for BatchStoreError {
    fn from(error: diesel::result::Error) -> Self {
        match classify_diesel_error(error) {
            // Reference checks run before bridge writes, so a surviving
            // constraint violation is a store-level anomaly, not bad input.
            StoreFailure::Conflict(message) | StoreFailure::Query(message) => Self::query(message),
            StoreFailure::Connection(message) => Self::connection(message),
        }
    }
}

impl From<PoolError> for SyllabusStoreError {
    fn from(error: PoolError) -> Self {
        Self::connection(pool_error_message(error))
    }
}

impl From<diesel::result::Error> for SyllabusStoreError {
    fn from(error: diesel::result::Error) -> Self {
        match classify_diesel_error(error) {
            StoreFailure::Conflict(message) | StoreFailure::Query(message) => Self::query(message),
            StoreFailure::Connection(message) => Self::connection(message),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error classification.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct FakeErrorInformation {
        constraint: Option<&'static str>,
    }

    impl diesel::result::DatabaseErrorInformation for FakeErrorInformation {
        fn message(&self) -> &str {
            "constraint violated"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(FakeErrorInformation { constraint }),
        )
    }

    #[rstest]
    fn duplicate_email_maps_to_a_named_conflict() {
        let error = UserStoreError::from(unique_violation(Some("users_email_key")));
        assert_eq!(error, UserStoreError::conflict("email already registered"));
    }

    #[rstest]
    fn anonymous_unique_violation_keeps_the_generic_message() {
        let error = UserStoreError::from(unique_violation(None));
        assert!(matches!(error, UserStoreError::Conflict { .. }));
        assert!(error.to_string().contains("unique constraint violated"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let error = CourseStoreError::from(DieselError::NotFound);
        assert!(matches!(error, CourseStoreError::Query { .. }));
        assert!(error.to_string().contains("record not found"));
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let error = BatchStoreError::from(PoolError::checkout("connection refused"));
        assert!(matches!(error, BatchStoreError::Connection { .. }));
        assert!(error.to_string().contains("connection refused"));
    }
}
