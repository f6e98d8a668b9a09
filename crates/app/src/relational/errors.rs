//! Mapping of MySQL failures onto store errors

use sqlx::{error::ErrorKind, mysql::MySqlDatabaseError};

use carts::prelude::StoreError;

/// `ER_LOCK_WAIT_TIMEOUT`
const LOCK_WAIT_TIMEOUT: u16 = 1205;

/// `ER_LOCK_DEADLOCK`
const LOCK_DEADLOCK: u16 = 1213;

pub(crate) fn store_error(context: &'static str, error: sqlx::Error) -> StoreError {
    classify(&error).unwrap_or_else(|| StoreError::backend(context, error))
}

fn classify(error: &sqlx::Error) -> Option<StoreError> {
    let database = error.as_database_error()?;

    if let Some(mysql) = database.try_downcast_ref::<MySqlDatabaseError>() {
        match mysql.number() {
            LOCK_WAIT_TIMEOUT => return Some(StoreError::LockTimeout),
            LOCK_DEADLOCK => return Some(StoreError::Deadlock),
            _ => {}
        }
    }

    match database.kind() {
        ErrorKind::UniqueViolation
        | ErrorKind::ForeignKeyViolation
        | ErrorKind::NotNullViolation
        | ErrorKind::CheckViolation => Some(StoreError::Constraint(database.message().to_owned())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_backend_failures() {
        let error = store_error("failed to fetch cart", sqlx::Error::RowNotFound);

        assert!(
            matches!(
                error,
                StoreError::Backend { ref context, .. } if context == "failed to fetch cart"
            ),
            "expected Backend, got {error:?}"
        );
    }

    #[test]
    fn pool_timeouts_are_backend_failures() {
        let error = store_error("failed to begin transaction", sqlx::Error::PoolTimedOut);

        assert!(matches!(error, StoreError::Backend { .. }));
    }
}
