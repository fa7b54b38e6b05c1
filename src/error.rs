// Store errors - shared by the Type Catalog and the Entry Store

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before or by the store (length, empty, UNIQUE)
    #[error("{0}")]
    Validation(String),

    /// Id did not resolve to a record
    #[error("{0}")]
    NotFound(&'static str),

    /// Entry type names no existing DataType
    #[error("Invalid data type")]
    InvalidReference,

    #[error(transparent)]
    Storage(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Validation(err.to_string())
            }
            other => StoreError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_constraint_violation_becomes_validation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (name TEXT UNIQUE)", []).unwrap();
        conn.execute("INSERT INTO t (name) VALUES ('a')", []).unwrap();

        let err: StoreError = conn
            .execute("INSERT INTO t (name) VALUES ('a')", [])
            .unwrap_err()
            .into();

        match err {
            StoreError::Validation(msg) => assert!(msg.contains("UNIQUE"), "got: {}", msg),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_other_failures_stay_storage() {
        let conn = Connection::open_in_memory().unwrap();
        let err: StoreError = conn
            .execute("SELECT * FROM missing_table", [])
            .unwrap_err()
            .into();

        assert!(matches!(err, StoreError::Storage(_)));
    }
}
