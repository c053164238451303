use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The database is temporarily unavailable: {0}")]
    Transient(String),
    #[error("The cart was modified by another request")]
    VersionConflict,
    #[error("A record with the same {0} already exists")]
    Duplicate(String),
    #[error("The referenced record does not exist: {0}")]
    MissingReference(String),
    #[error("Stored data could not be interpreted: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// True if retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Transient(e.to_string())
            },
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate(db.message().to_string()),
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::MissingReference(db.message().to_string())
            },
            sqlx::Error::Database(ref db) if is_busy(db.code().as_deref()) => StoreError::Transient(e.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::Corrupt(e.to_string()),
            _ => StoreError::DatabaseError(e.to_string()),
        }
    }
}

// SQLITE_BUSY and SQLITE_LOCKED, including their extended codes
fn is_busy(code: Option<&str>) -> bool {
    match code.and_then(|c| c.parse::<i32>().ok()) {
        Some(c) => matches!(c & 0xff, 5 | 6),
        None => false,
    }
}
