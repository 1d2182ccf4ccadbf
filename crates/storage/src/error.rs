use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    /// A second record for the same (name, segment) pair.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// True for the unique-index error in either form: raw Postgres 23505 or
    /// already mapped to `ConstraintViolation` by a store.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Database(sqlx::Error::Database(e)) => {
                e.code().as_deref() == Some("23505")
            }
            StorageError::ConstraintViolation(_) => true,
            _ => false,
        }
    }
}
