use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The database rejected or failed a statement.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// A row required by the operation does not exist.
    #[error("entity not found")]
    NotFound,
    /// A stored value violates a domain constraint.
    #[error("validation error: {0}")]
    Validation(String),
    /// A JSON column could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenient alias for repository results.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
