use thiserror::Error;

/// Error type returned by service layer functions.
///
/// Variants map one-to-one onto HTTP statuses through [`ServiceError::status_code`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// The request was malformed or violates a business rule.
    #[error("{0}")]
    BadRequest(String),
    /// The merchant's source configuration cannot be used.
    #[error("invalid source configuration: {0}")]
    ConfigInvalid(String),
    /// A sync for the same merchant is already running.
    #[error("a sync for this merchant is already running")]
    Conflict,
    /// Upstream failed terminally or kept failing after all retries.
    #[error("upstream failure: {0}")]
    UpstreamFatal(String),
    /// Upstream answered with GraphQL errors or without data.
    #[error("upstream protocol error: {0}")]
    ProtocolError(String),
    /// A blocking wait was cancelled.
    #[error("interrupted")]
    Interrupted,
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

impl ServiceError {
    /// HTTP status code reported at the transport boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::NotFound => 404,
            ServiceError::BadRequest(_) | ServiceError::ConfigInvalid(_) => 400,
            ServiceError::Conflict => 409,
            ServiceError::UpstreamFatal(_) | ServiceError::ProtocolError(_) => 502,
            ServiceError::Interrupted | ServiceError::Internal => 500,
        }
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
