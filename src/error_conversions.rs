//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or service error types, so
//! the `From` impls connecting them live here.

use crate::domain::types::TypeConstraintError;
use crate::repository::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::Validation(val.to_string())
    }
}

#[cfg(feature = "server")]
mod server {
    use crate::domain::types::TypeConstraintError;
    use crate::forms::review::ReviewFormError;
    use crate::repository::RepositoryError;
    use crate::services::ServiceError;
    use crate::source::SourceError;

    impl From<TypeConstraintError> for ServiceError {
        fn from(val: TypeConstraintError) -> Self {
            ServiceError::BadRequest(val.to_string())
        }
    }

    impl From<ReviewFormError> for ServiceError {
        fn from(val: ReviewFormError) -> Self {
            ServiceError::BadRequest(val.to_string())
        }
    }

    impl From<RepositoryError> for ServiceError {
        fn from(val: RepositoryError) -> Self {
            match val {
                RepositoryError::NotFound => ServiceError::NotFound,
                other => {
                    log::error!("Repository failure: {other}");
                    ServiceError::Internal
                }
            }
        }
    }

    impl From<SourceError> for ServiceError {
        fn from(val: SourceError) -> Self {
            match val {
                SourceError::ConfigInvalid(message) => ServiceError::ConfigInvalid(message),
                SourceError::Protocol(message) => ServiceError::ProtocolError(message),
                SourceError::Interrupted => ServiceError::Interrupted,
                other @ (SourceError::AuthFailed(_)
                | SourceError::RateLimited { .. }
                | SourceError::UpstreamUnavailable { .. }
                | SourceError::Rejected { .. }
                | SourceError::Transport(_)) => ServiceError::UpstreamFatal(other.to_string()),
            }
        }
    }
}
