//! Business logic sitting between the HTTP routes and the repository.

pub mod admin;
pub mod clock;
pub mod errors;
pub mod review;
pub mod staging;
pub mod sync;

pub use errors::{ServiceError, ServiceResult};
