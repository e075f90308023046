//! Core library exports for the catalog ingestion service.
//!
//! The `data` feature exposes the domain model and the Diesel persistence
//! layer. The default `server` feature adds the upstream storefront adapter,
//! the sync and review services and the JSON routes.

#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod source;
