//! Domain entities and value objects of the catalog pipeline.

pub mod catalog;
pub mod merchant;
pub mod offer;
pub mod options;
pub mod staging;
pub mod types;
