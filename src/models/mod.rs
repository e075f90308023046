pub mod catalog;
#[cfg(feature = "server")]
pub mod config;
pub mod merchant;
pub mod offer;
pub mod staging;
