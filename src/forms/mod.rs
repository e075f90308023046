//! Request payload parsing and validation.

pub mod review;
