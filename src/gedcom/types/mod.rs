//! Foundational data structures, error types, and parse options.

pub mod error;
pub mod models;
pub mod record;
