//! Foundational data structures, error types and the decoded value tree.

pub mod error;
pub mod models;
pub mod value;
