//! Intermediate representation shared by reconciliation, filtering and assembly.

pub mod types;
pub mod validate;

pub use types::*;
