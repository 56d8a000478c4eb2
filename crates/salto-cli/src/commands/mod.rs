//! CLI command implementations

pub mod fetch;
pub mod plan;
pub mod types;
pub mod validate;
