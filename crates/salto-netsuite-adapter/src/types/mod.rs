//! NetSuite type definitions

pub mod field_types;
pub mod file_cabinet;

pub use file_cabinet::{file, file_cabinet_types, folder, is_file_cabinet_type};
