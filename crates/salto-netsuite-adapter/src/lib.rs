//! Salto NetSuite Adapter
//!
//! Declarations of the NetSuite file cabinet: the `file` and `folder` object
//! types, their field types and the validators that check instances against
//! them before deploy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod constants;
pub mod types;

pub use adapter::NetsuiteAdapter;
pub use types::{file, file_cabinet_types, folder, is_file_cabinet_type};
