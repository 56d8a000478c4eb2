//! Salto Confluence Adapter
//!
//! Confluence definitions on top of the adapter components:
//! - Type names of spaces, pages and templates
//! - The template body filter, linking storage format bodies to the pages
//!   and spaces they mention
//! - The adapter's change validators

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod constants;
pub mod filters;

pub use adapter::ConfluenceAdapter;
pub use filters::TemplateBodyFilter;
