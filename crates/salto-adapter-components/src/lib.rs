//! Salto Adapter Components
//!
//! Reusable pieces for building adapters:
//! - Filter hooks (`on_fetch`, `pre_deploy`, `on_deploy`) and their runner
//! - Change validators and their composition
//! - Template extraction and serialization utilities
//! - Adapter user configuration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Elements   │────▶│   Filters   │────▶│  Workspace  │
//! │  (fetched)  │     │  on_fetch   │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Changes   │────▶│ Validators  │────▶│  pre_deploy │──▶ service ──▶ on_deploy
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod change_validators;
pub mod config;
pub mod error;
pub mod filter;
pub mod templates;

pub use adapter::Adapter;
pub use change_validators::{ChangeValidator, CompositeChangeValidator, create_change_validator};
pub use config::{UserConfig, WorkspaceConfig};
pub use error::{Error, Result};
pub use filter::{Filter, FilterResult, FiltersRunner};
