//! Salto Adapter API
//!
//! Shared vocabulary between the platform core and its adapters:
//! - Element IDs, types, instances and values
//! - Changes fed through validators and deploy filters
//! - Error values reported back to the user
//! - Validation of instances against their type declarations
//!
//! # Example
//!
//! ```rust,ignore
//! use salto_adapter_api::{ElemId, InstanceElement, to_change};
//!
//! let instance = InstanceElement::new("confluence", "space", "docs", values);
//! let change = to_change(None, Some(instance.into()))?;
//! assert_eq!(change.elem_id().full_name(), "confluence.space.instance.docs");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod change;
pub mod elem_id;
pub mod elements;
pub mod error;
pub mod salto_error;
pub mod validation;
pub mod values;

pub use change::{ActionName, Change, get_change_data, to_change};
pub use elem_id::{ElemId, ElemIdType};
pub use elements::{
    BuiltinTypes, Element, Field, InstanceElement, ObjectType, PrimitiveKind, PrimitiveType,
    Restriction, TypeRef, core_annotations, create_restriction, index_elements, link_references,
    resolve_references,
};
pub use error::{Error, Result};
pub use salto_error::{
    AnySaltoError, ChangeError, CredentialError, SaltoElementError, SaltoError, SaltoErrorType,
    SeverityLevel,
};
pub use values::{
    ReferenceExpression, ReferenceValue, StaticFile, TemplateExpression, TemplatePart, Value,
    Values,
};
