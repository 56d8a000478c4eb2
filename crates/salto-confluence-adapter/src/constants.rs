//! Confluence names

use phf::phf_set;

/// Adapter name
pub const ADAPTER_NAME: &str = "confluence";

/// Type of space instances
pub const SPACE_TYPE_NAME: &str = "space";

/// Type of page instances
pub const PAGE_TYPE_NAME: &str = "page";

/// Types whose instances hold a storage format body
pub static TEMPLATE_TYPE_NAMES: phf::Set<&'static str> = phf_set! {
    "template",
    "global_template",
};

/// Path of the storage format text inside a template instance
pub const BODY_VALUE_PATH: &str = "body.storage.value";

/// Path of the map holding the storage format text
pub const BODY_STORAGE_PATH: &str = "body.storage";

/// Field of [`BODY_STORAGE_PATH`] holding the text
pub const BODY_VALUE_FIELD: &str = "value";
