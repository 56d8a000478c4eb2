//! Primitive types of NetSuite fields

use salto_adapter_api::{ElemId, PrimitiveKind, PrimitiveType};

use crate::constants::NETSUITE;

/// `netsuite.fileContent`, the content of a file cabinet file
pub fn file_content() -> PrimitiveType {
    PrimitiveType::new(ElemId::new(NETSUITE, "fileContent"), PrimitiveKind::Unknown)
}
