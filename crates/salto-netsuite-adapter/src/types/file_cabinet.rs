//! File cabinet types
//!
//! Files and folders are identified by their absolute path in the file
//! cabinet; `internalId` is kept out of the workspace.

use phf::phf_set;
use salto_adapter_api::core_annotations::{HIDDEN_VALUE, REQUIRED, RESTRICTION};
use salto_adapter_api::{
    BuiltinTypes, ElemId, ObjectType, Restriction, Value, Values, create_restriction,
};

use super::field_types;
use crate::constants::{FILE, FOLDER, NETSUITE, PATH_REGEX, TYPES_PATH};

static FILE_CABINET_TYPE_NAMES: phf::Set<&'static str> = phf_set! {
    "file",
    "folder",
};

fn no_annotations() -> Values {
    Values::new()
}

fn path_annotations() -> Values {
    Values::from([
        (REQUIRED.to_string(), Value::Bool(true)),
        (
            RESTRICTION.to_string(),
            create_restriction(Restriction {
                regex: Some(PATH_REGEX.to_string()),
                ..Default::default()
            }),
        ),
    ])
}

fn hidden_annotations() -> Values {
    Values::from([(HIDDEN_VALUE.to_string(), Value::Bool(true))])
}

fn file_cabinet_type(type_name: &str) -> ObjectType {
    ObjectType::new(ElemId::new(NETSUITE, type_name))
        .with_path([NETSUITE, TYPES_PATH, type_name])
        .with_field("path", BuiltinTypes::service_id(), path_annotations())
}

/// A file in the file cabinet
pub fn file() -> ObjectType {
    file_cabinet_type(FILE)
        .with_field("content", field_types::file_content(), no_annotations())
        .with_field("availablewithoutlogin", BuiltinTypes::boolean(), no_annotations())
        .with_field("bundleable", BuiltinTypes::boolean(), no_annotations())
        .with_field("description", BuiltinTypes::string(), no_annotations())
        .with_field("generateurltimestamp", BuiltinTypes::boolean(), no_annotations())
        .with_field("hideinbundle", BuiltinTypes::boolean(), no_annotations())
        .with_field("isinactive", BuiltinTypes::boolean(), no_annotations())
        .with_field("internalId", BuiltinTypes::string(), hidden_annotations())
}

/// A folder in the file cabinet
pub fn folder() -> ObjectType {
    file_cabinet_type(FOLDER)
        .with_field("bundleable", BuiltinTypes::boolean(), no_annotations())
        .with_field("description", BuiltinTypes::string(), no_annotations())
        .with_field("isinactive", BuiltinTypes::boolean(), no_annotations())
        .with_field("isprivate", BuiltinTypes::boolean(), no_annotations())
        .with_field("internalId", BuiltinTypes::string(), hidden_annotations())
}

/// All file cabinet types
pub fn file_cabinet_types() -> Vec<ObjectType> {
    vec![file(), folder()]
}

/// Whether `type_name` is a file cabinet type
pub fn is_file_cabinet_type(type_name: &str) -> bool {
    FILE_CABINET_TYPE_NAMES.contains(type_name)
}
