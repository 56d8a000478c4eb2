//! Element identifiers
//!
//! Every element is addressed by an [`ElemId`] whose full name has the form
//! `adapter.typeName[.idType.name...]`, for example `confluence.page` or
//! `confluence.page.instance.home`. Built-in primitive types live in the
//! global adapter (the empty string) and are named by their type alone.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Separator between the parts of a full name
pub const NAME_SEPARATOR: char = '.';

/// Adapter name used by built-in types
pub const GLOBAL_ADAPTER: &str = "";

/// Kind of element an ID points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElemIdType {
    /// A type (object or primitive)
    Type,
    /// An instance of a type
    Instance,
    /// A field of an object type
    Field,
    /// A type annotation value
    Attr,
    /// An annotation type definition
    Annotation,
    /// A workspace variable
    Var,
}

impl ElemIdType {
    /// Name of the ID type as it appears in full names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Instance => "instance",
            Self::Field => "field",
            Self::Attr => "attr",
            Self::Annotation => "annotation",
            Self::Var => "var",
        }
    }
}

impl FromStr for ElemIdType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "type" => Ok(Self::Type),
            "instance" => Ok(Self::Instance),
            "field" => Ok(Self::Field),
            "attr" => Ok(Self::Attr),
            "annotation" => Ok(Self::Annotation),
            "var" => Ok(Self::Var),
            other => Err(format!("unknown ID type '{other}'")),
        }
    }
}

/// Identifier of an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElemId {
    adapter: String,
    type_name: String,
    id_type: ElemIdType,
    name_parts: Vec<String>,
}

impl ElemId {
    /// Create the ID of a type
    pub fn new(adapter: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            type_name: type_name.into(),
            id_type: ElemIdType::Type,
            name_parts: vec![],
        }
    }

    /// Create the ID of an instance of `type_name`
    pub fn instance(
        adapter: impl Into<String>,
        type_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            adapter: adapter.into(),
            type_name: type_name.into(),
            id_type: ElemIdType::Instance,
            name_parts: vec![name.into()],
        }
    }

    /// Create an ID nested under this one
    ///
    /// Nesting under a type switches the ID type; nesting under anything else
    /// keeps the ID type and appends to the name.
    pub fn create_nested_id<I, S>(&self, id_type: ElemIdType, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts = parts.into_iter().map(Into::into);
        if self.id_type == ElemIdType::Type {
            Self {
                adapter: self.adapter.clone(),
                type_name: self.type_name.clone(),
                id_type,
                name_parts: parts.collect(),
            }
        } else {
            let mut name_parts = self.name_parts.clone();
            name_parts.extend(parts);
            Self {
                adapter: self.adapter.clone(),
                type_name: self.type_name.clone(),
                id_type: self.id_type,
                name_parts,
            }
        }
    }

    /// Adapter that owns the element
    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    /// Name of the element's type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Kind of element
    pub fn id_type(&self) -> ElemIdType {
        self.id_type
    }

    /// Name parts below the type
    pub fn name_parts(&self) -> &[String] {
        &self.name_parts
    }

    /// Last name part, or the type name for types
    pub fn name(&self) -> &str {
        self.name_parts
            .last()
            .map(String::as_str)
            .unwrap_or(self.type_name.as_str())
    }

    /// Whether the ID points at a top level element
    pub fn is_top_level(&self) -> bool {
        match self.id_type {
            ElemIdType::Type => true,
            ElemIdType::Instance | ElemIdType::Var => self.name_parts.len() == 1,
            _ => false,
        }
    }

    /// Dotted full name of the element
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.name_parts.len() + 3);
        if self.adapter != GLOBAL_ADAPTER {
            parts.push(&self.adapter);
        }
        parts.push(&self.type_name);
        if self.id_type != ElemIdType::Type {
            parts.push(self.id_type.as_str());
            parts.extend(self.name_parts.iter().map(String::as_str));
        }
        parts.join(".")
    }
}

impl fmt::Display for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl FromStr for ElemId {
    type Err = Error;

    fn from_str(full_name: &str) -> Result<Self> {
        let invalid = |message: String| Error::InvalidElemId {
            full_name: full_name.to_string(),
            message,
        };

        let parts: Vec<&str> = full_name.split(NAME_SEPARATOR).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("name parts must not be empty".to_string()));
        }

        // Global elements omit the adapter, so an ID type in second position
        // marks a name nested under a built-in type.
        if let [type_name, id_type, rest @ ..] = parts.as_slice()
            && !rest.is_empty()
            && let Ok(id_type) = id_type.parse::<ElemIdType>()
            && id_type != ElemIdType::Type
        {
            return Ok(Self::new(GLOBAL_ADAPTER, *type_name)
                .create_nested_id(id_type, rest.iter().copied()));
        }

        match parts.as_slice() {
            [type_name] => Ok(Self::new(GLOBAL_ADAPTER, *type_name)),
            [adapter, type_name] => Ok(Self::new(*adapter, *type_name)),
            [_, _, _] => Err(invalid("missing name after ID type".to_string())),
            [adapter, type_name, id_type, rest @ ..] => {
                let id_type: ElemIdType = id_type.parse().map_err(invalid)?;
                if id_type == ElemIdType::Type {
                    return Err(invalid("'type' cannot be nested".to_string()));
                }
                Ok(Self::new(*adapter, *type_name).create_nested_id(id_type, rest.iter().copied()))
            }
            [] => Err(invalid("empty name".to_string())),
        }
    }
}

impl Serialize for ElemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.full_name())
    }
}

impl<'de> Deserialize<'de> for ElemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let full_name = String::deserialize(deserializer)?;
        full_name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_type_full_name() {
        let id = ElemId::new("myAdapter", "obj");
        assert_eq!(id.full_name(), "myAdapter.obj");
        assert_eq!(id.id_type(), ElemIdType::Type);
        assert!(id.is_top_level());
    }

    #[test]
    fn test_instance_full_name() {
        let id = ElemId::instance("confluence", "page", "home");
        assert_eq!(id.full_name(), "confluence.page.instance.home");
        assert_eq!(id.type_name(), "page");
        assert_eq!(id.name(), "home");
    }

    #[test]
    fn test_global_type_has_no_adapter_prefix() {
        let id = ElemId::new(GLOBAL_ADAPTER, "string");
        assert_eq!(id.full_name(), "string");
    }

    #[test]
    fn test_nested_field_id() {
        let field = ElemId::new("netsuite", "file").create_nested_id(ElemIdType::Field, ["path"]);
        assert_eq!(field.full_name(), "netsuite.file.field.path");
        assert!(!field.is_top_level());
    }

    #[rstest]
    #[case("string")]
    #[case("netsuite.file")]
    #[case("confluence.space.instance.my_space")]
    #[case("netsuite.folder.field.path")]
    #[case("confluence.page.instance.home.body")]
    #[case("string.attr.x")]
    #[case("number.annotation.max.min")]
    fn test_parse_full_name(#[case] full_name: &str) {
        let id: ElemId = full_name.parse().unwrap();
        assert_eq!(id.full_name(), full_name);
    }

    #[rstest]
    #[case("")]
    #[case("a..b")]
    #[case("a.b.instance")]
    #[case("a.b.bogus.c")]
    #[case("a.b.type.c")]
    fn test_parse_invalid_full_name(#[case] full_name: &str) {
        let err = full_name.parse::<ElemId>().unwrap_err();
        assert!(matches!(err, Error::InvalidElemId { .. }));
    }

    #[test]
    fn test_nested_global_id_parses_back() {
        let id = ElemId::new(GLOBAL_ADAPTER, "string").create_nested_id(ElemIdType::Attr, ["x"]);
        assert_eq!(id.full_name(), "string.attr.x");
        let back: ElemId = id.full_name().parse().unwrap();
        assert_eq!(back, id);
        assert_eq!(back.adapter(), GLOBAL_ADAPTER);
    }

    #[test]
    fn test_serde_uses_full_name() {
        let id = ElemId::instance("confluence", "space", "s1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"confluence.space.instance.s1\"");
        let back: ElemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
