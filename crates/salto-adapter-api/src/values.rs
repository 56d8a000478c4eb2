//! Element values
//!
//! Values are JSON-like trees that may additionally hold references to other
//! elements, template expressions (text interleaved with references) and
//! static files.
//!
//! # JSON interchange
//!
//! ```json
//! { "spaceId": { "$ref": "confluence.space.instance.s1" } }
//! { "body": { "$template": ["<p>", { "$ref": "confluence.page.instance.home" }, "</p>"] } }
//! { "content": { "$file": "netsuite/FileCabinet/a.js", "content": "x = 1" } }
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::elem_id::ElemId;
use crate::elements::{Element, InstanceElement};
use crate::error::{Error, Result};

/// Map of named values, the body of instances and annotations
pub type Values = BTreeMap<String, Value>;

const REF_KEY: &str = "$ref";
const TEMPLATE_KEY: &str = "$template";
const FILE_KEY: &str = "$file";

/// A value held by an element
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer or floating point number
    Number(serde_json::Number),
    /// Text
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// Nested map
    Map(Values),
    /// Reference to another element
    Reference(ReferenceExpression),
    /// Text interleaved with references
    Template(TemplateExpression),
    /// File content stored beside the element
    StaticFile(StaticFile),
}

/// Target of a reference
#[derive(Debug, Clone)]
pub enum ReferenceValue {
    /// The referenced element could not be found
    Unresolved,
    /// Snapshot of the referenced element
    Element(Arc<Element>),
}

/// A reference to another element
#[derive(Debug, Clone)]
pub struct ReferenceExpression {
    /// ID of the referenced element
    pub elem_id: ElemId,
    /// The referenced element, when resolved
    pub value: ReferenceValue,
}

impl ReferenceExpression {
    /// Reference a loaded element
    pub fn new(elem_id: ElemId, element: Arc<Element>) -> Self {
        Self {
            elem_id,
            value: ReferenceValue::Element(element),
        }
    }

    /// Reference an element that is not loaded
    pub fn unresolved(elem_id: ElemId) -> Self {
        Self {
            elem_id,
            value: ReferenceValue::Unresolved,
        }
    }

    /// Whether the referenced element is missing
    pub fn is_unresolved(&self) -> bool {
        matches!(self.value, ReferenceValue::Unresolved)
    }

    /// The referenced element, when resolved
    pub fn target(&self) -> Option<&Element> {
        match &self.value {
            ReferenceValue::Element(element) => Some(element.as_ref()),
            ReferenceValue::Unresolved => None,
        }
    }

    /// The referenced element when it is an instance
    pub fn target_instance(&self) -> Option<&InstanceElement> {
        self.target().and_then(Element::as_instance)
    }
}

impl PartialEq for ReferenceExpression {
    fn eq(&self, other: &Self) -> bool {
        self.elem_id == other.elem_id
    }
}

/// One piece of a template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text
    Text(String),
    /// Reference spliced into the text
    Reference(ReferenceExpression),
}

impl From<&str> for TemplatePart {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TemplatePart {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<ReferenceExpression> for TemplatePart {
    fn from(reference: ReferenceExpression) -> Self {
        Self::Reference(reference)
    }
}

/// Text interleaved with references
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateExpression {
    /// Parts in document order
    pub parts: Vec<TemplatePart>,
}

impl TemplateExpression {
    /// Create a template from its parts
    pub fn new(parts: Vec<TemplatePart>) -> Self {
        Self { parts }
    }

    /// References held by the template
    pub fn references(&self) -> impl Iterator<Item = &ReferenceExpression> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Reference(reference) => Some(reference),
            TemplatePart::Text(_) => None,
        })
    }
}

/// File content stored beside the element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    filepath: String,
    content: Vec<u8>,
    hash: String,
}

impl StaticFile {
    /// Create a static file, hashing its content
    pub fn new(filepath: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        let hash = hex::encode(Sha256::digest(&content));
        Self {
            filepath: filepath.into(),
            content,
            hash,
        }
    }

    /// Path of the file relative to the workspace
    pub fn filepath(&self) -> &str {
        &self.filepath
    }

    /// Raw content
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Hex SHA-256 of the content
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl Value {
    /// Text content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric content as a float, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Nested map, if this is a map
    pub fn as_map(&self) -> Option<&Values> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Mutable nested map, if this is a map
    pub fn as_map_mut(&mut self) -> Option<&mut Values> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Reference, if this is one
    pub fn as_reference(&self) -> Option<&ReferenceExpression> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Template, if this is one
    pub fn as_template(&self) -> Option<&TemplateExpression> {
        match self {
            Self::Template(template) => Some(template),
            _ => None,
        }
    }

    /// Whether the value is absent
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Look up a dotted path below this value
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        self.as_map().and_then(|map| get_path(map, path))
    }

    /// Visit every reference, including those inside templates
    pub fn walk_references<F: FnMut(&ReferenceExpression)>(&self, f: &mut F) {
        match self {
            Self::Reference(reference) => f(reference),
            Self::Template(template) => {
                for reference in template.references() {
                    f(reference);
                }
            }
            Self::List(items) => {
                for item in items {
                    item.walk_references(f);
                }
            }
            Self::Map(map) => {
                for item in map.values() {
                    item.walk_references(f);
                }
            }
            _ => {}
        }
    }

    /// Visit every reference mutably, including those inside templates
    pub fn walk_references_mut<F: FnMut(&mut ReferenceExpression)>(&mut self, f: &mut F) {
        match self {
            Self::Reference(reference) => f(reference),
            Self::Template(template) => {
                for part in &mut template.parts {
                    if let TemplatePart::Reference(reference) = part {
                        f(reference);
                    }
                }
            }
            Self::List(items) => {
                for item in items {
                    item.walk_references_mut(f);
                }
            }
            Self::Map(map) => {
                for item in map.values_mut() {
                    item.walk_references_mut(f);
                }
            }
            _ => {}
        }
    }

    /// Parse the JSON interchange form
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Ok(match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            serde_json::Value::Object(mut obj) => {
                if let Some(target) = obj.get(REF_KEY) {
                    return Ok(Self::Reference(parse_reference(target)?));
                }
                if let Some(parts) = obj.remove(TEMPLATE_KEY) {
                    return Ok(Self::Template(parse_template(parts)?));
                }
                if let Some(filepath) = obj.get(FILE_KEY) {
                    let filepath = filepath.as_str().ok_or_else(|| Error::InvalidValue {
                        message: format!("'{FILE_KEY}' must be a string"),
                    })?;
                    let content = obj
                        .get("content")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or_default();
                    return Ok(Self::StaticFile(StaticFile::new(filepath, content)));
                }
                Self::Map(
                    obj.into_iter()
                        .map(|(k, v)| Ok((k, Self::from_json(v)?)))
                        .collect::<Result<Values>>()?,
                )
            }
        })
    }

    /// Render the JSON interchange form
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::Reference(reference) => reference_json(reference),
            Self::Template(template) => {
                let parts = template
                    .parts
                    .iter()
                    .map(|part| match part {
                        TemplatePart::Text(text) => serde_json::Value::String(text.clone()),
                        TemplatePart::Reference(reference) => reference_json(reference),
                    })
                    .collect();
                serde_json::json!({ TEMPLATE_KEY: serde_json::Value::Array(parts) })
            }
            Self::StaticFile(file) => {
                serde_json::json!({
                    FILE_KEY: file.filepath(),
                    "content": String::from_utf8_lossy(file.content()),
                    "hash": file.hash(),
                })
            }
        }
    }
}

fn reference_json(reference: &ReferenceExpression) -> serde_json::Value {
    serde_json::json!({ REF_KEY: reference.elem_id.full_name() })
}

fn parse_reference(target: &serde_json::Value) -> Result<ReferenceExpression> {
    let full_name = target.as_str().ok_or_else(|| Error::InvalidValue {
        message: format!("'{REF_KEY}' must be an element full name"),
    })?;
    Ok(ReferenceExpression::unresolved(full_name.parse()?))
}

fn parse_template(parts: serde_json::Value) -> Result<TemplateExpression> {
    let serde_json::Value::Array(parts) = parts else {
        return Err(Error::InvalidValue {
            message: format!("'{TEMPLATE_KEY}' must be a list of parts"),
        });
    };
    let parts = parts
        .into_iter()
        .map(|part| match part {
            serde_json::Value::String(text) => Ok(TemplatePart::Text(text)),
            serde_json::Value::Object(obj) => match obj.get(REF_KEY) {
                Some(target) => Ok(TemplatePart::Reference(parse_reference(target)?)),
                None => Err(Error::InvalidValue {
                    message: "template parts must be strings or references".to_string(),
                }),
            },
            _ => Err(Error::InvalidValue {
                message: "template parts must be strings or references".to_string(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TemplateExpression::new(parts))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(json).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<Values> for Value {
    fn from(map: Values) -> Self {
        Self::Map(map)
    }
}

impl From<ReferenceExpression> for Value {
    fn from(reference: ReferenceExpression) -> Self {
        Self::Reference(reference)
    }
}

impl From<TemplateExpression> for Value {
    fn from(template: TemplateExpression) -> Self {
        Self::Template(template)
    }
}

/// Look up a dotted path in a map
pub fn get_path<'a>(values: &'a Values, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = values.get(segments.next()?)?;
    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}

/// Look up a dotted path in a map, mutably
pub fn get_path_mut<'a>(values: &'a mut Values, path: &str) -> Option<&'a mut Value> {
    let mut segments = path.split('.');
    let mut current = values.get_mut(segments.next()?)?;
    for segment in segments {
        current = current.as_map_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Set a dotted path in a map, creating missing intermediate maps
pub fn set_path(values: &mut Values, path: &str, value: Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = values;
    for segment in parents {
        let entry = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Map(Values::new()));
        current = entry.as_map_mut().ok_or_else(|| Error::InvalidPath {
            path: path.to_string(),
            segment: (*segment).to_string(),
        })?;
    }
    current.insert((*last).to_string(), value);
    Ok(())
}
