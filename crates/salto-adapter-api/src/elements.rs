//! Element model
//!
//! Types declare the shape of a service resource: each [`ObjectType`] lists
//! its fields, the type each field refers to, and annotations such as
//! [`core_annotations::REQUIRED`] or a regex [`Restriction`]. Instances hold
//! the actual configuration values fetched from a service.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

use crate::elem_id::{ElemId, ElemIdType, GLOBAL_ADAPTER};
use crate::error::{Error, Result};
use crate::values::{ReferenceValue, Value, Values};

/// Annotation names understood by the platform core
pub mod core_annotations {
    /// The field must hold a value
    pub const REQUIRED: &str = "_required";
    /// Constraints on the field's value, see [`super::Restriction`]
    pub const RESTRICTION: &str = "_restriction";
    /// The value is kept out of the user's workspace
    pub const HIDDEN_VALUE: &str = "_hidden_value";
}

/// Primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Text
    String,
    /// Number
    Number,
    /// Boolean
    Boolean,
    /// Any value
    Unknown,
}

/// A primitive type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveType {
    /// Type ID
    #[serde(rename = "elemID")]
    pub elem_id: ElemId,
    /// Kind of values this type accepts
    pub primitive: PrimitiveKind,
    /// Type annotations
    #[serde(skip_serializing_if = "Values::is_empty")]
    pub annotations: Values,
}

impl PrimitiveType {
    /// Create a primitive type without annotations
    pub fn new(elem_id: ElemId, primitive: PrimitiveKind) -> Self {
        Self {
            elem_id,
            primitive,
            annotations: Values::new(),
        }
    }

    /// Whether a concrete value fits this primitive
    ///
    /// References and templates are accepted for any kind; they are checked
    /// once resolved.
    pub fn accepts(&self, value: &Value) -> bool {
        if matches!(value, Value::Reference(_) | Value::Template(_)) {
            return true;
        }
        match self.primitive {
            PrimitiveKind::String => matches!(value, Value::String(_)),
            PrimitiveKind::Number => matches!(value, Value::Number(_)),
            PrimitiveKind::Boolean => matches!(value, Value::Bool(_)),
            PrimitiveKind::Unknown => true,
        }
    }
}

/// Built-in primitive types of the global adapter
pub struct BuiltinTypes;

impl BuiltinTypes {
    /// `string`
    pub fn string() -> PrimitiveType {
        PrimitiveType::new(ElemId::new(GLOBAL_ADAPTER, "string"), PrimitiveKind::String)
    }

    /// `number`
    pub fn number() -> PrimitiveType {
        PrimitiveType::new(ElemId::new(GLOBAL_ADAPTER, "number"), PrimitiveKind::Number)
    }

    /// `boolean`
    pub fn boolean() -> PrimitiveType {
        PrimitiveType::new(ElemId::new(GLOBAL_ADAPTER, "boolean"), PrimitiveKind::Boolean)
    }

    /// `serviceid`, a string that identifies the element in its service
    pub fn service_id() -> PrimitiveType {
        PrimitiveType::new(ElemId::new(GLOBAL_ADAPTER, "serviceid"), PrimitiveKind::String)
    }

    /// `unknown`
    pub fn unknown() -> PrimitiveType {
        PrimitiveType::new(ElemId::new(GLOBAL_ADAPTER, "unknown"), PrimitiveKind::Unknown)
    }
}

/// The type a field refers to
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// A primitive type, carried inline
    Primitive(PrimitiveType),
    /// An object type, by ID
    Object(ElemId),
}

impl TypeRef {
    /// ID of the referenced type
    pub fn elem_id(&self) -> &ElemId {
        match self {
            Self::Primitive(primitive) => &primitive.elem_id,
            Self::Object(elem_id) => elem_id,
        }
    }
}

impl From<PrimitiveType> for TypeRef {
    fn from(primitive: PrimitiveType) -> Self {
        Self::Primitive(primitive)
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.elem_id().full_name())
    }
}

/// A field of an object type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Field name
    pub name: String,
    /// ID of the owning type
    #[serde(skip)]
    pub parent: ElemId,
    /// Type of the field's values
    #[serde(rename = "refType")]
    pub ref_type: TypeRef,
    /// Field annotations
    #[serde(skip_serializing_if = "Values::is_empty")]
    pub annotations: Values,
}

impl Field {
    /// ID of the field, `parent.field.name`
    pub fn elem_id(&self) -> ElemId {
        self.parent
            .create_nested_id(ElemIdType::Field, [self.name.as_str()])
    }

    /// Whether the field is annotated as required
    pub fn is_required(&self) -> bool {
        self.annotations
            .get(core_annotations::REQUIRED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the field's value is hidden from the workspace
    pub fn is_hidden_value(&self) -> bool {
        self.annotations
            .get(core_annotations::HIDDEN_VALUE)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The field's restriction annotation, if any
    pub fn restriction(&self) -> Result<Option<Restriction>> {
        Restriction::from_annotations(&self.annotations)
    }
}

/// A structured type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectType {
    /// Type ID
    #[serde(rename = "elemID")]
    pub elem_id: ElemId,
    /// Fields in declaration order
    pub fields: Vec<Field>,
    /// Type annotations
    #[serde(skip_serializing_if = "Values::is_empty")]
    pub annotations: Values,
    /// Workspace path the type is written to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl ObjectType {
    /// Create an object type without fields
    pub fn new(elem_id: ElemId) -> Self {
        Self {
            elem_id,
            fields: vec![],
            annotations: Values::new(),
            path: vec![],
        }
    }

    /// Add a field
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        ref_type: impl Into<TypeRef>,
        annotations: Values,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            parent: self.elem_id.clone(),
            ref_type: ref_type.into(),
            annotations,
        });
        self
    }

    /// Set the workspace path
    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An instance of an object type
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceElement {
    /// Instance ID, `adapter.type.instance.name`
    pub elem_id: ElemId,
    /// ID of the instance's type
    pub ref_type: ElemId,
    /// Configuration values
    pub value: Values,
    /// Instance annotations
    pub annotations: Values,
}

impl InstanceElement {
    /// Create an instance of `adapter.type_name`
    pub fn new(
        adapter: impl Into<String>,
        type_name: impl Into<String>,
        name: impl Into<String>,
        value: Values,
    ) -> Self {
        let ref_type = ElemId::new(adapter, type_name);
        let elem_id = ref_type.create_nested_id(ElemIdType::Instance, [name.into()]);
        Self {
            elem_id,
            ref_type,
            value,
            annotations: Values::new(),
        }
    }

    /// Create an instance from an instance ID
    pub fn from_elem_id(elem_id: ElemId, value: Values) -> Result<Self> {
        if elem_id.id_type() != ElemIdType::Instance || !elem_id.is_top_level() {
            return Err(Error::InvalidElemId {
                full_name: elem_id.full_name(),
                message: "expected a top level instance ID".to_string(),
            });
        }
        let ref_type = ElemId::new(elem_id.adapter(), elem_id.type_name());
        Ok(Self {
            elem_id,
            ref_type,
            value,
            annotations: Values::new(),
        })
    }

    /// Name of the instance's type
    pub fn type_name(&self) -> &str {
        self.elem_id.type_name()
    }
}

/// Any top level element
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Object type
    Object(ObjectType),
    /// Primitive type
    Primitive(PrimitiveType),
    /// Instance
    Instance(InstanceElement),
}

impl Element {
    /// ID of the element
    pub fn elem_id(&self) -> &ElemId {
        match self {
            Self::Object(obj) => &obj.elem_id,
            Self::Primitive(prim) => &prim.elem_id,
            Self::Instance(inst) => &inst.elem_id,
        }
    }

    /// The instance, if this is one
    pub fn as_instance(&self) -> Option<&InstanceElement> {
        match self {
            Self::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// The instance, mutably, if this is one
    pub fn as_instance_mut(&mut self) -> Option<&mut InstanceElement> {
        match self {
            Self::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// Whether this is an instance
    pub fn is_instance(&self) -> bool {
        matches!(self, Self::Instance(_))
    }

    /// The object type, if this is one
    pub fn as_object_type(&self) -> Option<&ObjectType> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Values that may hold references
    fn values_mut(&mut self) -> &mut Values {
        match self {
            Self::Object(obj) => &mut obj.annotations,
            Self::Primitive(prim) => &mut prim.annotations,
            Self::Instance(inst) => &mut inst.value,
        }
    }
}

impl From<InstanceElement> for Element {
    fn from(inst: InstanceElement) -> Self {
        Self::Instance(inst)
    }
}

impl From<ObjectType> for Element {
    fn from(obj: ObjectType) -> Self {
        Self::Object(obj)
    }
}

impl From<PrimitiveType> for Element {
    fn from(prim: PrimitiveType) -> Self {
        Self::Primitive(prim)
    }
}

/// Constraints on a field's value
///
/// Stored under [`core_annotations::RESTRICTION`]. A restriction with
/// `enforce_value: false` only produces warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
    /// Whether violations are errors (default) or warnings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_value: Option<bool>,
    /// Allowed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<serde_json::Value>>,
    /// Minimal numeric value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximal numeric value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Pattern string values must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    /// Maximal string length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl Restriction {
    /// Whether violations are errors
    pub fn is_enforced(&self) -> bool {
        self.enforce_value.unwrap_or(true)
    }

    /// Read the restriction annotation from a set of annotations
    pub fn from_annotations(annotations: &Values) -> Result<Option<Self>> {
        annotations
            .get(core_annotations::RESTRICTION)
            .map(|value| serde_json::from_value(value.to_json()).map_err(Error::from))
            .transpose()
    }
}

/// Render a restriction as an annotation value
pub fn create_restriction(restriction: Restriction) -> Value {
    serde_json::to_value(restriction)
        .ok()
        .and_then(|json| Value::from_json(json).ok())
        .unwrap_or_default()
}

/// Index top level elements by ID, as reference targets
pub fn index_elements(elements: &[Element]) -> HashMap<ElemId, Arc<Element>> {
    elements
        .iter()
        .map(|element| (element.elem_id().clone(), Arc::new(element.clone())))
        .collect()
}

/// Link unresolved references inside `element` to the elements of `targets`
///
/// Returns the IDs that could not be resolved.
pub fn link_references(
    element: &mut Element,
    targets: &HashMap<ElemId, Arc<Element>>,
) -> Vec<ElemId> {
    let mut missing = Vec::new();
    for value in element.values_mut().values_mut() {
        value.walk_references_mut(&mut |reference| {
            if !reference.is_unresolved() {
                return;
            }
            match targets.get(&reference.elem_id) {
                Some(target) => reference.value = ReferenceValue::Element(Arc::clone(target)),
                None => missing.push(reference.elem_id.clone()),
            }
        });
    }
    missing
}

/// Link unresolved references to the loaded top level elements they name
///
/// References are resolved against a snapshot of the elements taken before
/// linking, so references inside the snapshot itself stay unresolved.
/// Returns the IDs that could not be resolved.
pub fn resolve_references(elements: &mut [Element]) -> Vec<ElemId> {
    let index = index_elements(elements);
    let missing: Vec<ElemId> = elements
        .iter_mut()
        .flat_map(|element| link_references(element, &index))
        .collect();
    if !missing.is_empty() {
        tracing::debug!("{} references could not be resolved", missing.len());
    }
    missing
}
