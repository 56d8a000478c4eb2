//! Instance validation against type declarations
//!
//! Checks required fields, primitive kinds and [`Restriction`] annotations.
//! Regex restrictions use search semantics: the pattern must match somewhere
//! in the value, so anchors belong in the pattern itself.

use regex::Regex;

use crate::elem_id::{ElemId, ElemIdType};
use crate::elements::{Field, InstanceElement, ObjectType, Restriction, TypeRef};
use crate::error::{Error, Result};
use crate::salto_error::{SaltoElementError, SeverityLevel};
use crate::values::Value;

/// A value that violates its type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// ID of the offending value
    pub elem_id: ElemId,
    /// `Error` for enforced constraints, `Warning` otherwise
    pub severity: SeverityLevel,
    /// Description of the violation
    pub message: String,
}

impl From<ValidationError> for SaltoElementError {
    fn from(error: ValidationError) -> Self {
        Self {
            message: error.message,
            severity: error.severity,
            error_type: None,
            elem_id: error.elem_id,
        }
    }
}

/// Validate an instance's top level values against its type
pub fn validate_instance(
    instance: &InstanceElement,
    object_type: &ObjectType,
) -> Result<Vec<ValidationError>> {
    let mut errors = Vec::new();
    for field in &object_type.fields {
        let elem_id = instance
            .elem_id
            .create_nested_id(ElemIdType::Instance, [field.name.as_str()]);
        match instance.value.get(&field.name).filter(|v| !v.is_null()) {
            None if field.is_required() => errors.push(ValidationError {
                elem_id,
                severity: SeverityLevel::Error,
                message: format!("Field {} is required but has no value", field.name),
            }),
            None => {}
            Some(value) => validate_field_value(field, value, elem_id, &mut errors)?,
        }
    }
    Ok(errors)
}

fn validate_field_value(
    field: &Field,
    value: &Value,
    elem_id: ElemId,
    errors: &mut Vec<ValidationError>,
) -> Result<()> {
    if let TypeRef::Primitive(primitive) = &field.ref_type {
        if !primitive.accepts(value) {
            errors.push(ValidationError {
                elem_id,
                severity: SeverityLevel::Error,
                message: format!(
                    "Invalid value type for {}: expected {}",
                    field.name,
                    primitive.elem_id.full_name()
                ),
            });
            return Ok(());
        }
    }

    let Some(restriction) = field.restriction()? else {
        return Ok(());
    };
    let severity = if restriction.is_enforced() {
        SeverityLevel::Error
    } else {
        SeverityLevel::Warning
    };
    for message in restriction_violations(&restriction, value)? {
        errors.push(ValidationError {
            elem_id: elem_id.clone(),
            severity,
            message,
        });
    }
    Ok(())
}

/// Describe every way `value` violates `restriction`
pub fn restriction_violations(restriction: &Restriction, value: &Value) -> Result<Vec<String>> {
    let mut violations = Vec::new();

    if let Some(allowed) = &restriction.values {
        let json = value.to_json();
        if !allowed.contains(&json) {
            let expected = serde_json::Value::Array(allowed.clone());
            violations.push(format!(
                "Value {json} is not valid for this field, expected one of: {expected}"
            ));
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(min) = restriction.min.filter(|min| number < *min) {
            violations.push(format!("Value {number} is less than the minimum {min}"));
        }
        if let Some(max) = restriction.max.filter(|max| number > *max) {
            violations.push(format!("Value {number} is greater than the maximum {max}"));
        }
    }

    if let Some(text) = value.as_str() {
        if let Some(pattern) = &restriction.regex {
            let re = Regex::new(pattern).map_err(|source| Error::InvalidRestriction {
                pattern: pattern.clone(),
                source,
            })?;
            if !re.is_match(text) {
                violations.push(format!(
                    "Value \"{text}\" is not valid for this field, it should match the regex \"{pattern}\""
                ));
            }
        }
        if let Some(max_length) = restriction.max_length {
            let length = text.chars().count();
            if length > max_length {
                violations.push(format!(
                    "Value length {length} exceeds the maximum length {max_length}"
                ));
            }
        }
    }

    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BuiltinTypes, core_annotations, create_restriction};
    use crate::values::Values;
    use rstest::rstest;
    use serde_json::json;

    fn annotations(json: serde_json::Value) -> Values {
        match Value::from_json(json).unwrap() {
            Value::Map(map) => map,
            other => panic!("expected map, got {other:?}"),
        }
    }

    fn path_restricted_type(enforce: bool) -> ObjectType {
        let mut field_annotations = annotations(json!({"_required": true}));
        field_annotations.insert(
            core_annotations::RESTRICTION.to_string(),
            create_restriction(Restriction {
                regex: Some("^/.+".to_string()),
                enforce_value: Some(enforce),
                ..Default::default()
            }),
        );
        ObjectType::new(ElemId::new("netsuite", "folder"))
            .with_field("path", BuiltinTypes::service_id(), field_annotations)
            .with_field("isinactive", BuiltinTypes::boolean(), Values::new())
    }

    fn folder(value: serde_json::Value) -> InstanceElement {
        InstanceElement::new("netsuite", "folder", "f", annotations(value))
    }

    #[test]
    fn test_valid_instance_has_no_errors() {
        let errors =
            validate_instance(&folder(json!({"path": "/SuiteScripts"})), &path_restricted_type(true))
                .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let errors = validate_instance(&folder(json!({})), &path_restricted_type(true)).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].elem_id.full_name(), "netsuite.folder.instance.f.path");
        assert!(errors[0].message.contains("required"));
    }

    #[rstest]
    #[case(true, SeverityLevel::Error)]
    #[case(false, SeverityLevel::Warning)]
    fn test_regex_violation_severity(#[case] enforce: bool, #[case] expected: SeverityLevel) {
        let errors = validate_instance(
            &folder(json!({"path": "SuiteScripts"})),
            &path_restricted_type(enforce),
        )
        .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, expected);
        assert!(errors[0].message.contains("^/.+"));
    }

    #[test]
    fn test_primitive_type_mismatch() {
        let errors = validate_instance(
            &folder(json!({"path": "/a", "isinactive": "no"})),
            &path_restricted_type(true),
        )
        .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("boolean"));
    }

    #[test]
    fn test_references_skip_restrictions() {
        let errors = validate_instance(
            &folder(json!({"path": {"$ref": "netsuite.folder.instance.other"}})),
            &path_restricted_type(true),
        )
        .unwrap();
        assert!(errors.is_empty());
    }

    #[rstest]
    #[case(json!(5), 1)]
    #[case(json!(0), 1)]
    #[case(json!(2), 0)]
    fn test_numeric_bounds(#[case] value: serde_json::Value, #[case] expected: usize) {
        let restriction = Restriction {
            min: Some(1.0),
            max: Some(3.0),
            ..Default::default()
        };
        let value = Value::from_json(value).unwrap();
        assert_eq!(restriction_violations(&restriction, &value).unwrap().len(), expected);
    }

    #[test]
    fn test_allowed_values_and_max_length() {
        let restriction = Restriction {
            values: Some(vec![json!("a"), json!("b")]),
            max_length: Some(1),
            ..Default::default()
        };
        assert!(restriction_violations(&restriction, &Value::from("a")).unwrap().is_empty());
        assert_eq!(restriction_violations(&restriction, &Value::from("cc")).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let restriction = Restriction {
            regex: Some("[unclosed".to_string()),
            ..Default::default()
        };
        let err = restriction_violations(&restriction, &Value::from("x")).unwrap_err();
        assert!(matches!(err, Error::InvalidRestriction { .. }));
    }
}
