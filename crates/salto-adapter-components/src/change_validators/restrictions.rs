//! Check instance changes against their type's declarations

use async_trait::async_trait;
use salto_adapter_api::validation::validate_instance;
use salto_adapter_api::{Change, ChangeError, ElemId, ObjectType, SeverityLevel};
use std::collections::HashMap;

use super::ChangeValidator;

/// Name under which the validator is registered
pub const RESTRICTIONS: &str = "restrictions";

/// Validates added and modified instances of known types
pub struct RestrictionValidator {
    types: HashMap<ElemId, ObjectType>,
}

impl RestrictionValidator {
    /// Validate instances of the given types; other instances pass
    pub fn new(types: impl IntoIterator<Item = ObjectType>) -> Self {
        Self {
            types: types
                .into_iter()
                .map(|obj| (obj.elem_id.clone(), obj))
                .collect(),
        }
    }
}

#[async_trait]
impl ChangeValidator for RestrictionValidator {
    async fn validate(&self, changes: &[Change]) -> Vec<ChangeError> {
        let mut errors = Vec::new();
        for change in changes.iter().filter(|c| c.is_addition_or_modification()) {
            let Some(instance) = change.data().as_instance() else {
                continue;
            };
            let Some(object_type) = self.types.get(&instance.ref_type) else {
                continue;
            };
            match validate_instance(instance, object_type) {
                Ok(found) => errors.extend(found.into_iter().map(|error| ChangeError {
                    elem_id: error.elem_id,
                    severity: error.severity,
                    detailed_message: error.message.clone(),
                    message: error.message,
                })),
                Err(e) => {
                    tracing::error!(
                        "failed to validate {} against {}: {}",
                        instance.elem_id,
                        object_type.elem_id,
                        e
                    );
                    errors.push(ChangeError {
                        elem_id: instance.elem_id.clone(),
                        severity: SeverityLevel::Warning,
                        message: "Could not validate instance restrictions".to_string(),
                        detailed_message: format!(
                            "Restrictions of {} could not be checked: {}",
                            object_type.elem_id, e
                        ),
                    });
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salto_adapter_api::{
        BuiltinTypes, InstanceElement, Restriction, Value, Values, core_annotations,
        create_restriction, to_change,
    };

    fn folder_type(pattern: &str) -> ObjectType {
        let mut annotations = Values::new();
        annotations.insert(
            core_annotations::RESTRICTION.to_string(),
            create_restriction(Restriction {
                regex: Some(pattern.to_string()),
                enforce_value: Some(true),
                ..Default::default()
            }),
        );
        ObjectType::new(ElemId::new("netsuite", "folder")).with_field(
            "path",
            BuiltinTypes::string(),
            annotations,
        )
    }

    fn folder_addition(path: &str) -> Change {
        let mut value = Values::new();
        value.insert("path".to_string(), Value::String(path.to_string()));
        let instance = InstanceElement::new("netsuite", "folder", "scripts", value);
        to_change(None, Some(instance.into())).unwrap()
    }

    #[tokio::test]
    async fn test_violations_become_change_errors() {
        let validator = RestrictionValidator::new([folder_type("^/.+")]);
        let errors = validator.validate(&[folder_addition("scripts")]).await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, SeverityLevel::Error);
        assert_eq!(
            errors[0].elem_id.full_name(),
            "netsuite.folder.instance.scripts.path"
        );
    }

    #[tokio::test]
    async fn test_malformed_regex_warns_instead_of_passing_silently() {
        let validator = RestrictionValidator::new([folder_type("[unclosed")]);
        let errors = validator.validate(&[folder_addition("/scripts")]).await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, SeverityLevel::Warning);
        assert_eq!(errors[0].elem_id.full_name(), "netsuite.folder.instance.scripts");
        assert!(errors[0].detailed_message.contains("netsuite.folder"));
    }
}
