//! Integration tests for change validator composition

use salto_adapter_api::{ChangeError, ElemId, ObjectType, SeverityLevel, to_change};
use salto_adapter_components::change_validators::{
    ChangeValidator, DEPLOY_NOT_SUPPORTED, DeployNotSupportedValidator, NamedValidators,
    create_change_validator,
};
use salto_adapter_components::config::ValidatorsActivationConfig;

fn validators() -> NamedValidators {
    vec![(
        DEPLOY_NOT_SUPPORTED.to_string(),
        Box::new(DeployNotSupportedValidator) as Box<dyn ChangeValidator>,
    )]
}

fn expected_error(name: &str) -> ChangeError {
    ChangeError {
        elem_id: ElemId::new("myAdapter", name),
        severity: SeverityLevel::Error,
        message: "Salto does not support myAdapter deployments.".to_string(),
        detailed_message: "Salto does not support myAdapter deployments. Please see https://help.salto.io/en/articles/6927118-supported-business-applications for more details.".to_string(),
    }
}

#[tokio::test]
async fn test_deploy_not_supported_without_changes() {
    let validator = create_change_validator(validators(), &ValidatorsActivationConfig::new());
    assert_eq!(validator.validate(&[]).await, vec![]);
}

#[tokio::test]
async fn test_deploy_not_supported_fails_each_change_individually() {
    let validator = create_change_validator(validators(), &ValidatorsActivationConfig::new());
    let changes = vec![
        to_change(None, Some(ObjectType::new(ElemId::new("myAdapter", "obj")).into())).unwrap(),
        to_change(Some(ObjectType::new(ElemId::new("myAdapter", "obj2")).into()), None).unwrap(),
    ];

    let errors = validator.validate(&changes).await;

    assert_eq!(errors, vec![expected_error("obj"), expected_error("obj2")]);
}

#[tokio::test]
async fn test_deploy_not_supported_can_be_disabled() {
    let config: ValidatorsActivationConfig =
        [(DEPLOY_NOT_SUPPORTED.to_string(), false)].into_iter().collect();
    let validator = create_change_validator(validators(), &config);
    let changes =
        vec![to_change(None, Some(ObjectType::new(ElemId::new("myAdapter", "obj")).into())).unwrap()];
    assert!(validator.validate(&changes).await.is_empty());
}

#[tokio::test]
async fn test_errors_serialize_like_the_platform_expects() {
    let validator = create_change_validator(validators(), &ValidatorsActivationConfig::new());
    let changes =
        vec![to_change(None, Some(ObjectType::new(ElemId::new("myAdapter", "obj")).into())).unwrap()];
    let json = serde_json::to_value(validator.validate(&changes).await).unwrap();
    assert_eq!(json[0]["elemID"], "myAdapter.obj");
    assert_eq!(json[0]["severity"], "Error");
    assert!(json[0]["detailedMessage"].as_str().unwrap().ends_with("for more details."));
}
