//! Reject every change of an adapter that cannot deploy

use async_trait::async_trait;
use salto_adapter_api::{Change, ChangeError, SeverityLevel};

use super::ChangeValidator;

/// Name under which the validator is registered
pub const DEPLOY_NOT_SUPPORTED: &str = "deployNotSupported";

const SUPPORTED_APPLICATIONS_URL: &str =
    "https://help.salto.io/en/articles/6927118-supported-business-applications";

/// Fails each change individually, naming the change's adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployNotSupportedValidator;

#[async_trait]
impl ChangeValidator for DeployNotSupportedValidator {
    async fn validate(&self, changes: &[Change]) -> Vec<ChangeError> {
        changes
            .iter()
            .map(|change| {
                let elem_id = change.elem_id().clone();
                let message = format!("Salto does not support {} deployments.", elem_id.adapter());
                ChangeError {
                    detailed_message: format!(
                        "{message} Please see {SUPPORTED_APPLICATIONS_URL} for more details."
                    ),
                    message,
                    elem_id,
                    severity: SeverityLevel::Error,
                }
            })
            .collect()
    }
}
