//! Change validators
//!
//! A change validator inspects the changes about to be deployed and reports
//! [`ChangeError`]s for the ones the adapter cannot or should not deploy.
//! [`create_change_validator`] composes named validators into one, honoring
//! the user's activation config.

use async_trait::async_trait;
use salto_adapter_api::{Change, ChangeError};
use std::time::Instant;

use crate::config::ValidatorsActivationConfig;

pub mod deploy_not_supported;
pub mod outgoing_unresolved_references;
pub mod restrictions;

pub use deploy_not_supported::{DEPLOY_NOT_SUPPORTED, DeployNotSupportedValidator};
pub use outgoing_unresolved_references::{
    OUTGOING_UNRESOLVED_REFERENCES, OutgoingUnresolvedReferencesValidator,
};
pub use restrictions::{RESTRICTIONS, RestrictionValidator};

/// Inspects changes before deploy
#[async_trait]
pub trait ChangeValidator: Send + Sync {
    /// Report errors for the given changes
    async fn validate(&self, changes: &[Change]) -> Vec<ChangeError>;
}

#[async_trait]
impl<F> ChangeValidator for F
where
    F: Fn(&[Change]) -> Vec<ChangeError> + Send + Sync,
{
    async fn validate(&self, changes: &[Change]) -> Vec<ChangeError> {
        self(changes)
    }
}

/// Validators keyed by name, in the order they run
pub type NamedValidators = Vec<(String, Box<dyn ChangeValidator>)>;

/// Several validators run as one
pub struct CompositeChangeValidator {
    validators: NamedValidators,
}

impl CompositeChangeValidator {
    /// Names of the validators that will run
    pub fn active_validators(&self) -> Vec<&str> {
        self.validators.iter().map(|(name, _)| name.as_str()).collect()
    }
}

#[async_trait]
impl ChangeValidator for CompositeChangeValidator {
    async fn validate(&self, changes: &[Change]) -> Vec<ChangeError> {
        let mut errors = Vec::new();
        for (name, validator) in &self.validators {
            let started = Instant::now();
            let found = validator.validate(changes).await;
            tracing::debug!(
                "change validator {} found {} errors in {:?}",
                name,
                found.len(),
                started.elapsed()
            );
            errors.extend(found);
        }
        errors
    }
}

/// Compose validators, skipping the ones the activation config turns off
///
/// Validators not mentioned in the config are active. Their errors are
/// concatenated in validator order.
pub fn create_change_validator(
    validators: NamedValidators,
    activation_config: &ValidatorsActivationConfig,
) -> CompositeChangeValidator {
    for name in activation_config.keys() {
        if !validators.iter().any(|(known, _)| known == name) {
            tracing::warn!("activation config mentions unknown change validator {}", name);
        }
    }

    let validators = validators
        .into_iter()
        .filter(|(name, _)| {
            let active = activation_config.get(name).copied().unwrap_or(true);
            if !active {
                tracing::debug!("change validator {} is disabled", name);
            }
            active
        })
        .collect();
    CompositeChangeValidator { validators }
}
