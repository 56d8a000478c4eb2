//! Adapter definitions
//!
//! An adapter bundles the declared types of a service, the filters applied to
//! its elements and the change validators guarding its deployments.

use salto_adapter_api::ObjectType;

use crate::change_validators::{
    ChangeValidator, CompositeChangeValidator, DEPLOY_NOT_SUPPORTED, DeployNotSupportedValidator,
    NamedValidators, create_change_validator,
};
use crate::config::UserConfig;
use crate::filter::{Filter, FiltersRunner};

/// A service adapter
pub trait Adapter: Send + Sync {
    /// Adapter name, the first part of every element ID it owns
    fn name(&self) -> &'static str;

    /// Object types declared statically by the adapter
    fn types(&self) -> Vec<ObjectType> {
        vec![]
    }

    /// Filters in the order they run on fetch
    fn filters(&self, config: &UserConfig) -> Vec<Box<dyn Filter>>;

    /// Change validators of the adapter, in the order they run
    fn change_validators(&self, config: &UserConfig) -> NamedValidators;

    /// All filters chained as one
    fn filters_runner(&self, config: &UserConfig) -> FiltersRunner {
        FiltersRunner::new(self.filters(config))
    }

    /// The validator guarding deployments
    ///
    /// Adapters configured with `deploy.supported: false` reject every change.
    fn change_validator(&self, config: &UserConfig) -> CompositeChangeValidator {
        let validators: NamedValidators = if config.deploy.supported {
            self.change_validators(config)
        } else {
            vec![(
                DEPLOY_NOT_SUPPORTED.to_string(),
                Box::new(DeployNotSupportedValidator) as Box<dyn ChangeValidator>,
            )]
        };
        create_change_validator(validators, &config.deploy.change_validators)
    }
}
