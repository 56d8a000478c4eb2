//! Confluence adapter definition

use salto_adapter_components::change_validators::{
    ChangeValidator, NamedValidators, OUTGOING_UNRESOLVED_REFERENCES,
    OutgoingUnresolvedReferencesValidator,
};
use salto_adapter_components::{Adapter, Filter, UserConfig};

use crate::constants::ADAPTER_NAME;
use crate::filters::all_filters;

/// The Confluence adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfluenceAdapter;

impl Adapter for ConfluenceAdapter {
    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn filters(&self, _config: &UserConfig) -> Vec<Box<dyn Filter>> {
        all_filters()
    }

    fn change_validators(&self, _config: &UserConfig) -> NamedValidators {
        vec![(
            OUTGOING_UNRESOLVED_REFERENCES.to_string(),
            Box::new(OutgoingUnresolvedReferencesValidator) as Box<dyn ChangeValidator>,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::template_body::FILTER_NAME;

    #[test]
    fn test_filters_runner_holds_template_body_filter() {
        let runner = ConfluenceAdapter.filters_runner(&UserConfig::default());
        assert_eq!(runner.filter_names(), vec![FILTER_NAME]);
    }

    #[test]
    fn test_deploy_disabled_uses_deploy_not_supported() {
        let mut config = UserConfig::default();
        config.deploy.supported = false;
        let validator = ConfluenceAdapter.change_validator(&config);
        assert_eq!(validator.active_validators(), vec!["deployNotSupported"]);
    }
}
