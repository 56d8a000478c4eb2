//! NetSuite adapter definition

use salto_adapter_api::ObjectType;
use salto_adapter_components::change_validators::{
    ChangeValidator, NamedValidators, OUTGOING_UNRESOLVED_REFERENCES,
    OutgoingUnresolvedReferencesValidator, RESTRICTIONS, RestrictionValidator,
};
use salto_adapter_components::{Adapter, Filter, UserConfig};

use crate::constants::NETSUITE;
use crate::types::file_cabinet_types;

/// The NetSuite adapter, limited to the file cabinet
#[derive(Debug, Clone, Copy, Default)]
pub struct NetsuiteAdapter;

impl Adapter for NetsuiteAdapter {
    fn name(&self) -> &'static str {
        NETSUITE
    }

    fn types(&self) -> Vec<ObjectType> {
        file_cabinet_types()
    }

    fn filters(&self, _config: &UserConfig) -> Vec<Box<dyn Filter>> {
        vec![]
    }

    fn change_validators(&self, _config: &UserConfig) -> NamedValidators {
        vec![
            (
                RESTRICTIONS.to_string(),
                Box::new(RestrictionValidator::new(self.types())) as Box<dyn ChangeValidator>,
            ),
            (
                OUTGOING_UNRESOLVED_REFERENCES.to_string(),
                Box::new(OutgoingUnresolvedReferencesValidator),
            ),
        ]
    }
}
