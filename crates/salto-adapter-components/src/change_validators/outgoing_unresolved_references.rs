//! Block deploying elements that point at missing elements

use async_trait::async_trait;
use salto_adapter_api::{Change, ChangeError, Element, SeverityLevel};
use std::collections::BTreeSet;

use super::ChangeValidator;

/// Name under which the validator is registered
pub const OUTGOING_UNRESOLVED_REFERENCES: &str = "outgoingUnresolvedReferences";

/// Reports additions and modifications holding unresolved references
#[derive(Debug, Clone, Copy, Default)]
pub struct OutgoingUnresolvedReferencesValidator;

fn unresolved_targets(element: &Element) -> BTreeSet<String> {
    let values = match element {
        Element::Instance(inst) => &inst.value,
        Element::Object(obj) => &obj.annotations,
        Element::Primitive(prim) => &prim.annotations,
    };
    let mut targets = BTreeSet::new();
    for value in values.values() {
        value.walk_references(&mut |reference| {
            if reference.is_unresolved() {
                targets.insert(reference.elem_id.full_name());
            }
        });
    }
    targets
}

#[async_trait]
impl ChangeValidator for OutgoingUnresolvedReferencesValidator {
    async fn validate(&self, changes: &[Change]) -> Vec<ChangeError> {
        changes
            .iter()
            .filter(|change| change.is_addition_or_modification())
            .filter_map(|change| {
                let targets = unresolved_targets(change.data());
                if targets.is_empty() {
                    return None;
                }
                let elem_id = change.elem_id().clone();
                let targets: Vec<String> = targets.into_iter().collect();
                Some(ChangeError {
                    message: "Element has unresolved references".to_string(),
                    detailed_message: format!(
                        "Element {} contains unresolved references: {}. Add the missing dependencies and try again.",
                        elem_id.full_name(),
                        targets.join(", ")
                    ),
                    elem_id,
                    severity: SeverityLevel::Error,
                })
            })
            .collect()
    }
}
