//! Changes between two states of an element
//!
//! A change is an addition (after only), a removal (before only) or a
//! modification (both). Validators and deploy filters consume changes.

use serde::{Deserialize, Serialize};

use crate::elem_id::ElemId;
use crate::elements::{Element, InstanceElement};
use crate::error::{Error, Result};

/// Kind of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionName {
    /// Element is added
    Add,
    /// Element is removed
    Remove,
    /// Element is modified
    Modify,
}

/// A before/after pair
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T = Element> {
    /// Element is added
    Addition {
        /// New state
        after: T,
    },
    /// Element is removed
    Removal {
        /// Previous state
        before: T,
    },
    /// Element is modified
    Modification {
        /// Previous state
        before: T,
        /// New state
        after: T,
    },
}

impl<T> Change<T> {
    /// Kind of change
    pub fn action(&self) -> ActionName {
        match self {
            Self::Addition { .. } => ActionName::Add,
            Self::Removal { .. } => ActionName::Remove,
            Self::Modification { .. } => ActionName::Modify,
        }
    }

    /// The after state when present, else the before state
    pub fn data(&self) -> &T {
        match self {
            Self::Addition { after } | Self::Modification { after, .. } => after,
            Self::Removal { before } => before,
        }
    }

    /// The after state when present, else the before state, mutably
    pub fn data_mut(&mut self) -> &mut T {
        match self {
            Self::Addition { after } | Self::Modification { after, .. } => after,
            Self::Removal { before } => before,
        }
    }

    /// Whether the change adds or modifies its element
    pub fn is_addition_or_modification(&self) -> bool {
        !matches!(self, Self::Removal { .. })
    }

    /// Apply `f` to every state the change holds, in place
    pub fn apply_to_data<F: FnMut(&mut T)>(&mut self, mut f: F) {
        match self {
            Self::Addition { after } => f(after),
            Self::Removal { before } => f(before),
            Self::Modification { before, after } => {
                f(before);
                f(after);
            }
        }
    }
}

impl Change<Element> {
    /// ID of the changed element
    pub fn elem_id(&self) -> &ElemId {
        self.data().elem_id()
    }

    /// Whether the changed element is an instance
    pub fn is_instance_change(&self) -> bool {
        self.data().is_instance()
    }

    /// Apply `f` to every instance state the change holds
    pub fn apply_to_instances<F: FnMut(&mut InstanceElement)>(&mut self, mut f: F) {
        self.apply_to_data(|element| {
            if let Some(instance) = element.as_instance_mut() {
                f(instance);
            }
        });
    }
}

/// Build a change from optional before and after states
pub fn to_change<T>(before: Option<T>, after: Option<T>) -> Result<Change<T>> {
    match (before, after) {
        (None, Some(after)) => Ok(Change::Addition { after }),
        (Some(before), None) => Ok(Change::Removal { before }),
        (Some(before), Some(after)) => Ok(Change::Modification { before, after }),
        (None, None) => Err(Error::EmptyChange),
    }
}

/// The after state when present, else the before state
pub fn get_change_data<T>(change: &Change<T>) -> &T {
    change.data()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ObjectType;
    use crate::values::{Value, Values};

    fn obj(name: &str) -> Element {
        ObjectType::new(ElemId::new("myAdapter", name)).into()
    }

    #[test]
    fn test_to_change_actions() {
        let add = to_change(None, Some(obj("a"))).unwrap();
        let remove = to_change(Some(obj("a")), None).unwrap();
        let modify = to_change(Some(obj("a")), Some(obj("b"))).unwrap();
        assert_eq!(add.action(), ActionName::Add);
        assert_eq!(remove.action(), ActionName::Remove);
        assert_eq!(modify.action(), ActionName::Modify);
        assert!(add.is_addition_or_modification());
        assert!(!remove.is_addition_or_modification());
        assert!(modify.is_addition_or_modification());
    }

    #[test]
    fn test_to_change_requires_a_side() {
        let err = to_change::<Element>(None, None).unwrap_err();
        assert!(matches!(err, Error::EmptyChange));
    }

    #[test]
    fn test_change_data_prefers_after() {
        let modify = to_change(Some(obj("before")), Some(obj("after"))).unwrap();
        assert_eq!(get_change_data(&modify).elem_id().name(), "after");
        let remove = to_change(Some(obj("gone")), None).unwrap();
        assert_eq!(remove.elem_id().name(), "gone");
    }

    #[test]
    fn test_apply_to_instances_touches_both_sides() {
        let inst = |v: &str| -> Element {
            let mut value = Values::new();
            value.insert("v".to_string(), Value::from(v));
            InstanceElement::new("a", "t", "i", value).into()
        };
        let mut change = to_change(Some(inst("1")), Some(inst("2"))).unwrap();
        let mut seen = 0;
        change.apply_to_instances(|instance| {
            instance.value.insert("touched".to_string(), Value::Bool(true));
            seen += 1;
        });
        assert_eq!(seen, 2);
        let Change::Modification { before, after } = &change else {
            panic!("expected modification");
        };
        assert_eq!(before.as_instance().unwrap().value["touched"], Value::Bool(true));
        assert_eq!(after.as_instance().unwrap().value["touched"], Value::Bool(true));
        assert!(change.is_instance_change());
    }
}
