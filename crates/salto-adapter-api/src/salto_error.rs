//! Errors reported to the user through the platform
//!
//! These are values, not control flow: adapters build them while fetching,
//! validating or deploying and hand them upward for display. Each carries a
//! [`SeverityLevel`] and optionally a [`SaltoErrorType`] classification; an
//! error bound to a specific element is a [`SaltoElementError`].

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;

use crate::elem_id::ElemId;

/// How severe a reported error is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    /// Blocks the operation for the affected element
    Error,
    /// Reported but does not block
    Warning,
    /// Informational only
    Info,
}

/// Classification of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaltoErrorType {
    /// Invalid adapter or workspace configuration
    Config,
    /// A dependency between elements could not be satisfied
    Dependency,
    /// Elements point at references that do not exist
    UnresolvedReferences,
}

/// An error that is not bound to an element
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct SaltoError {
    /// Message shown to the user
    pub message: String,
    /// Severity of the error
    pub severity: SeverityLevel,
    /// Optional classification
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<SaltoErrorType>,
}

impl SaltoError {
    /// Create an unclassified error
    pub fn new(message: impl Into<String>, severity: SeverityLevel) -> Self {
        Self {
            message: message.into(),
            severity,
            error_type: None,
        }
    }

    /// Attach a classification
    pub fn with_type(mut self, error_type: SaltoErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }
}

/// An error bound to a specific element
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{elem_id}: {message}")]
pub struct SaltoElementError {
    /// Message shown to the user
    pub message: String,
    /// Severity of the error
    pub severity: SeverityLevel,
    /// Optional classification
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<SaltoErrorType>,
    /// Element the error applies to
    #[serde(rename = "elemID")]
    pub elem_id: ElemId,
}

impl From<SaltoElementError> for SaltoError {
    fn from(error: SaltoElementError) -> Self {
        Self {
            message: error.message,
            severity: error.severity,
            error_type: error.error_type,
        }
    }
}

/// Error produced by a change validator
///
/// Serialized as `{ elemID, severity, message, detailedMessage }`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{elem_id}: {message}")]
pub struct ChangeError {
    /// Element whose change is rejected or flagged
    #[serde(rename = "elemID")]
    pub elem_id: ElemId,
    /// Severity of the error
    pub severity: SeverityLevel,
    /// Short message
    pub message: String,
    /// Longer explanation with remediation hints
    pub detailed_message: String,
}

impl From<ChangeError> for SaltoElementError {
    fn from(error: ChangeError) -> Self {
        Self {
            message: error.message,
            severity: error.severity,
            error_type: None,
            elem_id: error.elem_id,
        }
    }
}

/// Either kind of reported error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnySaltoError {
    /// Bound to an element
    Element(SaltoElementError),
    /// Not bound to an element
    Plain(SaltoError),
}

impl AnySaltoError {
    /// Message shown to the user
    pub fn message(&self) -> &str {
        match self {
            Self::Element(e) => &e.message,
            Self::Plain(e) => &e.message,
        }
    }

    /// Severity of the error
    pub fn severity(&self) -> SeverityLevel {
        match self {
            Self::Element(e) => e.severity,
            Self::Plain(e) => e.severity,
        }
    }

    /// Element the error is bound to, if any
    pub fn elem_id(&self) -> Option<&ElemId> {
        match self {
            Self::Element(e) => Some(&e.elem_id),
            Self::Plain(_) => None,
        }
    }
}

impl From<SaltoError> for AnySaltoError {
    fn from(error: SaltoError) -> Self {
        Self::Plain(error)
    }
}

impl From<SaltoElementError> for AnySaltoError {
    fn from(error: SaltoElementError) -> Self {
        Self::Element(error)
    }
}

/// Whether the error is bound to an element
pub fn is_salto_element_error(error: &AnySaltoError) -> bool {
    error.elem_id().is_some()
}

/// Whether an arbitrary error is one of the reportable error values
pub fn is_salto_error(error: &(dyn StdError + 'static)) -> bool {
    error.is::<SaltoError>() || error.is::<SaltoElementError>() || error.is::<ChangeError>()
}

/// Bind the message of an arbitrary error to an element
pub fn create_salto_element_error_from_error(
    error: &(dyn StdError + 'static),
    severity: SeverityLevel,
    elem_id: ElemId,
) -> SaltoElementError {
    SaltoElementError {
        message: error.to_string(),
        severity,
        error_type: None,
        elem_id,
    }
}

/// Build an element error from its parts
pub fn create_salto_element_error(
    message: impl Into<String>,
    severity: SeverityLevel,
    elem_id: ElemId,
) -> SaltoElementError {
    SaltoElementError {
        message: message.into(),
        severity,
        error_type: None,
        elem_id,
    }
}

/// Converts a failure while handling an element into a reportable error
pub type ConvertError = fn(&ElemId, &(dyn StdError + 'static)) -> SaltoElementError;

/// Keep errors that are already bound to an element, wrap everything else as `Error`
pub fn default_convert_error(
    elem_id: &ElemId,
    error: &(dyn StdError + 'static),
) -> SaltoElementError {
    if let Some(element_error) = error.downcast_ref::<SaltoElementError>() {
        return element_error.clone();
    }
    if let Some(change_error) = error.downcast_ref::<ChangeError>() {
        return change_error.clone().into();
    }
    create_salto_element_error_from_error(error, SeverityLevel::Error, elem_id.clone())
}

/// The service rejected the adapter's credentials
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CredentialError(pub String);
