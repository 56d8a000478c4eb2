//! Elements and changes stored on disk
//!
//! Instance files (`*.json`, `*.yaml`, `*.yml`) hold a list of records:
//!
//! ```text
//! [{ "elemID": "confluence.space.instance.eng", "value": { "key": "ENG" } }]
//! ```
//!
//! A changes file holds a list of `{ action, before?, after? }` entries whose
//! states are instance records.

use anyhow::{Context, Result, bail};
use salto_adapter_api::{
    ActionName, Change, ElemId, Element, InstanceElement, Values, index_elements, link_references,
    to_change,
};
use salto_adapter_components::config::CONFIG_FILE_NAME;
use salto_adapter_components::{Error as ComponentsError, WorkspaceConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An instance as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Instance ID
    #[serde(rename = "elemID")]
    pub elem_id: ElemId,
    /// Instance values
    #[serde(default)]
    pub value: Values,
}

impl InstanceRecord {
    fn from_instance(instance: &InstanceElement) -> Self {
        Self {
            elem_id: instance.elem_id.clone(),
            value: instance.value.clone(),
        }
    }

    fn into_element(self) -> Result<Element> {
        let full_name = self.elem_id.full_name();
        let instance = InstanceElement::from_elem_id(self.elem_id, self.value)
            .with_context(|| format!("Invalid instance record {}", full_name))?;
        Ok(instance.into())
    }
}

/// A change as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Kind of change
    pub action: ActionName,
    /// Previous state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<InstanceRecord>,
    /// New state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<InstanceRecord>,
}

impl ChangeRecord {
    fn from_change(change: &Change) -> Option<Self> {
        let record = |element: &Element| element.as_instance().map(InstanceRecord::from_instance);
        let (before, after) = match change {
            Change::Addition { after } => (None, Some(record(after)?)),
            Change::Removal { before } => (Some(record(before)?), None),
            Change::Modification { before, after } => (Some(record(before)?), Some(record(after)?)),
        };
        Some(Self {
            action: change.action(),
            before,
            after,
        })
    }

    fn into_change(self) -> Result<Change> {
        let action = self.action;
        let before = self.before.map(InstanceRecord::into_element).transpose()?;
        let after = self.after.map(InstanceRecord::into_element).transpose()?;
        let change = to_change(before, after).context("Change has neither before nor after")?;
        if change.action() != action {
            bail!(
                "Change of {} is declared as {:?} but holds the states of {:?}",
                change.elem_id(),
                action,
                change.action()
            );
        }
        Ok(change)
    }
}

/// Load the workspace configuration, falling back to defaults when absent
pub fn load_config(path: &str) -> Result<WorkspaceConfig> {
    match WorkspaceConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ComponentsError::ConfigNotFound { path }) => {
            tracing::debug!("No configuration at {}, using defaults", path);
            Ok(WorkspaceConfig::default())
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn is_data_file(path: &Path) -> bool {
    let is_config = path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME);
    let has_data_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "json" | "yaml" | "yml"));
    has_data_extension && !is_config
}

fn read_data_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        _ => serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
    };
    Ok(parsed)
}

/// Load every instance stored under `dir`, in file name order
pub fn load_instances(dir: &str) -> Result<Vec<Element>> {
    let dir = Path::new(dir);
    if !dir.is_dir() {
        bail!("Workspace directory not found: {}", dir.display());
    }

    let mut elements = Vec::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_data_file(entry.path()) {
            continue;
        }
        let records: Vec<InstanceRecord> = read_data_file(entry.path())?;
        tracing::debug!(
            "Loaded {} instances from {}",
            records.len(),
            entry.path().display()
        );
        for record in records {
            elements.push(record.into_element()?);
        }
    }
    Ok(elements)
}

/// Load the changes listed in `path`
pub fn load_changes(path: &str) -> Result<Vec<Change>> {
    let records: Vec<ChangeRecord> = read_data_file(Path::new(path))?;
    records.into_iter().map(ChangeRecord::into_change).collect()
}

/// Link references inside changes to workspace elements and to each other
///
/// Returns the IDs that could not be resolved.
pub fn link_change_references(changes: &mut [Change], workspace: &[Element]) -> Vec<ElemId> {
    let mut targets = index_elements(workspace);
    let changed: Vec<Element> = changes
        .iter()
        .filter(|change| change.is_addition_or_modification())
        .map(|change| change.data().clone())
        .collect();
    targets.extend(index_elements(&changed));

    let mut missing = Vec::new();
    for change in changes.iter_mut() {
        change.apply_to_data(|element| missing.extend(link_references(element, &targets)));
    }
    missing
}

/// Instances in their on-disk form
pub fn instance_records(elements: &[Element]) -> Vec<InstanceRecord> {
    elements
        .iter()
        .filter_map(Element::as_instance)
        .map(InstanceRecord::from_instance)
        .collect()
}

/// Changes in their on-disk form
pub fn change_records(changes: &[Change]) -> Vec<ChangeRecord> {
    changes.iter().filter_map(ChangeRecord::from_change).collect()
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
