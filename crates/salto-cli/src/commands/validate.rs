//! Validate changes command

use anyhow::{Result, bail};
use salto_adapter_api::{ChangeError, SeverityLevel, resolve_references};
use salto_adapter_components::ChangeValidator;

use crate::adapters;
use crate::workspace::{
    link_change_references, load_changes, load_config, load_instances, print_json,
};

/// Errors that block a deployment
pub fn blocking_errors(errors: &[ChangeError]) -> usize {
    errors
        .iter()
        .filter(|error| error.severity == SeverityLevel::Error)
        .count()
}

/// Run the validate command
pub async fn run(
    config_path: &str,
    adapter_name: &str,
    changes_path: &str,
    workspace_dir: Option<&str>,
) -> Result<()> {
    let adapter = adapters::adapter(adapter_name)?;
    let config = load_config(config_path)?.adapter(adapter_name);

    let mut workspace = match workspace_dir {
        Some(dir) => load_instances(dir)?,
        None => vec![],
    };
    resolve_references(&mut workspace);

    let mut changes = load_changes(changes_path)?;
    for missing in link_change_references(&mut changes, &workspace) {
        tracing::debug!("Unresolved reference to {}", missing);
    }
    tracing::info!("Validating {} changes", changes.len());

    let validator = adapter.change_validator(&config);
    tracing::debug!("Active validators: {:?}", validator.active_validators());
    let errors = validator.validate(&changes).await;
    print_json(&errors)?;

    let blocking = blocking_errors(&errors);
    if blocking > 0 {
        bail!("{} change errors block the deployment", blocking);
    }
    tracing::info!("✓ Changes are valid");
    Ok(())
}
