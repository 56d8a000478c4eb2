//! Plan deployment command
//!
//! Validates the changes, then runs the deploy filters without calling the
//! service: `deploy` holds the changes as they would be sent, `restored`
//! holds them after the post-deploy filters.

use anyhow::{Context, Result, bail};
use salto_adapter_api::{SeverityLevel, resolve_references};
use salto_adapter_components::{ChangeValidator, Filter};
use serde::Serialize;

use super::validate::blocking_errors;
use crate::adapters;
use crate::workspace::{
    ChangeRecord, change_records, link_change_references, load_changes, load_config,
    load_instances, print_json,
};

#[derive(Serialize)]
struct Plan {
    deploy: Vec<ChangeRecord>,
    restored: Vec<ChangeRecord>,
}

/// Run the plan command
pub async fn run(
    config_path: &str,
    adapter_name: &str,
    dir: &str,
    changes_path: &str,
) -> Result<()> {
    let adapter = adapters::adapter(adapter_name)?;
    let config = load_config(config_path)?.adapter(adapter_name);

    let mut workspace = load_instances(dir)?;
    resolve_references(&mut workspace);
    let mut changes = load_changes(changes_path)?;
    for missing in link_change_references(&mut changes, &workspace) {
        tracing::debug!("Unresolved reference to {}", missing);
    }

    let errors = adapter.change_validator(&config).validate(&changes).await;
    for error in errors.iter().filter(|e| e.severity != SeverityLevel::Error) {
        tracing::warn!("{}: {}", error.elem_id, error.detailed_message);
    }
    let blocking = blocking_errors(&errors);
    if blocking > 0 {
        print_json(&errors)?;
        bail!("{} change errors block the deployment", blocking);
    }

    let mut runner = adapter.filters_runner(&config);
    runner
        .pre_deploy(&mut changes)
        .await
        .context("Pre-deploy filters failed")?;
    let deploy = change_records(&changes);
    runner
        .on_deploy(&mut changes)
        .await
        .context("On-deploy filters failed")?;

    print_json(&Plan {
        deploy,
        restored: change_records(&changes),
    })
}
