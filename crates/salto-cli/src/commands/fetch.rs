//! Fetch command

use anyhow::{Context, Result};
use salto_adapter_api::{Element, resolve_references};
use salto_adapter_components::Filter;

use crate::adapters;
use crate::workspace::{instance_records, load_config, load_instances, print_json};

/// Run the fetch command
pub async fn run(config_path: &str, adapter_name: &str, dir: &str) -> Result<()> {
    let adapter = adapters::adapter(adapter_name)?;
    let config = load_config(config_path)?.adapter(adapter_name);

    let mut elements: Vec<Element> = load_instances(dir)?
        .into_iter()
        .filter(|element| {
            let elem_id = element.elem_id();
            elem_id.adapter() == adapter.name()
                && config.fetch.is_type_included(elem_id.type_name())
        })
        .collect();
    tracing::info!("Fetching {} {} instances", elements.len(), adapter.name());

    for missing in resolve_references(&mut elements) {
        tracing::warn!("Unresolved reference to {}", missing);
    }

    let mut runner = adapter.filters_runner(&config);
    let result = runner
        .on_fetch(&mut elements)
        .await
        .context("Fetch filters failed")?;
    for error in &result.errors {
        tracing::warn!("{}", error.message);
    }

    print_json(&instance_records(&elements))
}
