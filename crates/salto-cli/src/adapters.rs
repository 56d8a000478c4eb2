//! Adapters known to the CLI

use anyhow::{Result, bail};
use salto_adapter_components::Adapter;
use salto_confluence_adapter::ConfluenceAdapter;
use salto_confluence_adapter::constants::ADAPTER_NAME as CONFLUENCE;
use salto_netsuite_adapter::NetsuiteAdapter;
use salto_netsuite_adapter::constants::NETSUITE;

const ADAPTER_NAMES: &[&str] = &[CONFLUENCE, NETSUITE];

/// Look up an adapter by name
pub fn adapter(name: &str) -> Result<Box<dyn Adapter>> {
    match name {
        CONFLUENCE => Ok(Box::new(ConfluenceAdapter)),
        NETSUITE => Ok(Box::new(NetsuiteAdapter)),
        other => bail!(
            "Unknown adapter '{}', expected one of: {}",
            other,
            ADAPTER_NAMES.join(", ")
        ),
    }
}
