//! Show adapter types command

use anyhow::Result;

use crate::adapters;
use crate::workspace::print_json;

/// Run the types command
pub async fn run(adapter_name: &str) -> Result<()> {
    let adapter = adapters::adapter(adapter_name)?;
    print_json(&adapter.types())
}
