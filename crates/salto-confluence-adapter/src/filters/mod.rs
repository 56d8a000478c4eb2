//! Confluence filters

pub mod template_body;

pub use template_body::TemplateBodyFilter;

use salto_adapter_components::Filter;

/// Filters in the order they run on fetch
pub fn all_filters() -> Vec<Box<dyn Filter>> {
    vec![Box::new(TemplateBodyFilter::new())]
}
