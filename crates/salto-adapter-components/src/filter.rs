//! Adapter filters
//!
//! A filter transforms elements or changes at fixed points of the adapter
//! pipeline:
//!
//! ```text
//!  fetch ──▶ on_fetch ──▶ workspace
//!  workspace ──▶ pre_deploy ──▶ service call ──▶ on_deploy ──▶ workspace
//! ```
//!
//! Every hook defaults to a no-op, so a filter only implements the stages it
//! cares about. A [`FiltersRunner`] chains filters: `on_fetch` and
//! `on_deploy` run in declaration order, `pre_deploy` runs in reverse so each
//! filter undoes its fetch transformation after the filters declared after it.

use async_trait::async_trait;
use salto_adapter_api::{Change, Element, SaltoError};
use std::time::Instant;

use crate::error::{Error, Result};

/// Output of a filter's fetch stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    /// Errors to report to the user without failing the fetch
    pub errors: Vec<SaltoError>,
}

/// A set of pipeline hooks
#[async_trait]
pub trait Filter: Send + Sync {
    /// Filter name, used in logs
    fn name(&self) -> &str;

    /// Transform fetched elements in place
    async fn on_fetch(&mut self, _elements: &mut Vec<Element>) -> Result<FilterResult> {
        Ok(FilterResult::default())
    }

    /// Prepare changes for deployment in place
    async fn pre_deploy(&mut self, _changes: &mut [Change]) -> Result<()> {
        Ok(())
    }

    /// Restore deployed changes in place
    async fn on_deploy(&mut self, _changes: &mut [Change]) -> Result<()> {
        Ok(())
    }
}

fn filter_failed(filter: &dyn Filter, error: Error) -> Error {
    Error::FilterError {
        filter: filter.name().to_string(),
        message: error.to_string(),
    }
}

/// Runs a list of filters as a single filter
///
/// A failing hook stops the run and is reported as [`Error::FilterError`].
pub struct FiltersRunner {
    filters: Vec<Box<dyn Filter>>,
}

impl FiltersRunner {
    /// Create a runner over `filters`, in declaration order
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Names of the wrapped filters, in declaration order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

#[async_trait]
impl Filter for FiltersRunner {
    fn name(&self) -> &str {
        "filtersRunner"
    }

    async fn on_fetch(&mut self, elements: &mut Vec<Element>) -> Result<FilterResult> {
        let mut result = FilterResult::default();
        for filter in self.filters.iter_mut() {
            let started = Instant::now();
            let filter_result = filter
                .on_fetch(elements)
                .await
                .map_err(|e| filter_failed(&**filter, e))?;
            tracing::debug!(
                "filter {} on_fetch took {:?}",
                filter.name(),
                started.elapsed()
            );
            result.errors.extend(filter_result.errors);
        }
        Ok(result)
    }

    async fn pre_deploy(&mut self, changes: &mut [Change]) -> Result<()> {
        for filter in self.filters.iter_mut().rev() {
            let started = Instant::now();
            filter
                .pre_deploy(changes)
                .await
                .map_err(|e| filter_failed(&**filter, e))?;
            tracing::debug!(
                "filter {} pre_deploy took {:?}",
                filter.name(),
                started.elapsed()
            );
        }
        Ok(())
    }

    async fn on_deploy(&mut self, changes: &mut [Change]) -> Result<()> {
        for filter in self.filters.iter_mut() {
            let started = Instant::now();
            filter
                .on_deploy(changes)
                .await
                .map_err(|e| filter_failed(&**filter, e))?;
            tracing::debug!(
                "filter {} on_deploy took {:?}",
                filter.name(),
                started.elapsed()
            );
        }
        Ok(())
    }
}
