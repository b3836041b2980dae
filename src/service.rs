//! Request-level entry point
//!
//! `QueryService` owns a store handle and a [`ServiceConfig`] and applies the
//! configured defaults and limits before delegating to the correlation
//! engine, catalog search and table view. It keeps no state between calls.

use crate::config::ServiceConfig;
use crate::correlation::{CancellationToken, CorrelationEngine, CorrelationRequest, CorrelationResult};
use crate::error::Result;
use crate::model::{MeasurementKind, Mouse};
use crate::search::{CatalogSearch, SearchPage};
use crate::statistic::CorrelationKind;
use crate::store::{MeasurementStore, MemoryStore, MouseFilter};
use crate::table::{MeasurementTable, TableView};
use anyhow::Context;
use std::path::Path;

pub struct QueryService<S: MeasurementStore> {
    store: S,
    config: ServiceConfig,
}

impl<S: MeasurementStore> QueryService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fill unset request fields from the configuration
    pub fn correlation_request(
        &self,
        reference_kind: MeasurementKind,
        reference_id: &str,
        candidate_kind: MeasurementKind,
        statistic: Option<CorrelationKind>,
        max_results: Option<usize>,
    ) -> CorrelationRequest {
        CorrelationRequest::new(
            statistic.unwrap_or(self.config.default_statistic),
            reference_kind,
            reference_id,
            candidate_kind,
            max_results.unwrap_or(self.config.default_max_results),
        )
    }

    pub fn correlate(
        &self,
        request: &CorrelationRequest,
        cancel: &CancellationToken,
    ) -> Result<CorrelationResult> {
        let (result, summary) = CorrelationEngine::new(&self.store)
            .with_parallel(self.config.parallel)
            .with_max_results_limit(self.config.max_results_limit)
            .correlate_with_summary(request, cancel)?;

        tracing::info!(
            reference = %request.reference_id,
            statistic = %request.statistic,
            candidates = summary.candidates,
            scored = summary.scored,
            returned = result.len(),
            "correlate"
        );
        Ok(result)
    }

    /// `max_count` falls back to the configured page size
    pub fn search(
        &self,
        kind: MeasurementKind,
        text: &str,
        start_index: i64,
        max_count: Option<i64>,
    ) -> Result<SearchPage> {
        let default_count = i64::try_from(self.config.default_page_size).unwrap_or(i64::MAX);
        let count = max_count.unwrap_or(default_count);
        CatalogSearch::new(&self.store).search(kind, text, start_index, count)
    }

    pub fn table(&self, kind: MeasurementKind, id: &str) -> Result<MeasurementTable> {
        TableView::new(&self.store).table(kind, id)
    }

    pub fn mouse(&self, mouse_id: &str) -> Result<Mouse> {
        TableView::new(&self.store).mouse(mouse_id)
    }

    pub fn mice(&self, filter: &MouseFilter) -> Result<Vec<Mouse>> {
        TableView::new(&self.store).mice(filter)
    }
}

impl QueryService<MemoryStore> {
    /// Load the snapshot named by `data`, or by the config when `data` is `None`
    pub fn open(config: ServiceConfig, data: Option<&Path>) -> anyhow::Result<Self> {
        let path = match data.or(config.snapshot.as_deref()) {
            Some(path) => path.to_path_buf(),
            None => anyhow::bail!(
                "No cohort snapshot given (pass --data or set `snapshot` in the config file)"
            ),
        };
        let store = MemoryStore::from_json_file(&path)
            .with_context(|| format!("Failed to open cohort snapshot: {}", path.display()))?;
        tracing::info!(
            snapshot = %path.display(),
            mice = store.mouse_count(),
            genes = store.gene_count(),
            "cohort loaded"
        );
        Ok(Self::new(store, config))
    }
}
