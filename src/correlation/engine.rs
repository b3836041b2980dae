use crate::correlation::cancel::CancellationToken;
use crate::correlation::ranking::{rank_top_k, ScoredCandidate};
use crate::error::{EngineError, Result};
use crate::model::{Attribute, MeasurementKind, PhenotypeId};
use crate::series::MeasurementSeries;
use crate::statistic::{CorrelationKind, Statistic};
use crate::store::{Catalog, Cohort, GeneFilter, MeasurementStore, SeriesMatrix, StoreAdapter};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A top-K correlation query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationRequest {
    pub statistic: CorrelationKind,
    pub reference_kind: MeasurementKind,
    pub reference_id: String,
    pub candidate_kind: MeasurementKind,
    /// Upper bound on returned entries; must be positive
    pub max_results: usize,
}

impl CorrelationRequest {
    pub fn new(
        statistic: CorrelationKind,
        reference_kind: MeasurementKind,
        reference_id: impl Into<String>,
        candidate_kind: MeasurementKind,
        max_results: usize,
    ) -> Self {
        Self {
            statistic,
            reference_kind,
            reference_id: reference_id.into(),
            candidate_kind,
            max_results,
        }
    }
}

/// Ranked correlation response
///
/// The three lists are parallel and ordered strongest first. `total_count`
/// is the number of candidates that produced a defined coefficient, before
/// truncation to `max_results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub ids: Vec<String>,
    pub names: Vec<String>,
    pub correlations: Vec<f64>,
    pub total_count: usize,
}

impl CorrelationResult {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Bookkeeping for one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Candidates considered (reference excluded)
    pub candidates: usize,
    pub scored: usize,
    /// No mouse carries both measurements
    pub no_overlap: usize,
    /// Overlap too small or a constant series
    pub undefined: usize,
}

enum Outcome {
    Scored(ScoredCandidate),
    NoOverlap,
    Undefined,
}

/// Resolved reference measurement
enum Reference {
    Gene(String),
    Phenotype(Attribute),
}

impl Reference {
    fn key(&self) -> String {
        match self {
            Reference::Gene(id) => id.clone(),
            Reference::Phenotype(attribute) => attribute.id().to_string(),
        }
    }

    fn series(&self, cohort: &Cohort) -> MeasurementSeries {
        match self {
            Reference::Gene(id) => cohort.expression_series(id),
            Reference::Phenotype(attribute) => cohort.phenotype_series(&attribute.id()),
        }
    }
}

/// Scores every candidate measurement against a reference series
///
/// The engine borrows an explicit store handle and keeps no state between
/// calls; each request bulk-loads its own cohort.
///
/// # Example
/// ```
/// use phenocorr::correlation::{CancellationToken, CorrelationEngine, CorrelationRequest};
/// use phenocorr::model::{Gene, MeasurementKind, Mouse};
/// use phenocorr::statistic::CorrelationKind;
/// use phenocorr::store::MemoryStore;
///
/// let store = MemoryStore::new(
///     vec![
///         Mouse::new("m1").with_expression("G1", 1.0).with_expression("G2", 2.0),
///         Mouse::new("m2").with_expression("G1", 2.0).with_expression("G2", 4.0),
///         Mouse::new("m3").with_expression("G1", 3.0).with_expression("G2", 6.0),
///     ],
///     vec![Gene::new("G1", "Ins2"), Gene::new("G2", "Lep")],
///     vec![],
/// )?;
///
/// let request = CorrelationRequest::new(
///     CorrelationKind::Pearson,
///     MeasurementKind::Expression,
///     "G1",
///     MeasurementKind::Expression,
///     10,
/// );
/// let result = CorrelationEngine::new(&store).correlate(&request, &CancellationToken::new())?;
/// assert_eq!(result.ids, vec!["G2"]);
/// assert_eq!(result.correlations, vec![1.0]);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct CorrelationEngine<'s, S: MeasurementStore + ?Sized> {
    adapter: StoreAdapter<'s, S>,
    parallel: bool,
    max_results_limit: usize,
}

impl<'s, S: MeasurementStore + ?Sized> CorrelationEngine<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            adapter: StoreAdapter::new(store),
            parallel: true,
            max_results_limit: usize::MAX,
        }
    }

    /// Score candidates on the rayon pool (default) or sequentially
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Requests asking for more than `limit` results are clamped to it
    pub fn with_max_results_limit(mut self, limit: usize) -> Self {
        self.max_results_limit = limit.max(1);
        self
    }

    pub fn correlate(
        &self,
        request: &CorrelationRequest,
        cancel: &CancellationToken,
    ) -> Result<CorrelationResult> {
        self.correlate_with_summary(request, cancel)
            .map(|(result, _)| result)
    }

    /// Run a scan and also report how many candidates were skipped and why
    pub fn correlate_with_summary(
        &self,
        request: &CorrelationRequest,
        cancel: &CancellationToken,
    ) -> Result<(CorrelationResult, ScanSummary)> {
        // Validation happens before any store access
        let statistic = request.statistic.statistic()?;
        if request.max_results == 0 {
            return Err(EngineError::Validation(
                "max_results must be a positive integer".to_string(),
            ));
        }
        let max_results = request.max_results.min(self.max_results_limit);

        let reference = self.resolve_reference(request.reference_kind, &request.reference_id)?;
        let reference_key = reference.key();

        let cohort = self.adapter.load_cohort()?;
        let reference_series = reference.series(&cohort);
        let (catalog, matrix) = self.load_candidates(request.candidate_kind, &cohort)?;

        tracing::debug!(
            statistic = statistic.name(),
            reference = %reference_key,
            reference_mice = reference_series.len(),
            candidates = catalog.len(),
            "starting correlation scan"
        );

        let same_kind = request.reference_kind == request.candidate_kind;
        let candidate_ids: Vec<&str> = catalog
            .ids()
            .filter(|id| !(same_kind && *id == reference_key))
            .collect();

        let outcomes = self.score_all(&candidate_ids, &reference_series, &matrix, statistic, cancel)?;

        let mut summary = ScanSummary {
            candidates: candidate_ids.len(),
            ..ScanSummary::default()
        };
        let mut scored = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Outcome::Scored(candidate) => scored.push(candidate),
                Outcome::NoOverlap => summary.no_overlap += 1,
                Outcome::Undefined => summary.undefined += 1,
            }
        }
        summary.scored = scored.len();

        let ranked = rank_top_k(scored, max_results);
        let mut result = CorrelationResult {
            ids: Vec::with_capacity(ranked.len()),
            names: Vec::with_capacity(ranked.len()),
            correlations: Vec::with_capacity(ranked.len()),
            total_count: summary.scored,
        };
        for candidate in ranked {
            let name = catalog.display_name(&candidate.id).unwrap_or_default();
            result.names.push(name.to_string());
            result.correlations.push(candidate.correlation);
            result.ids.push(candidate.id);
        }

        tracing::debug!(
            scored = summary.scored,
            no_overlap = summary.no_overlap,
            undefined = summary.undefined,
            returned = result.len(),
            "correlation scan finished"
        );

        Ok((result, summary))
    }

    fn resolve_reference(&self, kind: MeasurementKind, id: &str) -> Result<Reference> {
        match kind {
            MeasurementKind::Expression => {
                let genes = self.adapter.store().find_genes(&GeneFilter::by_id(id))?;
                if genes.is_empty() {
                    return Err(EngineError::not_found(kind, id));
                }
                Ok(Reference::Gene(id.to_string()))
            }
            MeasurementKind::Phenotype => {
                let attribute = self
                    .adapter
                    .resolve_attribute(id)?
                    .ok_or_else(|| EngineError::not_found(kind, id))?;
                if !attribute.is_numeric() {
                    return Err(EngineError::Validation(format!(
                        "phenotype '{}' has type {} and cannot be correlated",
                        id, attribute.declared_type
                    )));
                }
                Ok(Reference::Phenotype(attribute))
            }
        }
    }

    fn load_candidates(
        &self,
        kind: MeasurementKind,
        cohort: &Cohort,
    ) -> Result<(Catalog, SeriesMatrix)> {
        match kind {
            MeasurementKind::Expression => {
                let catalog = self.adapter.load_gene_catalog()?;
                Ok((catalog, cohort.expression_matrix()))
            }
            MeasurementKind::Phenotype => {
                // Categorical phenotypes are never candidates
                let attributes = self.adapter.load_phenotype_attributes(true)?;
                let ids: Vec<PhenotypeId> = attributes.iter().map(Attribute::id).collect();
                let mut catalog = Catalog::default();
                for (id, attribute) in ids.iter().zip(attributes) {
                    catalog.insert(id.to_string(), attribute.key_id_desc);
                }
                Ok((catalog, cohort.phenotype_matrix(&ids)))
            }
        }
    }

    fn score_all(
        &self,
        candidate_ids: &[&str],
        reference: &MeasurementSeries,
        matrix: &SeriesMatrix,
        statistic: &dyn Statistic,
        cancel: &CancellationToken,
    ) -> Result<Vec<Outcome>> {
        let score = |id: &&str| -> Result<Outcome> {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let Some(series) = matrix.get(id) else {
                return Ok(Outcome::NoOverlap);
            };
            let pairs = reference.align(series);
            if pairs.is_empty() {
                return Ok(Outcome::NoOverlap);
            }

            match statistic.coefficient(&pairs.reference, &pairs.candidate) {
                Ok(correlation) => Ok(Outcome::Scored(ScoredCandidate::new(*id, correlation))),
                Err(err) => {
                    tracing::trace!(candidate = *id, "correlation undefined: {}", err);
                    Ok(Outcome::Undefined)
                }
            }
        };

        if self.parallel {
            candidate_ids.par_iter().map(score).collect()
        } else {
            candidate_ids.iter().map(score).collect()
        }
    }
}
