use crate::error::{EngineError, Result};
use crate::model::{Attribute, MeasurementKind, MeasurementValue, Mouse, PhenotypeId};
use crate::series::{MeasurementSeries, MouseIndex};
use crate::store::{AttributeFilter, GeneFilter, MeasurementStore, MouseFilter};
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeMap, HashMap};

/// One catalog hit: measurement id plus its human-readable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub display_name: String,
}

/// Measurement id → display name, iterated in id order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, String>,
}

impl Catalog {
    pub fn insert(&mut self, id: String, display_name: String) {
        self.entries.insert(id, display_name);
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Measurement id → series, built in one pass over a cohort
#[derive(Debug, Clone, Default)]
pub struct SeriesMatrix {
    series: HashMap<String, MeasurementSeries>,
}

impl SeriesMatrix {
    pub fn get(&self, id: &str) -> Option<&MeasurementSeries> {
        self.series.get(id)
    }

    /// Number of measurement ids with at least one value
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Every mouse fetched for one request, ordered by `mouse_id`
///
/// The position of a mouse in this list is its row index for every series
/// built from the cohort, so expression and phenotype series align with each
/// other.
#[derive(Debug, Clone, Default)]
pub struct Cohort {
    mice: Vec<Mouse>,
}

impl Cohort {
    pub fn from_mice(mut mice: Vec<Mouse>) -> Self {
        mice.sort_by(|a, b| a.mouse_id.cmp(&b.mouse_id));
        Self { mice }
    }

    pub fn mice(&self) -> &[Mouse] {
        &self.mice
    }

    pub fn len(&self) -> usize {
        self.mice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mice.is_empty()
    }

    pub fn expression_series(&self, gene_id: &str) -> MeasurementSeries {
        self.rows()
            .filter_map(|(i, mouse)| mouse.expression(gene_id).map(|v| (i, v)))
            .collect()
    }

    /// Series for every gene any mouse carries, from a single walk over the
    /// cohort's expression mappings.
    pub fn expression_matrix(&self) -> SeriesMatrix {
        let mut series: HashMap<String, MeasurementSeries> = HashMap::new();
        for (i, mouse) in self.rows() {
            let Some(expression) = &mouse.expression_data else {
                continue;
            };
            for (gene_id, value) in expression {
                if !value.is_finite() {
                    continue;
                }
                series.entry(gene_id.clone()).or_default().insert(i, *value);
            }
        }
        SeriesMatrix { series }
    }

    pub fn phenotype_series(&self, id: &PhenotypeId) -> MeasurementSeries {
        self.rows()
            .filter_map(|(i, mouse)| {
                mouse
                    .phenotype(id)
                    .and_then(MeasurementValue::as_number)
                    .map(|v| (i, v))
            })
            .collect()
    }

    pub fn phenotype_matrix<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a PhenotypeId>,
    ) -> SeriesMatrix {
        let series = ids
            .into_iter()
            .map(|id| (id.to_string(), self.phenotype_series(id)))
            .filter(|(_, s)| !s.is_empty())
            .collect();
        SeriesMatrix { series }
    }

    fn rows(&self) -> impl Iterator<Item = (MouseIndex, &Mouse)> {
        self.mice.iter().enumerate()
    }
}

/// Turns record-level store access into catalogs and series
///
/// Holds a borrowed store handle; nothing is cached across calls.
#[derive(Debug)]
pub struct StoreAdapter<'s, S: MeasurementStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: MeasurementStore + ?Sized> Clone for StoreAdapter<'s, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'s, S: MeasurementStore + ?Sized> Copy for StoreAdapter<'s, S> {}

impl<'s, S: MeasurementStore + ?Sized> StoreAdapter<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    /// The one bulk fetch a request makes for mouse data
    pub fn load_cohort(&self) -> Result<Cohort> {
        let mice = self.store.find_mice(&MouseFilter::all())?;
        Ok(Cohort::from_mice(mice))
    }

    pub fn load_expression_matrix(&self) -> Result<SeriesMatrix> {
        Ok(self.load_cohort()?.expression_matrix())
    }

    /// Gene id → gene symbol
    pub fn load_gene_catalog(&self) -> Result<Catalog> {
        let mut catalog = Catalog::default();
        for gene in self.store.find_genes(&GeneFilter::all())? {
            catalog.insert(gene.ensembl_gene_id, gene.gene_symbol);
        }
        Ok(catalog)
    }

    /// Phenotype id → description; `numeric_only` keeps `FLOAT`/`INT` only
    pub fn load_phenotype_catalog(&self, numeric_only: bool) -> Result<Catalog> {
        let mut catalog = Catalog::default();
        for attribute in self.load_phenotype_attributes(numeric_only)? {
            catalog.insert(attribute.id().to_string(), attribute.key_id_desc);
        }
        Ok(catalog)
    }

    pub fn load_catalog(&self, kind: MeasurementKind) -> Result<Catalog> {
        match kind {
            MeasurementKind::Expression => self.load_gene_catalog(),
            MeasurementKind::Phenotype => self.load_phenotype_catalog(false),
        }
    }

    pub fn load_phenotype_value<'m>(
        &self,
        id: &PhenotypeId,
        mouse: &'m Mouse,
    ) -> Option<&'m MeasurementValue> {
        mouse.phenotype(id)
    }

    pub fn find_attribute(&self, id: &PhenotypeId) -> Result<Option<Attribute>> {
        Ok(self
            .store
            .find_attribute(id.sub_key.as_deref(), &id.key_id)?)
    }

    /// Look up a phenotype by its textual id. A dotted id is tried as
    /// `sub_key.key_id` first, then as a bare `key_id` containing dots.
    pub fn resolve_attribute(&self, raw_id: &str) -> Result<Option<Attribute>> {
        let id = PhenotypeId::parse(raw_id)?;
        if let Some(attribute) = self.find_attribute(&id)? {
            return Ok(Some(attribute));
        }
        if id.sub_key.is_some() {
            return Ok(self.store.find_attribute(None, raw_id)?);
        }
        Ok(None)
    }

    /// Attributes eligible as phenotype candidates, in id order
    pub fn load_phenotype_attributes(&self, numeric_only: bool) -> Result<Vec<Attribute>> {
        let filter = AttributeFilter {
            sub_key: None,
            numeric_only,
        };
        Ok(self.store.find_attributes(&filter)?)
    }

    /// Case-insensitive search over a catalog, sorted by id.
    ///
    /// Expression search checks gene id and symbol; phenotype search checks
    /// the composite id and the description. An entry matching on more than
    /// one field appears once.
    pub fn search_catalog(&self, kind: MeasurementKind, text: &str) -> Result<Vec<CatalogEntry>> {
        let matcher = build_matcher(text)?;
        let catalog = self.load_catalog(kind)?;

        let hits = catalog
            .entries
            .into_iter()
            .filter(|(id, name)| matcher.is_match(id) || matcher.is_match(name))
            .map(|(id, display_name)| CatalogEntry { id, display_name })
            .collect();
        Ok(hits)
    }
}

/// Compile `text` as a case-insensitive regex, falling back to a literal
/// substring match when it is not valid regex syntax.
fn build_matcher(text: &str) -> Result<Regex> {
    match RegexBuilder::new(text).case_insensitive(true).build() {
        Ok(regex) => Ok(regex),
        Err(err) => {
            tracing::debug!("search text is not a regex ({}), matching literally", err);
            RegexBuilder::new(&regex::escape(text))
                .case_insensitive(true)
                .build()
                .map_err(|e| EngineError::Validation(format!("unusable search text: {}", e)))
        }
    }
}
