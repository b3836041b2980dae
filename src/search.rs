//! Catalog search with 1-based paging
//!
//! Matches are computed over the whole catalog, sorted by id, and only then
//! sliced, so consecutive pages are disjoint and contiguous and `total_count`
//! always reports the full match set.

use crate::error::Result;
use crate::model::MeasurementKind;
use crate::store::{MeasurementStore, StoreAdapter};
use serde::{Deserialize, Serialize};

/// Offset/limit window resolved from caller-supplied 1-based values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based offset into the sorted match set
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    /// `start_index <= 0` behaves as 1 and `max_count <= 0` behaves as 1.
    ///
    /// # Example
    /// ```
    /// use phenocorr::search::PageRequest;
    ///
    /// let page = PageRequest::from_one_based(11, 10);
    /// assert_eq!((page.offset, page.limit), (10, 10));
    ///
    /// let clamped = PageRequest::from_one_based(-3, 0);
    /// assert_eq!((clamped.offset, clamped.limit), (0, 1));
    /// ```
    pub fn from_one_based(start_index: i64, max_count: i64) -> Self {
        let start = start_index.max(1);
        let count = max_count.max(1);
        Self {
            offset: usize::try_from(start - 1).unwrap_or(usize::MAX),
            limit: usize::try_from(count).unwrap_or(usize::MAX),
        }
    }

    fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        &items[start..end]
    }
}

/// One page of search hits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub ids: Vec<String>,
    pub names: Vec<String>,
    /// Size of the full match set, independent of the page window
    pub total_count: usize,
}

impl SearchPage {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Free-text search over the gene or phenotype catalog
pub struct CatalogSearch<'s, S: MeasurementStore + ?Sized> {
    adapter: StoreAdapter<'s, S>,
}

impl<'s, S: MeasurementStore + ?Sized> CatalogSearch<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            adapter: StoreAdapter::new(store),
        }
    }

    pub fn search(
        &self,
        kind: MeasurementKind,
        text: &str,
        start_index: i64,
        max_count: i64,
    ) -> Result<SearchPage> {
        let page = PageRequest::from_one_based(start_index, max_count);
        self.search_page(kind, text, page)
    }

    pub fn search_page(
        &self,
        kind: MeasurementKind,
        text: &str,
        page: PageRequest,
    ) -> Result<SearchPage> {
        let hits = self.adapter.search_catalog(kind, text)?;
        let window = page.slice(&hits);

        tracing::debug!(
            kind = %kind,
            text,
            matches = hits.len(),
            offset = page.offset,
            returned = window.len(),
            "catalog search"
        );

        Ok(SearchPage {
            ids: window.iter().map(|hit| hit.id.clone()).collect(),
            names: window.iter().map(|hit| hit.display_name.clone()).collect(),
            total_count: hits.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, Gene, PhenotypeId};
    use crate::store::MemoryStore;

    fn gene_store(n: usize) -> MemoryStore {
        // Insert in reverse so ordering comes from the search, not the input
        let genes = (0..n)
            .rev()
            .map(|i| Gene::new(format!("ENSMUSG{:05}", i), format!("Gm{}", i)))
            .collect();
        MemoryStore::new(vec![], genes, vec![]).unwrap()
    }

    #[test]
    fn test_page_request_clamping() {
        assert_eq!(
            PageRequest::from_one_based(0, 0),
            PageRequest { offset: 0, limit: 1 }
        );
        assert_eq!(
            PageRequest::from_one_based(i64::MIN, -5),
            PageRequest { offset: 0, limit: 1 }
        );
        assert_eq!(
            PageRequest::from_one_based(21, 5),
            PageRequest {
                offset: 20,
                limit: 5
            }
        );
    }

    #[test]
    fn test_consecutive_pages_are_disjoint_and_contiguous() {
        let store = gene_store(25);
        let search = CatalogSearch::new(&store);

        let first = search.search(MeasurementKind::Expression, "ensmusg", 1, 10).unwrap();
        let second = search.search(MeasurementKind::Expression, "ensmusg", 11, 10).unwrap();
        assert_eq!(first.total_count, 25);
        assert_eq!(second.total_count, 25);
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);

        assert_eq!(first.ids[0], "ENSMUSG00000");
        assert_eq!(first.ids[9], "ENSMUSG00009");
        assert_eq!(second.ids[0], "ENSMUSG00010");
        assert!(first.ids.iter().all(|id| !second.ids.contains(id)));
    }

    #[test]
    fn test_non_positive_window_behaves_as_one() {
        let store = gene_store(5);
        let search = CatalogSearch::new(&store);

        let clamped = search.search(MeasurementKind::Expression, "gm", 0, 0).unwrap();
        let explicit = search.search(MeasurementKind::Expression, "gm", 1, 1).unwrap();
        assert_eq!(clamped, explicit);
        assert_eq!(clamped.ids, vec!["ENSMUSG00000"]);
        assert_eq!(clamped.names, vec!["Gm0"]);
    }

    #[test]
    fn test_start_past_end_keeps_total() {
        let store = gene_store(3);
        let page = CatalogSearch::new(&store)
            .search(MeasurementKind::Expression, "gm", 50, 10)
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn test_last_partial_page() {
        let store = gene_store(12);
        let page = CatalogSearch::new(&store)
            .search(MeasurementKind::Expression, "gm", 11, 10)
            .unwrap();
        assert_eq!(page.ids, vec!["ENSMUSG00010", "ENSMUSG00011"]);
    }

    #[test]
    fn test_phenotype_search_renders_composite_ids() {
        let store = MemoryStore::new(
            vec![],
            vec![],
            vec![
                Attribute::new(&PhenotypeId::parse("sex").unwrap(), "STRING", "Sex"),
                Attribute::new(
                    &PhenotypeId::parse("clinical.weight").unwrap(),
                    "FLOAT",
                    "Body weight at sacrifice",
                ),
            ],
        )
        .unwrap();
        let page = CatalogSearch::new(&store)
            .search(MeasurementKind::Phenotype, "weight|sex", 1, 10)
            .unwrap();
        assert_eq!(page.ids, vec!["clinical.weight", "sex"]);
        assert_eq!(page.names, vec!["Body weight at sacrifice", "Sex"]);
    }

    #[test]
    fn test_search_page_json_shape() {
        let store = gene_store(2);
        let page = CatalogSearch::new(&store)
            .search(MeasurementKind::Expression, "gm1", 1, 10)
            .unwrap();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["ids"][0], "ENSMUSG00001");
        assert_eq!(json["total_count"], 1);
    }
}
