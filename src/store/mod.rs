// Measurement store access
//
// The engine never talks to a database directly. It consumes the
// `MeasurementStore` contract (find mice, genes and attributes) through an
// explicit handle, and `StoreAdapter` turns those record fetches into the
// bulk-loaded, mouse-indexed series the correlation scan needs.
//
// `MemoryStore` is the bundled implementation, loaded from a JSON snapshot.

mod adapter;
mod filter;
mod memory;

pub use adapter::{Catalog, CatalogEntry, Cohort, SeriesMatrix, StoreAdapter};
pub use filter::{AttributeFilter, GeneFilter, MouseFilter};
pub use memory::{MemoryStore, Snapshot};

use crate::model::{Attribute, Gene, Mouse};
use thiserror::Error;

/// Failure reading from the backing store. Always transient from the
/// engine's point of view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("store read failed: {0}")]
    ReadFailed(String),
}

/// Read-only data-access contract supplied by the storage collaborator
///
/// Implementations must tolerate concurrent reads; the engine shares one
/// handle across parallel scoring workers.
pub trait MeasurementStore: Send + Sync {
    /// Mice matching `filter`, ordered by `mouse_id` ascending
    fn find_mice(&self, filter: &MouseFilter) -> Result<Vec<Mouse>, StoreError>;

    /// Genes matching `filter`, ordered by `ensembl_gene_id` ascending
    fn find_genes(&self, filter: &GeneFilter) -> Result<Vec<Gene>, StoreError>;

    /// Exact attribute lookup by composite key
    fn find_attribute(
        &self,
        sub_key: Option<&str>,
        key_id: &str,
    ) -> Result<Option<Attribute>, StoreError>;

    /// Attributes matching `filter`, ordered by composite id ascending
    fn find_attributes(&self, filter: &AttributeFilter) -> Result<Vec<Attribute>, StoreError>;
}

impl<S: MeasurementStore + ?Sized> MeasurementStore for &S {
    fn find_mice(&self, filter: &MouseFilter) -> Result<Vec<Mouse>, StoreError> {
        (**self).find_mice(filter)
    }

    fn find_genes(&self, filter: &GeneFilter) -> Result<Vec<Gene>, StoreError> {
        (**self).find_genes(filter)
    }

    fn find_attribute(
        &self,
        sub_key: Option<&str>,
        key_id: &str,
    ) -> Result<Option<Attribute>, StoreError> {
        (**self).find_attribute(sub_key, key_id)
    }

    fn find_attributes(&self, filter: &AttributeFilter) -> Result<Vec<Attribute>, StoreError> {
        (**self).find_attributes(filter)
    }
}
