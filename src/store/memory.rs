use crate::model::{Attribute, Gene, Mouse};
use crate::store::{AttributeFilter, GeneFilter, MeasurementStore, MouseFilter, StoreError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// On-disk cohort snapshot
///
/// # Example JSON
/// ```json
/// {
///   "mice": [{"mouse_id": "DO-001", "group": "DO", "expression_data": {"ENSMUSG01": 7.2}}],
///   "genes": [{"ensembl_gene_id": "ENSMUSG01", "gene_symbol": "Ins2", "chrom": "7"}],
///   "attributes": [{"sub_key": "clinical", "key_id": "weight", "type": "FLOAT", "key_id_desc": "Body weight"}]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub mice: Vec<Mouse>,
    #[serde(default)]
    pub genes: Vec<Gene>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Immutable in-memory store backed by a [`Snapshot`]
///
/// Records are kept sorted by their primary id so every query answers in the
/// order the store contract promises.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    mice: Vec<Mouse>,
    genes: Vec<Gene>,
    attributes: Vec<Attribute>,
}

impl MemoryStore {
    /// Build a store, rejecting duplicate mouse, gene or attribute ids
    pub fn new(mice: Vec<Mouse>, genes: Vec<Gene>, attributes: Vec<Attribute>) -> Result<Self> {
        Self::from_snapshot(Snapshot {
            mice,
            genes,
            attributes,
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let Snapshot {
            mut mice,
            mut genes,
            mut attributes,
        } = snapshot;

        let mut seen = HashSet::new();
        for mouse in &mice {
            if !seen.insert(mouse.mouse_id.as_str()) {
                anyhow::bail!("Duplicate mouse_id '{}' in snapshot", mouse.mouse_id);
            }
        }

        let mut seen = HashSet::new();
        for gene in &genes {
            if !seen.insert(gene.ensembl_gene_id.as_str()) {
                anyhow::bail!("Duplicate ensembl_gene_id '{}' in snapshot", gene.ensembl_gene_id);
            }
        }

        // Keyed on the rendered id: `glucose`/`t0` and a bare `glucose.t0`
        // share one catalog slot.
        let mut seen = HashSet::new();
        for attribute in &attributes {
            let id = attribute.id().to_string();
            if seen.contains(&id) {
                anyhow::bail!("Duplicate attribute '{}' in snapshot", id);
            }
            seen.insert(id);
        }

        mice.sort_by(|a, b| a.mouse_id.cmp(&b.mouse_id));
        genes.sort_by(|a, b| a.ensembl_gene_id.cmp(&b.ensembl_gene_id));
        attributes.sort_by_key(|a| a.id().to_string());

        tracing::debug!(
            mice = mice.len(),
            genes = genes.len(),
            attributes = attributes.len(),
            "loaded cohort snapshot"
        );

        Ok(Self {
            mice,
            genes,
            attributes,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(json).context("Failed to parse cohort snapshot JSON")?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read snapshot file: {}", path.as_ref().display())
        })?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid snapshot: {}", path.as_ref().display()))
    }

    pub fn mouse_count(&self) -> usize {
        self.mice.len()
    }

    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }
}

impl MeasurementStore for MemoryStore {
    fn find_mice(&self, filter: &MouseFilter) -> Result<Vec<Mouse>, StoreError> {
        Ok(self
            .mice
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    fn find_genes(&self, filter: &GeneFilter) -> Result<Vec<Gene>, StoreError> {
        Ok(self
            .genes
            .iter()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect())
    }

    fn find_attribute(
        &self,
        sub_key: Option<&str>,
        key_id: &str,
    ) -> Result<Option<Attribute>, StoreError> {
        Ok(self
            .attributes
            .iter()
            .find(|a| a.sub_key.as_deref() == sub_key && a.key_id == key_id)
            .cloned())
    }

    fn find_attributes(&self, filter: &AttributeFilter) -> Result<Vec<Attribute>, StoreError> {
        Ok(self
            .attributes
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }
}
