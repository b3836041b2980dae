use crate::model::{Attribute, Gene, Mouse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured mouse query. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_desc: Option<String>,

    /// Factor equalities, e.g. `{"sex": "F"}`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub factors: BTreeMap<String, String>,

    /// Only mice that carry an expression mapping
    #[serde(default)]
    pub with_expression: bool,
}

impl MouseFilter {
    /// Matches every mouse
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(mouse_id: impl Into<String>) -> Self {
        Self {
            mouse_id: Some(mouse_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, mouse: &Mouse) -> bool {
        if let Some(id) = &self.mouse_id {
            if &mouse.mouse_id != id {
                return false;
            }
        }
        if let Some(group) = &self.group {
            if mouse.group.as_ref() != Some(group) {
                return false;
            }
        }
        if let Some(diet) = &self.diet_desc {
            if mouse.diet_desc.as_ref() != Some(diet) {
                return false;
            }
        }
        if self.with_expression && !mouse.has_expression() {
            return false;
        }
        self.factors
            .iter()
            .all(|(key, value)| mouse.factors.get(key) == Some(value))
    }
}

/// Gene query by exact id and/or symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneFilter {
    pub ensembl_gene_id: Option<String>,
    pub gene_symbol: Option<String>,
}

impl GeneFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(ensembl_gene_id: impl Into<String>) -> Self {
        Self {
            ensembl_gene_id: Some(ensembl_gene_id.into()),
            gene_symbol: None,
        }
    }

    pub fn matches(&self, gene: &Gene) -> bool {
        self.ensembl_gene_id
            .as_ref()
            .map_or(true, |id| &gene.ensembl_gene_id == id)
            && self
                .gene_symbol
                .as_ref()
                .map_or(true, |symbol| &gene.gene_symbol == symbol)
    }
}

/// Attribute query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    pub sub_key: Option<String>,
    /// Keep only `FLOAT`/`INT` attributes
    pub numeric_only: bool,
}

impl AttributeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn numeric() -> Self {
        Self {
            sub_key: None,
            numeric_only: true,
        }
    }

    pub fn matches(&self, attribute: &Attribute) -> bool {
        if self.numeric_only && !attribute.is_numeric() {
            return false;
        }
        self.sub_key
            .as_ref()
            .map_or(true, |sub_key| attribute.sub_key.as_ref() == Some(sub_key))
    }
}
