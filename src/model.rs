//! Cohort records: mice, genes and phenotype attributes
//!
//! These mirror the documents held by the measurement store. They are created
//! by import tooling and never mutated by the query engine.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which catalog a measurement id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Gene expression intensity, keyed by ensembl gene id
    Expression,
    /// Phenotype attribute, keyed by `sub_key.key_id`
    Phenotype,
}

impl MeasurementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementKind::Expression => "expression",
            MeasurementKind::Phenotype => "phenotype",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expression" => Ok(MeasurementKind::Expression),
            "phenotype" => Ok(MeasurementKind::Phenotype),
            other => Err(EngineError::Validation(format!(
                "unknown measurement kind '{}' (expected expression or phenotype)",
                other
            ))),
        }
    }
}

/// A single stored measurement value
///
/// Phenotypes may be numeric or categorical; expression values are always
/// numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Number(f64),
    Text(String),
}

impl MeasurementValue {
    /// Numeric view used by correlation. Text that parses as a finite number
    /// counts; anything else is absent.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            MeasurementValue::Number(n) => *n,
            MeasurementValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementValue::Number(n) => write!(f, "{}", n),
            MeasurementValue::Text(s) => f.write_str(s),
        }
    }
}

/// Phenotype storage under a mouse: either a bare value or a `key_id` group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhenotypeEntry {
    Value(MeasurementValue),
    Group(BTreeMap<String, MeasurementValue>),
}

/// Composite phenotype identifier, `sub_key.key_id` or a bare `key_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhenotypeId {
    pub sub_key: Option<String>,
    pub key_id: String,
}

impl PhenotypeId {
    /// Split on the first `.`; both halves must be non-empty.
    pub fn parse(id: &str) -> Result<Self, EngineError> {
        let malformed = || EngineError::Validation(format!("malformed phenotype id '{}'", id));

        match id.split_once('.') {
            Some((sub_key, key_id)) => {
                if sub_key.is_empty() || key_id.is_empty() {
                    return Err(malformed());
                }
                Ok(Self {
                    sub_key: Some(sub_key.to_string()),
                    key_id: key_id.to_string(),
                })
            }
            None if id.is_empty() => Err(malformed()),
            None => Ok(Self {
                sub_key: None,
                key_id: id.to_string(),
            }),
        }
    }
}

impl fmt::Display for PhenotypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_key {
            Some(sub_key) => write!(f, "{}.{}", sub_key, self.key_id),
            None => f.write_str(&self.key_id),
        }
    }
}

/// One experimental subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mouse {
    pub mouse_id: String,

    /// Strain or experimental group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_desc: Option<String>,

    /// Design-file factors (treatment, strain, batch, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub factors: BTreeMap<String, String>,

    /// Gene id → intensity; `None` when the mouse was never arrayed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_data: Option<BTreeMap<String, f64>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub phenotypes: BTreeMap<String, PhenotypeEntry>,
}

impl Mouse {
    pub fn new(mouse_id: impl Into<String>) -> Self {
        Self {
            mouse_id: mouse_id.into(),
            group: None,
            diet_desc: None,
            factors: BTreeMap::new(),
            expression_data: None,
            phenotypes: BTreeMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_diet(mut self, diet: impl Into<String>) -> Self {
        self.diet_desc = Some(diet.into());
        self
    }

    pub fn with_factor(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.factors.insert(key.into(), value.into());
        self
    }

    pub fn with_expression(mut self, gene_id: impl Into<String>, value: f64) -> Self {
        self.expression_data
            .get_or_insert_with(BTreeMap::new)
            .insert(gene_id.into(), value);
        self
    }

    pub fn with_phenotype(mut self, id: &PhenotypeId, value: MeasurementValue) -> Self {
        match &id.sub_key {
            Some(sub_key) => {
                let entry = self
                    .phenotypes
                    .entry(sub_key.clone())
                    .or_insert_with(|| PhenotypeEntry::Group(BTreeMap::new()));
                if let PhenotypeEntry::Value(_) = entry {
                    *entry = PhenotypeEntry::Group(BTreeMap::new());
                }
                if let PhenotypeEntry::Group(group) = entry {
                    group.insert(id.key_id.clone(), value);
                }
            }
            None => {
                self.phenotypes
                    .insert(id.key_id.clone(), PhenotypeEntry::Value(value));
            }
        }
        self
    }

    /// Finite expression intensity for `gene_id`, if measured
    pub fn expression(&self, gene_id: &str) -> Option<f64> {
        self.expression_data
            .as_ref()?
            .get(gene_id)
            .copied()
            .filter(|v| v.is_finite())
    }

    pub fn has_expression(&self) -> bool {
        self.expression_data.is_some()
    }

    /// Stored phenotype value at `sub_key.key_id` (or top-level `key_id`)
    pub fn phenotype(&self, id: &PhenotypeId) -> Option<&MeasurementValue> {
        match (&id.sub_key, self.phenotypes.get(id.sub_key.as_ref().unwrap_or(&id.key_id))?) {
            (Some(_), PhenotypeEntry::Group(group)) => group.get(&id.key_id),
            (None, PhenotypeEntry::Value(value)) => Some(value),
            _ => None,
        }
    }
}

/// Gene annotation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub ensembl_gene_id: String,
    pub gene_symbol: String,
    #[serde(default)]
    pub chrom: String,
    #[serde(default)]
    pub gene_start: u64,
    #[serde(default)]
    pub gene_end: u64,
}

impl Gene {
    pub fn new(ensembl_gene_id: impl Into<String>, gene_symbol: impl Into<String>) -> Self {
        Self {
            ensembl_gene_id: ensembl_gene_id.into(),
            gene_symbol: gene_symbol.into(),
            chrom: String::new(),
            gene_start: 0,
            gene_end: 0,
        }
    }
}

/// How a measurement's values should be interpreted by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Identifier,
}

impl ValueType {
    /// `FLOAT` and `INT` are numeric; every other declared type is an identifier.
    pub fn from_declared(declared: &str) -> Self {
        match declared.trim().to_ascii_uppercase().as_str() {
            "FLOAT" | "INT" => ValueType::Number,
            _ => ValueType::Identifier,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Identifier => "identifier",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phenotype catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_key: Option<String>,
    pub key_id: String,
    /// Declared storage type (`FLOAT`, `INT`, `STRING`, ...)
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub key_id_desc: String,
}

impl Attribute {
    pub fn new(id: &PhenotypeId, declared_type: &str, description: &str) -> Self {
        Self {
            sub_key: id.sub_key.clone(),
            key_id: id.key_id.clone(),
            declared_type: declared_type.to_string(),
            key_id_desc: description.to_string(),
        }
    }

    pub fn id(&self) -> PhenotypeId {
        PhenotypeId {
            sub_key: self.sub_key.clone(),
            key_id: self.key_id.clone(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        ValueType::from_declared(&self.declared_type)
    }

    pub fn is_numeric(&self) -> bool {
        self.value_type() == ValueType::Number
    }
}
