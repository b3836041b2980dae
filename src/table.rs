//! Per-measurement cohort tables and mouse lookups
//!
//! A table lists one measurement across every mouse in the cohort, with the
//! strain, diet and factor columns callers need to group or color a plot.
//! Every column is aligned with `mouse_ids`; absence is `None`.

use crate::error::{EngineError, Result};
use crate::model::{MeasurementKind, MeasurementValue, Mouse, ValueType};
use crate::store::{Cohort, GeneFilter, MeasurementStore, MouseFilter, StoreAdapter};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One measurement laid out over the cohort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTable {
    pub kind: MeasurementKind,
    pub id: String,
    pub mouse_ids: Vec<String>,
    pub strains: Vec<Option<String>>,
    pub diets: Vec<Option<String>>,
    pub value_type: ValueType,
    pub values: Vec<Option<MeasurementValue>>,
    /// Factor key → column; keys are the union over the cohort
    pub factors: BTreeMap<String, Vec<Option<String>>>,
}

impl MeasurementTable {
    pub fn len(&self) -> usize {
        self.mouse_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mouse_ids.is_empty()
    }

    /// Mice that actually carry the measurement
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

pub struct TableView<'s, S: MeasurementStore + ?Sized> {
    adapter: StoreAdapter<'s, S>,
}

impl<'s, S: MeasurementStore + ?Sized> TableView<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            adapter: StoreAdapter::new(store),
        }
    }

    pub fn table(&self, kind: MeasurementKind, id: &str) -> Result<MeasurementTable> {
        match kind {
            MeasurementKind::Expression => {
                let genes = self.adapter.store().find_genes(&GeneFilter::by_id(id))?;
                if genes.is_empty() {
                    return Err(EngineError::not_found(kind, id));
                }
                let cohort = self.adapter.load_cohort()?;
                Ok(build_table(kind, id, ValueType::Number, &cohort, |mouse| {
                    mouse.expression(id).map(MeasurementValue::Number)
                }))
            }
            MeasurementKind::Phenotype => {
                let attribute = self
                    .adapter
                    .resolve_attribute(id)?
                    .ok_or_else(|| EngineError::not_found(kind, id))?;
                let phenotype_id = attribute.id();
                let cohort = self.adapter.load_cohort()?;
                Ok(build_table(
                    kind,
                    &phenotype_id.to_string(),
                    attribute.value_type(),
                    &cohort,
                    |mouse| self.adapter.load_phenotype_value(&phenotype_id, mouse).cloned(),
                ))
            }
        }
    }

    pub fn mouse(&self, mouse_id: &str) -> Result<Mouse> {
        self.adapter
            .store()
            .find_mice(&MouseFilter::by_id(mouse_id))?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::MouseNotFound(mouse_id.to_string()))
    }

    /// Mice matching `filter`, in `mouse_id` order
    pub fn mice(&self, filter: &MouseFilter) -> Result<Vec<Mouse>> {
        Ok(self.adapter.store().find_mice(filter)?)
    }
}

fn build_table<F>(
    kind: MeasurementKind,
    id: &str,
    value_type: ValueType,
    cohort: &Cohort,
    value_of: F,
) -> MeasurementTable
where
    F: Fn(&Mouse) -> Option<MeasurementValue>,
{
    let mice = cohort.mice();
    let factor_keys: BTreeSet<&str> = mice
        .iter()
        .flat_map(|m| m.factors.keys().map(String::as_str))
        .collect();

    let factors: BTreeMap<String, Vec<Option<String>>> = factor_keys
        .into_iter()
        .map(|key| {
            let column: Vec<Option<String>> =
                mice.iter().map(|m| m.factors.get(key).cloned()).collect();
            (key.to_string(), column)
        })
        .collect();

    MeasurementTable {
        kind,
        id: id.to_string(),
        mouse_ids: mice.iter().map(|m| m.mouse_id.clone()).collect(),
        strains: mice.iter().map(|m| m.group.clone()).collect(),
        diets: mice.iter().map(|m| m.diet_desc.clone()).collect(),
        value_type,
        values: mice.iter().map(value_of).collect(),
        factors,
    }
}
