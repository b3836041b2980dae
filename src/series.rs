//! Sparse, mouse-indexed measurement series and their alignment
//!
//! A series only holds entries for mice that actually carry the measurement.
//! Absence is an ordinary `None` from [`MeasurementSeries::get`]; nothing is
//! imputed or zero-filled. Two series are comparable only over the mouse rows
//! present in both.

use std::collections::BTreeMap;

/// Row index of a mouse within one request's cohort
pub type MouseIndex = usize;

/// Measurement values keyed by mouse row index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementSeries {
    values: BTreeMap<MouseIndex, f64>,
}

/// Values of two series restricted to their shared mouse rows, paired by
/// position in ascending row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPairs {
    pub indices: Vec<MouseIndex>,
    pub reference: Vec<f64>,
    pub candidate: Vec<f64>,
}

impl AlignedPairs {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl MeasurementSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-finite values are dropped; they count as missing.
    pub fn insert(&mut self, index: MouseIndex, value: f64) {
        if value.is_finite() {
            self.values.insert(index, value);
        }
    }

    pub fn get(&self, index: MouseIndex) -> Option<f64> {
        self.values.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pair `self` (reference) with `candidate` on their common rows.
    ///
    /// Both maps are ordered, so a single merge walk produces the
    /// intersection in ascending row order.
    pub fn align(&self, candidate: &MeasurementSeries) -> AlignedPairs {
        let capacity = self.len().min(candidate.len());
        let mut pairs = AlignedPairs {
            indices: Vec::with_capacity(capacity),
            reference: Vec::with_capacity(capacity),
            candidate: Vec::with_capacity(capacity),
        };

        let mut left = self.values.iter().peekable();
        let mut right = candidate.values.iter().peekable();
        loop {
            let (Some(&(&li, &lv)), Some(&(&ri, &rv))) = (left.peek(), right.peek()) else {
                break;
            };
            match li.cmp(&ri) {
                std::cmp::Ordering::Less => {
                    left.next();
                }
                std::cmp::Ordering::Greater => {
                    right.next();
                }
                std::cmp::Ordering::Equal => {
                    pairs.indices.push(li);
                    pairs.reference.push(lv);
                    pairs.candidate.push(rv);
                    left.next();
                    right.next();
                }
            }
        }
        pairs
    }
}

impl FromIterator<(MouseIndex, f64)> for MeasurementSeries {
    fn from_iter<I: IntoIterator<Item = (MouseIndex, f64)>>(iter: I) -> Self {
        let mut series = MeasurementSeries::new();
        for (index, value) in iter {
            series.insert(index, value);
        }
        series
    }
}
