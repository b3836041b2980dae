//! Pairwise correlation statistics
//!
//! Every statistic consumes two already-aligned sequences of equal length and
//! yields a coefficient in [-1, 1]. Degenerate input (fewer than two points,
//! a constant series, non-finite values) is reported as a [`StatisticError`]
//! so the caller can drop the pairing without aborting a whole scan.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minimum number of paired observations for any coefficient
pub const MIN_PAIRED_POINTS: usize = 2;

/// Why a coefficient could not be computed for one pairing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatisticError {
    #[error("need at least {required} paired points, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("{series} series has zero variance")]
    ZeroVariance { series: &'static str },

    #[error("{series} series contains a non-finite value")]
    NonFinite { series: &'static str },

    #[error("paired sequences differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
}

/// A correlation coefficient over paired observations
pub trait Statistic: Send + Sync {
    fn name(&self) -> &'static str;

    fn coefficient(&self, x: &[f64], y: &[f64]) -> Result<f64, StatisticError>;
}

/// Selectable correlation statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationKind {
    Pearson,
    Spearman,
    /// Biweight midcorrelation; accepted by the API but not implemented
    Biweight,
}

impl CorrelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CorrelationKind::Pearson => "pearson",
            CorrelationKind::Spearman => "spearman",
            CorrelationKind::Biweight => "biweight",
        }
    }

    /// Resolve to an implementation. Unimplemented kinds are rejected rather
    /// than substituted.
    pub fn statistic(self) -> Result<&'static dyn Statistic, EngineError> {
        match self {
            CorrelationKind::Pearson => Ok(&PearsonCorrelation),
            CorrelationKind::Spearman => Ok(&SpearmanCorrelation),
            CorrelationKind::Biweight => Err(EngineError::UnsupportedStatistic(self)),
        }
    }
}

impl fmt::Display for CorrelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pearson" => Ok(CorrelationKind::Pearson),
            "spearman" => Ok(CorrelationKind::Spearman),
            "biweight" => Ok(CorrelationKind::Biweight),
            other => Err(EngineError::Validation(format!(
                "unknown correlation kind '{}' (expected pearson, spearman or biweight)",
                other
            ))),
        }
    }
}

/// Pearson product-moment correlation
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonCorrelation;

impl Statistic for PearsonCorrelation {
    fn name(&self) -> &'static str {
        "pearson"
    }

    fn coefficient(&self, x: &[f64], y: &[f64]) -> Result<f64, StatisticError> {
        check_paired(x, y)?;
        pearson(x, y)
    }
}

/// Spearman rank correlation with average ranks for ties
#[derive(Debug, Clone, Copy, Default)]
pub struct SpearmanCorrelation;

impl Statistic for SpearmanCorrelation {
    fn name(&self) -> &'static str {
        "spearman"
    }

    fn coefficient(&self, x: &[f64], y: &[f64]) -> Result<f64, StatisticError> {
        check_paired(x, y)?;
        pearson(&fractional_ranks(x), &fractional_ranks(y))
    }
}

fn check_paired(x: &[f64], y: &[f64]) -> Result<(), StatisticError> {
    if x.len() != y.len() {
        return Err(StatisticError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.len() < MIN_PAIRED_POINTS {
        return Err(StatisticError::InsufficientPoints {
            required: MIN_PAIRED_POINTS,
            actual: x.len(),
        });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(StatisticError::NonFinite { series: "first" });
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(StatisticError::NonFinite { series: "second" });
    }
    Ok(())
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Inputs must already satisfy `check_paired`.
fn pearson(x: &[f64], y: &[f64]) -> Result<f64, StatisticError> {
    // Constant series are caught up front; a mean that is not exactly
    // representable would otherwise leave a tiny non-zero variance.
    if is_constant(x) {
        return Err(StatisticError::ZeroVariance { series: "first" });
    }
    if is_constant(y) {
        return Err(StatisticError::ZeroVariance { series: "second" });
    }

    // Power-of-two scaling is exact and keeps the sums finite and
    // non-zero at extreme magnitudes; r is scale invariant.
    let scale_x = binary_scale(x);
    let scale_y = binary_scale(y);

    let n = x.len() as f64;
    let mean_x = x.iter().map(|a| a / scale_x).sum::<f64>() / n;
    let mean_y = y.iter().map(|b| b / scale_y).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a / scale_x - mean_x;
        let dy = b / scale_y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        let series = if sxx == 0.0 { "first" } else { "second" };
        return Err(StatisticError::ZeroVariance { series });
    }

    Ok((sxy / denom).clamp(-1.0, 1.0))
}

/// Power of two near the largest magnitude in `values`
fn binary_scale(values: &[f64]) -> f64 {
    let max_abs = values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()));
    let exponent = max_abs.log2().floor().clamp(-1000.0, 1000.0) as i32;
    2f64.powi(exponent)
}

/// 1-based ranks; tied values share the mean of the ranks they span.
pub fn fractional_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}
