//! phenocorr - correlation search over a mouse cohort's gene expression and
//! phenotype measurements
//!
//! Given a reference measurement (one gene's expression or one numeric
//! phenotype), the engine scores every candidate measurement against it on
//! the mice both were recorded for and returns the strongest correlations.
//! Around that core sit a paged catalog search, per-measurement cohort
//! tables, and a JSON snapshot store.

pub mod cli;
pub mod config;
pub mod correlation;
pub mod error;
pub mod model;
pub mod output;
pub mod search;
pub mod series;
pub mod service;
pub mod statistic;
pub mod store;
pub mod table;
