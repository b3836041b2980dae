//! Error taxonomy for correlation, search and table requests
//!
//! Client-caused failures (validation, not found) are distinguished from
//! transient ones (store unavailable, cancelled) so callers can decide whether
//! a retry makes sense. Degenerate pairwise statistics never reach this type:
//! the engine drops those candidates.

use crate::model::MeasurementKind;
use crate::statistic::CorrelationKind;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to callers of the engine, search and table layers
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("unsupported correlation kind: {0}")]
    UnsupportedStatistic(CorrelationKind),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: MeasurementKind, id: String },

    #[error("mouse '{0}' not found")]
    MouseNotFound(String),

    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] StoreError),

    #[error("correlation scan cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Who is responsible for a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Bad request or unknown id; retrying unchanged will fail again
    Client,
    /// Store or scheduling failure; the same request may succeed later
    Transient,
}

impl EngineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            EngineError::Validation(_)
            | EngineError::UnsupportedStatistic(_)
            | EngineError::NotFound { .. }
            | EngineError::MouseNotFound(_) => ErrorClass::Client,
            EngineError::DataUnavailable(_) | EngineError::Cancelled => ErrorClass::Transient,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    pub fn not_found(kind: MeasurementKind, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// JSON error body returned in place of a result object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub class: ErrorClass,
    pub retryable: bool,
}

impl From<&EngineError> for ErrorResponse {
    fn from(err: &EngineError) -> Self {
        Self {
            error: err.to_string(),
            class: err.class(),
            retryable: err.is_retryable(),
        }
    }
}
