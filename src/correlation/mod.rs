// Cross-measurement correlation search
//
// Given a reference measurement (a gene's expression or a numeric phenotype),
// score every candidate measurement of the requested kind against it and
// return the strongest correlations, strongest first.
//
// Pipeline per request:
// 1. Validate the statistic and result limit before touching the store
// 2. Bulk-load the cohort once and index series by mouse row
// 3. Align each candidate with the reference on shared mice and score it
//    (parallel, cancellable; degenerate pairings are dropped, not fatal)
// 4. Rank by |r| descending with id as tie-break, truncate to the top K

mod cancel;
mod engine;
mod ranking;

pub use cancel::CancellationToken;
pub use engine::{CorrelationEngine, CorrelationRequest, CorrelationResult, ScanSummary};
pub use ranking::{rank_top_k, ScoredCandidate};
