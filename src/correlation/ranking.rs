use std::cmp::Ordering;

/// A candidate that produced a defined coefficient
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub id: String,
    pub correlation: f64,
}

impl ScoredCandidate {
    pub fn new(id: impl Into<String>, correlation: f64) -> Self {
        Self {
            id: id.into(),
            correlation,
        }
    }

    pub fn strength(&self) -> f64 {
        self.correlation.abs()
    }
}

/// Ranking order: |r| descending, then id ascending (byte-wise).
///
/// Candidate ids are unique within a scan, so this is a total order and the
/// output does not depend on scoring order.
pub fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.strength()
        .total_cmp(&a.strength())
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort `scored` by [`compare_ranked`] and keep the first `k`
pub fn rank_top_k(mut scored: Vec<ScoredCandidate>, k: usize) -> Vec<ScoredCandidate> {
    if k < scored.len() {
        // Partition first so only the kept prefix pays for a full sort
        scored.select_nth_unstable_by(k, compare_ranked);
        scored.truncate(k);
    }
    scored.sort_unstable_by(compare_ranked);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ranked: &[ScoredCandidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_rank_by_absolute_strength() {
        let scored = vec![
            ScoredCandidate::new("a", 0.2),
            ScoredCandidate::new("b", -0.9),
            ScoredCandidate::new("c", 0.5),
        ];
        let ranked = rank_top_k(scored, 10);
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
        assert_eq!(ranked[0].correlation, -0.9);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let scored = vec![
            ScoredCandidate::new("gene_z", 0.7),
            ScoredCandidate::new("gene_a", -0.7),
            ScoredCandidate::new("gene_m", 0.7),
        ];
        let ranked = rank_top_k(scored, 3);
        assert_eq!(ids(&ranked), vec!["gene_a", "gene_m", "gene_z"]);
    }

    #[test]
    fn test_truncation_keeps_strongest() {
        let scored: Vec<_> = (0..50)
            .map(|i| ScoredCandidate::new(format!("g{:02}", i), i as f64 / 50.0))
            .collect();
        let ranked = rank_top_k(scored, 3);
        assert_eq!(ids(&ranked), vec!["g49", "g48", "g47"]);
    }

    #[test]
    fn test_zero_k_and_empty() {
        assert!(rank_top_k(vec![ScoredCandidate::new("a", 1.0)], 0).is_empty());
        assert!(rank_top_k(Vec::new(), 5).is_empty());
    }
}
