use crate::model::{AuditSummary, Issue, KeptGroup, ScoredGroup};

/// Aggregate counts for one run.
pub fn compute_summary(
    kept: &[KeptGroup],
    force_split: &[ScoredGroup],
    issues: &[Issue],
    auto_split_count: usize,
) -> AuditSummary {
    let mut omission_count = 0;
    let mut addition_count = 0;
    let mut low_similarity_count = 0;

    for issue in issues {
        match issue {
            Issue::Omission { .. } => omission_count += 1,
            Issue::Addition { .. } => addition_count += 1,
            Issue::LowSimilarity { .. } => low_similarity_count += 1,
        }
    }

    AuditSummary {
        total_issues: omission_count + addition_count + low_similarity_count,
        omission_count,
        addition_count,
        low_similarity_count,
        force_split_count: force_split.len(),
        auto_split_count,
        kept_groups: kept.len(),
    }
}
