//! N:N auto-split.
//!
//! A bundled `N:N` group (`N > 1`) is read as `N` positional `1:1` pairs. If
//! the mean of the pair similarities is strictly greater than the bundled
//! similarity, the group is replaced by the pairs. Groups with `N != M` or
//! `N == 1` are never split.

use crate::config::SimilarityPolicy;
use crate::embed::Embedder;
use crate::error::AuditError;
use crate::model::{AlignmentGroup, ScoredGroup, SentenceList};
use crate::scorer::SimilarityScorer;

#[derive(Debug)]
pub struct AutoSplitOutput {
    pub groups: Vec<ScoredGroup>,
    /// Number of bundled groups that were dissolved.
    pub split_count: usize,
}

/// Replace `group` by its positional pairs when they score better on average.
///
/// `individual[i]` is the `1:1` similarity of `src_indices[i]` against
/// `tgt_indices[i]`. Returns `None` when the group should stay intact.
pub fn try_split(group: &ScoredGroup, individual: &[f32]) -> Option<Vec<ScoredGroup>> {
    let bundled = group.similarity?;
    if !group.group.is_square_multi() || individual.len() != group.src_indices().len() {
        return None;
    }

    let mean = individual.iter().sum::<f32>() / individual.len() as f32;
    if mean <= bundled {
        return None;
    }

    let pairs = group
        .src_indices()
        .iter()
        .zip(group.tgt_indices())
        .zip(individual)
        .map(|((&s, &t), &sim)| ScoredGroup {
            group: AlignmentGroup::new(vec![s], vec![t]),
            similarity: Some(sim),
            was_force_split: false,
            auto_split: true,
        })
        .collect();
    Some(pairs)
}

/// Run the auto-split over every scored group, preserving order.
pub fn auto_split<E: Embedder + ?Sized>(
    groups: Vec<ScoredGroup>,
    source: &SentenceList,
    target: &SentenceList,
    scorer: &mut SimilarityScorer<'_, E>,
) -> Result<AutoSplitOutput, AuditError> {
    let mut out = Vec::with_capacity(groups.len());
    let mut split_count = 0;

    for group in groups {
        if group.similarity.is_none() || !group.group.is_square_multi() {
            out.push(group);
            continue;
        }

        let mut individual = Vec::with_capacity(group.src_indices().len());
        for (&s, &t) in group.src_indices().iter().zip(group.tgt_indices()) {
            let src = source.texts(&[s]);
            let tgt = target.texts(&[t]);
            let sim = scorer.score(&src, &tgt, SimilarityPolicy::Mean)?.ok_or_else(|| {
                AuditError::Encoding(format!("no similarity for pair ({s}, {t})"))
            })?;
            individual.push(sim);
        }

        match try_split(&group, &individual) {
            Some(pairs) => {
                log::debug!(
                    "auto-split {:?}/{:?}: bundled {:.4} -> pairs {:?}",
                    group.src_indices(),
                    group.tgt_indices(),
                    group.similarity.unwrap_or_default(),
                    individual
                );
                split_count += 1;
                out.extend(pairs);
            }
            None => out.push(group),
        }
    }

    Ok(AutoSplitOutput {
        groups: out,
        split_count,
    })
}
