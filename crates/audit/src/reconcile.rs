//! Coverage reconciliation.
//!
//! After classification every source index must sit in exactly one kept group
//! or one omission, and every target index in exactly one kept group or one
//! addition. Indices the aligner never placed are appended as new issues.

use std::collections::BTreeSet;

use crate::classify::Classification;
use crate::model::{Issue, SentenceList};

/// Indices already accounted for on each side.
#[derive(Debug, Default)]
pub struct Coverage {
    pub src: BTreeSet<usize>,
    pub tgt: BTreeSet<usize>,
}

impl Coverage {
    /// Kept groups plus existing omissions and additions. Force-split groups
    /// count only through the issues they produced.
    pub fn of(classification: &Classification) -> Self {
        let mut cov = Coverage::default();
        for kept in &classification.kept {
            cov.src.extend(kept.scored.src_indices());
            cov.tgt.extend(kept.scored.tgt_indices());
        }
        for issue in &classification.issues {
            match issue {
                Issue::Omission { src_index, .. } => {
                    cov.src.insert(*src_index);
                }
                Issue::Addition { tgt_index, .. } => {
                    cov.tgt.insert(*tgt_index);
                }
                Issue::LowSimilarity { .. } => {}
            }
        }
        cov
    }
}

/// Append an omission or addition for every uncovered index. Returns how many
/// issues were added; a second call on the same classification returns 0.
pub fn reconcile(
    classification: &mut Classification,
    source: &SentenceList,
    target: &SentenceList,
) -> usize {
    let cov = Coverage::of(classification);
    let before = classification.issues.len();

    for (idx, text) in source.iter().enumerate() {
        if !cov.src.contains(&idx) {
            classification.issues.push(Issue::Omission {
                src_index: idx,
                src_text: text.to_string(),
            });
        }
    }
    for (idx, text) in target.iter().enumerate() {
        if !cov.tgt.contains(&idx) {
            classification.issues.push(Issue::Addition {
                tgt_index: idx,
                tgt_text: text.to_string(),
            });
        }
    }

    let added = classification.issues.len() - before;
    if added > 0 {
        log::debug!("coverage pass added {added} issues for unaligned sentences");
    }
    added
}
