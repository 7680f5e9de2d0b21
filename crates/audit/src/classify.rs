use crate::config::Thresholds;
use crate::error::AuditError;
use crate::model::{ExceptionLabel, Issue, KeptGroup, ScoredGroup, SentenceList};

/// Fate of one scored group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Clean translation, kept with `OK`.
    Ok,
    /// Weak but legitimate translation, kept and flagged.
    LowSimilarity,
    /// Distrusted; dissolved into omissions and additions.
    ForceSplit,
    /// Source-only group from the aligner.
    Omission,
    /// Target-only group from the aligner.
    Addition,
    /// No indices on either side.
    Empty,
    /// Both sides present but no usable similarity.
    Unscored,
}

/// Order-sensitive rule table. First matching row wins:
///
/// | condition                       | verdict         |
/// |---------------------------------|-----------------|
/// | src empty, tgt empty            | `Empty`         |
/// | src present, tgt empty          | `Omission`      |
/// | src empty, tgt present          | `Addition`      |
/// | similarity missing / non-finite | `Unscored`      |
/// | similarity < force_split        | `ForceSplit`    |
/// | similarity < similarity         | `LowSimilarity` |
/// | otherwise                       | `Ok`            |
pub fn verdict(group: &ScoredGroup, thresholds: &Thresholds) -> Verdict {
    match (group.src_indices().is_empty(), group.tgt_indices().is_empty()) {
        (true, true) => Verdict::Empty,
        (false, true) => Verdict::Omission,
        (true, false) => Verdict::Addition,
        (false, false) => match group.similarity {
            Some(sim) if !sim.is_finite() => Verdict::Unscored,
            None => Verdict::Unscored,
            Some(sim) if sim < thresholds.force_split => Verdict::ForceSplit,
            Some(sim) if sim < thresholds.similarity => Verdict::LowSimilarity,
            Some(_) => Verdict::Ok,
        },
    }
}

/// Groups partitioned by verdict, plus the issues they raised.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Groups that stay in the alignment table (`OK` or low similarity).
    pub kept: Vec<KeptGroup>,
    /// Dissolved groups, recorded with `was_force_split = true`.
    pub force_split: Vec<ScoredGroup>,
    pub issues: Vec<Issue>,
}

impl Classification {
    pub fn omission_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, Issue::Omission { .. }))
            .count()
    }

    pub fn addition_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, Issue::Addition { .. }))
            .count()
    }

    pub fn low_similarity_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, Issue::LowSimilarity { .. }))
            .count()
    }
}

/// Classify every group in order.
pub fn classify(
    groups: Vec<ScoredGroup>,
    source: &SentenceList,
    target: &SentenceList,
    thresholds: &Thresholds,
) -> Result<Classification, AuditError> {
    let mut out = Classification::default();

    for (gi, mut group) in groups.into_iter().enumerate() {
        let v = verdict(&group, thresholds);
        log::debug!(
            "group {gi} {:?}/{:?} sim={:?} -> {v:?}",
            group.src_indices(),
            group.tgt_indices(),
            group.similarity
        );

        match v {
            Verdict::Empty => {}
            Verdict::Omission => push_omissions(&mut out.issues, group.src_indices(), source),
            Verdict::Addition => push_additions(&mut out.issues, group.tgt_indices(), target),
            Verdict::Unscored => {
                return Err(AuditError::contract(
                    gi,
                    "group has both sides but no usable similarity",
                ));
            }
            Verdict::ForceSplit => {
                push_omissions(&mut out.issues, group.src_indices(), source);
                push_additions(&mut out.issues, group.tgt_indices(), target);
                group.was_force_split = true;
                out.force_split.push(group);
            }
            Verdict::LowSimilarity => {
                out.issues.push(Issue::LowSimilarity {
                    src_indices: group.src_indices().to_vec(),
                    tgt_indices: group.tgt_indices().to_vec(),
                    src_text: source.joined(group.src_indices()),
                    tgt_text: target.joined(group.tgt_indices()),
                    similarity: group.similarity.unwrap_or_default(),
                });
                out.kept.push(KeptGroup {
                    scored: group,
                    label: ExceptionLabel::LowSimilarity,
                });
            }
            Verdict::Ok => out.kept.push(KeptGroup {
                scored: group,
                label: ExceptionLabel::Ok,
            }),
        }
    }

    Ok(out)
}

fn push_omissions(issues: &mut Vec<Issue>, indices: &[usize], source: &SentenceList) {
    for &idx in indices {
        issues.push(Issue::Omission {
            src_index: idx,
            src_text: source.get(idx).unwrap_or_default().to_string(),
        });
    }
}

fn push_additions(issues: &mut Vec<Issue>, indices: &[usize], target: &SentenceList) {
    for &idx in indices {
        issues.push(Issue::Addition {
            tgt_index: idx,
            tgt_text: target.get(idx).unwrap_or_default().to_string(),
        });
    }
}
