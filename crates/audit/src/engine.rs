use crate::aligner::CoarseAligner;
use crate::autosplit::auto_split;
use crate::classify::classify;
use crate::config::{AuditConfig, SplitterConfig};
use crate::contract::validate_groups;
use crate::embed::Embedder;
use crate::error::AuditError;
use crate::model::{AuditInput, AuditMeta, AuditReport, ScoredGroup, Side};
use crate::reconcile::reconcile;
use crate::report::{assemble_rows, sort_issues};
use crate::scorer::SimilarityScorer;
use crate::splitter::{LanguageHint, SentenceSplitter};
use crate::summary::compute_summary;

/// One configured audit pipeline. The embedder is injected once and reused
/// across runs.
pub struct Auditor<E: Embedder> {
    config: AuditConfig,
    embedder: E,
}

impl<E: Embedder> Auditor<E> {
    pub fn new(config: AuditConfig, embedder: E) -> Result<Self, AuditError> {
        config.validate()?;
        Ok(Self { config, embedder })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Score, split, classify, reconcile and assemble one input.
    pub fn audit(&self, input: &AuditInput) -> Result<AuditReport, AuditError> {
        let source = &input.source;
        let target = &input.target;
        validate_groups(&input.groups, source.len(), target.len())?;

        let groups: Vec<_> = input
            .groups
            .iter()
            .filter(|g| !(g.src_indices.is_empty() && g.tgt_indices.is_empty()))
            .collect();
        if groups.len() < input.groups.len() {
            log::debug!("dropped {} empty groups", input.groups.len() - groups.len());
        }

        // Every sentence the scorer will see, auto-split pairs included, in one batch.
        let mut scorer = SimilarityScorer::new(&self.embedder);
        scorer.prefetch(
            groups
                .iter()
                .filter(|g| !g.is_null())
                .flat_map(|g| {
                    source
                        .texts(&g.src_indices)
                        .into_iter()
                        .chain(target.texts(&g.tgt_indices))
                }),
        )?;

        let policy = self.config.scoring.policy;
        let mut scored = Vec::with_capacity(groups.len());
        for group in groups {
            let similarity = if group.is_null() {
                None
            } else {
                scorer.score(
                    &source.texts(&group.src_indices),
                    &target.texts(&group.tgt_indices),
                    policy,
                )?
            };
            scored.push(ScoredGroup::new(group.clone(), similarity));
        }

        let mut auto_split_count = 0;
        if self.config.scoring.auto_split {
            let out = auto_split(scored, source, target, &mut scorer)?;
            auto_split_count = out.split_count;
            scored = out.groups;
        }

        let mut classification = classify(scored, source, target, &self.config.thresholds)?;
        reconcile(&mut classification, source, target);
        sort_issues(&mut classification.issues);

        let label_policy = self.config.report.label_policy;
        let rows = assemble_rows(
            &classification.kept,
            &classification.issues,
            source,
            target,
            label_policy,
        );
        let summary = compute_summary(
            &classification.kept,
            &classification.force_split,
            &classification.issues,
            auto_split_count,
        );

        log::info!(
            "{}: {} kept, {} force-split, {} auto-split, {} issues ({} omissions, {} additions, {} low similarity)",
            self.config.name,
            summary.kept_groups,
            summary.force_split_count,
            summary.auto_split_count,
            summary.total_issues,
            summary.omission_count,
            summary.addition_count,
            summary.low_similarity_count
        );

        Ok(AuditReport {
            meta: AuditMeta {
                config_name: self.config.name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                source_sentences: source.len(),
                target_sentences: target.len(),
                alignments: input.groups.len(),
                similarity_threshold: self.config.thresholds.similarity,
                force_split_threshold: self.config.thresholds.force_split,
                policy,
                auto_split: self.config.scoring.auto_split,
                label_policy,
            },
            summary,
            groups: classification.kept,
            force_split: classification.force_split,
            issues: classification.issues,
            rows,
        })
    }
}

/// Language hints for the two sides of a text check.
#[derive(Debug, Clone, Default)]
pub struct TextHints {
    pub source: LanguageHint,
    pub target: LanguageHint,
}

impl From<&SplitterConfig> for TextHints {
    fn from(config: &SplitterConfig) -> Self {
        Self {
            source: config.source_language.clone(),
            target: config.target_language.clone(),
        }
    }
}

/// Full check from raw texts: reject empty input, split, align, audit.
pub fn check_texts<E: Embedder>(
    auditor: &Auditor<E>,
    splitter: &dyn SentenceSplitter,
    aligner: &dyn CoarseAligner,
    source_text: &str,
    target_text: &str,
    hints: &TextHints,
) -> Result<AuditReport, AuditError> {
    if source_text.trim().is_empty() {
        return Err(AuditError::EmptyInput { side: Side::Source });
    }
    if target_text.trim().is_empty() {
        return Err(AuditError::EmptyInput { side: Side::Target });
    }

    let source = splitter.split(source_text, &hints.source);
    let target = splitter.split(target_text, &hints.target);
    if source.is_empty() {
        return Err(AuditError::EmptyInput { side: Side::Source });
    }
    if target.is_empty() {
        return Err(AuditError::EmptyInput { side: Side::Target });
    }
    log::info!(
        "split {} source / {} target sentences",
        source.len(),
        target.len()
    );

    let groups = aligner.align(&source, &target)?;
    auditor.audit(&AuditInput {
        source,
        target,
        groups,
    })
}
