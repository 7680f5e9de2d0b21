use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::splitter::LanguageHint;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub splitter: SplitterConfig,
    #[serde(default)]
    pub embedder: EmbedderConfig,
}

fn default_name() -> String {
    "translation-audit".into()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            thresholds: Thresholds::default(),
            scoring: ScoringConfig::default(),
            report: ReportConfig::default(),
            splitter: SplitterConfig::default(),
            embedder: EmbedderConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// `force_split < similarity` by convention; not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Thresholds {
    /// Below this a kept group is flagged as low similarity.
    #[serde(default = "default_similarity")]
    pub similarity: f32,
    /// Below this a group is dissolved into omissions and additions.
    #[serde(default = "default_force_split")]
    pub force_split: f32,
}

fn default_similarity() -> f32 {
    0.7
}

fn default_force_split() -> f32 {
    0.3
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            similarity: default_similarity(),
            force_split: default_force_split(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityPolicy {
    /// Cosine of the re-normalized source and target centroids.
    #[default]
    Mean,
    /// Minimum cosine over every (source, target) pair. Multi-sentence groups only.
    MinPairwise,
}

impl std::fmt::Display for SimilarityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::MinPairwise => write!(f, "min_pairwise"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub policy: SimilarityPolicy,
    /// Try dissolving `N:N` groups into positional `1:1` pairs.
    #[serde(default)]
    pub auto_split: bool,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Where a multi-row group carries its similarity and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    #[default]
    FirstRow,
    EveryRow,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub label_policy: LabelPolicy,
}

// ---------------------------------------------------------------------------
// Splitter + Embedder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SplitterConfig {
    #[serde(default)]
    pub source_language: LanguageHint,
    #[serde(default)]
    pub target_language: LanguageHint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    #[default]
    Hashing,
    Table,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedderConfig {
    #[serde(default)]
    pub kind: EmbedderKind,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_ngram")]
    pub ngram: usize,
    #[serde(default)]
    pub max_chars: Option<usize>,
    /// Path of the precomputed `text -> vector` map. Required for `kind = "table"`.
    #[serde(default)]
    pub table: Option<String>,
}

fn default_dimension() -> usize {
    256
}

fn default_ngram() -> usize {
    3
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::default(),
            dimension: default_dimension(),
            ngram: default_ngram(),
            max_chars: None,
            table: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AuditConfig {
    pub fn from_toml(input: &str) -> Result<Self, AuditError> {
        let config: AuditConfig =
            toml::from_str(input).map_err(|e| AuditError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        for (name, value) in [
            ("thresholds.similarity", self.thresholds.similarity),
            ("thresholds.force_split", self.thresholds.force_split),
        ] {
            if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                return Err(AuditError::ConfigValidation(format!(
                    "{name} must be within [-1, 1], got {value}"
                )));
            }
        }

        if self.thresholds.force_split > self.thresholds.similarity {
            log::warn!(
                "force_split threshold {} is above similarity threshold {}; low-similarity band is empty",
                self.thresholds.force_split,
                self.thresholds.similarity
            );
        }

        if self.embedder.dimension == 0 {
            return Err(AuditError::ConfigValidation(
                "embedder.dimension must be at least 1".into(),
            ));
        }
        if self.embedder.ngram == 0 {
            return Err(AuditError::ConfigValidation(
                "embedder.ngram must be at least 1".into(),
            ));
        }
        if self.embedder.max_chars == Some(0) {
            return Err(AuditError::ConfigValidation(
                "embedder.max_chars must be at least 1".into(),
            ));
        }
        if self.embedder.kind == EmbedderKind::Table && self.embedder.table.is_none() {
            return Err(AuditError::ConfigValidation(
                "embedder.kind = \"table\" requires embedder.table".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name = "nightly"

[thresholds]
similarity = 0.75
force_split = 0.25

[scoring]
policy = "min_pairwise"
auto_split = true

[report]
label_policy = "every_row"

[splitter]
source_language = "la"
target_language = "zh"

[embedder]
kind = "hashing"
dimension = 128
ngram = 2
max_chars = 500
"#;

    #[test]
    fn parse_full() {
        let config = AuditConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name, "nightly");
        assert_eq!(config.thresholds.similarity, 0.75);
        assert_eq!(config.thresholds.force_split, 0.25);
        assert_eq!(config.scoring.policy, SimilarityPolicy::MinPairwise);
        assert!(config.scoring.auto_split);
        assert_eq!(config.report.label_policy, LabelPolicy::EveryRow);
        assert_eq!(config.splitter.source_language, LanguageHint::Code("la".into()));
        assert_eq!(config.embedder.dimension, 128);
        assert_eq!(config.embedder.max_chars, Some(500));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = AuditConfig::from_toml("").unwrap();
        assert_eq!(config.name, "translation-audit");
        assert_eq!(config.thresholds, Thresholds::default());
        assert_eq!(config.thresholds.similarity, 0.7);
        assert_eq!(config.thresholds.force_split, 0.3);
        assert_eq!(config.scoring.policy, SimilarityPolicy::Mean);
        assert!(!config.scoring.auto_split);
        assert_eq!(config.report.label_policy, LabelPolicy::FirstRow);
        assert_eq!(config.splitter.source_language, LanguageHint::Auto);
        assert_eq!(config.embedder.kind, EmbedderKind::Hashing);
    }

    #[test]
    fn reject_misspelt_policy() {
        let err = AuditConfig::from_toml("[scoring]\npolicy = \"minimum\"\n");
        assert!(matches!(err, Err(AuditError::ConfigParse(_))));
    }

    #[test]
    fn reject_threshold_out_of_range() {
        let err = AuditConfig::from_toml("[thresholds]\nsimilarity = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("thresholds.similarity"));
    }

    #[test]
    fn inverted_thresholds_are_allowed() {
        let config =
            AuditConfig::from_toml("[thresholds]\nsimilarity = 0.2\nforce_split = 0.6\n").unwrap();
        assert_eq!(config.thresholds.force_split, 0.6);
    }

    #[test]
    fn reject_table_without_path() {
        let err = AuditConfig::from_toml("[embedder]\nkind = \"table\"\n").unwrap_err();
        assert!(err.to_string().contains("embedder.table"));
    }

    #[test]
    fn reject_zero_dimension() {
        let err = AuditConfig::from_toml("[embedder]\ndimension = 0\n").unwrap_err();
        assert!(matches!(err, AuditError::ConfigValidation(_)));
    }
}
