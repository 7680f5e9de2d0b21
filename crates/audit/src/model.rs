use serde::{Deserialize, Serialize, Serializer};

use crate::config::{LabelPolicy, SimilarityPolicy};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// Ordered, 0-indexed sentences for one side. Immutable once split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SentenceList(Vec<String>);

impl SentenceList {
    pub fn new(sentences: Vec<String>) -> Self {
        Self(sentences)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Texts at `indices`. Callers pass indices already checked against the contract.
    pub fn texts(&self, indices: &[usize]) -> Vec<&str> {
        indices.iter().filter_map(|&i| self.get(i)).collect()
    }

    /// Texts at `indices` joined with a single space, for display.
    pub fn joined(&self, indices: &[usize]) -> String {
        self.texts(indices).join(" ")
    }
}

impl From<Vec<String>> for SentenceList {
    fn from(sentences: Vec<String>) -> Self {
        Self(sentences)
    }
}

impl From<Vec<&str>> for SentenceList {
    fn from(sentences: Vec<&str>) -> Self {
        Self(sentences.into_iter().map(String::from).collect())
    }
}

/// A proposed correspondence between source and target sentence indices.
///
/// Deserializes from either the pair form `[[0, 1], [0]]` emitted by
/// sentence aligners or the object form `{"src": [0, 1], "tgt": [0]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GroupRepr")]
pub struct AlignmentGroup {
    pub src_indices: Vec<usize>,
    pub tgt_indices: Vec<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupRepr {
    Pair(Vec<usize>, Vec<usize>),
    Object {
        #[serde(alias = "src_indices")]
        src: Vec<usize>,
        #[serde(alias = "tgt_indices")]
        tgt: Vec<usize>,
    },
}

impl From<GroupRepr> for AlignmentGroup {
    fn from(repr: GroupRepr) -> Self {
        match repr {
            GroupRepr::Pair(src, tgt) | GroupRepr::Object { src, tgt } => Self::new(src, tgt),
        }
    }
}

impl AlignmentGroup {
    pub fn new(src_indices: Vec<usize>, tgt_indices: Vec<usize>) -> Self {
        Self {
            src_indices,
            tgt_indices,
        }
    }

    /// One side empty: a pre-existing omission or addition from the aligner.
    pub fn is_null(&self) -> bool {
        self.src_indices.is_empty() || self.tgt_indices.is_empty()
    }

    /// `N:N` with `N > 1`.
    pub fn is_square_multi(&self) -> bool {
        self.src_indices.len() == self.tgt_indices.len() && self.src_indices.len() > 1
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.src_indices.len(), self.tgt_indices.len())
    }
}

/// Everything one audit run consumes.
#[derive(Debug, Clone)]
pub struct AuditInput {
    pub source: SentenceList,
    pub target: SentenceList,
    pub groups: Vec<AlignmentGroup>,
}

// ---------------------------------------------------------------------------
// Scoring + classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredGroup {
    #[serde(flatten)]
    pub group: AlignmentGroup,
    /// `None` iff one side is empty.
    pub similarity: Option<f32>,
    pub was_force_split: bool,
    /// Produced by dissolving a bundled `N:N` group into positional pairs.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_split: bool,
}

impl ScoredGroup {
    pub fn new(group: AlignmentGroup, similarity: Option<f32>) -> Self {
        Self {
            group,
            similarity,
            was_force_split: false,
            auto_split: false,
        }
    }

    pub fn src_indices(&self) -> &[usize] {
        &self.group.src_indices
    }

    pub fn tgt_indices(&self) -> &[usize] {
        &self.group.tgt_indices
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionLabel {
    Ok,
    LowSimilarity,
    Omission,
    Addition,
}

impl std::fmt::Display for ExceptionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::LowSimilarity => write!(f, "Low Similarity"),
            Self::Omission => write!(f, "Omission"),
            Self::Addition => write!(f, "Addition"),
        }
    }
}

/// A group that survived classification and stays in the alignment table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeptGroup {
    #[serde(flatten)]
    pub scored: ScoredGroup,
    pub label: ExceptionLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Issue {
    Omission {
        src_index: usize,
        src_text: String,
    },
    Addition {
        tgt_index: usize,
        tgt_text: String,
    },
    LowSimilarity {
        src_indices: Vec<usize>,
        tgt_indices: Vec<usize>,
        src_text: String,
        tgt_text: String,
        similarity: f32,
    },
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Total order of report rows: `primary + offset * ε`.
///
/// Kept as integers so a group with more than `1/ε` rows can never bleed
/// into the next primary key; `value()` gives the real-valued form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    pub primary: usize,
    pub offset: usize,
}

impl SortKey {
    pub fn value(&self) -> f64 {
        self.primary as f64 + self.offset as f64 * crate::report::ROW_EPSILON
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub source_text: String,
    pub target_text: String,
    pub source_index: Option<usize>,
    pub target_index: Option<usize>,
    pub similarity: Option<f32>,
    pub exception: Option<ExceptionLabel>,
    pub sort_key: SortKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub total_issues: usize,
    pub omission_count: usize,
    pub addition_count: usize,
    pub low_similarity_count: usize,
    pub force_split_count: usize,
    pub auto_split_count: usize,
    pub kept_groups: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub source_sentences: usize,
    pub target_sentences: usize,
    pub alignments: usize,
    pub similarity_threshold: f32,
    pub force_split_threshold: f32,
    pub policy: SimilarityPolicy,
    pub auto_split: bool,
    pub label_policy: LabelPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub meta: AuditMeta,
    pub summary: AuditSummary,
    pub groups: Vec<KeptGroup>,
    pub force_split: Vec<ScoredGroup>,
    pub issues: Vec<Issue>,
    pub rows: Vec<ReportRow>,
}
