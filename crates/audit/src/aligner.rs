//! Coarse aligners: two sentence lists in, `N:M` groups out.
//!
//! The alignment search itself lives outside this crate. [`FixedAligner`]
//! replays groups computed elsewhere; [`PositionalAligner`] pairs sentences by
//! position and is only a fallback.

use std::path::Path;

use crate::error::AuditError;
use crate::model::{AlignmentGroup, SentenceList};

pub trait CoarseAligner {
    fn align(
        &self,
        source: &SentenceList,
        target: &SentenceList,
    ) -> Result<Vec<AlignmentGroup>, AuditError>;
}

/// Returns a fixed list of groups regardless of input.
#[derive(Debug, Clone, Default)]
pub struct FixedAligner {
    groups: Vec<AlignmentGroup>,
}

impl FixedAligner {
    pub fn new(groups: Vec<AlignmentGroup>) -> Self {
        Self { groups }
    }

    /// Accepts `[[[0, 1], [0]], ...]` or `[{"src": [0, 1], "tgt": [0]}, ...]`.
    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        let groups: Vec<AlignmentGroup> =
            serde_json::from_str(json).map_err(|e| AuditError::Parse(format!("alignment: {e}")))?;
        Ok(Self::new(groups))
    }

    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AuditError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn groups(&self) -> &[AlignmentGroup] {
        &self.groups
    }
}

impl CoarseAligner for FixedAligner {
    fn align(
        &self,
        _source: &SentenceList,
        _target: &SentenceList,
    ) -> Result<Vec<AlignmentGroup>, AuditError> {
        Ok(self.groups.clone())
    }
}

/// `1:1` by position; the longer side's tail becomes null groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalAligner;

impl CoarseAligner for PositionalAligner {
    fn align(
        &self,
        source: &SentenceList,
        target: &SentenceList,
    ) -> Result<Vec<AlignmentGroup>, AuditError> {
        let (n, m) = (source.len(), target.len());
        let groups = (0..n.max(m))
            .map(|i| {
                let src = if i < n { vec![i] } else { vec![] };
                let tgt = if i < m { vec![i] } else { vec![] };
                AlignmentGroup::new(src, tgt)
            })
            .collect();
        Ok(groups)
    }
}
