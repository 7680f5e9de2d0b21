//! Group similarity from sentence embeddings.

use std::collections::{HashMap, HashSet};

use crate::config::SimilarityPolicy;
use crate::embed::{excerpt, Embedder};
use crate::error::AuditError;

/// Scale `v` to unit L2 norm in place. Returns `false` (leaving `v` untouched) for a zero vector.
pub fn normalize(v: &mut [f32]) -> bool {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm < f32::EPSILON {
        return false;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    true
}

/// Cosine similarity. Zero-length or mismatched inputs score 0.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Re-normalized centroid of `vectors`.
pub fn centroid(vectors: &[&[f32]]) -> Vec<f32> {
    let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
    let mut c = vec![0.0f32; dim];
    for v in vectors {
        for (acc, x) in c.iter_mut().zip(v.iter()) {
            *acc += x;
        }
    }
    let n = vectors.len().max(1) as f32;
    for acc in c.iter_mut() {
        *acc /= n;
    }
    normalize(&mut c);
    c
}

/// Similarity of two bundles of unit vectors under `policy`.
///
/// `MinPairwise` only applies when either side has more than one vector;
/// a `1:1` pair always uses the centroid cosine.
pub fn bundle_similarity(src: &[&[f32]], tgt: &[&[f32]], policy: SimilarityPolicy) -> f32 {
    let multi = src.len() > 1 || tgt.len() > 1;
    match policy {
        SimilarityPolicy::MinPairwise if multi => src
            .iter()
            .flat_map(|s| tgt.iter().map(move |t| cosine(s, t)))
            .fold(1.0f32, f32::min),
        _ => cosine(&centroid(src), &centroid(tgt)),
    }
}

/// Scores groups of sentences, embedding each distinct text once.
pub struct SimilarityScorer<'e, E: Embedder + ?Sized> {
    embedder: &'e E,
    cache: HashMap<String, Vec<f32>>,
    batches: usize,
}

impl<'e, E: Embedder + ?Sized> SimilarityScorer<'e, E> {
    pub fn new(embedder: &'e E) -> Self {
        Self {
            embedder,
            cache: HashMap::new(),
            batches: 0,
        }
    }

    /// Embed every text not already cached in a single `embed_many` call.
    /// Returns how many texts were newly embedded.
    pub fn prefetch<'t, I>(&mut self, texts: I) -> Result<usize, AuditError>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut missing: Vec<&str> = Vec::new();
        for text in texts {
            if !self.cache.contains_key(text) && seen.insert(text) {
                missing.push(text);
            }
        }
        if missing.is_empty() {
            return Ok(0);
        }

        let vectors = self.embedder.embed_many(&missing)?;
        self.batches += 1;
        if vectors.len() != missing.len() {
            return Err(AuditError::Encoding(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                missing.len()
            )));
        }

        let dimension = self.embedder.dimension();
        for (text, mut v) in missing.iter().zip(vectors) {
            if v.len() != dimension {
                return Err(AuditError::Encoding(format!(
                    "embedding for {} has dimension {}, expected {dimension}",
                    excerpt(text),
                    v.len()
                )));
            }
            if v.iter().any(|x| !x.is_finite()) {
                return Err(AuditError::Encoding(format!(
                    "non-finite embedding for {}",
                    excerpt(text)
                )));
            }
            // Encoders that claim unit length are re-normalized anyway.
            if !normalize(&mut v) {
                return Err(AuditError::Encoding(format!(
                    "zero-length embedding for {}",
                    excerpt(text)
                )));
            }
            self.cache.insert((*text).to_string(), v);
        }

        log::debug!("embedded {} distinct texts (batch {})", missing.len(), self.batches);
        Ok(missing.len())
    }

    /// Similarity in `[-1, 1]`, or `None` when either side is empty.
    pub fn score(
        &mut self,
        src_texts: &[&str],
        tgt_texts: &[&str],
        policy: SimilarityPolicy,
    ) -> Result<Option<f32>, AuditError> {
        if src_texts.is_empty() || tgt_texts.is_empty() {
            return Ok(None);
        }
        self.prefetch(src_texts.iter().chain(tgt_texts).copied())?;

        let src = self.vectors(src_texts);
        let tgt = self.vectors(tgt_texts);
        Ok(Some(bundle_similarity(&src, &tgt, policy)))
    }

    /// Number of `embed_many` calls issued so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    fn vectors(&self, texts: &[&str]) -> Vec<&[f32]> {
        texts
            .iter()
            .filter_map(|t| self.cache.get(*t).map(Vec::as_slice))
            .collect()
    }
}
