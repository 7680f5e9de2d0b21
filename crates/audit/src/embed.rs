//! Sentence embedders.
//!
//! The engine only needs [`Embedder`]. Two implementations ship with the crate:
//! [`HashEmbedder`], a lexical char n-gram hasher that needs no model, and
//! [`TableEmbedder`], which serves vectors computed elsewhere.

use std::collections::HashMap;
use std::path::Path;

use crate::config::{EmbedderConfig, EmbedderKind};
use crate::error::AuditError;

pub trait Embedder {
    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// Embed a batch. Output order matches input order.
    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AuditError>;

    fn embed(&self, text: &str) -> Result<Vec<f32>, AuditError> {
        self.embed_many(&[text])?
            .pop()
            .ok_or_else(|| AuditError::Encoding("embedder returned no vector".into()))
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AuditError> {
        (**self).embed_many(texts)
    }
}

/// Build the embedder described by `config`. Relative table paths resolve against `base_dir`.
pub fn from_config(config: &EmbedderConfig, base_dir: &Path) -> Result<Box<dyn Embedder>, AuditError> {
    match config.kind {
        EmbedderKind::Hashing => Ok(Box::new(HashEmbedder::new(
            config.dimension,
            config.ngram,
            config.max_chars,
        ))),
        EmbedderKind::Table => {
            let table = config.table.as_deref().ok_or_else(|| {
                AuditError::ConfigValidation("embedder.kind = \"table\" requires embedder.table".into())
            })?;
            Ok(Box::new(TableEmbedder::load(&base_dir.join(table))?))
        }
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

const BOS: char = '\u{0002}';
const EOS: char = '\u{0003}';

/// Signed FNV-1a hashing of char 1..=n-grams into a fixed-size unit vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    ngram: usize,
    max_chars: Option<usize>,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256, 3, None)
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize, ngram: usize, max_chars: Option<usize>) -> Self {
        Self {
            dimension: dimension.max(1),
            ngram: ngram.max(1),
            max_chars,
        }
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, AuditError> {
        let lowered = text.to_lowercase();
        let count = lowered.chars().count();
        if let Some(max) = self.max_chars {
            if count > max {
                return Err(AuditError::Encoding(format!(
                    "text of {count} chars exceeds max_chars {max}: {}",
                    excerpt(text)
                )));
            }
        }

        let mut xs: Vec<char> = Vec::with_capacity(count + 2);
        xs.push(BOS);
        xs.extend(lowered.chars());
        xs.push(EOS);

        let mut v = vec![0.0f32; self.dimension];
        for n in 1..=self.ngram {
            if xs.len() < n {
                continue;
            }
            for window in xs.windows(n) {
                let h = fnv1a(window);
                let idx = (h as usize) % self.dimension;
                v[idx] += if h & 1 == 0 { 1.0 } else { -1.0 };
            }
        }

        // Opposite-signed collisions can cancel out; fall back to one bucket.
        if v.iter().all(|x| *x == 0.0) {
            v[(fnv1a(&xs) as usize) % self.dimension] = 1.0;
        }

        crate::scorer::normalize(&mut v);
        Ok(v)
    }
}

fn fnv1a(chars: &[char]) -> u32 {
    let mut h: u32 = 2166136261;
    for &c in chars {
        h ^= c as u32;
        h = h.wrapping_mul(16777619);
    }
    h
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AuditError> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Precomputed vectors keyed by exact sentence text.
#[derive(Debug, Clone)]
pub struct TableEmbedder {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new(vectors: HashMap<String, Vec<f32>>) -> Result<Self, AuditError> {
        let dimension = vectors.values().next().map(Vec::len).unwrap_or(0);
        if dimension == 0 {
            return Err(AuditError::Encoding("embedding table is empty".into()));
        }
        if let Some((text, v)) = vectors.iter().find(|(_, v)| v.len() != dimension) {
            return Err(AuditError::Encoding(format!(
                "embedding for {} has dimension {}, expected {dimension}",
                excerpt(text),
                v.len()
            )));
        }
        Ok(Self { dimension, vectors })
    }

    /// Parse a JSON object mapping sentence text to a vector.
    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        let vectors: HashMap<String, Vec<f32>> =
            serde_json::from_str(json).map_err(|e| AuditError::Parse(format!("embedding table: {e}")))?;
        Self::new(vectors)
    }

    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AuditError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl Embedder for TableEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AuditError> {
        texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(*t)
                    .cloned()
                    .ok_or_else(|| AuditError::Encoding(format!("no embedding for {}", excerpt(t))))
            })
            .collect()
    }
}

/// First 40 chars of `text`, quoted, for error messages.
pub(crate) fn excerpt(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        format!("\"{text}\"")
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("\"{head}...\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn hash_vectors_are_unit_length() {
        let e = HashEmbedder::default();
        for text in ["", "a", "The quick brown fox.", "今天天气很好"] {
            let v = e.embed(text).unwrap();
            assert_eq!(v.len(), 256);
            assert!((norm(&v) - 1.0).abs() < 1e-5, "norm for {text:?}");
        }
    }

    #[test]
    fn hash_is_deterministic_and_case_insensitive() {
        let e = HashEmbedder::default();
        assert_eq!(e.embed("Hello World").unwrap(), e.embed("hello world").unwrap());
    }

    #[test]
    fn hash_similar_texts_score_higher() {
        let e = HashEmbedder::default();
        let a = e.embed("the cat sat on the mat").unwrap();
        let b = e.embed("the cat sat on a mat").unwrap();
        let c = e.embed("quarterly revenue projections").unwrap();
        let dot = |x: &[f32], y: &[f32]| x.iter().zip(y).map(|(p, q)| p * q).sum::<f32>();
        assert!(dot(&a, &b) > dot(&a, &c));
    }

    #[test]
    fn hash_rejects_overlong_text() {
        let e = HashEmbedder::new(64, 3, Some(5));
        let err = e.embed("longer than five").unwrap_err();
        assert!(matches!(err, AuditError::Encoding(_)));
        assert!(e.embed("short").is_ok());
    }

    #[test]
    fn batch_matches_single() {
        let e = HashEmbedder::default();
        let batch = e.embed_many(&["one", "two"]).unwrap();
        assert_eq!(batch[1], e.embed("two").unwrap());
    }

    #[test]
    fn table_lookup_and_miss() {
        let t = TableEmbedder::from_json(r#"{"A.": [1.0, 0.0], "a.": [0.0, 1.0]}"#).unwrap();
        assert_eq!(t.dimension(), 2);
        assert_eq!(t.embed("a.").unwrap(), vec![0.0, 1.0]);
        let err = t.embed("missing").unwrap_err();
        assert!(err.to_string().contains("no embedding for \"missing\""));
    }

    #[test]
    fn table_rejects_ragged_dimensions() {
        let err = TableEmbedder::from_json(r#"{"A.": [1.0, 0.0], "B.": [1.0]}"#).unwrap_err();
        assert!(matches!(err, AuditError::Encoding(_)));
    }

    #[test]
    fn table_rejects_bad_json() {
        let err = TableEmbedder::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, AuditError::Parse(_)));
    }

    #[test]
    fn excerpt_truncates() {
        let long = "x".repeat(50);
        assert_eq!(excerpt(&long), format!("\"{}...\"", "x".repeat(40)));
        assert_eq!(excerpt("short"), "\"short\"");
    }
}
