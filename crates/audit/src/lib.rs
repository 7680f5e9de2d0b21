//! `transqa-audit`: translation audit engine.
//!
//! Pure engine crate: receives sentence lists, alignment groups and an
//! injected embedder; returns a classified, fully-covering, ordered report.
//! No CLI or process concerns.

pub mod aligner;
pub mod autosplit;
pub mod classify;
pub mod config;
pub mod contract;
pub mod embed;
pub mod engine;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod scorer;
pub mod splitter;
pub mod summary;

pub use aligner::{CoarseAligner, FixedAligner, PositionalAligner};
pub use config::AuditConfig;
pub use embed::{Embedder, HashEmbedder, TableEmbedder};
pub use engine::{check_texts, Auditor, TextHints};
pub use error::AuditError;
pub use model::{AlignmentGroup, AuditInput, AuditReport, Issue, ReportRow, SentenceList};
pub use splitter::{LanguageHint, LineSplitter, RuleSplitter, SentenceSplitter};
