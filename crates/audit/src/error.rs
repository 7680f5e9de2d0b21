use std::fmt;

use crate::model::Side;

#[derive(Debug)]
pub enum AuditError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, missing table, etc.).
    ConfigValidation(String),
    /// Top-level source or target text is empty after trimming.
    EmptyInput { side: Side },
    /// An alignment group breaks the aligner contract (range, order, partition).
    ContractViolation { group: usize, message: String },
    /// Embedding failure. Fatal for the run; no fallback similarity is guessed.
    Encoding(String),
    /// Malformed alignment or embedding JSON.
    Parse(String),
    /// IO error (file read, CSV write, etc.).
    Io(String),
}

impl AuditError {
    pub(crate) fn contract(group: usize, message: impl Into<String>) -> Self {
        Self::ContractViolation {
            group,
            message: message.into(),
        }
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::EmptyInput { side } => write!(f, "{side} text is empty"),
            Self::ContractViolation { group, message } => {
                write!(f, "alignment group {group}: {message}")
            }
            Self::Encoding(msg) => write!(f, "encoding error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AuditError {}
