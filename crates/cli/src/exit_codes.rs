//! CLI Exit Code Registry
//!
//! Single source of truth for every `tqa` exit code. Scripts and CI jobs
//! rely on these values.
//!
//! | Code  | Meaning                                              |
//! |-------|------------------------------------------------------|
//! | 0     | Success                                              |
//! | 1     | Issues found (`--strict-exit` only)                  |
//! | 2     | Usage error (bad args, conflicting flags)            |
//! | 60    | Invalid config                                       |
//! | 61    | Input read/parse error, or empty input               |
//! | 62    | Alignment contract violation                         |
//! | 63    | Encoding error (embedder failure)                    |
//!
//! New codes go in the 60-69 block and get a row in the table above.

use transqa_audit::AuditError;

// =============================================================================
// Universal (0-2)
// =============================================================================

pub const EXIT_SUCCESS: u8 = 0;

/// At least one omission, addition or low-similarity issue, with `--strict-exit`.
/// Like `diff(1)`, exit 1 means "texts differ."
pub const EXIT_ISSUES: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Audit (60-69)
// =============================================================================

/// Config failed to parse or validate.
pub const EXIT_AUDIT_INVALID_CONFIG: u8 = 60;

/// Input file unreadable, malformed JSON, or empty text.
pub const EXIT_AUDIT_INPUT: u8 = 61;

/// Alignment groups break the partition contract.
pub const EXIT_AUDIT_CONTRACT: u8 = 62;

/// Embedder failed (too long, missing vector, bad dimension).
pub const EXIT_AUDIT_ENCODING: u8 = 63;

/// Map an engine error to its exit code.
pub fn audit_exit_code(err: &AuditError) -> u8 {
    match err {
        AuditError::ConfigParse(_) | AuditError::ConfigValidation(_) => EXIT_AUDIT_INVALID_CONFIG,
        AuditError::EmptyInput { .. } | AuditError::Parse(_) | AuditError::Io(_) => {
            EXIT_AUDIT_INPUT
        }
        AuditError::ContractViolation { .. } => EXIT_AUDIT_CONTRACT,
        AuditError::Encoding(_) => EXIT_AUDIT_ENCODING,
    }
}
