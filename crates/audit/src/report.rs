//! Report assembly: ordered rows, issue ordering and CSV export.

use std::io::Write;

use crate::config::LabelPolicy;
use crate::error::AuditError;
use crate::model::{ExceptionLabel, Issue, KeptGroup, ReportRow, SentenceList, SortKey};

/// Spacing between rows of one group in the real-valued sort key.
pub const ROW_EPSILON: f64 = 1e-3;

/// Primary key base for units with no source index. Target-only content sorts
/// after everything anchored on the source side.
pub const LARGE_OFFSET: usize = 999_999;

pub const CSV_HEADER: [&str; 6] = [
    "source",
    "target",
    "source_index",
    "target_index",
    "similarity",
    "exception",
];

/// First source index, else `LARGE_OFFSET + first target index`, else `LARGE_OFFSET`.
pub fn primary_key(src_indices: &[usize], tgt_indices: &[usize]) -> usize {
    match (src_indices.first(), tgt_indices.first()) {
        (Some(&s), _) => s,
        (None, Some(&t)) => LARGE_OFFSET + t,
        (None, None) => LARGE_OFFSET,
    }
}

/// Expand one kept group into `max(|src|, |tgt|)` rows.
pub fn group_rows(
    kept: &KeptGroup,
    source: &SentenceList,
    target: &SentenceList,
    label_policy: LabelPolicy,
) -> Vec<ReportRow> {
    let src = kept.scored.src_indices();
    let tgt = kept.scored.tgt_indices();
    let primary = primary_key(src, tgt);
    let height = src.len().max(tgt.len());

    (0..height)
        .map(|i| {
            let labelled = i == 0 || label_policy == LabelPolicy::EveryRow;
            let source_index = src.get(i).copied();
            let target_index = tgt.get(i).copied();
            ReportRow {
                source_text: cell(source, source_index),
                target_text: cell(target, target_index),
                source_index,
                target_index,
                similarity: if labelled { kept.scored.similarity } else { None },
                exception: if labelled { Some(kept.label) } else { None },
                sort_key: SortKey { primary, offset: i },
            }
        })
        .collect()
}

/// Single row for a standalone omission or addition. Low-similarity issues
/// are rendered through their kept group instead.
pub fn issue_row(issue: &Issue) -> Option<ReportRow> {
    match issue {
        Issue::Omission {
            src_index,
            src_text,
        } => Some(ReportRow {
            source_text: src_text.clone(),
            target_text: String::new(),
            source_index: Some(*src_index),
            target_index: None,
            similarity: None,
            exception: Some(ExceptionLabel::Omission),
            sort_key: SortKey {
                primary: primary_key(&[*src_index], &[]),
                offset: 0,
            },
        }),
        Issue::Addition {
            tgt_index,
            tgt_text,
        } => Some(ReportRow {
            source_text: String::new(),
            target_text: tgt_text.clone(),
            source_index: None,
            target_index: Some(*tgt_index),
            similarity: None,
            exception: Some(ExceptionLabel::Addition),
            sort_key: SortKey {
                primary: primary_key(&[], &[*tgt_index]),
                offset: 0,
            },
        }),
        Issue::LowSimilarity { .. } => None,
    }
}

/// Every kept group and standalone issue as one table, sorted by sort key.
pub fn assemble_rows(
    kept: &[KeptGroup],
    issues: &[Issue],
    source: &SentenceList,
    target: &SentenceList,
    label_policy: LabelPolicy,
) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = kept
        .iter()
        .flat_map(|k| group_rows(k, source, target, label_policy))
        .chain(issues.iter().filter_map(issue_row))
        .collect();
    // Stable: equal keys keep insertion order.
    rows.sort_by_key(|r| r.sort_key);
    rows
}

/// Omissions by source index, then additions by target index, then
/// low-similarity issues in their original group order.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by_key(|issue| match issue {
        Issue::Omission { src_index, .. } => (0, *src_index),
        Issue::Addition { tgt_index, .. } => (1, *tgt_index),
        Issue::LowSimilarity { .. } => (2, 0),
    });
}

fn cell(list: &SentenceList, index: Option<usize>) -> String {
    index
        .and_then(|i| list.get(i))
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

pub fn write_csv<W: Write>(rows: &[ReportRow], out: W) -> Result<(), AuditError> {
    let mut writer = csv::WriterBuilder::new().from_writer(out);
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AuditError::Io(e.to_string()))?;

    for row in rows {
        writer
            .write_record([
                row.source_text.clone(),
                row.target_text.clone(),
                opt(row.source_index),
                opt(row.target_index),
                row.similarity.map(|s| format!("{s:.4}")).unwrap_or_default(),
                row.exception.map(|e| e.to_string()).unwrap_or_default(),
            ])
            .map_err(|e| AuditError::Io(e.to_string()))?;
    }

    writer.flush().map_err(|e| AuditError::Io(e.to_string()))?;
    Ok(())
}

pub fn to_csv_string(rows: &[ReportRow]) -> Result<String, AuditError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(|e| AuditError::Io(e.to_string()))
}

fn opt(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
