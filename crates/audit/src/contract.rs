//! Precondition checks on aligner output.
//!
//! Groups must reference in-range indices, each side strictly increasing, and
//! no index may appear in more than one group. Gaps are allowed; the coverage
//! pass heals them. Any violation fails the run instead of dropping indices.

use crate::error::AuditError;
use crate::model::{AlignmentGroup, Side};

pub fn validate_groups(
    groups: &[AlignmentGroup],
    src_len: usize,
    tgt_len: usize,
) -> Result<(), AuditError> {
    let mut src_owner: Vec<Option<usize>> = vec![None; src_len];
    let mut tgt_owner: Vec<Option<usize>> = vec![None; tgt_len];

    for (gi, group) in groups.iter().enumerate() {
        check_side(gi, Side::Source, &group.src_indices, &mut src_owner)?;
        check_side(gi, Side::Target, &group.tgt_indices, &mut tgt_owner)?;
    }
    Ok(())
}

fn check_side(
    group: usize,
    side: Side,
    indices: &[usize],
    owner: &mut [Option<usize>],
) -> Result<(), AuditError> {
    let len = owner.len();
    let mut prev: Option<usize> = None;

    for &idx in indices {
        if idx >= len {
            return Err(AuditError::contract(
                group,
                format!("{side} index {idx} out of range (len {len})"),
            ));
        }
        if let Some(p) = prev {
            if idx <= p {
                return Err(AuditError::contract(
                    group,
                    format!("{side} indices not strictly increasing ({p} then {idx})"),
                ));
            }
        }
        if let Some(other) = owner[idx] {
            return Err(AuditError::contract(
                group,
                format!("{side} index {idx} already claimed by group {other}"),
            ));
        }
        owner[idx] = Some(group);
        prev = Some(idx);
    }
    Ok(())
}
