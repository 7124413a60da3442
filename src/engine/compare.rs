// src/engine/compare.rs
//
// Label-based alignment of two differently-started series, element-wise
// diff, and the lock-dependent verdict.

use super::types::{MismatchRecord, Verdict};
use crate::core::Month;
use crate::error::CheckError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comparison {
    pub mismatches: Vec<MismatchRecord>,
    /// Positions actually compared; callers enforce a minimum.
    pub compared_count: usize,
}

/// Index of the FIRST occurrence of `pivot`.
///
/// Multi-year series repeat month labels; the earliest match is the one
/// nearest to the current period. Do not change this to the last match.
pub fn find_pivot(labels: &[Month], pivot: Month) -> Option<usize> {
    labels.iter().position(|&m| m == pivot)
}

/// Slice the right series from the pivot and compare it against `left`
/// position by position, up to the shortest of the three slices.
pub fn align_and_compare(
    pivot: Month,
    left: &[u64],
    right_labels: &[Month],
    right_values: &[u64],
) -> Result<Comparison, CheckError> {
    let start = find_pivot(right_labels, pivot).ok_or(CheckError::PivotNotFound { pivot })?;
    let labels = &right_labels[start..];
    let values = right_values.get(start..).unwrap_or(&[]);

    let compared_count = left.len().min(labels.len()).min(values.len());
    let mismatches = (0..compared_count)
        .filter(|&i| left[i] != values[i])
        .map(|i| MismatchRecord { index: i, label: labels[i], left: left[i], right: values[i] })
        .collect();

    Ok(Comparison { mismatches, compared_count })
}

/// Locked data must match exactly; unlocked divergence is advisory only.
pub fn classify(locked: bool, mismatches: &[MismatchRecord]) -> Verdict {
    match (locked, mismatches.is_empty()) {
        (_, true) => Verdict::Pass,
        (true, false) => Verdict::Fail,
        (false, false) => Verdict::Advisory,
    }
}
