// src/engine/stitch.rs
//
// Multi-row stitching: year-scoped demand rows → one continuous monthly
// series. Consecutive rows may repeat 0..=max_overlap boundary months.

use log::{debug, warn};

use super::types::{LabeledSeries, RowExtract, StitchedSeries};
use crate::core::Month;

/// Largest `k` in `1..=max_overlap` for which the last `k` labels of `prev`
/// equal the first `k` labels of `curr`; 0 when none match.
///
/// Every `k` is tried and a later (larger) match overwrites an earlier one,
/// so a 2-month overlap is not mistaken for a 1-month one.
pub fn detect_overlap(prev: &[Month], curr: &[Month], max_overlap: usize) -> usize {
    let bound = max_overlap.min(prev.len()).min(curr.len());
    let mut overlap = 0;
    for k in 1..=bound {
        if prev[prev.len() - k..] == curr[..k] {
            overlap = k;
        }
    }
    overlap
}

/// Sort rows by origin year (stable) and concatenate, dropping each row's
/// leading months that duplicate the accumulated tail.
pub fn stitch(mut rows: Vec<RowExtract>, max_overlap: usize) -> StitchedSeries {
    rows.sort_by_key(|r| r.origin_year);
    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return LabeledSeries::new();
    };

    let (mut labels, mut values) = first.series.into_parts();
    for row in rows {
        let (r_labels, r_values) = row.series.into_parts();
        let k = detect_overlap(&labels, &r_labels, max_overlap);
        if k > 0 {
            let tail = &values[values.len() - k..];
            if tail != &r_values[..k] {
                warn!(
                    "year {} overlap {:?}: values differ ({:?} vs {:?}); keeping earlier row",
                    row.origin_year, &r_labels[..k], tail, &r_values[..k]
                );
            }
        }
        debug!("stitch year {}: {} months, overlap {k}", row.origin_year, r_labels.len());
        labels.extend_from_slice(&r_labels[k..]);
        values.extend_from_slice(&r_values[k..]);
    }
    labels.into_iter().zip(values).collect()
}
