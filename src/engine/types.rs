// src/engine/types.rs
use std::fmt;

use serde::Serialize;

use crate::core::Month;
use crate::error::CheckError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side { Supply, Demand }

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Side::Supply => "supply", Side::Demand => "demand" })
    }
}

/// Month labels paired with counts. `labels.len() == values.len()` always;
/// labels repeat across years, so they are only unique within 12 months.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LabeledSeries {
    labels: Vec<Month>,
    values: Vec<u64>,
}

impl LabeledSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: Month, value: u64) {
        self.labels.push(label);
        self.values.push(value);
    }

    pub fn labels(&self) -> &[Month] { &self.labels }
    pub fn values(&self) -> &[u64] { &self.values }
    pub fn len(&self) -> usize { self.labels.len() }
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    pub fn into_parts(self) -> (Vec<Month>, Vec<u64>) {
        (self.labels, self.values)
    }
}

impl FromIterator<(Month, u64)> for LabeledSeries {
    fn from_iter<I: IntoIterator<Item = (Month, u64)>>(iter: I) -> Self {
        let mut s = LabeledSeries::new();
        for (m, v) in iter {
            s.push(m, v);
        }
        s
    }
}

/// One raw table row's contribution, before stitching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowExtract {
    pub origin_year: i32,
    pub series: LabeledSeries,
}

impl RowExtract {
    pub fn new(origin_year: i32, labels: Vec<Month>, values: Vec<u64>) -> Self {
        debug_assert_eq!(labels.len(), values.len());
        Self { origin_year, series: labels.into_iter().zip(values).collect() }
    }
}

/// Chronological concatenation of row extracts with boundary overlap removed.
pub type StitchedSeries = LabeledSeries;

/// One aligned position where the two series disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MismatchRecord {
    pub index: usize,
    pub label: Month,
    pub left: u64,
    pub right: u64,
}

impl fmt::Display for MismatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}!={}", self.label, self.left, self.right)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
    /// Divergence on unlocked data: recorded, does not fail the run.
    Advisory,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Advisory => "ADVISORY",
        })
    }
}

/// One (product, color, time-window) comparison unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct UnitKey {
    pub product: String,
    pub color: String,
    pub window: String,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.product, self.color, self.window)
    }
}

/// What was read on both pages, kept for triage and export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub pivot: Option<Month>,
    pub locked: Option<bool>,
    pub supply: LabeledSeries,
    pub demand: LabeledSeries,
    pub demand_rows: usize,
    pub used_fallback: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Verdict(Verdict),
    Error(CheckError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnitReport {
    pub key: UnitKey,
    pub outcome: Outcome,
    pub mismatches: Vec<MismatchRecord>,
    pub compared_count: usize,
    pub diagnostics: Diagnostics,
}

impl UnitReport {
    pub fn verdict(&self) -> Option<Verdict> {
        match self.outcome {
            Outcome::Verdict(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CheckError> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            Outcome::Verdict(_) => None,
        }
    }

    /// `FAIL` and every unit error count against the run.
    pub fn is_failure(&self) -> bool {
        !matches!(self.outcome, Outcome::Verdict(Verdict::Pass | Verdict::Advisory))
    }

    /// Status column value: the verdict, or `ERROR`.
    pub fn status(&self) -> String {
        match &self.outcome {
            Outcome::Verdict(v) => v.to_string(),
            Outcome::Error(_) => s!("ERROR"),
        }
    }

    /// Collapse to a test-style result; a `Fail` verdict becomes
    /// `MismatchFailure` carrying the literal mismatch list.
    pub fn into_result(self) -> Result<Verdict, CheckError> {
        match self.outcome {
            Outcome::Verdict(Verdict::Fail) => {
                Err(CheckError::MismatchFailure { mismatches: self.mismatches })
            }
            Outcome::Verdict(v) => Ok(v),
            Outcome::Error(e) => Err(e),
        }
    }
}
