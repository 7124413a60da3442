// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::core::Month;
use crate::engine::types::{MismatchRecord, Side};

/// Unit-level failures. Extraction-layer problems that can be recovered
/// locally (an unparseable cell) never reach this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error("{side} row not found: no row containing {label:?}")]
    RowNotFound { side: Side, label: String },

    #[error("{side} header not found: no row with enough month cells")]
    HeaderNotFound { side: Side },

    #[error("pivot {pivot} not found in demand labels")]
    PivotNotFound { pivot: Month },

    #[error("only {compared} months compared, need at least {required}")]
    InsufficientComparison { compared: usize, required: usize },

    #[error("locked forecast mismatch: {}", fmt_mismatches(.mismatches))]
    MismatchFailure { mismatches: Vec<MismatchRecord> },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl CheckError {
    /// Extraction and driver errors may clear on a re-run; data verdicts won't.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckError::RowNotFound { .. } | CheckError::HeaderNotFound { .. } | CheckError::Driver(_)
        )
    }
}

fn fmt_mismatches(list: &[MismatchRecord]) -> String {
    list.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(", ")
}

/// Failures of the page-driver boundary (browser, saved snapshot, …).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("reading {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("page driver unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("parsing config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_failure_lists_every_record() {
        let err = CheckError::MismatchFailure {
            mismatches: vec![
                MismatchRecord { index: 0, label: Month::Dec, left: 564, right: 560 },
                MismatchRecord { index: 2, label: Month::Feb, left: 1, right: 0 },
            ],
        };
        assert_eq!(err.to_string(), "locked forecast mismatch: DEC:564!=560, FEB:1!=0");
        assert!(!err.is_retryable());
    }

    #[test]
    fn lookup_and_driver_errors_are_retryable() {
        assert!(CheckError::HeaderNotFound { side: Side::Supply }.is_retryable());
        assert!(CheckError::from(DriverError::Unavailable(s!("gone"))).is_retryable());
        assert!(!CheckError::PivotNotFound { pivot: Month::Jan }.is_retryable());
    }
}
