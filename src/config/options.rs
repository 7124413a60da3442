// src/config/options.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use super::consts::*;
use crate::error::ConfigError;

/// Which table row to read on one page.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RowQuery {
    /// Substring the row's text must contain (case-insensitive).
    pub label: String,
    /// Substrings that disqualify a row.
    pub exclude: Vec<String>,
    /// Require a bracketed year range such as `[2026-2027]` in the row.
    pub year_range: bool,
    /// Drop values that look like literal calendar years.
    pub year_guard: bool,
}

impl RowQuery {
    pub fn new(label: &str) -> Self {
        Self { label: s!(label), ..Self::default() }
    }

    pub fn supply() -> Self {
        Self::new(DEFAULT_SUPPLY_LABEL)
    }

    pub fn demand() -> Self {
        Self { year_range: true, year_guard: true, ..Self::new(DEFAULT_DEMAND_LABEL) }
    }

    pub fn excluding(mut self, words: &[&str]) -> Self {
        self.exclude = words.iter().map(|w| s!(*w)).collect();
        self
    }
}

impl Default for RowQuery {
    fn default() -> Self {
        Self {
            label: s!(),
            exclude: DEFAULT_EXCLUDE.iter().map(|w| s!(*w)).collect(),
            year_range: false,
            year_guard: false,
        }
    }
}

/// A `[supply_row]`/`[demand_row]` table as written: only the keys given
/// override that side's own defaults.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RowQueryPatch {
    label: Option<String>,
    exclude: Option<Vec<String>>,
    year_range: Option<bool>,
    year_guard: Option<bool>,
}

impl RowQueryPatch {
    fn over(self, base: RowQuery) -> RowQuery {
        RowQuery {
            label: self.label.unwrap_or(base.label),
            exclude: self.exclude.unwrap_or(base.exclude),
            year_range: self.year_range.unwrap_or(base.year_range),
            year_guard: self.year_guard.unwrap_or(base.year_guard),
        }
    }
}

fn supply_row<'de, D: Deserializer<'de>>(d: D) -> Result<RowQuery, D::Error> {
    Ok(RowQueryPatch::deserialize(d)?.over(RowQuery::supply()))
}

fn demand_row<'de, D: Deserializer<'de>>(d: D) -> Result<RowQuery, D::Error> {
    Ok(RowQueryPatch::deserialize(d)?.over(RowQuery::demand()))
}

/// Everything a comparison run reads. Passed in explicitly; nothing in the
/// engine consults globals or the environment.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckOptions {
    #[serde(deserialize_with = "supply_row")]
    pub supply_row: RowQuery,
    #[serde(deserialize_with = "demand_row")]
    pub demand_row: RowQuery,
    pub header_min_cells: usize,
    pub max_overlap: usize,
    pub min_compared: usize,
    pub workers: usize,
    pub wait_timeout_ms: u64,
    /// Whole-unit re-runs after an extraction or driver error.
    pub retries: u32,
    pub lock_marker: String,
    pub unlock_marker: String,
    /// Offset used to derive the current-month pivot from the clock.
    pub utc_offset_hours: i32,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            supply_row: RowQuery::supply(),
            demand_row: RowQuery::demand(),
            header_min_cells: HEADER_MIN_MONTH_CELLS,
            max_overlap: MAX_OVERLAP,
            min_compared: MIN_COMPARED_MONTHS,
            workers: WORKERS,
            wait_timeout_ms: WAIT_TIMEOUT_MS,
            retries: 0,
            lock_marker: s!(DEFAULT_LOCK_MARKER),
            unlock_marker: s!(DEFAULT_UNLOCK_MARKER),
            utc_offset_hours: 0,
            log_level: s!("info"),
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

impl CheckOptions {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let opts: Self = toml::from_str(text)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supply_row.label.trim().is_empty() || self.demand_row.label.trim().is_empty() {
            return Err(ConfigError::Invalid(s!("row labels must not be empty")));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid(s!("workers must be at least 1")));
        }
        if self.header_min_cells == 0 || self.header_min_cells > 12 {
            return Err(ConfigError::Invalid(s!("header_min_cells must be within 1..=12")));
        }
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_hours out of range: {}",
                self.utc_offset_hours
            )));
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}
