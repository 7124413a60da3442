// src/config/consts.rs

// Extraction
/// Cells in one row that must read as months before the row counts as a header.
pub const HEADER_MIN_MONTH_CELLS: usize = 6;
/// Values at or above this are not plausible business counts.
pub const PLAUSIBLE_CEILING: u64 = 10_000_000;
/// Literal calendar years leaking into one demand source's data cells.
pub const CALENDAR_YEAR_BAND: std::ops::RangeInclusive<u64> = 1900..=2100;
/// Values under this always survive the calendar-year exclusion.
pub const SMALL_VALUE_CEILING: u64 = 1000;

// Stitching
/// Largest boundary overlap searched between consecutive year rows.
/// Observed overlaps are 0..=2 months.
pub const MAX_OVERLAP: usize = 3;

// Comparison
pub const MIN_COMPARED_MONTHS: usize = 12;

// Rows
pub const DEFAULT_SUPPLY_LABEL: &str = "Forecast";
pub const DEFAULT_DEMAND_LABEL: &str = "Demand forecast";
pub const DEFAULT_EXCLUDE: &[&str] = &["Total", "Previous"];

// Lock marker (icon presence)
pub const DEFAULT_LOCK_MARKER: &str = "lock";
pub const DEFAULT_UNLOCK_MARKER: &str = "unlock";

// Page driver
pub const WAIT_TIMEOUT_MS: u64 = 15_000;
pub const WAIT_POLL_MS: u64 = 100;

// Concurrency
pub const WORKERS: usize = 4;

// Local files
pub const DEFAULT_LOG_FILE: &str = ".store/debug.log";
pub const DEFAULT_OUT_FILE: &str = "out/results.csv";
