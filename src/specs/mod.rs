// src/specs/mod.rs
//! # Page-shape knowledge
//!
//! This module knows **where the numbers live** on the planning pages and how
//! to read them robustly from a snapshot. It is deliberately narrow: it parses
//! the table shapes the supply and demand pages render, nothing more.
//!
//! ## What lives here
//! - **Row location** (`locate`): header rows by month-cell count, target rows
//!   by label / exclusion / bracketed year range, across every table.
//! - **Series extraction** (`extract`): cell → count, editable input before
//!   rendered text, the calendar-year filter, label/value pairing by column.
//!
//! ## What does **not** live here
//! - **Page driving** (navigation, waits, sessions) – `driver`.
//! - **Stitching, alignment, verdicts** – `engine`.
//! - **Export** – `report`.
//!
//! ## Conventions & invariants
//! - Everything takes `&impl DomView`; no browser types leak in.
//! - **Absence is a value**: lookups return `Option`/empty `Vec`, never panic.
//! - Cells that fail to parse are skipped, never fatal.
//! - Case-insensitive matching for labels and exclusions.
//!
//! ## Testing notes
//! Every function here is testable offline against inline HTML fixtures.
pub mod extract;
pub mod locate;

pub use extract::{ValueFilter, extract_row, is_calendar_year_artifact};
pub use locate::{HeaderRow, RowMatch, YearRange, find_row, find_rows, find_rows_relaxed, header_for_row};
