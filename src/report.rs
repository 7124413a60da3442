// src/report.rs
//! Flat export of unit reports: one scalar/string column per field so any
//! CSV/TSV consumer (spreadsheet, DB loader) can ingest it directly.
use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::types::{LabeledSeries, MismatchRecord, UnitReport};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub timestamp: String,
    pub product: String,
    pub color: String,
    pub window: String,
    pub status: String,
    pub compared: usize,
    pub mismatch_count: usize,
    pub mismatches: String,
    pub locked: String,
    pub pivot: String,
    pub supply_labels: String,
    pub supply_values: String,
    pub demand_labels: String,
    pub demand_values: String,
    pub error: String,
}

impl ReportRecord {
    pub fn from_report(r: &UnitReport, at: DateTime<Utc>) -> Self {
        let d = &r.diagnostics;
        let (supply_labels, supply_values) = join_series(&d.supply);
        let (demand_labels, demand_values) = join_series(&d.demand);
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            product: r.key.product.clone(),
            color: r.key.color.clone(),
            window: r.key.window.clone(),
            status: r.status(),
            compared: r.compared_count,
            mismatch_count: r.mismatches.len(),
            mismatches: join_mismatches(&r.mismatches),
            locked: d.locked.map(|b| b.to_string()).unwrap_or_default(),
            pivot: d.pivot.map(|m| m.to_string()).unwrap_or_default(),
            supply_labels,
            supply_values,
            demand_labels,
            demand_values,
            error: r.error().map(|e| e.to_string()).unwrap_or_default(),
        }
    }
}

fn join_series(s: &LabeledSeries) -> (String, String) {
    let labels = s.labels().iter().map(|m| m.code()).collect::<Vec<_>>().join("|");
    let values = s.values().iter().map(|v| v.to_string()).collect::<Vec<_>>().join("|");
    (labels, values)
}

/// `DEC:564!=560;JAN:20!=21`
pub fn join_mismatches(list: &[MismatchRecord]) -> String {
    list.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(";")
}

/// Stamp every report with the same run time.
pub fn to_records(reports: &[UnitReport], at: DateTime<Utc>) -> Vec<ReportRecord> {
    reports.iter().map(|r| ReportRecord::from_report(r, at)).collect()
}

/// Header line plus one row per record.
pub fn write_records<W: io::Write>(w: W, records: &[ReportRecord], format: ExportFormat) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(w);
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write to `path`, creating parent directories.
pub fn write_records_to(path: &Path, records: &[ReportRecord], format: ExportFormat) -> csv::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(path)?;
    write_records(io::BufWriter::new(file), records, format)
}
