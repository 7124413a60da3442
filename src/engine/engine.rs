// src/engine/engine.rs
use log::{debug, error, info, warn};

use super::compare::{Comparison, align_and_compare, classify};
use super::stitch::stitch;
use super::types::*;
use crate::config::{CheckOptions, RowQuery};
use crate::core::{Document, Month};
use crate::driver::{LockSignalProvider, PageSource};
use crate::error::CheckError;
use crate::specs::extract::{ValueFilter, extract_row};
use crate::specs::locate::{RowMatch, find_row, find_rows, find_rows_relaxed, header_for_row, table_year};

/// One product/time-window pair with its own page sessions.
///
/// The unit owns its sources; dropping it releases them whether the run
/// passed, failed or errored.
pub struct ComparisonUnit {
    pub key: UnitKey,
    pub pivot: Month,
    pub supply: Box<dyn PageSource>,
    pub demand: Box<dyn PageSource>,
    pub lock: Box<dyn LockSignalProvider>,
}

impl ComparisonUnit {
    pub fn new(
        key: UnitKey,
        pivot: Month,
        supply: Box<dyn PageSource>,
        demand: Box<dyn PageSource>,
        lock: Box<dyn LockSignalProvider>,
    ) -> Self {
        Self { key, pivot, supply, demand, lock }
    }
}

/// Run one unit start to finish. Never panics on page content; every
/// failure ends up in the report's outcome with whatever was read so far.
pub fn run_comparison(unit: &mut ComparisonUnit, opts: &CheckOptions) -> UnitReport {
    let mut diagnostics = Diagnostics { pivot: Some(unit.pivot), ..Diagnostics::default() };
    // Filled once alignment ran, so errors raised after it keep the counts.
    let mut cmp = Comparison::default();
    info!("[{}] start, pivot {}", unit.key, unit.pivot);

    let outcome = match evaluate(unit, opts, &mut diagnostics, &mut cmp) {
        Ok(verdict) => {
            match verdict {
                Verdict::Fail => error!("[{}] FAIL: {} mismatches", unit.key, cmp.mismatches.len()),
                Verdict::Advisory => warn!("[{}] ADVISORY: {} mismatches (unlocked)", unit.key, cmp.mismatches.len()),
                Verdict::Pass => info!("[{}] PASS over {} months", unit.key, cmp.compared_count),
            }
            Outcome::Verdict(verdict)
        }
        Err(e) => {
            error!("[{}] {e}", unit.key);
            Outcome::Error(e)
        }
    };
    UnitReport {
        key: unit.key.clone(),
        outcome,
        mismatches: cmp.mismatches,
        compared_count: cmp.compared_count,
        diagnostics,
    }
}

fn evaluate(
    unit: &mut ComparisonUnit,
    opts: &CheckOptions,
    diag: &mut Diagnostics,
    cmp: &mut Comparison,
) -> Result<Verdict, CheckError> {
    let timeout = opts.wait_timeout();

    // Supply
    let supply_q = &opts.supply_row;
    if !unit.supply.wait_for(&|d| find_row(d, supply_q).is_some(), timeout)? {
        debug!("[{}] supply wait timed out", unit.key);
    }
    let supply_doc = unit.supply.snapshot()?;
    let locked = unit.lock.lock_signal(&supply_doc)?;
    diag.locked = Some(locked);
    debug!("[{}] lock signal: {locked}", unit.key);

    let supply = extract_supply(&supply_doc, opts)?;
    if supply.labels().first().is_some_and(|&m| m != unit.pivot) {
        warn!(
            "[{}] supply starts at {} rather than pivot {}",
            unit.key, supply.labels()[0], unit.pivot
        );
    }
    diag.supply = supply;

    // Demand
    let demand_q = &opts.demand_row;
    let ready = |d: &Document| !find_rows(d, demand_q).is_empty() || !find_rows_relaxed(d, demand_q).is_empty();
    if !unit.demand.wait_for(&ready, timeout)? {
        debug!("[{}] demand wait timed out", unit.key);
    }
    let demand_doc = unit.demand.snapshot()?;
    let (rows, used_fallback) = extract_demand(&demand_doc, opts)?;
    diag.demand_rows = rows.len();
    diag.used_fallback = used_fallback;

    let demand = stitch(rows, opts.max_overlap);
    info!("[{}] demand stitched: {} months from {} rows", unit.key, demand.len(), diag.demand_rows);
    diag.demand = demand;

    // Compare
    *cmp = align_and_compare(unit.pivot, diag.supply.values(), diag.demand.labels(), diag.demand.values())?;
    if cmp.compared_count < opts.min_compared {
        return Err(CheckError::InsufficientComparison {
            compared: cmp.compared_count,
            required: opts.min_compared,
        });
    }
    Ok(classify(locked, &cmp.mismatches))
}

fn filter_for(q: &RowQuery) -> ValueFilter {
    if q.year_guard { ValueFilter::year_guarded() } else { ValueFilter::plain() }
}

/// The supply page carries a single forecast row.
fn extract_supply(doc: &Document, opts: &CheckOptions) -> Result<LabeledSeries, CheckError> {
    let q = &opts.supply_row;
    let found = find_row(doc, q).ok_or_else(|| CheckError::RowNotFound {
        side: Side::Supply,
        label: q.label.clone(),
    })?;
    let header = header_for_row(doc, found.row, opts.header_min_cells)
        .ok_or(CheckError::HeaderNotFound { side: Side::Supply })?;
    let rx = extract_row(doc, found.row, &header, &q.label, 0, filter_for(q));
    debug!("supply: {} values", rx.series.len());
    Ok(rx.series)
}

/// Demand rows, one per fiscal year. Targeted lookup first; when it finds
/// nothing, every row with the label is taken and its year inferred.
fn extract_demand(doc: &Document, opts: &CheckOptions) -> Result<(Vec<RowExtract>, bool), CheckError> {
    let q = &opts.demand_row;
    let mut matches = find_rows(doc, q);
    let used_fallback = matches.is_empty();
    if used_fallback {
        warn!("no targeted {:?} rows; trying label-only lookup", q.label);
        matches = find_rows_relaxed(doc, q);
    }
    if matches.is_empty() {
        return Err(CheckError::RowNotFound { side: Side::Demand, label: q.label.clone() });
    }

    let filter = filter_for(q);
    let years = origin_years(doc, &matches);
    let mut rows = Vec::with_capacity(matches.len());
    let mut headerless = 0usize;
    for (ordinal, (m, year)) in matches.iter().zip(years).enumerate() {
        let Some(header) = header_for_row(doc, m.row, opts.header_min_cells) else {
            warn!("demand row #{ordinal} has no month header; skipped");
            headerless += 1;
            continue;
        };
        let rx = extract_row(doc, m.row, &header, &q.label, year, filter);
        if rx.series.is_empty() {
            debug!("demand row #{ordinal} (year {year}) has no values; skipped");
            continue;
        }
        rows.push(rx);
    }

    if rows.is_empty() {
        return Err(if headerless == matches.len() {
            CheckError::HeaderNotFound { side: Side::Demand }
        } else {
            CheckError::RowNotFound { side: Side::Demand, label: q.label.clone() }
        });
    }
    Ok((rows, used_fallback))
}

/// Sort key per row: bracketed range start, else a year stated by the
/// table. Undated rows follow every dated one, in document order.
fn origin_years(doc: &Document, matches: &[RowMatch]) -> Vec<i32> {
    let known: Vec<Option<i32>> = matches
        .iter()
        .map(|m| m.years.map(|y| y.start).or_else(|| table_year(doc, m.table)))
        .collect();
    let after = known.iter().flatten().max().map_or(0, |y| y + 1);
    known
        .into_iter()
        .enumerate()
        .map(|(ordinal, y)| {
            y.unwrap_or_else(|| {
                debug!("demand row #{ordinal} has no year; placed after dated rows");
                after + ordinal as i32
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{FixedLock, MarkerLock, StaticSource};

    const FY: &str = "<th>Oct</th><th>Nov</th><th>Dec</th><th>Jan</th><th>Feb</th><th>Mar</th>\
                      <th>Apr</th><th>May</th><th>Jun</th><th>Jul</th><th>Aug</th><th>Sep</th>";

    fn tds(values: &[u64]) -> String {
        values.iter().map(|v| format!("<td>{v}</td>")).collect()
    }

    fn supply_page(values: &[u64], lock_icon: bool) -> String {
        let months = ["Dec", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov"];
        let head: String = months.iter().map(|m| format!("<th>{m}</th>")).collect();
        let icon = if lock_icon { r#"<span class="icon-lock"></span>"# } else { "" };
        format!(
            "<div>{icon}<table><tr><th>Measure</th>{head}</tr>\
             <tr><td>Forecast</td>{}</tr></table></div>",
            tds(values)
        )
    }

    fn demand_page(y1: &[u64], y2: &[u64]) -> String {
        format!(
            "<table><tr><th>Measure</th>{FY}</tr>\
             <tr><td>Demand forecast [2026-2027]</td>{}</tr>\
             <tr><td>Demand forecast total [2026-2027]</td>{}</tr></table>\
             <table><tr><th>Measure</th>{FY}</tr>\
             <tr><td>Demand forecast [2027-2028]</td>{}</tr></table>",
            tds(y1),
            tds(&[9; 12]),
            tds(y2)
        )
    }

    fn unit(supply: &str, demand: &str, lock: Box<dyn LockSignalProvider>) -> ComparisonUnit {
        ComparisonUnit::new(
            UnitKey { product: s!("P1"), color: s!("Black"), window: s!("FY27") },
            Month::Dec,
            Box::new(StaticSource::new(supply)),
            Box::new(StaticSource::new(demand)),
            lock,
        )
    }

    fn opts() -> CheckOptions {
        CheckOptions { min_compared: 12, ..CheckOptions::default() }
    }

    // Demand years as rendered: Oct..Sep per year; supply from Dec.
    fn series() -> (Vec<u64>, Vec<u64>, Vec<u64>) {
        let y1: Vec<u64> = (1..=12).map(|i| i * 10).collect();
        let y2: Vec<u64> = (13..=24).map(|i| i * 10).collect();
        let supply: Vec<u64> = y1[2..].iter().chain(&y2[..2]).copied().collect();
        (y1, y2, supply)
    }

    #[test]
    fn locked_equal_series_pass() {
        let (y1, y2, supply) = series();
        let mut u = unit(&supply_page(&supply, true), &demand_page(&y1, &y2), Box::new(MarkerLock::new("lock", "unlock")));
        let report = run_comparison(&mut u, &opts());
        assert_eq!(report.verdict(), Some(Verdict::Pass));
        assert_eq!(report.compared_count, 12);
        assert_eq!(report.diagnostics.locked, Some(true));
        assert_eq!(report.diagnostics.demand_rows, 2);
        assert!(!report.diagnostics.used_fallback);
        assert_eq!(report.diagnostics.demand.len(), 24);
    }

    #[test]
    fn locked_divergence_fails_with_list() {
        let (y1, y2, mut supply) = series();
        supply[0] += 1;
        let mut u = unit(&supply_page(&supply, false), &demand_page(&y1, &y2), Box::new(FixedLock(true)));
        let report = run_comparison(&mut u, &opts());
        assert_eq!(report.verdict(), Some(Verdict::Fail));
        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "locked forecast mismatch: DEC:31!=30");
    }

    #[test]
    fn unlocked_divergence_is_advisory() {
        let (y1, y2, mut supply) = series();
        supply[3] = 0;
        let mut u = unit(&supply_page(&supply, false), &demand_page(&y1, &y2), Box::new(FixedLock(false)));
        let report = run_comparison(&mut u, &opts());
        assert_eq!(report.verdict(), Some(Verdict::Advisory));
        assert_eq!(report.mismatches.len(), 1);
        assert!(!report.is_failure());
    }

    #[test]
    fn too_few_months_is_not_a_mismatch() {
        let (y1, y2, supply) = series();
        let mut u = unit(&supply_page(&supply[..6], true), &demand_page(&y1, &y2), Box::new(FixedLock(true)));
        let report = run_comparison(&mut u, &opts());
        assert_eq!(
            report.error(),
            Some(&CheckError::InsufficientComparison { compared: 6, required: 12 })
        );
        assert_eq!(report.status(), "ERROR");
    }

    #[test]
    fn missing_supply_row_reports_what_was_read() {
        let (y1, y2, _) = series();
        let mut u = unit("<table><tr><td>Other</td></tr></table>", &demand_page(&y1, &y2), Box::new(FixedLock(true)));
        let report = run_comparison(&mut u, &CheckOptions { wait_timeout_ms: 0, ..opts() });
        assert!(matches!(report.error(), Some(CheckError::RowNotFound { side: Side::Supply, .. })));
        assert_eq!(report.diagnostics.locked, Some(true));
        assert!(report.diagnostics.demand.is_empty());
    }

    #[test]
    fn pivot_absent_from_demand() {
        let (y1, y2, supply) = series();
        let mut u = unit(&supply_page(&supply, true), &demand_page(&y1, &y2), Box::new(FixedLock(true)));
        let demand = "<table><tr><th>x</th><th>Jan</th><th>Feb</th><th>Mar</th><th>Apr</th><th>May</th><th>Jun</th></tr>\
                      <tr><td>Demand forecast [2026-2027]</td><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td><td>6</td></tr></table>";
        u.demand = Box::new(StaticSource::new(demand));
        let report = run_comparison(&mut u, &opts());
        assert_eq!(report.error(), Some(&CheckError::PivotNotFound { pivot: Month::Dec }));
    }

    #[test]
    fn undated_rows_sort_after_dated_ones() {
        let doc = Document::parse(
            "<table><tr><td>Demand forecast</td></tr></table>\
             <table><caption>Plan 2031</caption><tr><td>Demand forecast</td></tr></table>\
             <table><tr><td>Demand forecast [2030-2031]</td></tr></table>\
             <table><tr><td>Demand forecast</td></tr></table>",
        );
        let rows = find_rows_relaxed(&doc, &RowQuery::demand());
        assert_eq!(origin_years(&doc, &rows), vec![2032, 2031, 2030, 2035]);
        assert_eq!(origin_years(&doc, &rows[..1]), vec![0]);
    }

    #[test]
    fn short_comparison_keeps_counts_and_mismatches() {
        let (y1, y2, supply) = series();
        let mut short = supply[..6].to_vec();
        short[0] = 99;
        let mut u = unit(&supply_page(&short, true), &demand_page(&y1, &y2), Box::new(FixedLock(true)));
        let report = run_comparison(&mut u, &opts());
        assert_eq!(
            report.error(),
            Some(&CheckError::InsufficientComparison { compared: 6, required: 12 })
        );
        assert_eq!(report.compared_count, 6);
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].to_string(), "DEC:99!=30");
    }
}
