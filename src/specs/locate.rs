// src/specs/locate.rs
//! Table row location.
//!
//! Two lookups over a page snapshot:
//! - **Header discovery**: the first row of a table with at least
//!   `min_cells` month cells; its month cells, in order, are the labels.
//!   Headers are always read from the live table, never synthesized, since
//!   column counts and start months differ per table instance.
//! - **Target rows**: rows whose text contains the query label, none of the
//!   exclusions and (optionally) a bracketed year range like `[2026-2027]`.
//!
//! Absence is a value (`None` / empty `Vec`), never a panic or error; the
//! engine decides whether a fallback exists.

use log::debug;

use crate::config::RowQuery;
use crate::core::sanitize::contains_ci;
use crate::core::{DomView, Month, NodeId, parse_label};

/// A header row and the column position of each month cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderRow {
    pub row: NodeId,
    pub columns: Vec<(usize, Month)>,
}

impl HeaderRow {
    pub fn labels(&self) -> Vec<Month> {
        self.columns.iter().map(|&(_, m)| m).collect()
    }
}

/// `[2026-2027]`, `[2026–2027]`, `[2026 - 2027]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowMatch {
    pub table: NodeId,
    pub row: NodeId,
    pub years: Option<YearRange>,
}

/* ---------- structure ---------- */

pub fn tables<D: DomView + ?Sized>(dom: &D) -> Vec<NodeId> {
    dom.find_tag(dom.root(), "table")
}

/// Rows owned by `table` itself (rows of nested tables excluded).
pub fn rows_of<D: DomView + ?Sized>(dom: &D, table: NodeId) -> Vec<NodeId> {
    dom.find_tag(table, "tr")
        .into_iter()
        .filter(|&tr| dom.ancestor(tr, "table") == Some(table))
        .collect()
}

/// `td`/`th` cells of a row with their starting column (colspan-aware).
pub fn cells<D: DomView + ?Sized>(dom: &D, row: NodeId) -> Vec<(usize, NodeId)> {
    let mut col = 0usize;
    let mut out = Vec::new();
    for c in dom.children(row) {
        if !(dom.is_tag(c, "td") || dom.is_tag(c, "th")) {
            continue;
        }
        out.push((col, c));
        let span = dom
            .attr(c, "colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, 100);
        col += span;
    }
    out
}

/* ---------- headers ---------- */

/// Read `row` as a header if it has at least `min_cells` month cells.
pub fn read_header<D: DomView + ?Sized>(dom: &D, row: NodeId, min_cells: usize) -> Option<HeaderRow> {
    let columns: Vec<(usize, Month)> = cells(dom, row)
        .into_iter()
        .filter_map(|(col, c)| parse_label(&dom.text_content(c)).map(|m| (col, m)))
        .collect();
    (columns.len() >= min_cells).then_some(HeaderRow { row, columns })
}

/// First qualifying header row of a table, scanning top to bottom.
pub fn find_header<D: DomView + ?Sized>(dom: &D, table: NodeId, min_cells: usize) -> Option<HeaderRow> {
    rows_of(dom, table).into_iter().find_map(|r| read_header(dom, r, min_cells))
}

/// Header governing `row`: the nearest qualifying header above it in the
/// same table, else the table's first header (headers rendered below data).
pub fn header_for_row<D: DomView + ?Sized>(dom: &D, row: NodeId, min_cells: usize) -> Option<HeaderRow> {
    let table = dom.ancestor(row, "table")?;
    let rows = rows_of(dom, table);
    let pos = rows.iter().position(|&r| r == row)?;
    rows[..pos]
        .iter()
        .rev()
        .find_map(|&r| read_header(dom, r, min_cells))
        .or_else(|| find_header(dom, table, min_cells))
}

/* ---------- target rows ---------- */

/// First bracketed `[YYYY-YYYY]` range in `text` (hyphen or en/em dash).
pub fn parse_year_range(text: &str) -> Option<YearRange> {
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else { break };
        if let Some(r) = year_range_inner(&after[..close]) {
            return Some(r);
        }
        rest = &after[close + 1..];
    }
    None
}

fn year_range_inner(inner: &str) -> Option<YearRange> {
    let (a, b) = inner.split_once(['-', '\u{2013}', '\u{2014}'])?;
    let (a, b) = (a.trim(), b.trim());
    let year = |s: &str| -> Option<i32> {
        (s.len() == 4 && s.bytes().all(|c| c.is_ascii_digit())).then(|| s.parse().ok()).flatten()
    };
    Some(YearRange { start: year(a)?, end: year(b)? })
}

/// Does this row's text satisfy the query? Returns the parsed year range
/// alongside (`Some(None)` when matched without one).
fn row_qualifies(text: &str, query: &RowQuery, require_range: bool) -> Option<Option<YearRange>> {
    if !contains_ci(text, &query.label) {
        return None;
    }
    if let Some(word) = query.exclude.iter().find(|w| !w.is_empty() && contains_ci(text, w)) {
        debug!("row {text:?} skipped: contains excluded {word:?}");
        return None;
    }
    let years = parse_year_range(text);
    if require_range && years.is_none() {
        return None;
    }
    Some(years)
}

fn collect_rows<D: DomView + ?Sized>(dom: &D, query: &RowQuery, require_range: bool) -> Vec<RowMatch> {
    let mut out = Vec::new();
    for table in tables(dom) {
        for row in rows_of(dom, table) {
            let text = dom.text_content(row);
            if let Some(years) = row_qualifies(&text, query, require_range) {
                out.push(RowMatch { table, row, years });
            }
        }
    }
    out
}

/// Every qualifying row across all tables, in document order.
pub fn find_rows<D: DomView + ?Sized>(dom: &D, query: &RowQuery) -> Vec<RowMatch> {
    collect_rows(dom, query, query.year_range)
}

/// First qualifying row.
pub fn find_row<D: DomView + ?Sized>(dom: &D, query: &RowQuery) -> Option<RowMatch> {
    find_rows(dom, query).into_iter().next()
}

/// Alternate path when the targeted lookup finds nothing: label and
/// exclusions only, year range not required.
pub fn find_rows_relaxed<D: DomView + ?Sized>(dom: &D, query: &RowQuery) -> Vec<RowMatch> {
    collect_rows(dom, query, false)
}

/// A 4-digit year stated in a table's caption or header rows.
pub fn table_year<D: DomView + ?Sized>(dom: &D, table: NodeId) -> Option<i32> {
    let mut sources: Vec<NodeId> = dom.find_tag(table, "caption");
    sources.extend(dom.find_tag(table, "thead"));
    if let Some(first) = rows_of(dom, table).first() {
        sources.push(*first);
    }
    sources
        .into_iter()
        .find_map(|n| first_year_in(&dom.text_content(n)))
}

fn first_year_in(text: &str) -> Option<i32> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|w| w.len() == 4)
        .filter_map(|w| w.parse::<i32>().ok())
        .find(|y| (1900..=2100).contains(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Document;

    const PAGE: &str = r#"
        <table id="t1">
          <tr><th>Measure</th><th>Oct</th><th>Nov</th><th>Dec</th><th>Jan</th><th>Feb</th><th>Mar</th></tr>
          <tr><td>Demand forecast [2026-2027]</td><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td><td>6</td></tr>
          <tr><td>Demand forecast total [2026-2027]</td><td>9</td><td>9</td><td>9</td><td>9</td><td>9</td><td>9</td></tr>
        </table>
        <table id="t2">
          <tr><td>Demand forecast [2027&ndash;2028]</td><td>7</td></tr>
          <tr><td>Demand forecast</td><td>8</td></tr>
        </table>"#;

    fn demand() -> RowQuery {
        RowQuery::demand().excluding(&["total"])
    }

    #[test]
    fn year_ranges_accept_hyphen_and_dashes() {
        assert_eq!(parse_year_range("X [2026-2027]"), Some(YearRange { start: 2026, end: 2027 }));
        assert_eq!(parse_year_range("[2026 \u{2013} 2027]"), Some(YearRange { start: 2026, end: 2027 }));
        assert_eq!(parse_year_range("[v2] [2030-2031]"), Some(YearRange { start: 2030, end: 2031 }));
        assert_eq!(parse_year_range("[26-27]"), None);
        assert_eq!(parse_year_range("2026-2027"), None);
    }

    #[test]
    fn targeted_rows_honor_exclusions_and_range() {
        let doc = Document::parse(PAGE);
        let rows = find_rows(&doc, &demand());
        assert_eq!(rows.len(), 2, "one per table, total row and range-less row skipped");
        assert_eq!(rows[0].years, Some(YearRange { start: 2026, end: 2027 }));
        assert_eq!(rows[1].years, Some(YearRange { start: 2027, end: 2028 }));
        assert_ne!(rows[0].table, rows[1].table);
    }

    #[test]
    fn relaxed_lookup_drops_range_requirement() {
        let doc = Document::parse(PAGE);
        let rows = find_rows_relaxed(&doc, &demand());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].years, None);
    }

    #[test]
    fn missing_row_is_none_not_panic() {
        let doc = Document::parse(PAGE);
        assert!(find_row(&doc, &RowQuery::new("Supply plan")).is_none());
        assert!(find_row(&Document::parse(""), &demand()).is_none());
    }

    #[test]
    fn header_needs_six_month_cells() {
        let doc = Document::parse(PAGE);
        let t = tables(&doc);
        let h = find_header(&doc, t[0], 6).unwrap();
        assert_eq!(h.labels(), months![Oct, Nov, Dec, Jan, Feb, Mar]);
        assert_eq!(h.columns[0].0, 1);
        assert!(find_header(&doc, t[0], 7).is_none());
        assert!(find_header(&doc, t[1], 6).is_none());
    }

    #[test]
    fn colspan_shifts_columns() {
        let doc = Document::parse(
            "<table><tr><td colspan=2>Label</td><td>Jan</td><td>Feb</td></tr></table>",
        );
        let row = doc.find_tag(doc.root(), "tr")[0];
        let cols: Vec<usize> = cells(&doc, row).into_iter().map(|(c, _)| c).collect();
        assert_eq!(cols, vec![0, 2, 3]);
    }

    #[test]
    fn nearest_header_above_wins() {
        let doc = Document::parse(
            r#"<table>
              <tr><th></th><th>Jan</th><th>Feb</th><th>Mar</th><th>Apr</th><th>May</th><th>Jun</th></tr>
              <tr><td>A</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td></tr>
              <tr><th></th><th>Jul</th><th>Aug</th><th>Sep</th><th>Oct</th><th>Nov</th><th>Dec</th></tr>
              <tr><td>B</td><td>2</td><td>2</td><td>2</td><td>2</td><td>2</td><td>2</td></tr>
            </table>"#,
        );
        let rows = doc.find_tag(doc.root(), "tr");
        assert_eq!(header_for_row(&doc, rows[1], 6).unwrap().labels()[0], Month::Jan);
        assert_eq!(header_for_row(&doc, rows[3], 6).unwrap().labels()[0], Month::Jul);
    }

    #[test]
    fn table_year_reads_caption() {
        let doc = Document::parse("<table><caption>Plan FY 2027</caption><tr><td>x</td></tr></table>");
        assert_eq!(table_year(&doc, tables(&doc)[0]), Some(2027));
    }
}
