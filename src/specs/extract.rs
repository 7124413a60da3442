// src/specs/extract.rs
//! Series extraction: one located row → (labels, values).
//!
//! Per data cell, an editable input's current value wins over the cell's
//! rendered text. Cells that do not parse are skipped (absent value), and
//! surviving values are paired with header labels by column position.

use log::debug;

use super::locate::{HeaderRow, cells};
use crate::config::consts::{CALENDAR_YEAR_BAND, PLAUSIBLE_CEILING, SMALL_VALUE_CEILING};
use crate::core::sanitize::contains_ci;
use crate::core::{DomView, NodeId, parse_count};
use crate::engine::types::{LabeledSeries, RowExtract};

/// Calendar-year heuristic for the one demand source that renders literal
/// years among its data cells.
///
/// Both halves are deliberate: values inside the year band are artifacts,
/// unless they are also below `SMALL_VALUE_CEILING`. Kept isolated so a
/// revision of the rule stays local.
pub fn is_calendar_year_artifact(v: u64) -> bool {
    CALENDAR_YEAR_BAND.contains(&v) && v >= SMALL_VALUE_CEILING
}

/// Inclusion filter applied to every parsed cell value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueFilter {
    /// Apply `is_calendar_year_artifact`.
    pub year_guard: bool,
}

impl ValueFilter {
    pub fn plain() -> Self {
        Self { year_guard: false }
    }

    pub fn year_guarded() -> Self {
        Self { year_guard: true }
    }

    pub fn keep(&self, v: u64) -> bool {
        if v >= PLAUSIBLE_CEILING {
            return false;
        }
        !(self.year_guard && is_calendar_year_artifact(v))
    }
}

/// Text to parse for one cell: an editable sub-element's current value if
/// it has one, else the rendered cell text.
pub fn cell_text<D: DomView + ?Sized>(dom: &D, cell: NodeId) -> String {
    for n in dom.descendants(cell) {
        let editable = match dom.tag(n) {
            Some("input") if is_value_input(dom.attr(n, "type")) => dom.attr(n, "value").map(str::to_string),
            Some("textarea") => Some(dom.text_content(n)),
            Some(_) if dom.attr(n, "contenteditable").is_some_and(|v| v != "false") => {
                Some(dom.text_content(n))
            }
            _ => None,
        };
        if let Some(v) = editable.filter(|v| !v.trim().is_empty()) {
            return v;
        }
    }
    dom.text_content(cell)
}

/// Inputs that carry a typed-in quantity. Hidden ids, checkboxes and
/// buttons do not.
fn is_value_input(kind: Option<&str>) -> bool {
    match kind.map(str::trim) {
        None | Some("") => true,
        Some(t) => ["text", "number", "tel"].iter().any(|k| t.eq_ignore_ascii_case(k)),
    }
}

/// Parsed, filtered values of a row's data cells as (column, value).
/// The label cell (a `th`, or any cell carrying `label`) is not data.
pub fn extract_values<D: DomView + ?Sized>(
    dom: &D,
    row: NodeId,
    label: &str,
    filter: ValueFilter,
) -> Vec<(usize, u64)> {
    let mut out = Vec::new();
    for (col, cell) in cells(dom, row) {
        if dom.is_tag(cell, "th") || (!label.is_empty() && contains_ci(&dom.text_content(cell), label)) {
            continue;
        }
        let raw = cell_text(dom, cell);
        match parse_count(&raw) {
            Ok(v) if filter.keep(v) => out.push((col, v)),
            Ok(v) => debug!("col {col}: {v} filtered out"),
            Err(e) => debug!("col {col}: {e}, skipped"),
        }
    }
    out
}

/// Pair values with header labels by column. When the columns share no
/// position at all (header and row laid out differently), pair in cell
/// order instead.
pub fn pair_with_header(header: &HeaderRow, values: &[(usize, u64)]) -> LabeledSeries {
    let joined: LabeledSeries = header
        .columns
        .iter()
        .filter_map(|&(col, m)| values.iter().find(|(c, _)| *c == col).map(|&(_, v)| (m, v)))
        .collect();
    if !joined.is_empty() || values.is_empty() {
        return joined;
    }
    debug!("header/row columns disjoint; pairing {} values by position", values.len());
    header
        .columns
        .iter()
        .zip(values)
        .map(|(&(_, m), &(_, v))| (m, v))
        .collect()
}

/// Extract one row against its header.
pub fn extract_row<D: DomView + ?Sized>(
    dom: &D,
    row: NodeId,
    header: &HeaderRow,
    label: &str,
    origin_year: i32,
    filter: ValueFilter,
) -> RowExtract {
    let values = extract_values(dom, row, label, filter);
    RowExtract { origin_year, series: pair_with_header(header, &values) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Document, Month};
    use crate::specs::locate::{find_header, tables};

    fn row_and_header(html: &str) -> (Document, NodeId, HeaderRow) {
        let doc = Document::parse(html);
        let t = tables(&doc)[0];
        let h = find_header(&doc, t, 6).unwrap();
        let row = doc.find_tag(doc.root(), "tr")[1];
        (doc, row, h)
    }

    #[test]
    fn calendar_year_filter_keeps_small_values() {
        let g = ValueFilter::year_guarded();
        assert!(g.keep(230));
        assert!(!g.keep(2026));
        assert!(!g.keep(1900));
        assert!(!g.keep(2100));
        assert!(g.keep(2101));
        assert!(g.keep(1899));
        assert!(!g.keep(10_000_000));
        assert!(ValueFilter::plain().keep(2026));
        assert!(!is_calendar_year_artifact(230));
    }

    #[test]
    fn mixed_small_and_year_cells_leave_one_value() {
        let doc = Document::parse("<table><tr><td>Demand</td><td>230</td><td>1950</td></tr></table>");
        let row = doc.find_tag(doc.root(), "tr")[0];
        let vals = extract_values(&doc, row, "Demand", ValueFilter::year_guarded());
        assert_eq!(vals, vec![(1, 230)]);
    }

    #[test]
    fn input_value_beats_cell_text() {
        let doc = Document::parse(
            r#"<table><tr><td>F</td><td>99<input value="1,250"></td><td><input value="">7</td></tr></table>"#,
        );
        let row = doc.find_tag(doc.root(), "tr")[0];
        assert_eq!(extract_values(&doc, row, "F", ValueFilter::plain()), vec![(1, 1250), (2, 7)]);
    }

    #[test]
    fn non_value_inputs_leave_the_rendered_text() {
        let doc = Document::parse(
            r#"<table><tr><td>F</td><td>1,234<input type="hidden" value="r-17"></td><td>55</td>
               <td><input type="checkbox" value="on">8</td><td><input type="NUMBER" value="9"></td></tr></table>"#,
        );
        let row = doc.find_tag(doc.root(), "tr")[0];
        assert_eq!(
            extract_values(&doc, row, "F", ValueFilter::plain()),
            vec![(1, 1234), (2, 55), (3, 8), (4, 9)]
        );
    }

    #[test]
    fn unparseable_cells_are_skipped_with_their_label() {
        let (doc, row, h) = row_and_header(
            "<table><tr><th>x</th><th>Jan</th><th>Feb</th><th>Mar</th><th>Apr</th><th>May</th><th>Jun</th></tr>\
             <tr><td>Forecast</td><td>1</td><td>-</td><td>3</td><td>4</td><td></td><td>6</td></tr></table>",
        );
        let rx = extract_row(&doc, row, &h, "Forecast", 2026, ValueFilter::plain());
        assert_eq!(rx.series.labels(), &[Month::Jan, Month::Mar, Month::Apr, Month::Jun]);
        assert_eq!(rx.series.values(), &[1, 3, 4, 6]);
        assert_eq!(rx.origin_year, 2026);
    }

    #[test]
    fn disjoint_columns_pair_by_position() {
        let header = HeaderRow {
            row: NodeId(0),
            columns: vec![(5, Month::Jan), (6, Month::Feb)],
        };
        let s = pair_with_header(&header, &[(1, 10), (2, 20), (3, 30)]);
        assert_eq!(s.labels(), &[Month::Jan, Month::Feb]);
        assert_eq!(s.values(), &[10, 20]);
    }
}
