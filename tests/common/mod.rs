// tests/common/mod.rs
#![allow(dead_code)]
use std::fs;
use std::path::PathBuf;

pub fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("forecast_check_{}", name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

pub fn th(months: &[&str]) -> String {
    months.iter().map(|m| format!("<th>{m}</th>")).collect()
}

pub fn td(values: &[u64]) -> String {
    values.iter().map(|v| format!("<td>{v}</td>")).collect()
}

pub const FY: [&str; 12] = ["Oct", "Nov", "Dec", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep"];

/// Supply page: one locked (or not) forecast row, header starting at Dec.
pub fn supply_page(values: &[u64], locked: bool) -> String {
    let months: Vec<&str> = ["Dec", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov"]
        .iter()
        .cycle()
        .take(values.len())
        .copied()
        .collect();
    let icon = if locked {
        r#"<span class="fa fa-lock" title="Locked"></span>"#
    } else {
        r#"<span class="fa fa-unlock"></span>"#
    };
    format!(
        r#"<html><body><div class="toolbar">{icon}</div>
        <table class="grid">
          <thead><tr><th>Measure</th>{}</tr></thead>
          <tbody>
            <tr><td>Previous forecast</td>{}</tr>
            <tr><td>Forecast</td>{}</tr>
          </tbody>
        </table></body></html>"#,
        th(&months),
        td(&vec![0; values.len()]),
        values.iter().map(|v| format!(r#"<td><input type="text" value="{v}"></td>"#)).collect::<String>()
    )
}

/// Demand page: one table per fiscal year, bracketed year range in the
/// row label. Each entry is (start year, header months, values).
pub fn demand_page(years: &[(i32, Vec<&str>, Vec<u64>)]) -> String {
    let mut html = String::from("<html><body>");
    for (year, months, values) in years {
        let pad = months.len().saturating_sub(values.len());
        html.push_str(&format!(
            "<table><tr><th>Measure</th>{}</tr>\
             <tr><td>Demand forecast [{year}-{}]</td>{}{}</tr>\
             <tr><td>Demand forecast Total [{year}-{}]</td>{}</tr></table>",
            th(months),
            year + 1,
            td(values),
            "<td>-</td>".repeat(pad),
            year + 1,
            td(&vec![1; months.len()]),
        ));
    }
    html.push_str("</body></html>");
    html
}
