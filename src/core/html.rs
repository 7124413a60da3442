// src/core/html.rs
//
// Tolerant HTML → `Document` reader. Not a conformant HTML5 parser: it
// knows just enough tree-building to read the table markup planning pages
// render (implicit cell/row closes, void elements, raw-text blocks).

use super::dom::{Document, NodeId, NodeKind};
use super::sanitize::decode_entities;

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Content kept verbatim as one text node (textarea) or dropped (script/style).
const RAW_TEXT: &[&str] = &["script", "style", "textarea"];

pub fn parse(src: &str) -> Document {
    let mut doc = Document::new();
    let lc = src.to_ascii_lowercase();
    let b = src.as_bytes();
    let n = b.len();

    // (node, tag)
    let mut stack: Vec<(NodeId, String)> = vec![(NodeId(0), String::new())];
    let mut i = 0usize;
    let mut text_start = 0usize;

    while i < n {
        if b[i] != b'<' {
            i += 1;
            continue;
        }
        let next = b.get(i + 1).copied().unwrap_or(b' ');
        let is_markup = next == b'/' || next == b'!' || next == b'?' || next.is_ascii_alphabetic();
        if !is_markup {
            i += 1;
            continue;
        }

        flush_text(&mut doc, &stack, &src[text_start..i]);

        if lc[i..].starts_with("<!--") {
            i = lc[i + 4..].find("-->").map_or(n, |e| i + 4 + e + 3);
        } else if next == b'!' || next == b'?' {
            i = find_byte(b, i, b'>').map_or(n, |e| e + 1);
        } else if next == b'/' {
            let name_start = i + 2;
            let name_end = scan_name(b, name_start);
            let name = lc[name_start..name_end].to_string();
            i = find_byte(b, name_end, b'>').map_or(n, |e| e + 1);
            close_tag(&mut stack, &name);
        } else {
            let (tag, attrs, self_closing, end) = read_open_tag(src, &lc, i + 1);
            i = end;
            open_implied_closes(&mut stack, &tag);

            let parent = stack.last().map_or(NodeId(0), |(id, _)| *id);
            let id = doc.push(parent, NodeKind::Element { tag: tag.clone(), attrs });

            if RAW_TEXT.contains(&tag.as_str()) && !self_closing {
                let close = format!("</{tag}");
                let body_end = lc[i..].find(&close).map_or(n, |e| i + e);
                if tag == "textarea" && body_end > i {
                    doc.push(id, NodeKind::Text(decode_entities(&src[i..body_end])));
                }
                i = find_byte(b, body_end, b'>').map_or(n, |e| e + 1);
            } else if !self_closing && !VOID.contains(&tag.as_str()) {
                stack.push((id, tag));
            }
        }
        text_start = i;
    }
    flush_text(&mut doc, &stack, &src[text_start.min(n)..]);
    doc
}

fn flush_text(doc: &mut Document, stack: &[(NodeId, String)], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let parent = stack.last().map_or(NodeId(0), |(id, _)| *id);
    doc.push(parent, NodeKind::Text(decode_entities(raw)));
}

fn find_byte(b: &[u8], from: usize, needle: u8) -> Option<usize> {
    b.get(from..)?.iter().position(|&c| c == needle).map(|off| from + off)
}

fn scan_name(b: &[u8], from: usize) -> usize {
    let mut j = from;
    while j < b.len() && (b[j].is_ascii_alphanumeric() || b[j] == b'-' || b[j] == b':' || b[j] == b'_') {
        j += 1;
    }
    j
}

/// Parse `<tag attr=… …>` starting right after `<`.
/// Returns (lowercase tag, attrs, self-closing, index after `>`).
fn read_open_tag(src: &str, lc: &str, from: usize) -> (String, Vec<(String, String)>, bool, usize) {
    let b = src.as_bytes();
    let n = b.len();
    let name_end = scan_name(b, from);
    let tag = lc[from..name_end].to_string();
    let mut attrs = Vec::new();
    let mut j = name_end;
    let mut self_closing = false;

    loop {
        while j < n && b[j].is_ascii_whitespace() { j += 1; }
        if j >= n { return (tag, attrs, self_closing, n); }
        match b[j] {
            b'>' => return (tag, attrs, self_closing, j + 1),
            b'/' => { self_closing = true; j += 1; continue; }
            _ => {}
        }
        self_closing = false;

        let a_start = j;
        while j < n && !b[j].is_ascii_whitespace() && !matches!(b[j], b'=' | b'>' | b'/') { j += 1; }
        if j == a_start {
            // stray byte such as a lone quote
            j += 1;
            continue;
        }
        let name = lc[a_start..j].to_string();

        while j < n && b[j].is_ascii_whitespace() { j += 1; }
        if j < n && b[j] == b'=' {
            j += 1;
            while j < n && b[j].is_ascii_whitespace() { j += 1; }
            let value = match b.get(j) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let v_end = find_byte(b, j + 1, q).unwrap_or(n);
                    let v = &src[j + 1..v_end];
                    j = (v_end + 1).min(n);
                    v
                }
                _ => {
                    let v_start = j;
                    while j < n && !b[j].is_ascii_whitespace() && b[j] != b'>' { j += 1; }
                    &src[v_start..j]
                }
            };
            attrs.push((name, decode_entities(value)));
        } else {
            attrs.push((name, String::new()));
        }
    }
}

fn close_tag(stack: &mut Vec<(NodeId, String)>, name: &str) {
    if let Some(pos) = stack.iter().rposition(|(_, t)| t == name) {
        if pos > 0 {
            stack.truncate(pos);
        }
    }
}

/// Pop elements an opening tag implicitly closes (`<td>` after an open cell,
/// `<tr>` after an open row, …) without crossing the given boundary.
fn open_implied_closes(stack: &mut Vec<(NodeId, String)>, tag: &str) {
    let (closes, boundary): (&[&str], &[&str]) = match tag {
        "td" | "th" => (&["td", "th"], &["tr", "table"]),
        "tr" => (&["tr"], &["thead", "tbody", "tfoot", "table"]),
        "thead" | "tbody" | "tfoot" => (&["thead", "tbody", "tfoot"], &["table"]),
        "li" => (&["li"], &["ul", "ol"]),
        "option" => (&["option"], &["select"]),
        _ => return,
    };
    for pos in (1..stack.len()).rev() {
        let t = stack[pos].1.as_str();
        if boundary.contains(&t) {
            return;
        }
        if closes.contains(&t) {
            stack.truncate(pos);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dom::DomView;

    #[test]
    fn unclosed_cells_and_rows_nest_correctly() {
        let doc = parse("<TABLE><tr><td>A<td>B<tr><td>C</table>");
        let rows = doc.find_tag(doc.root(), "tr");
        assert_eq!(rows.len(), 2);
        let first_cells: Vec<String> = doc
            .children(rows[0])
            .into_iter()
            .map(|c| doc.text_content(c))
            .collect();
        assert_eq!(first_cells, vec!["A", "B"]);
        assert_eq!(doc.text_content(rows[1]), "C");
    }

    #[test]
    fn attributes_quoted_unquoted_and_bare() {
        let doc = parse(r#"<td class="cell edit" data-col=3 hidden><input type='text' value="1,250"></td>"#);
        let td = doc.find_tag(doc.root(), "td")[0];
        assert_eq!(doc.attr(td, "class"), Some("cell edit"));
        assert_eq!(doc.attr(td, "DATA-COL"), Some("3"));
        assert_eq!(doc.attr(td, "hidden"), Some(""));
        let input = doc.find_tag(td, "input")[0];
        assert_eq!(doc.attr(input, "value"), Some("1,250"));
        assert!(doc.children(input).is_empty());
    }

    #[test]
    fn comments_scripts_and_entities() {
        let doc = parse(
            "<p>a<!-- <td>x</td> -->b<script>if (a<b) {}</script>&nbsp;c &lt;d&gt;</p>",
        );
        assert!(doc.find_tag(doc.root(), "td").is_empty());
        let p = doc.find_tag(doc.root(), "p")[0];
        assert_eq!(doc.text_content(p), "ab c <d>");
    }

    #[test]
    fn textarea_keeps_its_body_as_text() {
        let doc = parse("<td><textarea name=q>4,100</textarea></td>");
        let ta = doc.find_tag(doc.root(), "textarea")[0];
        assert_eq!(doc.text_content(ta), "4,100");
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let doc = parse("<td>a < b</td>");
        let td = doc.find_tag(doc.root(), "td")[0];
        assert_eq!(doc.text_content(td), "a < b");
    }
}
