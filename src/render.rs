//! Plain-text table output of a grid view.

use gridmark_core::GridSession;
use gridmark_engine::engine::Row;

/// Render the sorted view of `session` as a `|`-separated table. Each
/// column is padded to its pixel width converted to characters; rows whose
/// height would be auto get a trailing `*`.
pub fn render_table(session: &GridSession) -> String {
    let columns = session.columns();
    let char_width = session.config().layout.fallback_char_width;
    let fields: Vec<&str> = columns.fields().collect();
    let widths: Vec<usize> = fields
        .iter()
        .map(|f| width_in_chars(session.column_width(f), char_width))
        .collect();

    let mut out = String::new();
    let headers: Vec<&str> = fields.iter().map(|f| columns.header(f)).collect();
    push_line(&mut out, &headers, &widths, false);

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let separator: Vec<&str> = separator.iter().map(String::as_str).collect();
    push_line(&mut out, &separator, &widths, false);

    for row in session.view() {
        let cells = cell_texts(&row, &fields);
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        let auto = session.row_height(&row, None).is_auto();
        push_line(&mut out, &cells, &widths, auto);
    }
    out
}

/// Widest column the text renderer will draw.
const MAX_COLUMN_CHARS: usize = 1024;

fn width_in_chars(width: f64, char_width: f64) -> usize {
    let chars = width / char_width;
    if char_width > 0.0 && chars.is_finite() {
        chars.floor().clamp(1.0, MAX_COLUMN_CHARS as f64) as usize
    } else if char_width > 0.0 && chars == f64::INFINITY {
        MAX_COLUMN_CHARS
    } else {
        1
    }
}

fn cell_texts(row: &Row, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .map(|f| {
            row.get(f)
                .map(|v| escape(&v.display_text()))
                .unwrap_or_default()
        })
        .collect()
}

fn escape(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize], auto: bool) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        let len = cell.chars().count();
        if len < *width {
            out.push_str(&" ".repeat(width - len));
        }
        out.push_str(" |");
    }
    if auto {
        out.push_str(" *");
    }
    out.push('\n');
}
