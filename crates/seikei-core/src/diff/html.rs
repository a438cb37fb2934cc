use super::matcher::{SequenceMatcher, Tag};
use super::ndiff::diff_tokens;
use crate::types::EditOp;

const STYLE: &str = r#"
    table.diff { font-family: Menlo, Consolas, monospace; border: medium; border-collapse: collapse; }
    .diff_header { background-color: #e0e0e0; text-align: right; padding: 0 0.5em; }
    .diff_label { background-color: #e0e0e0; padding: 0.25em 0.5em; text-align: left; }
    td.diff_text { padding: 0 0.5em; white-space: pre-wrap; }
    tr.diff_row_chg td.diff_text { background-color: #fffbe6; }
    .diff_add { background-color: #aaffaa; }
    .diff_chg { background-color: #ffff77; }
    .diff_sub { background-color: #ffaaaa; }
    table.diff_legend { margin-top: 1em; font-family: sans-serif; font-size: small; }
"#;

const LEGEND: &str = r#"<table class="diff_legend" summary="Legends">
  <tr><th>Legend</th></tr>
  <tr><td>
    <span class="diff_add">&nbsp;Added&nbsp;</span>
    <span class="diff_chg">&nbsp;Changed&nbsp;</span>
    <span class="diff_sub">&nbsp;Deleted&nbsp;</span>
  </td></tr>
</table>
"#;

enum Row {
    Same {
        left_no: usize,
        right_no: usize,
        token: String,
    },
    Changed {
        left: Option<(usize, String)>,
        right: Option<(usize, String)>,
    },
}

/// Render a standalone side-by-side HTML view of two token sequences,
/// one token per row.
pub fn render_html_diff(
    tokens_a: &[&str],
    tokens_b: &[&str],
    label_a: &str,
    label_b: &str,
) -> String {
    let rows = build_rows(&diff_tokens(tokens_a, tokens_b));

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{} / {}</title>\n",
        escape(label_a),
        escape(label_b)
    ));
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<table class=\"diff\" summary=\"Token differences\">\n");
    html.push_str(&format!(
        "  <thead><tr><th class=\"diff_label\" colspan=\"2\">{}</th><th class=\"diff_label\" colspan=\"2\">{}</th></tr></thead>\n",
        escape(label_a),
        escape(label_b)
    ));
    html.push_str("  <tbody>\n");
    for row in &rows {
        html.push_str(&render_row(row));
    }
    html.push_str("  </tbody>\n</table>\n");
    html.push_str(LEGEND);
    html.push_str("</body>\n</html>\n");
    html
}

fn build_rows(ops: &[EditOp]) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut left_no = 0;
    let mut right_no = 0;
    let mut removed: Vec<(usize, String)> = Vec::new();
    let mut added: Vec<(usize, String)> = Vec::new();

    for op in ops {
        match op {
            EditOp::Unchanged(token) => {
                flush_changes(&mut removed, &mut added, &mut rows);
                left_no += 1;
                right_no += 1;
                rows.push(Row::Same {
                    left_no,
                    right_no,
                    token: token.clone(),
                });
            }
            EditOp::Removed(token) => {
                left_no += 1;
                removed.push((left_no, token.clone()));
            }
            EditOp::Added(token) => {
                right_no += 1;
                added.push((right_no, token.clone()));
            }
            EditOp::Annotation(_) => {}
        }
    }
    flush_changes(&mut removed, &mut added, &mut rows);
    rows
}

fn flush_changes(
    removed: &mut Vec<(usize, String)>,
    added: &mut Vec<(usize, String)>,
    rows: &mut Vec<Row>,
) {
    let count = removed.len().max(added.len());
    let mut left = removed.drain(..);
    let mut right = added.drain(..);
    for _ in 0..count {
        rows.push(Row::Changed {
            left: left.next(),
            right: right.next(),
        });
    }
}

fn render_row(row: &Row) -> String {
    match row {
        Row::Same {
            left_no,
            right_no,
            token,
        } => {
            let text = escape(token);
            format!(
                "    <tr>{}{}</tr>\n",
                cells(Some(*left_no), &text),
                cells(Some(*right_no), &text)
            )
        }
        Row::Changed { left, right } => {
            let (left_html, right_html) = match (left, right) {
                (Some((_, a)), Some((_, b))) => highlight_pair(a, b),
                (Some((_, a)), None) => (span("diff_sub", a), String::new()),
                (None, Some((_, b))) => (String::new(), span("diff_add", b)),
                (None, None) => (String::new(), String::new()),
            };
            format!(
                "    <tr class=\"diff_row_chg\">{}{}</tr>\n",
                cells(left.as_ref().map(|(no, _)| *no), &left_html),
                cells(right.as_ref().map(|(no, _)| *no), &right_html)
            )
        }
    }
}

fn cells(number: Option<usize>, html: &str) -> String {
    let number = number.map(|no| no.to_string()).unwrap_or_default();
    format!("<td class=\"diff_header\">{number}</td><td class=\"diff_text\">{html}</td>")
}

fn highlight_pair(original: &str, corrected: &str) -> (String, String) {
    let a: Vec<char> = original.chars().collect();
    let b: Vec<char> = corrected.chars().collect();
    let mut left = String::new();
    let mut right = String::new();
    for op in SequenceMatcher::new(&a, &b).opcodes() {
        let a_text: String = a[op.a_start..op.a_end].iter().collect();
        let b_text: String = b[op.b_start..op.b_end].iter().collect();
        match op.tag {
            Tag::Equal => {
                left.push_str(&escape(&a_text));
                right.push_str(&escape(&b_text));
            }
            Tag::Replace => {
                left.push_str(&span("diff_chg", &a_text));
                right.push_str(&span("diff_chg", &b_text));
            }
            Tag::Delete => left.push_str(&span("diff_sub", &a_text)),
            Tag::Insert => right.push_str(&span("diff_add", &b_text)),
        }
    }
    (left, right)
}

fn span(class: &str, text: &str) -> String {
    format!("<span class=\"{class}\">{}</span>", escape(text))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
