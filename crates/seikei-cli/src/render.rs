use seikei_core::compare::{Comparison, Outcome};
use seikei_core::replace::RuleSet;
use seikei_core::CorrectionTable;

/// Markdown table with the original/corrected word columns.
pub fn corrections_table(table: &CorrectionTable) -> String {
    if table.is_empty() {
        return "(修正なし)\n".to_string();
    }
    let mut out = format!(
        "| # | {} | {} |\n|---|---|---|\n",
        CorrectionTable::ORIGINAL_COLUMN,
        CorrectionTable::CORRECTED_COLUMN
    );
    for (index, row) in table.rows().iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            index + 1,
            cell(&row.from_word),
            cell(&row.to_word)
        ));
    }
    out
}

pub fn comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    section(&mut out, "整形前のテキスト", comparison.original.trim());
    section(&mut out, "整形後のテキスト", &comparison.cleaned);

    for analysis in &comparison.analyses {
        let label = analysis.kind.label();
        section(
            &mut out,
            &format!("整形前の{label}（話し言葉のまま）"),
            &outcome_text(&analysis.before),
        );
        section(
            &mut out,
            &format!("整形後の{label}（整った言葉）"),
            &outcome_text(&analysis.after),
        );
    }

    section(
        &mut out,
        "整形ログ（どこがどう直されたか）",
        corrections_table(&comparison.corrections).trim_end(),
    );
    out
}

pub fn rules(rules: &RuleSet) -> String {
    if rules.is_empty() {
        return "(no rules)\n".to_string();
    }
    let mut out = String::from("| # | find | replace |\n|---|---|---|\n");
    for (index, rule) in rules.rules().iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            index + 1,
            cell(&rule.find),
            cell(&rule.replace)
        ));
    }
    out
}

fn section(out: &mut String, title: &str, body: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("## {title}\n\n{body}\n"));
}

fn outcome_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Text(text) if text.is_empty() => "(empty response)".to_string(),
        Outcome::Text(text) => text.clone(),
        Outcome::Failed(message) => format!("(failed: {message})"),
    }
}

/// Escape pipes and show spaces inside a rule so table cells stay readable.
fn cell(value: &str) -> String {
    let escaped = value.replace('|', "\\|");
    if escaped.is_empty() || escaped.contains(char::is_whitespace) {
        format!("`{escaped}`")
    } else {
        escaped
    }
}
