use crate::complete::CompletionProvider;
use crate::corrections::extract_corrections;
use crate::diff::{render_html_diff, tokenize};
use crate::prompts::{AnalysisKind, DEFAULT_TEMPERATURE};
use crate::replace::apply_replacements;
use crate::types::{CorrectionTable, ReplacementRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub kinds: Vec<AnalysisKind>,
    pub temperature: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            kinds: vec![AnalysisKind::Summary],
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Result of one model call; failures are kept so the caller can warn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum Outcome {
    Text(String),
    Failed(String),
}

impl Outcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Text(text) => Some(text),
            Outcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Model output for one kind, from the original and the cleaned text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub kind: AnalysisKind,
    pub before: Outcome,
    pub after: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub original: String,
    pub cleaned: String,
    pub corrections: CorrectionTable,
    pub analyses: Vec<Analysis>,
}

impl Comparison {
    pub fn render_html_diff(&self, label_a: &str, label_b: &str) -> String {
        render_html_diff(
            &tokenize(&self.original),
            &tokenize(&self.cleaned),
            label_a,
            label_b,
        )
    }

    pub fn failures(&self) -> impl Iterator<Item = (AnalysisKind, &str)> {
        self.analyses.iter().flat_map(|analysis| {
            [&analysis.before, &analysis.after]
                .into_iter()
                .filter_map(move |outcome| match outcome {
                    Outcome::Failed(message) => Some((analysis.kind, message.as_str())),
                    Outcome::Text(_) => None,
                })
        })
    }
}

/// Clean `original` with `rules`, extract the corrections, and ask the
/// provider (if any) for each requested analysis of both texts.
pub fn compare(
    original: &str,
    rules: &[ReplacementRule],
    provider: Option<&mut dyn CompletionProvider>,
    options: &CompareOptions,
) -> Comparison {
    let cleaned = apply_replacements(original, rules);
    let corrections = extract_corrections(original, &cleaned);
    tracing::debug!(
        rules = rules.len(),
        corrections = corrections.len(),
        "applied replacement rules"
    );

    let mut analyses = Vec::new();
    if let Some(provider) = provider {
        for kind in &options.kinds {
            let before = run_analysis(provider, *kind, original, options.temperature);
            let after = run_analysis(provider, *kind, &cleaned, options.temperature);
            analyses.push(Analysis {
                kind: *kind,
                before,
                after,
            });
        }
    }

    Comparison {
        original: original.to_string(),
        cleaned,
        corrections,
        analyses,
    }
}

fn run_analysis(
    provider: &mut dyn CompletionProvider,
    kind: AnalysisKind,
    text: &str,
    temperature: f64,
) -> Outcome {
    let request = kind.request(text, temperature);
    match provider.complete(&request) {
        Ok(text) => Outcome::Text(text),
        Err(err) => {
            tracing::warn!(provider = provider.name(), %kind, error = %err, "analysis failed");
            Outcome::Failed(err.to_string())
        }
    }
}
