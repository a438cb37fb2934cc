use serde::{Deserialize, Serialize};

/// One entry of a token-level edit script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "text", rename_all = "snake_case")]
pub enum EditOp {
    /// Token present in both sequences at this position.
    Unchanged(String),
    /// Token present only in the original sequence.
    Removed(String),
    /// Token present only in the corrected sequence.
    Added(String),
    /// Intraline hint markers for the preceding removed/added token.
    Annotation(String),
}

impl EditOp {
    /// The token carried by this operation; `None` for annotations.
    pub fn token(&self) -> Option<&str> {
        match self {
            EditOp::Unchanged(token) | EditOp::Removed(token) | EditOp::Added(token) => {
                Some(token)
            }
            EditOp::Annotation(_) => None,
        }
    }
}

/// An (original word, corrected word) substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionPair {
    pub from_word: String,
    pub to_word: String,
}

impl CorrectionPair {
    pub fn new(from_word: impl Into<String>, to_word: impl Into<String>) -> Self {
        Self {
            from_word: from_word.into(),
            to_word: to_word.into(),
        }
    }
}

/// Ordered correction rows, in the order the removals appeared.
///
/// Repeated identical substitutions are kept as repeated rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionTable {
    rows: Vec<CorrectionPair>,
}

impl CorrectionTable {
    pub const ORIGINAL_COLUMN: &'static str = "元の言葉";
    pub const CORRECTED_COLUMN: &'static str = "修正後の言葉";

    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn push(&mut self, pair: CorrectionPair) {
        self.rows.push(pair);
    }

    pub fn rows(&self) -> &[CorrectionPair] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as plain `(from, to)` tuples.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|row| (row.from_word.clone(), row.to_word.clone()))
            .collect()
    }
}

impl IntoIterator for CorrectionTable {
    type Item = CorrectionPair;
    type IntoIter = std::vec::IntoIter<CorrectionPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a CorrectionTable {
    type Item = &'a CorrectionPair;
    type IntoIter = std::slice::Iter<'a, CorrectionPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A literal find-and-replace rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    pub find: String,
    pub replace: String,
}

impl ReplacementRule {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// A single prompt sent to a language-model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}
