pub mod html;
pub mod matcher;
mod ndiff;

pub use html::render_html_diff;
pub use ndiff::diff_tokens;

use crate::types::EditOp;

/// Split text into whitespace-delimited tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Tokenize both texts and diff the resulting sequences.
pub fn diff_texts(original: &str, corrected: &str) -> Vec<EditOp> {
    diff_tokens(&tokenize(original), &tokenize(corrected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  a \t b\n\nc  "), vec!["a", "b", "c"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t ").is_empty());
    }

    #[test]
    fn diff_texts_ignores_spacing_changes() {
        let ops = diff_texts("a   b\nc", "a b c");
        assert!(ops.iter().all(|op| matches!(op, EditOp::Unchanged(_))));
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn full_width_space_separates_tokens() {
        assert_eq!(tokenize("お\u{3000}伝え"), vec!["お", "伝え"]);
    }
}
