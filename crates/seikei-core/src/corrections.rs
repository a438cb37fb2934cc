use crate::diff::diff_texts;
use crate::types::{CorrectionPair, CorrectionTable, EditOp};

/// Build the table of word substitutions between two texts.
///
/// Only a removal immediately followed by an addition counts as a
/// substitution. Pure deletions, pure insertions and pairs split by an
/// unchanged token or hint annotation produce no row.
pub fn extract_corrections(original: &str, corrected: &str) -> CorrectionTable {
    pair_adjacent(&diff_texts(original, corrected))
}

/// Pair every `Removed` with an `Added` that directly follows it.
pub fn pair_adjacent(ops: &[EditOp]) -> CorrectionTable {
    let mut table = CorrectionTable::new();
    let mut i = 0;
    while i < ops.len() {
        if let (EditOp::Removed(from), Some(EditOp::Added(to))) = (&ops[i], ops.get(i + 1)) {
            table.push(CorrectionPair::new(from.as_str(), to.as_str()));
            i += 2;
        } else {
            i += 1;
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(original: &str, corrected: &str) -> Vec<(String, String)> {
        extract_corrections(original, corrected).to_pairs()
    }

    fn owned(rows: &[(&str, &str)]) -> Vec<(String, String)> {
        rows.iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn identical_inputs_have_no_corrections() {
        for text in ["", "a", "a b c", "この 剣士 は", "  spaced   out  "] {
            assert!(extract_corrections(text, text).is_empty(), "{text:?}");
        }
    }

    #[test]
    fn whitespace_only_changes_have_no_corrections() {
        assert!(extract_corrections("a   b \n c ", "a b c").is_empty());
    }

    #[test]
    fn single_substitution() {
        assert_eq!(pairs("a b c", "a x c"), owned(&[("b", "x")]));
    }

    #[test]
    fn pure_deletion_is_not_a_correction() {
        assert!(pairs("a b c", "a c").is_empty());
    }

    #[test]
    fn pure_insertion_is_not_a_correction() {
        assert!(pairs("a c", "a b c").is_empty());
    }

    #[test]
    fn multiple_substitutions_in_order() {
        assert_eq!(
            pairs("one two three", "uno two tres"),
            owned(&[("one", "uno"), ("three", "tres")])
        );
    }

    #[test]
    fn repeated_substitutions_are_not_deduplicated() {
        assert_eq!(
            pairs("天子 と 天子", "犬種 と 犬種"),
            owned(&[("天子", "犬種"), ("天子", "犬種")])
        );
    }

    #[test]
    fn empty_boundaries() {
        assert!(pairs("", "").is_empty());
        assert!(pairs("", "a").is_empty());
        assert!(pairs("a", "").is_empty());
    }

    #[test]
    fn repeated_calls_agree() {
        let first = extract_corrections("one two three", "uno two tres");
        let second = extract_corrections("one two three", "uno two tres");
        assert_eq!(first, second);
    }

    #[test]
    fn annotation_between_pair_blocks_it() {
        // Similar spellings carry a hint between the removal and the addition.
        assert!(pairs("the colour red", "the color red").is_empty());
        assert_eq!(pairs("color", "colour"), owned(&[("color", "colour")]));
    }

    #[test]
    fn long_tokens_prune_repeated_characters_before_comparing() {
        let short_a = "ab".repeat(50);
        let short_b = "ba".repeat(50);
        assert!(pairs(&short_a, &short_b).is_empty());

        let long_a = "ab".repeat(150);
        let long_b = "ba".repeat(150);
        assert_eq!(
            pairs(&long_a, &long_b),
            vec![(long_a.clone(), long_b.clone())]
        );
    }

    #[test]
    fn multi_token_replacement_pairs_only_the_boundary() {
        assert_eq!(pairs("p q", "x y"), owned(&[("q", "x")]));
    }

    #[test]
    fn pair_adjacent_requires_removed_before_added() {
        let ops = vec![
            EditOp::Added("x".into()),
            EditOp::Removed("a".into()),
            EditOp::Unchanged("k".into()),
            EditOp::Removed("b".into()),
            EditOp::Annotation("^".into()),
            EditOp::Added("y".into()),
            EditOp::Removed("c".into()),
            EditOp::Added("z".into()),
            EditOp::Added("w".into()),
        ];
        assert_eq!(pair_adjacent(&ops).to_pairs(), owned(&[("c", "z")]));
    }

    #[test]
    fn consumed_addition_is_not_reused() {
        let ops = vec![
            EditOp::Removed("a".into()),
            EditOp::Added("x".into()),
            EditOp::Added("y".into()),
        ];
        assert_eq!(pair_adjacent(&ops).to_pairs(), owned(&[("a", "x")]));
    }
}
