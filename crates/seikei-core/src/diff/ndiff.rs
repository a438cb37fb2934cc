use super::matcher::{SequenceMatcher, Tag};
use crate::types::EditOp;

/// Two tokens must be at least this similar to be shown as an in-place edit.
const CUTOFF: f64 = 0.75;
const INITIAL_BEST: f64 = 0.74;

/// Compute a token-level edit script in the style of a classic line differ.
///
/// Replaced runs are searched for their most similar token pair; such pairs
/// are emitted as removed/added with character hint annotations, and the
/// rest of the run is handled recursively around them.
pub fn diff_tokens(original: &[&str], corrected: &[&str]) -> Vec<EditOp> {
    let mut out = Vec::new();
    let matcher = SequenceMatcher::new(original, corrected);
    for op in matcher.opcodes() {
        match op.tag {
            Tag::Replace => fancy_replace(
                original,
                (op.a_start, op.a_end),
                corrected,
                (op.b_start, op.b_end),
                &mut out,
            ),
            Tag::Delete => dump(EditOp::Removed, &original[op.a_start..op.a_end], &mut out),
            Tag::Insert => dump(EditOp::Added, &corrected[op.b_start..op.b_end], &mut out),
            Tag::Equal => dump(EditOp::Unchanged, &original[op.a_start..op.a_end], &mut out),
        }
    }
    out
}

fn dump(make: fn(String) -> EditOp, tokens: &[&str], out: &mut Vec<EditOp>) {
    out.extend(tokens.iter().map(|token| make((*token).to_string())));
}

fn plain_replace(a: &[&str], b: &[&str], out: &mut Vec<EditOp>) {
    // The shorter side goes first.
    if b.len() < a.len() {
        dump(EditOp::Added, b, out);
        dump(EditOp::Removed, a, out);
    } else {
        dump(EditOp::Removed, a, out);
        dump(EditOp::Added, b, out);
    }
}

fn fancy_replace(
    a: &[&str],
    (alo, ahi): (usize, usize),
    b: &[&str],
    (blo, bhi): (usize, usize),
    out: &mut Vec<EditOp>,
) {
    let mut best_ratio = INITIAL_BEST;
    let mut best: Option<(usize, usize)> = None;
    let mut identical: Option<(usize, usize)> = None;

    for (j, b_token) in b.iter().enumerate().take(bhi).skip(blo) {
        let b_chars: Vec<char> = b_token.chars().collect();
        for (i, a_token) in a.iter().enumerate().take(ahi).skip(alo) {
            if a_token == b_token {
                if identical.is_none() {
                    identical = Some((i, j));
                }
                continue;
            }
            let a_chars: Vec<char> = a_token.chars().collect();
            let matcher = SequenceMatcher::new(&a_chars, &b_chars);
            if matcher.real_quick_ratio() > best_ratio && matcher.quick_ratio() > best_ratio {
                let ratio = matcher.ratio();
                if ratio > best_ratio {
                    best_ratio = ratio;
                    best = Some((i, j));
                }
            }
        }
    }

    let similar = best.filter(|_| best_ratio >= CUTOFF);
    let (best_i, best_j, is_identical) = match (similar, identical) {
        (Some((i, j)), _) => (i, j, false),
        (None, Some((i, j))) => (i, j, true),
        (None, None) => {
            plain_replace(&a[alo..ahi], &b[blo..bhi], out);
            return;
        }
    };

    fancy_helper(a, (alo, best_i), b, (blo, best_j), out);

    if is_identical {
        out.push(EditOp::Unchanged(a[best_i].to_string()));
    } else {
        let (a_hint, b_hint) = hints(a[best_i], b[best_j]);
        out.push(EditOp::Removed(a[best_i].to_string()));
        if !a_hint.is_empty() {
            out.push(EditOp::Annotation(a_hint));
        }
        out.push(EditOp::Added(b[best_j].to_string()));
        if !b_hint.is_empty() {
            out.push(EditOp::Annotation(b_hint));
        }
    }

    fancy_helper(a, (best_i + 1, ahi), b, (best_j + 1, bhi), out);
}

fn fancy_helper(
    a: &[&str],
    (alo, ahi): (usize, usize),
    b: &[&str],
    (blo, bhi): (usize, usize),
    out: &mut Vec<EditOp>,
) {
    if alo < ahi {
        if blo < bhi {
            fancy_replace(a, (alo, ahi), b, (blo, bhi), out);
        } else {
            dump(EditOp::Removed, &a[alo..ahi], out);
        }
    } else if blo < bhi {
        dump(EditOp::Added, &b[blo..bhi], out);
    }
}

/// Character marker lines for a similar token pair: `^` replaced,
/// `-` only in the original, `+` only in the correction.
fn hints(original: &str, corrected: &str) -> (String, String) {
    let a: Vec<char> = original.chars().collect();
    let b: Vec<char> = corrected.chars().collect();
    let mut a_hint = String::new();
    let mut b_hint = String::new();
    for op in SequenceMatcher::new(&a, &b).opcodes() {
        let a_len = op.a_end - op.a_start;
        let b_len = op.b_end - op.b_start;
        match op.tag {
            Tag::Replace => {
                a_hint.extend(std::iter::repeat_n('^', a_len));
                b_hint.extend(std::iter::repeat_n('^', b_len));
            }
            Tag::Delete => a_hint.extend(std::iter::repeat_n('-', a_len)),
            Tag::Insert => b_hint.extend(std::iter::repeat_n('+', b_len)),
            Tag::Equal => {
                a_hint.extend(std::iter::repeat_n(' ', a_len));
                b_hint.extend(std::iter::repeat_n(' ', b_len));
            }
        }
    }
    (
        a_hint.trim_end().to_string(),
        b_hint.trim_end().to_string(),
    )
}
