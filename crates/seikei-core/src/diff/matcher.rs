use std::collections::HashMap;
use std::hash::Hash;

/// A run of `size` equal elements starting at `a[a]` and `b[b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// Turns `a[a_start..a_end]` into `b[b_start..b_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

/// `b` needs at least this many elements before popular ones are pruned.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Aligns two sequences by repeatedly taking the longest contiguous match
/// and recursing into the unmatched pieces on either side of it.
///
/// Ties go to the match that starts earliest in `a`, then earliest in `b`.
/// When `b` is long, elements occurring in more than 1% of it are not used
/// to seed matches; they only join a match by extending it.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b2j.entry(item).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }
        Self { a, b, b2j }
    }

    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let mut best = Match {
            a: alo,
            b: blo,
            size: 0,
        };
        // j2len[j] = length of the match ending at a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let run = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, run);
                    if run > best.size {
                        best = Match {
                            a: i + 1 - run,
                            b: j + 1 - run,
                            size: run,
                        };
                    }
                }
            }
            j2len = next;
        }

        while best.a > alo && best.b > blo && self.a[best.a - 1] == self.b[best.b - 1] {
            best.a -= 1;
            best.b -= 1;
            best.size += 1;
        }
        while best.a + best.size < ahi
            && best.b + best.size < bhi
            && self.a[best.a + best.size] == self.b[best.b + best.size]
        {
            best.size += 1;
        }
        best
    }

    /// Non-overlapping matching blocks in increasing order, adjacent blocks
    /// merged, terminated by a zero-size sentinel at `(len(a), len(b))`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut found = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            found.push(m);
        }
        found.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(found.len() + 1);
        for m in found {
            match merged.last_mut() {
                Some(last) if last.a + last.size == m.a && last.b + last.size == m.b => {
                    last.size += m.size;
                }
                _ => merged.push(m),
            }
        }
        merged.push(Match {
            a: self.a.len(),
            b: self.b.len(),
            size: 0,
        });
        merged
    }

    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);
        for m in self.matching_blocks() {
            let tag = if i < m.a && j < m.b {
                Some(Tag::Replace)
            } else if i < m.a {
                Some(Tag::Delete)
            } else if j < m.b {
                Some(Tag::Insert)
            } else {
                None
            };
            if let Some(tag) = tag {
                ops.push(Opcode {
                    tag,
                    a_start: i,
                    a_end: m.a,
                    b_start: j,
                    b_end: m.b,
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                ops.push(Opcode {
                    tag: Tag::Equal,
                    a_start: m.a,
                    a_end: i,
                    b_start: m.b,
                    b_end: j,
                });
            }
        }
        ops
    }

    /// Similarity in `[0, 1]`: twice the matched elements over the total.
    pub fn ratio(&self) -> f64 {
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        scaled_ratio(matched, self.a.len() + self.b.len())
    }

    /// Upper bound on `ratio` from element counts alone.
    pub fn quick_ratio(&self) -> f64 {
        let mut available: HashMap<&T, usize> = HashMap::new();
        for item in self.b {
            *available.entry(item).or_default() += 1;
        }
        let mut matched = 0;
        for item in self.a {
            if let Some(count) = available.get_mut(item)
                && *count > 0
            {
                *count -= 1;
                matched += 1;
            }
        }
        scaled_ratio(matched, self.a.len() + self.b.len())
    }

    /// Upper bound on `ratio` from lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        let shorter = self.a.len().min(self.b.len());
        scaled_ratio(shorter, self.a.len() + self.b.len())
    }
}

fn scaled_ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    2.0 * matched as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn longest_match_prefers_earliest() {
        let a = chars("abxab");
        let b = chars("ab");
        let matcher = SequenceMatcher::new(&a, &b);
        let m = matcher.find_longest_match(0, a.len(), 0, b.len());
        assert_eq!(m, Match { a: 0, b: 0, size: 2 });
    }

    #[test]
    fn matching_blocks_end_with_sentinel() {
        let a = chars("abcd");
        let b = chars("bcd");
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                Match { a: 1, b: 0, size: 3 },
                Match { a: 4, b: 3, size: 0 },
            ]
        );
    }

    #[test]
    fn opcodes_cover_both_sequences() {
        let a = ["a", "b", "c"];
        let b = ["a", "x", "c", "d"];
        let ops = SequenceMatcher::new(&a, &b).opcodes();
        let tags: Vec<Tag> = ops.iter().map(|op| op.tag).collect();
        assert_eq!(tags, vec![Tag::Equal, Tag::Replace, Tag::Equal, Tag::Insert]);
        assert_eq!(ops[1].a_start, 1);
        assert_eq!(ops[1].b_end, 2);
        assert_eq!(ops[3].b_start, 3);
        assert_eq!(ops[3].b_end, 4);
    }

    #[test]
    fn identical_sequences_are_one_equal_block() {
        let a = ["x", "y"];
        let ops = SequenceMatcher::new(&a, &a).opcodes();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].tag, Tag::Equal);
    }

    #[test]
    fn empty_sequences_have_no_opcodes() {
        let a: [&str; 0] = [];
        let matcher = SequenceMatcher::new(&a, &a);
        assert!(matcher.opcodes().is_empty());
        assert_eq!(matcher.ratio(), 1.0);
    }

    #[test]
    fn ratio_cases() {
        let a = chars("colour");
        let b = chars("color");
        let matcher = SequenceMatcher::new(&a, &b);
        assert!((matcher.ratio() - 10.0 / 11.0).abs() < 1e-9);
        assert!(matcher.quick_ratio() >= matcher.ratio());
        assert!(matcher.real_quick_ratio() >= matcher.quick_ratio());

        let a = chars("one");
        let b = chars("uno");
        assert!((SequenceMatcher::new(&a, &b).ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn popular_elements_do_not_seed_long_matches() {
        let a = chars(&"ab".repeat(150));
        let b = chars(&"ba".repeat(150));
        let matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(matcher.matching_blocks(), vec![Match { a: 300, b: 300, size: 0 }]);
        assert_eq!(matcher.ratio(), 0.0);
        assert_eq!(matcher.quick_ratio(), 1.0);

        let a = chars(&"ab".repeat(50));
        let b = chars(&"ba".repeat(50));
        let matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(matcher.matching_blocks()[0], Match { a: 0, b: 1, size: 99 });
    }

    #[test]
    fn matches_extend_across_popular_elements() {
        let a = chars(&"a".repeat(300));
        let b = chars(&format!("{}b", "a".repeat(299)));
        let matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(
            matcher.matching_blocks(),
            vec![
                Match { a: 0, b: 0, size: 299 },
                Match { a: 300, b: 300, size: 0 },
            ]
        );
    }
}
