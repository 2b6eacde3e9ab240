//! # lcsruns
//!
//! Alignment of two ordered lists into runs of matched, inserted, and
//! removed elements.
//!
//! This is a thin shell over the [`similar`] crate's Myers diff: elements
//! are compared with plain equality, and the resulting edit operations are
//! flattened into [`Segment`] runs that partition both input lists
//! exhaustively, left to right. Callers that need a deeper notion of
//! "sameness" (e.g. tree diffing) align on shallow keys and re-examine
//! matched pairs themselves.
//!
//! When several minimal alignments exist, the tie-break is whatever
//! `similar`'s Myers implementation produces; this crate imposes no
//! ordering policy of its own.
//!
//! ## Usage
//!
//! ```
//! use lcsruns::{align, Segment};
//!
//! let a = ["p", "span", "p"];
//! let b = ["p", "p"];
//! let segments = align(&a, &b);
//! assert_eq!(
//!     segments,
//!     vec![Segment::Matched(1), Segment::Removed(1), Segment::Matched(1)],
//! );
//! ```

#![warn(missing_docs)]

use std::hash::Hash;

use similar::{Algorithm, DiffOp, capture_diff_slices};

/// A maximal run of elements with the same disposition.
///
/// A sequence of segments covers both input lists: `Matched(n)` consumes
/// `n` elements from each list, `Inserted(n)` consumes `n` elements from
/// the second list only, `Removed(n)` consumes `n` elements from the first
/// list only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// The next `n` elements of both lists are pairwise equal.
    Matched(usize),
    /// The next `n` elements of the second list have no counterpart.
    Inserted(usize),
    /// The next `n` elements of the first list have no counterpart.
    Removed(usize),
}

impl Segment {
    /// Number of elements this run consumes from the first list.
    pub fn len_a(&self) -> usize {
        match *self {
            Segment::Matched(n) | Segment::Removed(n) => n,
            Segment::Inserted(_) => 0,
        }
    }

    /// Number of elements this run consumes from the second list.
    pub fn len_b(&self) -> usize {
        match *self {
            Segment::Matched(n) | Segment::Inserted(n) => n,
            Segment::Removed(_) => 0,
        }
    }
}

/// Align two lists and report the edit runs between them.
///
/// Elements are compared by `Eq` only; nothing is deep-compared. A
/// `Replace` op from the underlying diff (elements swapped in place) is
/// reported as a `Removed` run followed by an `Inserted` run, since this
/// crate's vocabulary has no in-place substitution.
pub fn align<T>(a: &[T], b: &[T]) -> Vec<Segment>
where
    T: Eq + Hash + Ord,
{
    let ops = capture_diff_slices(Algorithm::Myers, a, b);
    let mut segments = Vec::with_capacity(ops.len());
    for op in ops {
        match op {
            DiffOp::Equal { len, .. } => push_run(&mut segments, Segment::Matched(len)),
            DiffOp::Delete { old_len, .. } => push_run(&mut segments, Segment::Removed(old_len)),
            DiffOp::Insert { new_len, .. } => push_run(&mut segments, Segment::Inserted(new_len)),
            DiffOp::Replace {
                old_len, new_len, ..
            } => {
                push_run(&mut segments, Segment::Removed(old_len));
                push_run(&mut segments, Segment::Inserted(new_len));
            }
        }
    }
    segments
}

/// Append a run, merging with the previous one when it has the same
/// disposition, so runs stay maximal.
fn push_run(segments: &mut Vec<Segment>, seg: Segment) {
    match (segments.last_mut(), seg) {
        (Some(Segment::Matched(n)), Segment::Matched(m)) => *n += m,
        (Some(Segment::Inserted(n)), Segment::Inserted(m)) => *n += m,
        (Some(Segment::Removed(n)), Segment::Removed(m)) => *n += m,
        _ => segments.push(seg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Total elements consumed from each side must equal the input lengths.
    fn check_coverage(segments: &[Segment], len_a: usize, len_b: usize) {
        let consumed_a: usize = segments.iter().map(Segment::len_a).sum();
        let consumed_b: usize = segments.iter().map(Segment::len_b).sum();
        assert_eq!(consumed_a, len_a);
        assert_eq!(consumed_b, len_b);
    }

    #[test]
    fn test_identical_lists() {
        let a = [1, 2, 3];
        let segments = align(&a, &a);
        assert_eq!(segments, vec![Segment::Matched(3)]);
    }

    #[test]
    fn test_empty_lists() {
        let segments = align::<u32>(&[], &[]);
        assert!(segments.is_empty());
    }

    #[test]
    fn test_pure_insertion() {
        let segments = align(&[], &[1, 2]);
        assert_eq!(segments, vec![Segment::Inserted(2)]);
    }

    #[test]
    fn test_pure_removal() {
        let segments = align(&[1, 2], &[]);
        assert_eq!(segments, vec![Segment::Removed(2)]);
    }

    #[test]
    fn test_insertion_at_end() {
        let segments = align(&["p"], &["p", "span"]);
        assert_eq!(segments, vec![Segment::Matched(1), Segment::Inserted(1)]);
    }

    #[test]
    fn test_disjoint_lists() {
        let segments = align(&[1, 2, 3], &[4, 5, 6]);
        check_coverage(&segments, 3, 3);
        // No element is shared, so nothing may be reported as matched.
        assert!(
            segments
                .iter()
                .all(|s| !matches!(s, Segment::Matched(_)))
        );
    }

    #[test]
    fn test_interleaved_edits() {
        let a = ["h1", "p", "p", "ul"];
        let b = ["h1", "p", "ol", "ul"];
        let segments = align(&a, &b);
        check_coverage(&segments, 4, 4);
        let matched: usize = segments
            .iter()
            .map(|s| match s {
                Segment::Matched(n) => *n,
                _ => 0,
            })
            .sum();
        assert_eq!(matched, 3);
    }

    #[test]
    fn test_runs_are_maximal() {
        let segments = align(&[1, 9, 9, 1], &[1, 7, 7, 1]);
        check_coverage(&segments, 4, 4);
        // Adjacent runs never share a disposition.
        for pair in segments.windows(2) {
            assert!(
                std::mem::discriminant(&pair[0]) != std::mem::discriminant(&pair[1]),
                "adjacent runs {:?} should have been merged",
                pair
            );
        }
    }
}
