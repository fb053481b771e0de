use std::cmp::Ordering;
use std::fmt::{self, Display};

use crate::errors::TraxError;

///
/// A 1-based, closed genomic interval tied to a chromosome name.
///
/// Both `start` and `end` are inclusive; `start <= end` always holds for
/// intervals built through [`GenomeInterval::new`].
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct GenomeInterval {
    pub chr: String,
    pub start: u32,
    pub end: u32,
}

impl GenomeInterval {
    pub fn new(chr: impl Into<String>, start: u32, end: u32) -> Result<Self, TraxError> {
        let chr = chr.into();
        if start > end {
            return Err(TraxError::InvertedInterval(chr, start, end));
        }
        Ok(GenomeInterval { chr, start, end })
    }

    /// Number of bases covered, endpoints included.
    pub fn width(&self) -> u32 {
        self.end - self.start + 1
    }

    /// True iff the two closed ranges share at least one coordinate on the
    /// same chromosome. Intervals that merely touch end-to-start plus one
    /// (e.g. `1-5` and `6-10`) do NOT overlap.
    pub fn overlaps(&self, other: &GenomeInterval) -> bool {
        self.chr == other.chr && self.start <= other.end && self.end >= other.start
    }

    /// Widen this interval to span `other` as well.
    ///
    /// Permissive on purpose: when the two intervals do not overlap the
    /// receiver is left unmodified, so callers are expected to check
    /// [`GenomeInterval::overlaps`] first when they rely on the merge.
    pub fn merge_with(&mut self, other: &GenomeInterval) {
        if !self.overlaps(other) {
            return;
        }
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
    }
}

impl Ord for GenomeInterval {
    fn cmp(&self, other: &GenomeInterval) -> Ordering {
        self.chr
            .cmp(&other.chr)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }
}

impl PartialOrd for GenomeInterval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for GenomeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chr, self.start, self.end)
    }
}

/// Collapse a collection of intervals into a minimal disjoint, sorted set.
///
/// Sorts by (chr, start, end) and performs a single left-to-right scan,
/// merging each interval into the top of a stack of maximal intervals when
/// they overlap and pushing a new entry otherwise. The union of covered
/// positions is preserved exactly. O(n log n).
pub fn optimize_intervals(mut intervals: Vec<GenomeInterval>) -> Vec<GenomeInterval> {
    if intervals.is_empty() {
        return intervals;
    }

    intervals.sort();

    let mut merged: Vec<GenomeInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(top) if top.overlaps(&interval) => top.merge_with(&interval),
            _ => merged.push(interval),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn intervals() -> Vec<GenomeInterval> {
        vec![
            GenomeInterval::new("chr1", 8, 12).unwrap(),
            GenomeInterval::new("chr1", 1, 5).unwrap(),
            GenomeInterval::new("chr2", 1, 5).unwrap(),
            GenomeInterval::new("chr1", 3, 7).unwrap(),
        ]
    }

    #[rstest]
    fn test_inverted_interval_is_rejected() {
        let result = GenomeInterval::new("chr1", 10, 5);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_self_overlap_and_self_merge() {
        let a = GenomeInterval::new("chr1", 10, 20).unwrap();
        assert!(a.overlaps(&a));

        let mut b = a.clone();
        b.merge_with(&a);
        assert_eq!(b, a);
    }

    #[rstest]
    fn test_adjacent_intervals_do_not_overlap() {
        let a = GenomeInterval::new("chr1", 1, 5).unwrap();
        let b = GenomeInterval::new("chr1", 6, 10).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        // permissive merge leaves the receiver untouched
        let mut c = a.clone();
        c.merge_with(&b);
        assert_eq!(c, a);
    }

    #[rstest]
    fn test_overlap_requires_same_chromosome() {
        let a = GenomeInterval::new("chr1", 1, 100).unwrap();
        let b = GenomeInterval::new("chr2", 1, 100).unwrap();
        assert!(!a.overlaps(&b));
    }

    #[rstest]
    fn test_optimize_intervals(intervals: Vec<GenomeInterval>) {
        let merged = optimize_intervals(intervals);

        assert_eq!(
            merged,
            vec![
                GenomeInterval::new("chr1", 1, 7).unwrap(),
                GenomeInterval::new("chr1", 8, 12).unwrap(),
                GenomeInterval::new("chr2", 1, 5).unwrap(),
            ]
        );
    }

    #[rstest]
    fn test_optimize_intervals_is_sorted_and_disjoint(intervals: Vec<GenomeInterval>) {
        let merged = optimize_intervals(intervals);

        for pair in merged.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(!pair[0].overlaps(&pair[1]));
        }
    }

    #[rstest]
    fn test_optimize_intervals_preserves_coverage(intervals: Vec<GenomeInterval>) {
        use std::collections::HashSet;

        let covered = |list: &[GenomeInterval]| -> HashSet<(String, u32)> {
            list.iter()
                .flat_map(|iv| {
                    let chr = iv.chr.clone();
                    (iv.start..=iv.end).map(move |p| (chr.clone(), p))
                })
                .collect()
        };

        let before = covered(&intervals);
        let merged = optimize_intervals(intervals);
        assert_eq!(covered(&merged), before);
    }

    #[rstest]
    fn test_optimize_intervals_empty_input() {
        let merged = optimize_intervals(vec![]);
        assert!(merged.is_empty());
    }

    #[rstest]
    fn test_optimize_intervals_collapses_duplicates() {
        let merged = optimize_intervals(vec![
            GenomeInterval::new("chr1", 4, 9).unwrap(),
            GenomeInterval::new("chr1", 4, 9).unwrap(),
        ]);
        assert_eq!(merged, vec![GenomeInterval::new("chr1", 4, 9).unwrap()]);
    }
}
