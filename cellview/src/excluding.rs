use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::{IndexRange, RangeExhausted};

/// An inclusive range that skips excluded indexes when iterated.
///
/// Used by the reconciliation passes to enumerate "indexes still waiting for a cell" without
/// materializing them. Exclusions are kept as sorted, merged spans, so excluding a wide span
/// costs the same as excluding a single index. Exclusions outside the range are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcludingRange {
    range: IndexRange,
    // Sorted, disjoint and non-adjacent `[start, end]` spans, all inside `range`.
    excluded: Vec<(usize, usize)>,
}

impl ExcludingRange {
    pub fn new(range: IndexRange) -> Self {
        Self {
            range,
            excluded: Vec::new(),
        }
    }

    pub fn of(start: usize, end: usize) -> Self {
        Self::new(IndexRange::new(start, end))
    }

    pub fn range(&self) -> IndexRange {
        self.range
    }

    pub fn exclude(&mut self, index: usize) -> &mut Self {
        self.insert_span(IndexRange::new(index, index));
        self
    }

    /// Excludes every listed index.
    pub fn exclude_all(&mut self, indexes: impl IntoIterator<Item = usize>) -> &mut Self {
        for i in indexes {
            self.exclude(i);
        }
        self
    }

    /// Excludes a whole span at once.
    pub fn exclude_range(&mut self, span: IndexRange) -> &mut Self {
        self.insert_span(span);
        self
    }

    /// `true` for excluded indexes and for indexes outside the range.
    pub fn is_excluded(&self, index: usize) -> bool {
        if !self.range.contains(index) {
            return true;
        }
        let at = self.excluded.partition_point(|&(_, end)| end < index);
        self.excluded.get(at).is_some_and(|&(start, _)| start <= index)
    }

    /// Number of indexes an iteration would yield.
    pub fn remaining(&self) -> usize {
        let skipped: usize = self.excluded.iter().map(|&(s, e)| e - s + 1).sum();
        self.range.len() - skipped
    }

    /// The excluded spans, ascending.
    pub fn excluded(&self) -> impl Iterator<Item = IndexRange> + '_ {
        self.excluded.iter().map(|&(s, e)| IndexRange::new(s, e))
    }

    /// A fresh forward-only iterator over the non-excluded indexes.
    pub fn iter(&self) -> ExcludingIter<'_> {
        ExcludingIter {
            excluded: &self.excluded,
            cursor: self.range.first(),
            end: self.range.last().unwrap_or(0),
        }
    }

    fn insert_span(&mut self, span: IndexRange) {
        let span = span.intersect(&self.range);
        let (Some(mut start), Some(mut end)) = (span.first(), span.last()) else {
            return;
        };
        // Spans overlapping or touching `[start, end]` are merged into it.
        let lo = self
            .excluded
            .partition_point(|&(_, e)| e.saturating_add(1) < start);
        let hi = self
            .excluded
            .partition_point(|&(s, _)| s <= end.saturating_add(1));
        if lo < hi {
            start = start.min(self.excluded[lo].0);
            end = end.max(self.excluded[hi - 1].1);
        }
        self.excluded.drain(lo..hi);
        self.excluded.insert(lo, (start, end));
    }
}

impl<'a> IntoIterator for &'a ExcludingRange {
    type Item = usize;
    type IntoIter = ExcludingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`ExcludingRange::iter`].
///
/// Besides the [`Iterator`] protocol it offers `has_next`/`next_index`, which report
/// exhaustion explicitly.
#[derive(Clone, Debug)]
pub struct ExcludingIter<'a> {
    excluded: &'a [(usize, usize)],
    cursor: Option<usize>,
    end: usize,
}

impl ExcludingIter<'_> {
    /// Whether another index will be yielded.
    ///
    /// Takes `&mut self` because it skips over excluded spans eagerly.
    pub fn has_next(&mut self) -> bool {
        self.settle().is_some()
    }

    /// Like [`Iterator::next`], but reports exhaustion as an error.
    pub fn next_index(&mut self) -> Result<usize, RangeExhausted> {
        self.next().ok_or(RangeExhausted)
    }

    // Moves the cursor past excluded spans; clears it once the range is exhausted.
    fn settle(&mut self) -> Option<usize> {
        let mut cur = self.cursor?;
        while let Some((&(start, end), rest)) = self.excluded.split_first() {
            if end < cur {
                self.excluded = rest;
                continue;
            }
            if start <= cur {
                self.excluded = rest;
                match end.checked_add(1) {
                    Some(next) => cur = next,
                    None => {
                        self.cursor = None;
                        return None;
                    }
                }
                continue;
            }
            break;
        }
        if cur > self.end {
            self.cursor = None;
            return None;
        }
        self.cursor = Some(cur);
        Some(cur)
    }
}

impl Iterator for ExcludingIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let cur = self.settle()?;
        self.cursor = match cur.checked_add(1) {
            Some(n) if n <= self.end => Some(n),
            _ => None,
        };
        Some(cur)
    }
}

impl FusedIterator for ExcludingIter<'_> {}
