use core::fmt;
use core::ops::RangeInclusive;

use smallvec::SmallVec;

/// An inclusive range of indexes, `[start, end]`.
///
/// Every empty range compares equal to [`IndexRange::EMPTY`]; there is no way to build a
/// range with `start > end` that is not the empty sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexRange {
    start: usize,
    end: usize,
}

impl IndexRange {
    pub const EMPTY: Self = Self { start: 1, end: 0 };

    /// Builds `[start, end]`, or the empty range when `start > end`.
    pub const fn new(start: usize, end: usize) -> Self {
        if start > end {
            Self::EMPTY
        } else {
            Self { start, end }
        }
    }

    /// Builds a range from signed bounds, clamping `start` to zero.
    ///
    /// Useful when bounds come out of offset arithmetic that may go below zero.
    pub fn of(start: isize, end: isize) -> Self {
        let start = start.max(0);
        if end < start {
            return Self::EMPTY;
        }
        Self::new(start as usize, end as usize)
    }

    /// The range `[0, count - 1]`, empty when `count == 0`.
    pub fn up_to(count: usize) -> Self {
        match count {
            0 => Self::EMPTY,
            n => Self::new(0, n - 1),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub const fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn first(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.start)
    }

    pub fn last(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.end)
    }

    pub const fn contains(&self, index: usize) -> bool {
        !self.is_empty() && index >= self.start && index <= self.end
    }

    /// Indexes present in both ranges.
    pub fn intersect(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::EMPTY;
        }
        Self::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Indexes of `self` that are not in `other`, as at most two ascending pieces.
    pub fn diff(&self, other: &Self) -> SmallVec<[Self; 2]> {
        let mut out = SmallVec::new();
        if self.is_empty() {
            return out;
        }
        let common = self.intersect(other);
        if common.is_empty() {
            out.push(*self);
            return out;
        }
        if common.start > self.start {
            out.push(Self::new(self.start, common.start - 1));
        }
        if common.end < self.end {
            out.push(Self::new(common.end + 1, self.end));
        }
        out
    }

    /// The smallest range covering both.
    pub fn hull(&self, other: &Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => *other,
            (_, true) => *self,
            _ => Self::new(self.start.min(other.start), self.end.max(other.end)),
        }
    }

    /// Grows the range by `by` on both sides, clamped into `[0, count - 1]`.
    pub fn expand(&self, by: usize, count: usize) -> Self {
        if self.is_empty() || count == 0 {
            return Self::EMPTY;
        }
        Self::new(
            self.start.saturating_sub(by),
            self.end.saturating_add(by).min(count - 1),
        )
    }

    /// Drops every index `>= count`.
    pub fn clamp_to(&self, count: usize) -> Self {
        if self.is_empty() || count == 0 {
            return Self::EMPTY;
        }
        Self::new(self.start, self.end.min(count - 1))
    }

    pub fn center(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.start + (self.end - self.start) / 2)
    }

    /// Twice the distance between `index` and the center of the range.
    ///
    /// Doubling keeps the value exact for even-length ranges whose center falls between two
    /// indexes. Returns `0` for the empty range.
    pub fn center_distance(&self, index: usize) -> usize {
        if self.is_empty() {
            return 0;
        }
        let doubled = index.saturating_mul(2);
        let mid2 = self.start + self.end;
        doubled.abs_diff(mid2)
    }

    pub fn iter(&self) -> RangeInclusive<usize> {
        // Empty ranges are always `EMPTY` (`1..=0`), which iterates nothing.
        self.start..=self.end
    }
}

impl Default for IndexRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl IntoIterator for IndexRange {
    type Item = usize;
    type IntoIter = RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &IndexRange {
    type Item = usize;
    type IntoIter = RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("IndexRange(empty)")
        } else {
            write!(f, "IndexRange[{}, {}]", self.start, self.end)
        }
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("[]")
        } else {
            write!(f, "[{}, {}]", self.start, self.end)
        }
    }
}
