//! Pixel/index/percentage conversions along one scroll axis.
//!
//! All conversions clamp: offsets past the content map to the last index, percentages are
//! clamped into `[0, 1]`, and scroll offsets never exceed [`max_scroll`].

use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::{ConfigError, IndexRange};

/// Extent metrics of a sequence of cells laid out along one axis.
pub trait AxisMetrics {
    fn count(&self) -> usize;

    /// Content length: every extent plus the spacing between consecutive cells.
    fn total_extent(&self) -> u64;

    /// Start offset of `index`.
    fn pixel_of(&self, index: usize) -> u64;

    /// Index of the cell covering `pixel`, clamped into `[0, count - 1]` (`0` when empty).
    fn index_of(&self, pixel: u64) -> usize;

    fn extent_of(&self, index: usize) -> u32;

    /// First visible index and number of visible cells for a viewport at `offset`.
    fn visible(&self, offset: u64, viewport: u32) -> (usize, usize);
}

/// Cells of one fixed extent, separated by `spacing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedAxis {
    pub count: usize,
    pub extent: u32,
    pub spacing: u32,
}

impl FixedAxis {
    pub fn new(count: usize, extent: u32, spacing: u32) -> Result<Self, ConfigError> {
        if extent == 0 {
            return Err(ConfigError::ZeroCellExtent);
        }
        Ok(Self {
            count,
            extent,
            spacing,
        })
    }

    /// Distance between the starts of two consecutive cells.
    pub fn stride(&self) -> u64 {
        self.extent as u64 + self.spacing as u64
    }
}

impl AxisMetrics for FixedAxis {
    fn count(&self) -> usize {
        self.count
    }

    fn total_extent(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        (self.count as u64)
            .saturating_mul(self.stride())
            .saturating_sub(self.spacing as u64)
    }

    fn pixel_of(&self, index: usize) -> u64 {
        (index as u64).saturating_mul(self.stride())
    }

    fn index_of(&self, pixel: u64) -> usize {
        if self.count == 0 {
            return 0;
        }
        let i = pixel / self.stride().max(1);
        usize::try_from(i).map_or(self.count - 1, |i| i.min(self.count - 1))
    }

    fn extent_of(&self, _index: usize) -> u32 {
        self.extent
    }

    fn visible(&self, offset: u64, viewport: u32) -> (usize, usize) {
        let visible = (viewport as u64).div_ceil(self.stride().max(1));
        (
            self.index_of(offset),
            usize::try_from(visible).unwrap_or(usize::MAX),
        )
    }
}

/// Cells with individual extents, backed by prefix sums.
///
/// Offset-to-index lookups are `O(log n)`, so the axis stays virtualized however many cells it
/// holds.
#[derive(Clone, Debug, Default)]
pub struct VariableAxis {
    // Each stored value is `extent + spacing`; the trailing spacing is dropped from the total.
    sums: Fenwick,
    spacing: u32,
}

impl VariableAxis {
    pub fn new(spacing: u32) -> Self {
        Self {
            sums: Fenwick::default(),
            spacing,
        }
    }

    /// Builds an axis of `count` cells, asking `extent_of` for each.
    pub fn from_fn(
        count: usize,
        spacing: u32,
        mut extent_of: impl FnMut(usize) -> u32,
    ) -> Result<Self, ConfigError> {
        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            let extent = extent_of(i);
            if extent == 0 {
                return Err(ConfigError::ZeroItemExtent(i));
            }
            values.push(extent as u64 + spacing as u64);
        }
        Ok(Self {
            sums: Fenwick::from_values(values),
            spacing,
        })
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    pub fn set_extent(&mut self, index: usize, extent: u32) -> Result<(), ConfigError> {
        if extent == 0 {
            return Err(ConfigError::ZeroItemExtent(index));
        }
        self.sums.set(index, extent as u64 + self.spacing as u64);
        Ok(())
    }

    pub fn push(&mut self, extent: u32) -> Result<(), ConfigError> {
        if extent == 0 {
            return Err(ConfigError::ZeroItemExtent(self.sums.len()));
        }
        self.sums.push(extent as u64 + self.spacing as u64);
        Ok(())
    }

    pub fn truncate(&mut self, count: usize) {
        self.sums.truncate(count);
    }
}

impl AxisMetrics for VariableAxis {
    fn count(&self) -> usize {
        self.sums.len()
    }

    fn total_extent(&self) -> u64 {
        if self.sums.len() == 0 {
            return 0;
        }
        self.sums.total().saturating_sub(self.spacing as u64)
    }

    fn pixel_of(&self, index: usize) -> u64 {
        self.sums.prefix_sum(index)
    }

    fn index_of(&self, pixel: u64) -> usize {
        let n = self.sums.len();
        if n == 0 {
            return 0;
        }
        self.sums.lower_bound(pixel).min(n - 1)
    }

    fn extent_of(&self, index: usize) -> u32 {
        let stride = self.sums.get(index).unwrap_or(0);
        u32::try_from(stride.saturating_sub(self.spacing as u64)).unwrap_or(u32::MAX)
    }

    fn visible(&self, offset: u64, viewport: u32) -> (usize, usize) {
        let first = self.index_of(offset);
        if viewport == 0 || self.sums.len() == 0 {
            return (first, 0);
        }
        let last = self.index_of(offset.saturating_add(viewport as u64 - 1));
        (first, last - first + 1)
    }
}

/// Largest valid scroll offset, never negative.
pub fn max_scroll(total_extent: u64, viewport: u32) -> u64 {
    total_extent.saturating_sub(viewport as u64)
}

/// Scroll offset as a fraction of `max_scroll`, in `[0, 1]`.
pub fn percent_of(pixel: u64, max_scroll: u64) -> f64 {
    if max_scroll == 0 {
        return 0.0;
    }
    pixel.min(max_scroll) as f64 / max_scroll as f64
}

/// Scroll offset for a fraction of `max_scroll`; the fraction is clamped into `[0, 1]`.
pub fn pixel_of_percent(percent: f64, max_scroll: u64) -> u64 {
    let p = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 1.0)
    };
    // Round half up; `p` is non-negative.
    ((p * max_scroll as f64) + 0.5) as u64
}

/// The index range to materialize: `visible + 2 * buffer` cells starting `buffer` cells before
/// `first`, shifted back when it would run past the end, and never more than `count` cells.
pub fn buffered_range(first: usize, visible: usize, count: usize, buffer: usize) -> IndexRange {
    if count == 0 {
        return IndexRange::EMPTY;
    }
    let needed = visible
        .saturating_add(buffer.saturating_mul(2))
        .min(count);
    if needed == 0 {
        return IndexRange::EMPTY;
    }
    let first = first.min(count - 1);
    let mut start = first.saturating_sub(buffer);
    let end = start.saturating_add(needed - 1).min(count - 1);
    if end - start + 1 < needed {
        start = (end + 1).saturating_sub(needed);
    }
    IndexRange::new(start, end)
}

/// Required range for a viewport at `offset` over `axis`.
pub fn required_range(
    axis: &impl AxisMetrics,
    offset: u64,
    viewport: u32,
    buffer: usize,
) -> IndexRange {
    if viewport == 0 {
        return IndexRange::EMPTY;
    }
    let (first, visible) = axis.visible(offset, viewport);
    buffered_range(first, visible, axis.count(), buffer)
}
