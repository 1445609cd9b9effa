use alloc::vec::Vec;

use crate::axis::{AxisMetrics, FixedAxis, required_range};
use crate::{CellBounds, ConfigError, IndexRange, Rect, ScrollPosition};

/// Row-major placement of fixed-size cells in `columns` columns.
///
/// The linear index of `(row, column)` is `row * columns + column`; the last row may be
/// partial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    columns: usize,
    cell: Rect,
    h_spacing: u32,
    v_spacing: u32,
}

impl GridGeometry {
    pub fn new(columns: usize, cell: Rect) -> Result<Self, ConfigError> {
        if columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        if cell.is_empty() {
            return Err(ConfigError::ZeroCellExtent);
        }
        Ok(Self {
            columns,
            cell,
            h_spacing: 0,
            v_spacing: 0,
        })
    }

    pub fn with_spacing(mut self, horizontal: u32, vertical: u32) -> Self {
        self.h_spacing = horizontal;
        self.v_spacing = vertical;
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell(&self) -> Rect {
        self.cell
    }

    pub fn spacing(&self) -> (u32, u32) {
        (self.h_spacing, self.v_spacing)
    }

    pub fn rows(&self, count: usize) -> usize {
        count.div_ceil(self.columns)
    }

    /// Columns actually used by `count` items (fewer than `columns` for a single short row).
    pub fn used_columns(&self, count: usize) -> usize {
        count.min(self.columns)
    }

    pub fn row_axis(&self, count: usize) -> FixedAxis {
        FixedAxis {
            count: self.rows(count),
            extent: self.cell.height,
            spacing: self.v_spacing,
        }
    }

    pub fn column_axis(&self, count: usize) -> FixedAxis {
        FixedAxis {
            count: self.used_columns(count),
            extent: self.cell.width,
            spacing: self.h_spacing,
        }
    }

    /// Saturates at `usize::MAX` for coordinates past any addressable index.
    pub fn index_of(&self, row: usize, column: usize) -> usize {
        row.saturating_mul(self.columns).saturating_add(column)
    }

    /// `(row, column)` of a linear index.
    pub fn coordinates(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }

    pub fn content_size(&self, count: usize) -> (u64, u64) {
        (
            self.column_axis(count).total_extent(),
            self.row_axis(count).total_extent(),
        )
    }

    pub fn bounds_of(&self, index: usize) -> CellBounds {
        let (row, column) = self.coordinates(index);
        let stride_w = self.cell.width as u64 + self.h_spacing as u64;
        let stride_h = self.cell.height as u64 + self.v_spacing as u64;
        CellBounds {
            x: (column as u64).saturating_mul(stride_w),
            y: (row as u64).saturating_mul(stride_h),
            width: self.cell.width,
            height: self.cell.height,
        }
    }

    pub fn rows_range(
        &self,
        offset_y: u64,
        viewport_h: u32,
        count: usize,
        buffer: usize,
    ) -> IndexRange {
        required_range(&self.row_axis(count), offset_y, viewport_h, buffer)
    }

    pub fn columns_range(
        &self,
        offset_x: u64,
        viewport_w: u32,
        count: usize,
        buffer: usize,
    ) -> IndexRange {
        required_range(&self.column_axis(count), offset_x, viewport_w, buffer)
    }

    /// One index segment per required row, truncated at `count`.
    pub fn segments(
        &self,
        rows: IndexRange,
        columns: IndexRange,
        count: usize,
    ) -> Vec<IndexRange> {
        let (Some(first_col), Some(last_col)) = (columns.first(), columns.last()) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let start = self.index_of(row, first_col);
            if start >= count {
                break;
            }
            let end = self.index_of(row, last_col).min(count - 1);
            out.push(IndexRange::new(start, end));
        }
        out
    }

    /// Required segments for a viewport of `viewport` at `scroll`.
    pub fn required_segments(
        &self,
        scroll: ScrollPosition,
        viewport: Rect,
        count: usize,
        buffer: usize,
    ) -> Vec<IndexRange> {
        let rows = self.rows_range(scroll.y, viewport.height, count, buffer);
        let columns = self.columns_range(scroll.x, viewport.width, count, buffer);
        self.segments(rows, columns, count)
    }
}
