use crate::axis::{AxisMetrics, FixedAxis, VariableAxis, required_range};
use crate::{ConfigError, IndexRange};

/// How a table decides its column widths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnsLayoutMode {
    /// Every column has the table's column width. Columns are virtualized like rows.
    #[default]
    Fixed,
    /// Columns may have individual widths. Every column is materialized.
    Variable,
}

/// Stable identity of a table column. It survives insertions and removals of other columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnId(pub u32);

/// The column a table cell is shown in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub id: ColumnId,
    /// Current position among the table's columns.
    pub index: usize,
}

/// Horizontal placement of table columns.
#[derive(Clone, Debug)]
pub enum ColumnLayout {
    Fixed(FixedAxis),
    Variable(VariableAxis),
}

impl ColumnLayout {
    /// `count` columns of `width` each.
    pub fn fixed(count: usize, width: u32) -> Result<Self, ConfigError> {
        FixedAxis::new(count, width, 0).map(Self::Fixed)
    }

    /// One column per entry of `widths`. A zero width is rejected.
    pub fn variable(widths: &[u32]) -> Result<Self, ConfigError> {
        VariableAxis::from_fn(widths.len(), 0, |i| widths[i]).map(Self::Variable)
    }

    pub fn mode(&self) -> ColumnsLayoutMode {
        match self {
            Self::Fixed(_) => ColumnsLayoutMode::Fixed,
            Self::Variable(_) => ColumnsLayoutMode::Variable,
        }
    }

    fn axis(&self) -> &dyn AxisMetrics {
        match self {
            Self::Fixed(axis) => axis,
            Self::Variable(axis) => axis,
        }
    }

    pub fn count(&self) -> usize {
        self.axis().count()
    }

    pub fn total_width(&self) -> u64 {
        self.axis().total_extent()
    }

    pub fn x_of(&self, column: usize) -> u64 {
        self.axis().pixel_of(column)
    }

    pub fn width_of(&self, column: usize) -> u32 {
        self.axis().extent_of(column)
    }

    /// Columns to materialize for a viewport `viewport_w` wide at `offset_x`.
    ///
    /// Variable layouts ignore the viewport and return every column: horizontal virtualization
    /// is off in that mode.
    pub fn required_columns(&self, offset_x: u64, viewport_w: u32, buffer: usize) -> IndexRange {
        match self {
            Self::Fixed(axis) => required_range(axis, offset_x, viewport_w, buffer),
            Self::Variable(axis) => IndexRange::up_to(axis.count()),
        }
    }
}
