use alloc::sync::Arc;

use cellview::{
    BindFailure, BufferSize, ColumnsLayoutMode, ConfigError, Orientation, Rect, ViewportState,
};

use crate::TableState;

/// Per-item extent along the scroll axis, given the item index and value.
pub type SizeFn<T> = Arc<dyn Fn(usize, &T) -> u32 + Send + Sync>;

/// A callback fired after every reconciliation pass with the new state.
pub type OnStateChange<T, C> = Arc<dyn Fn(&ViewportState<T, C>) + Send + Sync>;

/// A callback fired after every table pass with the new state.
pub type OnTableChange<T, C> = Arc<dyn Fn(&TableState<T, C>) + Send + Sync>;

/// A callback fired for each cell the factory failed to produce.
pub type OnFailure = Arc<dyn Fn(&BindFailure) + Send + Sync>;

/// Configuration for [`crate::ListContainer`] and [`crate::PaginatedList`].
///
/// Cells either share one fixed `cell_extent`, or get individual extents from `size_fn` when
/// it is set. `spacing` is added between consecutive cells in both cases.
pub struct ListOptions<T> {
    pub orientation: Orientation,
    pub buffer_size: BufferSize,
    pub cell_extent: u32,
    pub spacing: u32,
    pub size_fn: Option<SizeFn<T>>,
    /// Free cells kept for reuse; `0` disables pooling.
    pub pool_capacity: usize,
    pub viewport: Rect,
    pub initial_offset: u64,
}

impl<T> Clone for ListOptions<T> {
    fn clone(&self) -> Self {
        Self {
            orientation: self.orientation,
            buffer_size: self.buffer_size,
            cell_extent: self.cell_extent,
            spacing: self.spacing,
            size_fn: self.size_fn.clone(),
            pool_capacity: self.pool_capacity,
            viewport: self.viewport,
            initial_offset: self.initial_offset,
        }
    }
}

impl<T> ListOptions<T> {
    /// Options for fixed-extent cells.
    pub fn new(cell_extent: u32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            buffer_size: BufferSize::default(),
            cell_extent,
            spacing: 0,
            size_fn: None,
            pool_capacity: cellview::DEFAULT_POOL_CAPACITY,
            viewport: Rect::default(),
            initial_offset: 0,
        }
    }

    /// Options for cells whose extent depends on the item.
    pub fn with_sizes(size_fn: impl Fn(usize, &T) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            size_fn: Some(Arc::new(size_fn)),
            ..Self::new(1)
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: BufferSize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_cell_extent(mut self, cell_extent: u32) -> Self {
        self.cell_extent = cell_extent;
        self
    }

    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_size_fn(
        mut self,
        size_fn: Option<impl Fn(usize, &T) -> u32 + Send + Sync + 'static>,
    ) -> Self {
        self.size_fn = size_fn.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_fn.is_none() && self.cell_extent == 0 {
            return Err(ConfigError::ZeroCellExtent);
        }
        Ok(())
    }
}

impl<T> core::fmt::Debug for ListOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListOptions")
            .field("orientation", &self.orientation)
            .field("buffer_size", &self.buffer_size)
            .field("cell_extent", &self.cell_extent)
            .field("spacing", &self.spacing)
            .field("variable_sizes", &self.size_fn.is_some())
            .field("pool_capacity", &self.pool_capacity)
            .field("viewport", &self.viewport)
            .field("initial_offset", &self.initial_offset)
            .finish()
    }
}

/// Configuration for [`crate::GridContainer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridOptions {
    pub columns: usize,
    pub cell_size: Rect,
    pub h_spacing: u32,
    pub v_spacing: u32,
    pub buffer_size: BufferSize,
    pub pool_capacity: usize,
    pub viewport: Rect,
}

impl GridOptions {
    pub fn new(columns: usize, cell_size: Rect) -> Self {
        Self {
            columns,
            cell_size,
            h_spacing: 0,
            v_spacing: 0,
            buffer_size: BufferSize::default(),
            pool_capacity: cellview::DEFAULT_POOL_CAPACITY,
            viewport: Rect::default(),
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_cell_size(mut self, cell_size: Rect) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_spacing(mut self, horizontal: u32, vertical: u32) -> Self {
        self.h_spacing = horizontal;
        self.v_spacing = vertical;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: BufferSize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }
}

/// Configuration for [`crate::TableContainer`].
///
/// `column_width` is the width of every column in [`ColumnsLayoutMode::Fixed`] and the width of
/// columns without their own width in [`ColumnsLayoutMode::Variable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableOptions {
    pub row_height: u32,
    pub column_width: u32,
    pub layout_mode: ColumnsLayoutMode,
    pub buffer_size: BufferSize,
    /// Free cells kept for reuse by each column; `0` disables pooling.
    pub pool_capacity: usize,
    pub viewport: Rect,
}

impl TableOptions {
    pub fn new(row_height: u32, column_width: u32) -> Self {
        Self {
            row_height,
            column_width,
            layout_mode: ColumnsLayoutMode::default(),
            buffer_size: BufferSize::default(),
            pool_capacity: cellview::DEFAULT_POOL_CAPACITY,
            viewport: Rect::default(),
        }
    }

    pub fn with_layout_mode(mut self, layout_mode: ColumnsLayoutMode) -> Self {
        self.layout_mode = layout_mode;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: BufferSize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.row_height == 0 || self.column_width == 0 {
            return Err(ConfigError::ZeroCellExtent);
        }
        Ok(())
    }
}
