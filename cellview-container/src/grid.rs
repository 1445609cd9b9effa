use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use cellview::axis::max_scroll;
use cellview::{
    BindFailure, BufferSize, CellBounds, CellFactory, ConfigError, ContainerKind, Context,
    GridCell, GridGeometry, ItemKey, ListChange, Orientation, Rect, ReconcileReport,
    ScrollPosition, UpdateType, ViewportState,
};

use crate::FrameState;
use crate::driver::{Driver, Request};
use crate::options::GridOptions;

/// A virtualized grid of fixed-size cells, scrolling on both axes.
///
/// Items are laid out row-major in `columns` columns. Each pass materializes one index segment
/// per required row, restricted to the required columns, and tells every live cell its
/// `(row, column)` through [`GridCell::set_coordinates`].
pub struct GridContainer<T, C> {
    driver: Driver<T, C>,
    options: GridOptions,
    geometry: GridGeometry,
    scroll: ScrollPosition,
}

impl<T: ItemKey + Clone, C: GridCell<T>> GridContainer<T, C> {
    pub fn new(options: GridOptions) -> Result<Self, ConfigError> {
        let geometry = GridGeometry::new(options.columns, options.cell_size)?
            .with_spacing(options.h_spacing, options.v_spacing);
        vdebug!(?options, "grid container created");
        Ok(Self {
            driver: Driver::new(ContainerKind::Grid, options.pool_capacity),
            options,
            geometry,
            scroll: ScrollPosition::ZERO,
        })
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn items(&self) -> &[T] {
        &self.driver.items
    }

    pub fn len(&self) -> usize {
        self.driver.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.driver.items.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.geometry.rows(self.len())
    }

    pub fn current_state(&self) -> &ViewportState<T, C> {
        &self.driver.state
    }

    pub fn last_report(&self) -> ReconcileReport {
        self.driver.last_report()
    }

    pub fn context(&self) -> &Context {
        &self.driver.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.driver.context
    }

    pub fn pooled_cells(&self) -> usize {
        self.driver.pool.len()
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&ViewportState<T, C>) + Send + Sync + 'static>,
    ) {
        self.driver.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    pub fn set_on_failure(
        &mut self,
        on_failure: Option<impl Fn(&BindFailure) + Send + Sync + 'static>,
    ) {
        self.driver.on_failure = on_failure.map(|f| Arc::new(f) as _);
    }

    pub fn set_cell_factory(&mut self, factory: impl CellFactory<T, C> + 'static) {
        self.driver.set_factory(Box::new(factory));
        self.update(UpdateType::Init, None);
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        let count = items.len();
        self.driver.items = items;
        self.update(UpdateType::Change, Some(ListChange::set_all(count)));
    }

    /// Applies an arbitrary mutation to the items; see [`crate::ListContainer::notify_change`].
    pub fn notify_change(&mut self, change: Option<ListChange>, mutate: impl FnOnce(&mut Vec<T>)) {
        mutate(&mut self.driver.items);
        self.update(UpdateType::Change, change);
    }

    /// Reflows the items into `columns` columns. Cells keep their items but move to new
    /// coordinates.
    pub fn set_columns(&mut self, columns: usize) -> Result<(), ConfigError> {
        let geometry = GridGeometry::new(columns, self.options.cell_size)
            .inspect_err(|_err| vwarn!(error = %_err, "rejected column count"))?
            .with_spacing(self.options.h_spacing, self.options.v_spacing);
        self.options.columns = columns;
        self.set_geometry(geometry);
        Ok(())
    }

    pub fn set_cell_size(&mut self, cell_size: Rect) -> Result<(), ConfigError> {
        let geometry = GridGeometry::new(self.options.columns, cell_size)
            .inspect_err(|_err| vwarn!(error = %_err, "rejected cell size"))?
            .with_spacing(self.options.h_spacing, self.options.v_spacing);
        self.options.cell_size = cell_size;
        self.set_geometry(geometry);
        Ok(())
    }

    pub fn set_spacing(&mut self, horizontal: u32, vertical: u32) {
        self.options.h_spacing = horizontal;
        self.options.v_spacing = vertical;
        self.set_geometry(self.geometry.with_spacing(horizontal, vertical));
    }

    fn set_geometry(&mut self, geometry: GridGeometry) {
        if self.geometry == geometry {
            return;
        }
        self.geometry = geometry;
        self.update(UpdateType::Scroll, None);
    }

    pub fn set_buffer_size(&mut self, buffer_size: BufferSize) {
        if self.options.buffer_size == buffer_size {
            return;
        }
        self.options.buffer_size = buffer_size;
        self.update(UpdateType::Scroll, None);
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.options.viewport == viewport {
            return;
        }
        self.options.viewport = viewport;
        self.update(UpdateType::Scroll, None);
    }

    pub fn set_pool_capacity(&mut self, capacity: usize) {
        self.options.pool_capacity = capacity;
        self.driver.pool.set_capacity(capacity);
    }

    /// Content width and height.
    pub fn content_size(&self) -> (u64, u64) {
        self.geometry.content_size(self.len())
    }

    /// Largest scroll offsets on both axes.
    pub fn max_scroll(&self) -> ScrollPosition {
        let (width, height) = self.content_size();
        ScrollPosition::new(
            max_scroll(width, self.options.viewport.width),
            max_scroll(height, self.options.viewport.height),
        )
    }

    pub fn scroll_position(&self) -> ScrollPosition {
        self.scroll
    }

    /// Scrolls to `position`, clamped on both axes. Returns the applied position.
    pub fn scroll_to(&mut self, position: ScrollPosition) -> ScrollPosition {
        let max = self.max_scroll();
        let clamped = ScrollPosition::new(position.x.min(max.x), position.y.min(max.y));
        if clamped != self.scroll {
            vtrace!(x = clamped.x, y = clamped.y, "scroll");
            self.scroll = clamped;
            self.update(UpdateType::Scroll, None);
        }
        self.scroll
    }

    pub fn scroll_by(&mut self, dx: i64, dy: i64) -> ScrollPosition {
        self.scroll_to(ScrollPosition::new(
            self.scroll.x.saturating_add_signed(dx),
            self.scroll.y.saturating_add_signed(dy),
        ))
    }

    /// Scrolls so `row` is at the top, clamped to the last row.
    pub fn scroll_to_row(&mut self, row: usize) -> ScrollPosition {
        let row = row.min(self.rows().saturating_sub(1));
        let y = self.geometry.bounds_of(self.geometry.index_of(row, 0)).y;
        self.scroll_to(Orientation::Vertical.with_main_offset(self.scroll, y))
    }

    pub fn scroll_to_column(&mut self, column: usize) -> ScrollPosition {
        let x = self.geometry.bounds_of(column.min(self.geometry.columns() - 1)).x;
        self.scroll_to(Orientation::Horizontal.with_main_offset(self.scroll, x))
    }

    /// Scrolls so the cell of `index` is at the top-left, as far as the content allows.
    pub fn scroll_to_index(&mut self, index: usize) -> ScrollPosition {
        let bounds = self.geometry.bounds_of(index);
        self.scroll_to(ScrollPosition::new(bounds.x, bounds.y))
    }

    pub fn bounds_of(&self, index: usize) -> CellBounds {
        self.geometry.bounds_of(index)
    }

    /// Visits every live cell in index order with its bounds.
    pub fn layout(&mut self, mut place: impl FnMut(usize, CellBounds, &mut C)) {
        let geometry = self.geometry;
        for (index, _, cell) in self.driver.state.iter_mut() {
            cell.before_layout();
            place(index, geometry.bounds_of(index), cell);
            cell.after_layout();
        }
    }

    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.driver.begin_batch();
        f(self);
        if let Some(req) = self.driver.end_batch() {
            self.run(req);
        }
    }

    pub fn dispose(&mut self) {
        self.driver.dispose_cells();
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.options.viewport,
            scroll: self.scroll,
            page: None,
        }
    }

    pub fn restore_frame_state(&mut self, frame: FrameState) {
        self.batch_update(|grid| {
            grid.set_viewport(frame.viewport);
            grid.scroll_to(frame.scroll);
        });
    }

    fn update(&mut self, update: UpdateType, change: Option<ListChange>) {
        if let Some(req) = self.driver.request(update, change) {
            self.run(req);
        }
    }

    fn run(&mut self, req: Request) {
        let max = self.max_scroll();
        self.scroll = ScrollPosition::new(self.scroll.x.min(max.x), self.scroll.y.min(max.y));
        if !self.driver.has_factory() {
            return;
        }
        let segments = self.geometry.required_segments(
            self.scroll,
            self.options.viewport,
            self.len(),
            self.options.buffer_size.cells(),
        );
        let total_extent = self.content_size().1;
        if req.update == UpdateType::Scroll && self.driver.is_current(&segments, total_extent) {
            vtrace!(rows = segments.len(), "segments unchanged, pass skipped");
            return;
        }
        let geometry = self.geometry;
        self.driver.run(
            req,
            &segments,
            total_extent,
            Orientation::Vertical,
            |index, cell| {
                let (row, column) = geometry.coordinates(index);
                cell.set_coordinates(row, column);
            },
        );
    }
}

impl<T, C> core::fmt::Debug for GridContainer<T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridContainer")
            .field("options", &self.options)
            .field("scroll", &self.scroll)
            .finish_non_exhaustive()
    }
}
