use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::slice;

use cellview::axis::{AxisMetrics, FixedAxis, max_scroll, required_range};
use cellview::{
    BindFailure, BufferSize, CellBounds, CellFactory, CellPool, ColumnId, ColumnLayout,
    ColumnRef, ColumnsLayoutMode, ConfigError, ContainerKind, Context, Host, IndexRange, ItemKey,
    ListChange, Orientation, Rect, ReconcileReport, Reconciler, ScrollPosition, TableCell,
    UpdateType, ViewportState,
};

use crate::driver::{Batch, Request};
use crate::options::{OnFailure, OnTableChange, TableOptions};
use crate::{FrameState, TableState};

struct TableColumn<T, C> {
    id: ColumnId,
    /// Own width in variable layouts; the table's column width otherwise.
    width: Option<u32>,
    factory: Box<dyn CellFactory<T, C>>,
    pool: CellPool<T, C>,
}

/// A virtualized table: rows of items, each shown through every column.
///
/// Each column has its own cell factory and pool, and its cells are reconciled over the
/// required rows like a list. In [`ColumnsLayoutMode::Fixed`] columns are virtualized as well:
/// columns leaving the viewport hand their cells to their pool.
///
/// In [`ColumnsLayoutMode::Variable`] every column is materialized whatever the horizontal
/// scroll position, so a table with many variable-width columns holds
/// `rows in range * columns` cells. Only rows are virtualized in that mode.
pub struct TableContainer<T, C> {
    items: Vec<T>,
    columns: Vec<TableColumn<T, C>>,
    layout: ColumnLayout,
    state: TableState<T, C>,
    options: TableOptions,
    scroll: ScrollPosition,
    context: Context,
    engine: Reconciler,
    batch: Batch,
    next_id: u32,
    /// Columns or their widths changed since the last pass.
    columns_dirty: bool,
    last_report: ReconcileReport,
    on_change: Option<OnTableChange<T, C>>,
    on_failure: Option<OnFailure>,
}

impl<T: ItemKey + Clone, C: TableCell<T>> TableContainer<T, C> {
    pub fn new(options: TableOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        vdebug!(?options, "table container created");
        Ok(Self {
            items: Vec::new(),
            columns: Vec::new(),
            layout: ColumnLayout::fixed(0, options.column_width)?,
            state: TableState::default(),
            options,
            scroll: ScrollPosition::ZERO,
            context: Context::new(),
            engine: Reconciler::new(),
            batch: Batch::default(),
            next_id: 0,
            columns_dirty: false,
            last_report: ReconcileReport::default(),
            on_change: None,
            on_failure: None,
        })
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.iter().map(|c| c.id)
    }

    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn column_layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn current_state(&self) -> &TableState<T, C> {
        &self.state
    }

    /// Churn of the latest pass, summed over columns.
    pub fn last_report(&self) -> ReconcileReport {
        self.last_report
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Free cells over all column pools.
    pub fn pooled_cells(&self) -> usize {
        self.columns.iter().map(|c| c.pool.len()).sum()
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&TableState<T, C>) + Send + Sync + 'static>,
    ) {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    pub fn set_on_failure(
        &mut self,
        on_failure: Option<impl Fn(&BindFailure) + Send + Sync + 'static>,
    ) {
        self.on_failure = on_failure.map(|f| Arc::new(f) as _);
    }

    /// Appends a column whose cells come from `factory`.
    pub fn add_column(&mut self, factory: impl CellFactory<T, C> + 'static) -> ColumnId {
        self.insert_column(self.columns.len(), factory)
    }

    /// Inserts a column before position `at` (clamped to the column count).
    pub fn insert_column(
        &mut self,
        at: usize,
        factory: impl CellFactory<T, C> + 'static,
    ) -> ColumnId {
        let at = at.min(self.columns.len());
        let id = ColumnId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.columns.insert(
            at,
            TableColumn {
                id,
                width: None,
                factory: Box::new(factory),
                pool: CellPool::with_capacity(self.options.pool_capacity),
            },
        );
        self.state.states.insert(at, ViewportState::empty());
        self.state.column_ids.insert(at, id);
        vdebug!(?id, at, "column inserted");
        self.columns_changed();
        id
    }

    /// Removes a column, disposing its live and pooled cells. Returns `false` for an unknown id.
    pub fn remove_column(&mut self, id: ColumnId) -> bool {
        let Some(index) = self.column_index(id) else {
            return false;
        };
        let mut column = self.columns.remove(index);
        let mut state = self.state.states.remove(index);
        self.state.column_ids.remove(index);
        if let Err(_err) = self.engine.teardown(&mut state, &mut column.pool) {
            vwarn!(error = %_err, "cannot dispose column cells during a pass");
        }
        vdebug!(?id, "column removed");
        self.columns_changed();
        true
    }

    /// Replaces a column's factory. The column's cells, live or pooled, are disposed and rebuilt.
    pub fn set_column_factory(
        &mut self,
        id: ColumnId,
        factory: impl CellFactory<T, C> + 'static,
    ) -> Result<(), ConfigError> {
        let index = self.column_index(id).ok_or(ConfigError::UnknownColumn(id))?;
        let column = &mut self.columns[index];
        if let Err(_err) = self
            .engine
            .teardown(&mut self.state.states[index], &mut column.pool)
        {
            vwarn!(error = %_err, "cannot dispose column cells during a pass");
        }
        column.factory = Box::new(factory);
        self.update(UpdateType::Init, None);
        Ok(())
    }

    /// Gives a column its own width. Only [`ColumnsLayoutMode::Variable`] layouts use it.
    pub fn set_column_width(&mut self, id: ColumnId, width: u32) -> Result<(), ConfigError> {
        if width == 0 {
            vwarn!(?id, "rejected zero column width");
            return Err(ConfigError::ZeroCellExtent);
        }
        let index = self.column_index(id).ok_or(ConfigError::UnknownColumn(id))?;
        self.columns[index].width = Some(width);
        if self.options.layout_mode == ColumnsLayoutMode::Variable {
            self.columns_changed();
        }
        Ok(())
    }

    /// Width of every fixed column, and of variable columns without their own width.
    pub fn set_default_column_width(&mut self, width: u32) -> Result<(), ConfigError> {
        if width == 0 {
            vwarn!("rejected zero column width");
            return Err(ConfigError::ZeroCellExtent);
        }
        if self.options.column_width == width {
            return Ok(());
        }
        self.options.column_width = width;
        self.columns_changed();
        Ok(())
    }

    pub fn set_layout_mode(&mut self, mode: ColumnsLayoutMode) {
        if self.options.layout_mode == mode {
            return;
        }
        self.options.layout_mode = mode;
        self.columns_changed();
    }

    pub fn set_row_height(&mut self, row_height: u32) -> Result<(), ConfigError> {
        if row_height == 0 {
            vwarn!("rejected zero row height");
            return Err(ConfigError::ZeroCellExtent);
        }
        if self.options.row_height == row_height {
            return Ok(());
        }
        self.options.row_height = row_height;
        self.update(UpdateType::Scroll, None);
        Ok(())
    }

    fn columns_changed(&mut self) {
        let width = self.options.column_width;
        let layout = match self.options.layout_mode {
            ColumnsLayoutMode::Fixed => ColumnLayout::fixed(self.columns.len(), width),
            ColumnsLayoutMode::Variable => {
                let widths: Vec<u32> = self
                    .columns
                    .iter()
                    .map(|c| c.width.unwrap_or(width))
                    .collect();
                ColumnLayout::variable(&widths)
            }
        };
        self.columns_dirty = true;
        match layout {
            Ok(layout) => self.layout = layout,
            Err(_err) => vwarn!(error = %_err, "column layout rejected"),
        }
        self.update(UpdateType::Scroll, None);
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        let count = items.len();
        self.items = items;
        self.update(UpdateType::Change, Some(ListChange::set_all(count)));
    }

    /// Inserts `items` before row `at` (clamped to the length).
    pub fn insert_items(&mut self, at: usize, items: impl IntoIterator<Item = T>) {
        let at = at.min(self.len());
        let before = self.len();
        self.items.splice(at..at, items);
        let added = self.len() - before;
        if added > 0 {
            self.update(UpdateType::Change, Some(ListChange::insert(at, added)));
        }
    }

    /// Removes up to `count` rows starting at `from`, returning their items.
    pub fn remove_items(&mut self, from: usize, count: usize) -> Vec<T> {
        let from = from.min(self.len());
        let end = from.saturating_add(count).min(self.len());
        let removed: Vec<T> = self.items.drain(from..end).collect();
        if !removed.is_empty() {
            self.update(UpdateType::Change, Some(ListChange::remove(from, removed.len())));
        }
        removed
    }

    /// Applies an arbitrary mutation to the items; see [`crate::ListContainer::notify_change`].
    pub fn notify_change(&mut self, change: Option<ListChange>, mutate: impl FnOnce(&mut Vec<T>)) {
        mutate(&mut self.items);
        self.update(UpdateType::Change, change);
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

    /// Changes the capacity of every column pool.
    pub fn set_pool_capacity(&mut self, capacity: usize) {
        self.options.pool_capacity = capacity;
        for column in &mut self.columns {
            column.pool.set_capacity(capacity);
        }
    }

    fn row_axis(&self) -> FixedAxis {
        FixedAxis {
            count: self.items.len(),
            extent: self.options.row_height,
            spacing: 0,
        }
    }

    /// Content width and height.
    pub fn content_size(&self) -> (u64, u64) {
        (self.layout.total_width(), self.row_axis().total_extent())
    }

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

    /// Scrolls so `row` is at the top, as far as the content allows.
    pub fn scroll_to_row(&mut self, row: usize) -> ScrollPosition {
        let y = self.row_axis().pixel_of(row.min(self.len().saturating_sub(1)));
        self.scroll_to(Orientation::Vertical.with_main_offset(self.scroll, y))
    }

    /// Scrolls so the column at `column` is at the left, as far as the content allows.
    pub fn scroll_to_column(&mut self, column: usize) -> ScrollPosition {
        let x = self.layout.x_of(column.min(self.columns.len().saturating_sub(1)));
        self.scroll_to(Orientation::Horizontal.with_main_offset(self.scroll, x))
    }

    /// Bounds of the cell at `(row, column)`, whether or not it is live.
    pub fn bounds_of(&self, row: usize, column: usize) -> CellBounds {
        CellBounds {
            x: self.layout.x_of(column),
            y: self.row_axis().pixel_of(row),
            width: self.layout.width_of(column),
            height: self.options.row_height,
        }
    }

    /// Visits every live cell, column by column, with its bounds.
    pub fn layout(&mut self, mut place: impl FnMut(usize, ColumnRef, CellBounds, &mut C)) {
        let row_axis = self.row_axis();
        let row_height = self.options.row_height;
        for (index, (&id, state)) in self
            .state
            .column_ids
            .iter()
            .zip(self.state.states.iter_mut())
            .enumerate()
        {
            let column = ColumnRef { id, index };
            let x = self.layout.x_of(index);
            let width = self.layout.width_of(index);
            for (row, _, cell) in state.iter_mut() {
                let bounds = CellBounds {
                    x,
                    y: row_axis.pixel_of(row),
                    width,
                    height: row_height,
                };
                cell.before_layout();
                place(row, column, bounds, cell);
                cell.after_layout();
            }
        }
    }

    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.batch.begin();
        f(self);
        if let Some(req) = self.batch.end() {
            self.run(req);
        }
    }

    /// Disposes every live and pooled cell of every column.
    pub fn dispose(&mut self) {
        let mut disposed = 0;
        for (column, state) in self.columns.iter_mut().zip(self.state.states.iter_mut()) {
            match self.engine.teardown(state, &mut column.pool) {
                Ok(n) => disposed += n,
                Err(_err) => vwarn!(error = %_err, "cannot dispose cells during a pass"),
            }
        }
        vdebug!(disposed, "table cells disposed");
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.options.viewport,
            scroll: self.scroll,
            page: None,
        }
    }

    pub fn restore_frame_state(&mut self, frame: FrameState) {
        self.batch_update(|table| {
            table.set_viewport(frame.viewport);
            table.scroll_to(frame.scroll);
        });
    }

    fn update(&mut self, update: UpdateType, change: Option<ListChange>) {
        if let Some(req) = self.batch.request(update, change) {
            self.run(req);
        }
    }

    fn is_current(&self, rows: IndexRange, columns: IndexRange, total_extent: u64) -> bool {
        !self.columns_dirty
            && self.state.generation > 0
            && self.state.rows == rows
            && self.state.columns == columns
            && self.state.total_extent == total_extent
            && self.state.count == self.items.len()
            && self.state.failures().next().is_none()
    }

    fn run(&mut self, req: Request) {
        let max = self.max_scroll();
        self.scroll = ScrollPosition::new(self.scroll.x.min(max.x), self.scroll.y.min(max.y));
        let viewport = self.options.viewport;
        let buffer = self.options.buffer_size.cells();
        let rows = required_range(&self.row_axis(), self.scroll.y, viewport.height, buffer);
        let columns = if rows.is_empty() {
            IndexRange::EMPTY
        } else {
            self.layout
                .required_columns(self.scroll.x, viewport.width, buffer)
        };
        let total_extent = self.content_size().1;
        if req.update == UpdateType::Scroll && self.is_current(rows, columns, total_extent) {
            vtrace!(%rows, %columns, "ranges unchanged, pass skipped");
            return;
        }

        let host = Host::new(ContainerKind::Table, Orientation::Vertical, &self.context);
        let mut report = ReconcileReport::default();
        for (index, (column, state)) in self
            .columns
            .iter_mut()
            .zip(self.state.states.iter_mut())
            .enumerate()
        {
            let segments: &[IndexRange] = if columns.contains(index) {
                slice::from_ref(&rows)
            } else {
                &[]
            };
            let plan = req.plan(&self.items, segments, total_extent);
            match self
                .engine
                .reconcile(state, plan, &mut column.pool, &mut *column.factory, &host)
            {
                Ok(column_report) => report += column_report,
                Err(_err) => {
                    vwarn!(error = %_err, "reconciliation rejected");
                    return;
                }
            }
            let column_ref = ColumnRef {
                id: column.id,
                index,
            };
            for (row, _, cell) in state.iter_mut() {
                cell.set_position(row, column_ref);
            }
        }

        self.state.rows = rows;
        self.state.columns = columns;
        self.state.count = self.items.len();
        self.state.total_extent = total_extent;
        self.state.generation = self.state.generation.wrapping_add(1);
        self.state.update_type = req.update;
        self.columns_dirty = false;
        self.last_report = report;
        vdebug!(
            %rows,
            %columns,
            generation = self.state.generation,
            live = self.state.len(),
            "table reconciled"
        );

        if let Some(on_failure) = &self.on_failure {
            for (_, failure) in self.state.failures() {
                on_failure(failure);
            }
        }
        if let Some(on_change) = &self.on_change {
            on_change(&self.state);
        }
    }
}

impl<T, C> core::fmt::Debug for TableContainer<T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TableContainer")
            .field("options", &self.options)
            .field("columns", &self.columns.len())
            .field("scroll", &self.scroll)
            .finish_non_exhaustive()
    }
}
