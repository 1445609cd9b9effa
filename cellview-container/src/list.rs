use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::slice;

use cellview::axis::{self, AxisMetrics};
use cellview::{
    BindFailure, BufferSize, Cell, CellBounds, CellFactory, ConfigError, ContainerKind, Context,
    FixedAxis, IndexRange, ItemKey, ListChange, Orientation, Paginator, Rect, ReconcileReport,
    ScrollPosition, UpdateType, VariableAxis, ViewportState,
};

use crate::FrameState;
use crate::driver::{Driver, Request};
use crate::options::{ListOptions, SizeFn};

#[derive(Clone, Debug)]
enum ListAxis {
    Fixed(FixedAxis),
    Variable(VariableAxis),
}

impl AxisMetrics for ListAxis {
    fn count(&self) -> usize {
        match self {
            Self::Fixed(a) => a.count(),
            Self::Variable(a) => a.count(),
        }
    }

    fn total_extent(&self) -> u64 {
        match self {
            Self::Fixed(a) => a.total_extent(),
            Self::Variable(a) => a.total_extent(),
        }
    }

    fn pixel_of(&self, index: usize) -> u64 {
        match self {
            Self::Fixed(a) => a.pixel_of(index),
            Self::Variable(a) => a.pixel_of(index),
        }
    }

    fn index_of(&self, pixel: u64) -> usize {
        match self {
            Self::Fixed(a) => a.index_of(pixel),
            Self::Variable(a) => a.index_of(pixel),
        }
    }

    fn extent_of(&self, index: usize) -> u32 {
        match self {
            Self::Fixed(a) => a.extent_of(index),
            Self::Variable(a) => a.extent_of(index),
        }
    }

    fn visible(&self, offset: u64, viewport: u32) -> (usize, usize) {
        match self {
            Self::Fixed(a) => a.visible(offset, viewport),
            Self::Variable(a) => a.visible(offset, viewport),
        }
    }
}

fn build_axis<T>(options: &ListOptions<T>, items: &[T]) -> ListAxis {
    match &options.size_fn {
        None => ListAxis::Fixed(FixedAxis {
            count: items.len(),
            extent: options.cell_extent.max(1),
            spacing: options.spacing,
        }),
        Some(size_fn) => {
            let axis = VariableAxis::from_fn(items.len(), options.spacing, |i| {
                let extent = size_fn(i, &items[i]);
                if extent == 0 {
                    vwarn!(index = i, "size function returned zero, using 1");
                }
                extent.max(1)
            });
            ListAxis::Variable(axis.unwrap_or_else(|_| VariableAxis::new(options.spacing)))
        }
    }
}

fn bounds_of(
    axis: &ListAxis,
    orientation: Orientation,
    viewport: Rect,
    index: usize,
) -> CellBounds {
    let main = axis.pixel_of(index);
    let extent = axis.extent_of(index);
    let cross = orientation.cross(viewport);
    let origin = orientation.point(main, 0);
    let (width, height) = match orientation {
        Orientation::Vertical => (cross, extent),
        Orientation::Horizontal => (extent, cross),
    };
    CellBounds {
        x: origin.x,
        y: origin.y,
        width,
        height,
    }
}

/// A virtualized list: one column (or row) of cells along the scroll axis.
///
/// The container owns its items and re-runs the reconciliation engine on every relevant
/// mutation (items, scroll position, viewport, sizing). The UI layer reads
/// [`ListContainer::current_state`] or calls [`ListContainer::layout`] to position cells.
///
/// Nothing is materialized until a cell factory is set and the viewport is non-empty.
pub struct ListContainer<T, C> {
    driver: Driver<T, C>,
    options: ListOptions<T>,
    axis: ListAxis,
    offset: u64,
    pub(crate) paging: Option<Paginator>,
}

impl<T: ItemKey + Clone, C: Cell<T>> ListContainer<T, C> {
    pub fn new(options: ListOptions<T>) -> Result<Self, ConfigError> {
        Self::build(options, ContainerKind::List, None)
    }

    pub(crate) fn new_paginated(
        options: ListOptions<T>,
        items_per_page: usize,
    ) -> Result<Self, ConfigError> {
        let paging = Paginator::new(items_per_page)?;
        Self::build(options, ContainerKind::PaginatedList, Some(paging))
    }

    fn build(
        options: ListOptions<T>,
        kind: ContainerKind,
        paging: Option<Paginator>,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        vdebug!(?kind, ?options, "list container created");
        Ok(Self {
            driver: Driver::new(kind, options.pool_capacity),
            axis: build_axis(&options, &[]),
            offset: options.initial_offset,
            options,
            paging,
        })
    }

    pub fn options(&self) -> &ListOptions<T> {
        &self.options
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

    pub fn orientation(&self) -> Orientation {
        self.options.orientation
    }

    pub fn buffer_size(&self) -> BufferSize {
        self.options.buffer_size
    }

    pub fn viewport(&self) -> Rect {
        self.options.viewport
    }

    /// The latest state. Empty until a factory is set and the viewport has an extent.
    pub fn current_state(&self) -> &ViewportState<T, C> {
        &self.driver.state
    }

    /// Churn of the latest pass.
    pub fn last_report(&self) -> ReconcileReport {
        self.driver.last_report()
    }

    pub fn context(&self) -> &Context {
        &self.driver.context
    }

    /// Services registered here reach new cells through [`cellview::Host`].
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

    /// Replaces the cell factory. Every existing cell (live or pooled) is disposed and the
    /// viewport is rebuilt with the new factory.
    pub fn set_cell_factory(&mut self, factory: impl CellFactory<T, C> + 'static) {
        self.driver.set_factory(Box::new(factory));
        self.update(UpdateType::Init, None);
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        let count = items.len();
        self.driver.items = items;
        self.items_changed(Some(ListChange::set_all(count)));
    }

    /// Inserts `items` before index `at` (clamped to the length).
    pub fn insert_items(&mut self, at: usize, items: impl IntoIterator<Item = T>) {
        let at = at.min(self.len());
        let before = self.len();
        self.driver.items.splice(at..at, items);
        let added = self.len() - before;
        if added > 0 {
            self.items_changed(Some(ListChange::insert(at, added)));
        }
    }

    pub fn push_items(&mut self, items: impl IntoIterator<Item = T>) {
        self.insert_items(self.len(), items);
    }

    /// Removes up to `count` items starting at `from`, returning them.
    pub fn remove_items(&mut self, from: usize, count: usize) -> Vec<T> {
        let from = from.min(self.len());
        let end = from.saturating_add(count).min(self.len());
        let removed: Vec<T> = self.driver.items.drain(from..end).collect();
        if !removed.is_empty() {
            self.items_changed(Some(ListChange::remove(from, removed.len())));
        }
        removed
    }

    /// Overwrites items from `from` onwards, stopping at the end of the list.
    ///
    /// Returns how many items were replaced.
    pub fn replace_items(&mut self, from: usize, items: impl IntoIterator<Item = T>) -> usize {
        let mut replaced = 0;
        for (slot, item) in self.driver.items.iter_mut().skip(from).zip(items) {
            *slot = item;
            replaced += 1;
        }
        if replaced > 0 {
            self.items_changed(Some(ListChange::replace(from, from + replaced - 1)));
        }
        replaced
    }

    /// Reorders the items in `[from, to]` (clamped to the list) with `reorder`.
    ///
    /// Cells follow their items to their new indexes without being rebound.
    pub fn permute_items(&mut self, from: usize, to: usize, reorder: impl FnOnce(&mut [T])) {
        let Some(last) = self.len().checked_sub(1) else {
            return;
        };
        let to = to.min(last);
        if from > to {
            return;
        }
        reorder(&mut self.driver.items[from..=to]);
        self.items_changed(Some(ListChange::permute(from, to)));
    }

    /// Applies an arbitrary mutation to the items.
    ///
    /// Pass the change descriptor when it is known so cells can be shifted positionally;
    /// without it cells are matched to items by equality.
    pub fn notify_change(&mut self, change: Option<ListChange>, mutate: impl FnOnce(&mut Vec<T>)) {
        mutate(&mut self.driver.items);
        self.items_changed(change);
    }

    fn items_changed(&mut self, change: Option<ListChange>) {
        self.axis = build_axis(&self.options, &self.driver.items);
        self.update(UpdateType::Change, change);
    }

    pub fn set_buffer_size(&mut self, buffer_size: BufferSize) {
        if self.options.buffer_size == buffer_size {
            return;
        }
        self.options.buffer_size = buffer_size;
        self.update(UpdateType::Scroll, None);
    }

    pub fn set_cell_extent(&mut self, cell_extent: u32) -> Result<(), ConfigError> {
        if cell_extent == 0 {
            vwarn!("rejected zero cell extent");
            return Err(ConfigError::ZeroCellExtent);
        }
        if self.options.cell_extent == cell_extent {
            return Ok(());
        }
        self.options.cell_extent = cell_extent;
        if self.options.size_fn.is_none() {
            self.geometry_changed();
        }
        Ok(())
    }

    pub fn set_spacing(&mut self, spacing: u32) {
        if self.options.spacing == spacing {
            return;
        }
        self.options.spacing = spacing;
        self.geometry_changed();
    }

    /// Switches between per-item extents (`Some`) and the fixed cell extent (`None`).
    ///
    /// A size function returning zero for any current item is rejected.
    pub fn set_size_fn(
        &mut self,
        size_fn: Option<impl Fn(usize, &T) -> u32 + Send + Sync + 'static>,
    ) -> Result<(), ConfigError> {
        match size_fn {
            Some(f) => {
                let f: SizeFn<T> = Arc::new(f);
                let items = &self.driver.items;
                let axis =
                    VariableAxis::from_fn(items.len(), self.options.spacing, |i| f(i, &items[i]))
                        .inspect_err(|_err| vwarn!(error = %_err, "rejected size function"))?;
                self.options.size_fn = Some(f);
                self.axis = ListAxis::Variable(axis);
            }
            None => {
                if self.options.cell_extent == 0 {
                    return Err(ConfigError::ZeroCellExtent);
                }
                self.options.size_fn = None;
                self.axis = build_axis(&self.options, &self.driver.items);
            }
        }
        self.update(UpdateType::Scroll, None);
        Ok(())
    }

    /// Changes the scroll axis. The scroll position is reset to the start.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.options.orientation == orientation {
            return;
        }
        self.options.orientation = orientation;
        self.offset = 0;
        if let Some(p) = self.paging.as_mut() {
            p.go_to_page(1);
        }
        self.update(UpdateType::Init, None);
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

    fn geometry_changed(&mut self) {
        self.axis = build_axis(&self.options, &self.driver.items);
        self.update(UpdateType::Scroll, None);
    }

    pub fn total_extent(&self) -> u64 {
        self.axis.total_extent()
    }

    pub fn max_scroll(&self) -> u64 {
        axis::max_scroll(self.total_extent(), self.main_viewport())
    }

    pub fn scroll_offset(&self) -> u64 {
        self.offset
    }

    /// Scroll offset as a fraction of [`ListContainer::max_scroll`].
    pub fn scroll_percent(&self) -> f64 {
        axis::percent_of(self.offset, self.max_scroll())
    }

    pub fn pixel_of(&self, index: usize) -> u64 {
        self.axis.pixel_of(index)
    }

    /// Index of the item at content offset `pixel`, or `None` for an empty list.
    pub fn index_of(&self, pixel: u64) -> Option<usize> {
        (!self.is_empty()).then(|| self.axis.index_of(pixel))
    }

    pub fn first_visible_index(&self) -> Option<usize> {
        self.index_of(self.offset)
    }

    /// Scrolls to `pixel`, clamped into `[0, max_scroll]`. Returns the applied offset.
    pub fn scroll_to_pixel(&mut self, pixel: u64) -> u64 {
        let clamped = pixel.min(self.max_scroll());
        if clamped != self.offset {
            vtrace!(offset = clamped, "scroll");
            self.offset = clamped;
            self.update(UpdateType::Scroll, None);
        }
        self.offset
    }

    pub fn scroll_by(&mut self, delta: i64) -> u64 {
        self.scroll_to_pixel(self.offset.saturating_add_signed(delta))
    }

    /// Brings `index` (clamped to the list) to the start of the viewport, as far as the
    /// content allows.
    pub fn scroll_to_index(&mut self, index: usize) -> u64 {
        let Some(last) = self.len().checked_sub(1) else {
            return self.offset;
        };
        self.scroll_to_pixel(self.axis.pixel_of(index.min(last)))
    }

    pub fn scroll_to_first(&mut self) -> u64 {
        self.scroll_to_pixel(0)
    }

    pub fn scroll_to_last(&mut self) -> u64 {
        self.scroll_to_pixel(u64::MAX)
    }

    pub fn scroll_to_percent(&mut self, percent: f64) -> u64 {
        self.scroll_to_pixel(axis::pixel_of_percent(percent, self.max_scroll()))
    }

    /// Where the cell for `index` goes, in content coordinates.
    pub fn bounds_of(&self, index: usize) -> CellBounds {
        bounds_of(&self.axis, self.options.orientation, self.options.viewport, index)
    }

    /// Visits every live cell in index order with its bounds, between its
    /// [`Cell::before_layout`] and [`Cell::after_layout`] hooks.
    pub fn layout(&mut self, mut place: impl FnMut(usize, CellBounds, &mut C)) {
        let (orientation, viewport) = (self.options.orientation, self.options.viewport);
        for (index, _, cell) in self.driver.state.iter_mut() {
            cell.before_layout();
            place(index, bounds_of(&self.axis, orientation, viewport, index), cell);
            cell.after_layout();
        }
    }

    /// Runs `f` and reconciles once at the end, however many mutations it made.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.begin_batch();
        f(self);
        self.end_batch();
    }

    pub(crate) fn begin_batch(&mut self) {
        self.driver.begin_batch();
    }

    pub(crate) fn end_batch(&mut self) {
        if let Some(req) = self.driver.end_batch() {
            self.run(req);
        }
    }

    /// Disposes every live and pooled cell. The next mutation rebuilds the viewport.
    pub fn dispose(&mut self) {
        self.driver.dispose_cells();
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.options.viewport,
            scroll: self.options.orientation.point(self.offset, 0),
            page: self.paging.map(|p| p.state()),
        }
    }

    /// Restores a snapshot taken with [`ListContainer::frame_state`].
    pub fn restore_frame_state(&mut self, frame: FrameState) {
        self.batch_update(|list| {
            list.set_viewport(frame.viewport);
            match (list.paging.as_mut(), frame.page) {
                (Some(p), Some(page)) => {
                    if p.set_items_per_page(page.items_per_page).is_ok() {
                        p.go_to_page(page.page);
                    }
                    list.update(UpdateType::Scroll, None);
                }
                _ => {
                    list.scroll_to_pixel(list.options.orientation.main_offset(frame.scroll));
                }
            }
        });
    }

    fn main_viewport(&self) -> u32 {
        self.options.orientation.main(self.options.viewport)
    }

    pub(crate) fn update(&mut self, update: UpdateType, change: Option<ListChange>) {
        if let Some(req) = self.driver.request(update, change) {
            self.run(req);
        }
    }

    fn run(&mut self, req: Request) {
        let viewport = self.main_viewport();
        let buffer = self.options.buffer_size.cells();
        let max_scroll = self.max_scroll();
        let range = match self.paging.as_mut() {
            Some(p) => {
                p.set_count(self.driver.items.len());
                self.offset = p.offset_of_page(p.page(), &self.axis);
                if viewport == 0 {
                    IndexRange::EMPTY
                } else {
                    p.required_range(buffer)
                }
            }
            None => {
                self.offset = self.offset.min(max_scroll);
                axis::required_range(&self.axis, self.offset, viewport, buffer)
            }
        };
        if !self.driver.has_factory() {
            return;
        }
        let segments: &[IndexRange] = if range.is_empty() {
            &[]
        } else {
            slice::from_ref(&range)
        };
        let total_extent = self.axis.total_extent();
        if req.update == UpdateType::Scroll && self.driver.is_current(segments, total_extent) {
            vtrace!(range = %range, "range unchanged, pass skipped");
            return;
        }
        self.driver
            .run(req, segments, total_extent, self.options.orientation, |_, _| {});
    }

    pub fn scroll_position(&self) -> ScrollPosition {
        self.options.orientation.point(self.offset, 0)
    }
}

impl<T, C> core::fmt::Debug for ListContainer<T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListContainer")
            .field("options", &self.options)
            .field("offset", &self.offset)
            .field("paging", &self.paging)
            .finish_non_exhaustive()
    }
}
