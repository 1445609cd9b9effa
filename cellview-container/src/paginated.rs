use alloc::vec::Vec;

use cellview::{
    BindFailure, BufferSize, Cell, CellBounds, CellFactory, ConfigError, Context, ItemKey,
    ListChange, PageState, Rect, ReconcileReport, ScrollError, UpdateType, ViewportState,
};

use crate::FrameState;
use crate::list::ListContainer;
use crate::options::ListOptions;

/// A list that shows one page of `items_per_page` cells at a time.
///
/// Motion is quantized to whole pages: the scroll offset is always the start of the current
/// page, so pixel scrolling fails with [`ScrollError::Unsupported`].
pub struct PaginatedList<T, C> {
    list: ListContainer<T, C>,
}

impl<T: ItemKey + Clone, C: Cell<T>> PaginatedList<T, C> {
    pub fn new(options: ListOptions<T>, items_per_page: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            list: ListContainer::new_paginated(options, items_per_page)?,
        })
    }

    fn paging(&self) -> PageState {
        self.list
            .paging
            .map(|p| p.state())
            .unwrap_or(PageState {
                page: 1,
                max_page: 1,
                items_per_page: 1,
            })
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.paging().page
    }

    pub fn max_page(&self) -> usize {
        self.paging().max_page
    }

    pub fn items_per_page(&self) -> usize {
        self.paging().items_per_page
    }

    pub fn page_state(&self) -> PageState {
        self.paging()
    }

    /// Changes the page size, staying on the page that holds the first item of the current
    /// page.
    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<(), ConfigError> {
        let Some(p) = self.list.paging.as_mut() else {
            return Ok(());
        };
        p.set_items_per_page(items_per_page)
            .inspect_err(|_err| vwarn!(error = %_err, "rejected items per page"))?;
        self.list.update(UpdateType::Scroll, None);
        Ok(())
    }

    /// Moves to `page`, clamped into `[1, max_page]`. Returns the page now current.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.move_with(|p| p.go_to_page(page))
    }

    pub fn next_page(&mut self) -> usize {
        self.move_with(|p| p.next())
    }

    pub fn previous_page(&mut self) -> usize {
        self.move_with(|p| p.previous())
    }

    /// Moves `pages` pages forward (or backward when negative).
    pub fn move_by(&mut self, pages: isize) -> usize {
        self.move_with(|p| p.move_by(pages))
    }

    /// Shows the page holding `index`.
    pub fn scroll_to_index(&mut self, index: usize) -> usize {
        self.move_with(|p| {
            let page = p.page_of_index(index);
            p.go_to_page(page)
        })
    }

    pub fn scroll_to_first(&mut self) -> usize {
        self.go_to_page(1)
    }

    pub fn scroll_to_last(&mut self) -> usize {
        self.go_to_page(usize::MAX)
    }

    fn move_with(&mut self, f: impl FnOnce(&mut cellview::Paginator) -> usize) -> usize {
        let count = self.list.len();
        let Some(p) = self.list.paging.as_mut() else {
            return 1;
        };
        p.set_count(count);
        let before = p.page();
        let page = f(p);
        if page != before {
            vdebug!(from = before, to = page, "page changed");
            self.list.update(UpdateType::Scroll, None);
        }
        page
    }

    /// Always fails: pages cannot be scrolled by pixels.
    pub fn scroll_by(&mut self, pixels: i64) -> Result<u64, ScrollError> {
        match self.list.paging {
            Some(p) => p.scroll_by(pixels).map(|()| self.list.scroll_offset()),
            None => Err(ScrollError::Unsupported),
        }
    }

    /// Always fails: pages cannot be scrolled by pixels.
    pub fn scroll_to_pixel(&mut self, pixel: u64) -> Result<u64, ScrollError> {
        self.scroll_by(i64::try_from(pixel).unwrap_or(i64::MAX))
    }

    /// Offset of the current page start.
    pub fn scroll_offset(&self) -> u64 {
        self.list.scroll_offset()
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.list.set_items(items);
    }

    pub fn items(&self) -> &[T] {
        self.list.items()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn insert_items(&mut self, at: usize, items: impl IntoIterator<Item = T>) {
        self.list.insert_items(at, items);
    }

    pub fn push_items(&mut self, items: impl IntoIterator<Item = T>) {
        self.list.push_items(items);
    }

    pub fn remove_items(&mut self, from: usize, count: usize) -> Vec<T> {
        self.list.remove_items(from, count)
    }

    pub fn replace_items(&mut self, from: usize, items: impl IntoIterator<Item = T>) -> usize {
        self.list.replace_items(from, items)
    }

    pub fn permute_items(&mut self, from: usize, to: usize, reorder: impl FnOnce(&mut [T])) {
        self.list.permute_items(from, to, reorder);
    }

    pub fn notify_change(&mut self, change: Option<ListChange>, mutate: impl FnOnce(&mut Vec<T>)) {
        self.list.notify_change(change, mutate);
    }

    pub fn set_cell_factory(&mut self, factory: impl CellFactory<T, C> + 'static) {
        self.list.set_cell_factory(factory);
    }

    pub fn set_buffer_size(&mut self, buffer_size: BufferSize) {
        self.list.set_buffer_size(buffer_size);
    }

    pub fn set_cell_extent(&mut self, cell_extent: u32) -> Result<(), ConfigError> {
        self.list.set_cell_extent(cell_extent)
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.list.set_viewport(viewport);
    }

    pub fn set_pool_capacity(&mut self, capacity: usize) {
        self.list.set_pool_capacity(capacity);
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&ViewportState<T, C>) + Send + Sync + 'static>,
    ) {
        self.list.set_on_change(on_change);
    }

    pub fn set_on_failure(
        &mut self,
        on_failure: Option<impl Fn(&BindFailure) + Send + Sync + 'static>,
    ) {
        self.list.set_on_failure(on_failure);
    }

    pub fn current_state(&self) -> &ViewportState<T, C> {
        self.list.current_state()
    }

    pub fn last_report(&self) -> ReconcileReport {
        self.list.last_report()
    }

    pub fn context(&self) -> &Context {
        self.list.context()
    }

    pub fn context_mut(&mut self) -> &mut Context {
        self.list.context_mut()
    }

    pub fn bounds_of(&self, index: usize) -> CellBounds {
        self.list.bounds_of(index)
    }

    pub fn layout(&mut self, place: impl FnMut(usize, CellBounds, &mut C)) {
        self.list.layout(place);
    }

    /// Runs `f` and reconciles once at the end.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.list.begin_batch();
        f(self);
        self.list.end_batch();
    }

    pub fn dispose(&mut self) {
        self.list.dispose();
    }

    pub fn frame_state(&self) -> FrameState {
        self.list.frame_state()
    }

    pub fn restore_frame_state(&mut self, frame: FrameState) {
        self.list.restore_frame_state(frame);
    }

    /// The wrapped list, for read-only queries such as pixel conversions.
    pub fn as_list(&self) -> &ListContainer<T, C> {
        &self.list
    }
}

impl<T, C> core::fmt::Debug for PaginatedList<T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PaginatedList")
            .field("list", &self.list)
            .finish()
    }
}
