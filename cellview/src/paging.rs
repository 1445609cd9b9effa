use crate::axis::{AxisMetrics, buffered_range};
use crate::{ConfigError, IndexRange, ScrollError};

/// A serializable snapshot of a paginator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageState {
    pub page: usize,
    pub max_page: usize,
    pub items_per_page: usize,
}

/// Page bookkeeping for paginated lists.
///
/// Pages are 1-based and always in `[1, max_page]`; an empty collection still has one (empty)
/// page. Motion is quantized to whole pages, so pixel scrolling is not supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paginator {
    items_per_page: usize,
    count: usize,
    page: usize,
}

impl Paginator {
    pub fn new(items_per_page: usize) -> Result<Self, ConfigError> {
        if items_per_page == 0 {
            return Err(ConfigError::ZeroItemsPerPage);
        }
        Ok(Self {
            items_per_page,
            count: 0,
            page: 1,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn max_page(&self) -> usize {
        self.count.div_ceil(self.items_per_page).max(1)
    }

    pub fn state(&self) -> PageState {
        PageState {
            page: self.page,
            max_page: self.max_page(),
            items_per_page: self.items_per_page,
        }
    }

    /// Updates the item count, clamping the current page.
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.page = self.page.min(self.max_page());
    }

    /// Keeps the first item of the current page visible across the change.
    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<(), ConfigError> {
        if items_per_page == 0 {
            return Err(ConfigError::ZeroItemsPerPage);
        }
        let first = self.first_index_of_page(self.page);
        self.items_per_page = items_per_page;
        self.page = self.page_of_index(first);
        Ok(())
    }

    /// Moves to `page`, clamped into `[1, max_page]`. Returns the page now current.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.max_page());
        self.page
    }

    pub fn next(&mut self) -> usize {
        self.go_to_page(self.page.saturating_add(1))
    }

    pub fn previous(&mut self) -> usize {
        self.go_to_page(self.page.saturating_sub(1))
    }

    pub fn move_by(&mut self, pages: isize) -> usize {
        self.go_to_page(self.page.saturating_add_signed(pages))
    }

    /// Page holding `index`, clamped into `[1, max_page]`.
    pub fn page_of_index(&self, index: usize) -> usize {
        (index / self.items_per_page + 1).min(self.max_page())
    }

    pub fn first_index_of_page(&self, page: usize) -> usize {
        page.saturating_sub(1).saturating_mul(self.items_per_page)
    }

    /// Indexes shown on `page`, truncated at the item count.
    pub fn page_range(&self, page: usize) -> IndexRange {
        let first = self.first_index_of_page(page);
        IndexRange::new(first, first.saturating_add(self.items_per_page - 1)).clamp_to(self.count)
    }

    /// Scroll offset of the first cell of `page`.
    pub fn offset_of_page(&self, page: usize, axis: &impl AxisMetrics) -> u64 {
        axis.pixel_of(self.first_index_of_page(page))
    }

    /// Required range for the current page, including `buffer` cells on each side.
    pub fn required_range(&self, buffer: usize) -> IndexRange {
        buffered_range(
            self.first_index_of_page(self.page),
            self.items_per_page,
            self.count,
            buffer,
        )
    }

    /// Always fails: paginated motion is quantized to whole pages.
    pub fn scroll_by(&self, _pixels: i64) -> Result<(), ScrollError> {
        vwarn!(page = self.page, "pixel scrolling rejected in paginated mode");
        Err(ScrollError::Unsupported)
    }
}
