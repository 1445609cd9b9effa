use alloc::vec::Vec;

use crate::key::ItemKey;
use crate::{CellError, IndexBiMap, IndexRange, UpdateType};

/// A cell that could not be produced for `index`. The slot stays empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindFailure {
    pub index: usize,
    pub error: CellError,
}

/// A snapshot of which cell shows which index, for one scroll/data configuration.
///
/// States are produced by [`crate::Reconciler::reconcile`]; their index→cell mapping is never
/// edited afterwards. Layout code may still reach the cells mutably through
/// [`ViewportState::iter_mut`] to position them.
#[derive(Debug)]
pub struct ViewportState<T, C> {
    pub(crate) segments: Vec<IndexRange>,
    pub(crate) range: IndexRange,
    pub(crate) cells: IndexBiMap<T, C>,
    pub(crate) count: usize,
    pub(crate) total_extent: u64,
    pub(crate) generation: u64,
    pub(crate) update_type: UpdateType,
    pub(crate) cells_changed: bool,
    pub(crate) failures: Vec<BindFailure>,
}

impl<T: ItemKey + Clone, C> Default for ViewportState<T, C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ItemKey + Clone, C> ViewportState<T, C> {
    /// The state before any pass, or of a container that cannot show cells.
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
            range: IndexRange::EMPTY,
            cells: IndexBiMap::new(),
            count: 0,
            total_extent: 0,
            generation: 0,
            update_type: UpdateType::Init,
            cells_changed: false,
            failures: Vec::new(),
        }
    }

    /// Hull of the required segments.
    pub fn range(&self) -> IndexRange {
        self.range
    }

    /// Ascending, disjoint index segments that were required (one per row for grids).
    pub fn segments(&self) -> &[IndexRange] {
        &self.segments
    }

    /// Total item count at the time of the pass.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total_extent(&self) -> u64 {
        self.total_extent
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn update_type(&self) -> UpdateType {
        self.update_type
    }

    /// `true` when the pass added cells to, or removed cells from, the live set.
    pub fn cells_changed(&self) -> bool {
        self.cells_changed
    }

    pub fn failures(&self) -> &[BindFailure] {
        &self.failures
    }

    /// Number of live cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&C> {
        self.cells.get(index)
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.cells.key(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.cells.contains_index(index)
    }

    /// Indexes showing `item`, ascending.
    pub fn indices_of<'a>(&'a self, item: &T) -> impl Iterator<Item = usize> + 'a {
        self.cells.indices_of(item)
    }

    /// `(index, item, cell)` by ascending index.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &T, &C)> + '_ {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (usize, &T, &mut C)> + '_ {
        self.cells.iter_mut()
    }

    pub fn cells(&self) -> &IndexBiMap<T, C> {
        &self.cells
    }

    pub fn is_valid(&self) -> bool {
        self.cells.is_valid()
            && self.cells.indices().all(|i| self.range.contains(i) && i < self.count)
    }
}
