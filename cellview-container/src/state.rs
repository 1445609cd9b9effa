use alloc::vec::Vec;

use cellview::{
    BindFailure, ColumnId, ColumnRef, IndexRange, ItemKey, PageState, Rect, ScrollPosition,
    UpdateType, ViewportState,
};

/// A lightweight, serializable snapshot of a container's viewport and scroll position.
///
/// This is useful for restoring UI state across frames or sessions without keeping the
/// container (and its cells) alive. With `feature = "serde"`, this type implements
/// `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameState {
    pub viewport: Rect,
    pub scroll: ScrollPosition,
    /// Set for paginated lists only.
    pub page: Option<PageState>,
}

/// A snapshot of a table: the required rows and columns, and one [`ViewportState`] per column
/// mapping row indexes to that column's cells.
///
/// Columns outside [`TableState::columns`] have empty states.
#[derive(Debug)]
pub struct TableState<T, C> {
    pub(crate) rows: IndexRange,
    pub(crate) columns: IndexRange,
    pub(crate) column_ids: Vec<ColumnId>,
    pub(crate) states: Vec<ViewportState<T, C>>,
    pub(crate) count: usize,
    pub(crate) total_extent: u64,
    pub(crate) generation: u64,
    pub(crate) update_type: UpdateType,
}

impl<T: ItemKey + Clone, C> Default for TableState<T, C> {
    fn default() -> Self {
        Self {
            rows: IndexRange::EMPTY,
            columns: IndexRange::EMPTY,
            column_ids: Vec::new(),
            states: Vec::new(),
            count: 0,
            total_extent: 0,
            generation: 0,
            update_type: UpdateType::Init,
        }
    }
}

impl<T: ItemKey + Clone, C> TableState<T, C> {
    /// Required row indexes.
    pub fn rows(&self) -> IndexRange {
        self.rows
    }

    /// Required column indexes.
    pub fn columns(&self) -> IndexRange {
        self.columns
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn update_type(&self) -> UpdateType {
        self.update_type
    }

    pub fn column_count(&self) -> usize {
        self.states.len()
    }

    /// Row-to-cell state of the column at `index`.
    pub fn column(&self, index: usize) -> Option<&ViewportState<T, C>> {
        self.states.get(index)
    }

    pub fn column_by_id(&self, id: ColumnId) -> Option<&ViewportState<T, C>> {
        let index = self.column_ids.iter().position(|c| *c == id)?;
        self.states.get(index)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&C> {
        self.states.get(column)?.get(row)
    }

    /// Number of live cells over all columns.
    pub fn len(&self) -> usize {
        self.states.iter().map(ViewportState::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.states.iter().all(ViewportState::is_empty)
    }

    /// `(row, column, cell)`, column by column, rows ascending within a column.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ColumnRef, &C)> + '_ {
        self.column_ids
            .iter()
            .zip(&self.states)
            .enumerate()
            .flat_map(|(index, (&id, state))| {
                let column = ColumnRef { id, index };
                state.iter().map(move |(row, _, cell)| (row, column, cell))
            })
    }

    pub fn failures(&self) -> impl Iterator<Item = (ColumnId, &BindFailure)> + '_ {
        self.column_ids
            .iter()
            .zip(&self.states)
            .flat_map(|(&id, state)| state.failures().iter().map(move |f| (id, f)))
    }

    /// `true` when the pass added cells to, or removed cells from, any column.
    pub fn cells_changed(&self) -> bool {
        self.states.iter().any(ViewportState::cells_changed)
    }

    pub fn is_valid(&self) -> bool {
        self.column_ids.len() == self.states.len()
            && self.states.iter().enumerate().all(|(index, state)| {
                state.is_valid()
                    && (state.is_empty() || self.columns.contains(index))
                    && state.iter().all(|(row, _, _)| self.rows.contains(row))
            })
    }
}
