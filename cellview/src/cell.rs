use crate::{CellError, ColumnRef, Context, Orientation};

/// The capability set of a reusable cell.
///
/// A cell is bound to at most one item at a time. It is either *live* (owned by exactly one slot
/// of the current [`crate::ViewportState`]) or *free* (sitting in a [`crate::CellPool`]).
/// Only [`Cell::bind`] is required; every other hook defaults to a no-op.
///
/// Hooks must not start another reconciliation pass on the engine that is calling them. Such
/// a pass is rejected with [`crate::ReconcileError::Reentrant`].
pub trait Cell<T> {
    /// Shows `item`. Relocated cells whose item did not change are not rebound.
    fn bind(&mut self, item: &T);

    /// The index this cell now represents.
    fn set_index(&mut self, _index: usize) {}

    /// Called once, right after the factory produced the cell and before its first bind.
    fn on_created(&mut self, _host: &Host<'_>) {}

    fn before_layout(&mut self) {}

    fn after_layout(&mut self) {}

    /// The cell is entering the pool.
    fn on_cache(&mut self) {}

    /// The cell is leaving the pool to be bound again.
    fn on_decache(&mut self) {}

    /// The cell is being destroyed and will never be used again.
    fn dispose(&mut self) {}
}

/// A cell placed in a two-dimensional grid.
pub trait GridCell<T>: Cell<T> {
    fn set_coordinates(&mut self, row: usize, column: usize);
}

/// A cell of a table: one row item shown through one column.
///
/// The row arrives through [`Cell::set_index`] as well; `set_position` adds the column, whose
/// index changes when columns are inserted or removed before it.
pub trait TableCell<T>: Cell<T> {
    fn set_position(&mut self, row: usize, column: ColumnRef);
}

/// Produces cells for items.
///
/// Implemented for every `FnMut(&T) -> Result<C, CellError>`.
pub trait CellFactory<T, C> {
    fn create(&mut self, item: &T) -> Result<C, CellError>;
}

impl<T, C, F> CellFactory<T, C> for F
where
    F: FnMut(&T) -> Result<C, CellError>,
{
    fn create(&mut self, item: &T) -> Result<C, CellError> {
        self(item)
    }
}

/// The kind of container hosting a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    List,
    PaginatedList,
    Grid,
    Table,
}

/// What a freshly created cell learns about its container.
#[derive(Clone, Copy, Debug)]
pub struct Host<'a> {
    pub kind: ContainerKind,
    pub orientation: Orientation,
    pub context: &'a Context,
}

impl<'a> Host<'a> {
    pub fn new(kind: ContainerKind, orientation: Orientation, context: &'a Context) -> Self {
        Self {
            kind,
            orientation,
            context,
        }
    }
}
