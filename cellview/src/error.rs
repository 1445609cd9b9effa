//! Error types shared by the engine and the container facades.

use alloc::string::String;

use crate::ColumnId;

/// A rejected configuration value.
///
/// Setters that return this error leave the previous (valid) configuration in place.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Cells must have a strictly positive extent along the scroll axis.
    #[error("cell extent must be greater than zero")]
    ZeroCellExtent,
    /// A per-index size lookup produced a zero extent.
    #[error("size function returned zero for index {0}")]
    ZeroItemExtent(usize),
    /// Buffer sizes are `1` (small), `2` (medium) or `3` (big).
    #[error("invalid buffer size {0}, expected 1, 2 or 3")]
    InvalidBufferSize(u8),
    /// Paginated containers need at least one item per page.
    #[error("items per page must be greater than zero")]
    ZeroItemsPerPage,
    /// Grids need at least one column.
    #[error("grid must have at least one column")]
    ZeroColumns,
    #[error("no table column with id {0:?}")]
    UnknownColumn(ColumnId),
}

/// A cell factory failed to produce a cell for an item.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cell creation failed: {message}")]
pub struct CellError {
    message: String,
}

impl CellError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A scroll request the container cannot honor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScrollError {
    /// Paginated containers move by whole pages, never by pixels.
    #[error("paginated containers scroll by page, not by pixels")]
    Unsupported,
}

/// A reconciliation pass could not run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// A pass was requested from inside another pass on the same engine (e.g. from a cell
    /// hook). The current state is left untouched.
    #[error("re-entrant reconciliation rejected: a pass is already running")]
    Reentrant,
}

/// Returned by [`crate::ExcludingIter::next_index`] once every index has been yielded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("excluding range iterator is exhausted")]
pub struct RangeExhausted;

/// A service registry lookup or registration failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("service `{0}` is already registered and locked")]
    Locked(&'static str),
    #[error("required service `{0}` is not registered")]
    Missing(&'static str),
}
