//! A headless cell-recycling engine for virtualized lists and grids.
//!
//! Instead of building one UI cell per data item, a virtualized container keeps a small set of
//! reusable cells sized to the viewport plus a buffer, and remaps them as the user scrolls, as
//! items are inserted or removed, or as the viewport is resized. This crate holds the parts that
//! do not depend on any UI toolkit:
//!
//! - [`IndexRange`] and [`ExcludingRange`]: inclusive index ranges and lazy "range minus
//!   exclusions" iteration;
//! - [`IndexBiMap`]: index → (item, cell) with reverse item → indexes lookup, tolerant of
//!   duplicate items;
//! - [`Reconciler`]: the diff engine producing the next [`ViewportState`] from the previous one
//!   while preserving the identity of on-screen cells;
//! - [`CellPool`]: a bounded LIFO store of free cells;
//! - [`axis`], [`GridGeometry`], [`ColumnLayout`] and [`Paginator`]: pixel/index/percentage/page
//!   math.
//!
//! A UI layer provides cells (implementing [`Cell`]) and positions them; the
//! `cellview-container` crate wraps all of this into list, paginated list, grid and table
//! containers.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

pub mod axis;
mod bimap;
mod cell;
mod change;
mod context;
mod error;
mod excluding;
mod fenwick;
mod grid;
mod key;
mod paging;
mod pool;
mod range;
mod reconcile;
mod state;
mod table;
mod types;

#[cfg(test)]
mod tests;

pub use axis::{AxisMetrics, FixedAxis, VariableAxis};
pub use bimap::IndexBiMap;
pub use cell::{Cell, CellFactory, ContainerKind, GridCell, Host, TableCell};
pub use change::{ChangeKind, ListChange, UpdateType};
pub use context::Context;
pub use error::{CellError, ConfigError, ContextError, RangeExhausted, ReconcileError, ScrollError};
pub use excluding::{ExcludingIter, ExcludingRange};
pub use grid::GridGeometry;
pub use key::ItemKey;
pub use paging::{PageState, Paginator};
pub use pool::{CellPool, DEFAULT_POOL_CAPACITY, Released};
pub use range::IndexRange;
pub use reconcile::{PassGuard, Plan, ReconcileReport, Reconciler};
pub use state::{BindFailure, ViewportState};
pub use table::{ColumnId, ColumnLayout, ColumnRef, ColumnsLayoutMode};
pub use types::{BufferSize, CellBounds, Orientation, Rect, ScrollPosition};
