//! Container facades for the `cellview` engine.
//!
//! `cellview` knows how to reconcile a viewport state; this crate owns everything around a
//! pass so UI glue only deals with items, geometry and scroll input:
//!
//! - [`ListContainer`]: a vertical or horizontal list with fixed or per-item extents
//! - [`PaginatedList`]: a list shown one page at a time
//! - [`GridContainer`]: a row-major grid scrolling on both axes
//! - [`TableContainer`]: rows of items shown through columns, each column with its own cells
//!
//! Every mutation (items, scroll position, viewport, sizing) re-runs the engine; wrap several
//! mutations in `batch_update` to run it once. Read the result with `current_state()` or
//! position cells with `layout()`.
//!
//! This crate is framework-agnostic: cells are whatever type implements [`cellview::Cell`].
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod driver;
mod grid;
mod list;
mod options;
mod paginated;
mod state;
mod table;


pub use grid::GridContainer;
pub use list::ListContainer;
pub use options::{
    GridOptions, ListOptions, OnFailure, OnStateChange, OnTableChange, SizeFn, TableOptions,
};
pub use paginated::PaginatedList;
pub use state::{FrameState, TableState};
pub use table::TableContainer;
