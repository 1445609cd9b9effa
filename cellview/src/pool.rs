use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use crate::Cell;

pub const DEFAULT_POOL_CAPACITY: usize = 10;

/// What happened to a cell handed to [`CellPool::release`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Released {
    Pooled,
    Disposed,
}

/// A bounded, last-in-first-out store of free cells.
///
/// Released cells receive [`Cell::on_cache`] and are queued; acquired cells receive
/// [`Cell::on_decache`]. When the pool is full the released cell is disposed instead. A
/// capacity of `0` disables pooling altogether.
pub struct CellPool<T, C> {
    cells: Vec<C>,
    capacity: usize,
    _item: PhantomData<fn(&T)>,
}

impl<T, C: Cell<T>> Default for CellPool<T, C> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }
}

impl<T, C: Cell<T>> CellPool<T, C> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::new(),
            capacity,
            _item: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity. Shrinking disposes the oldest excess cells.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        if self.cells.len() > capacity {
            let excess = self.cells.len() - capacity;
            for mut cell in self.cells.drain(..excess) {
                cell.dispose();
            }
            vtrace!(capacity, disposed = excess, "pool shrunk");
        }
    }

    /// Takes the most recently released cell, if any.
    pub fn acquire(&mut self) -> Option<C> {
        let mut cell = self.cells.pop()?;
        cell.on_decache();
        Some(cell)
    }

    pub fn release(&mut self, mut cell: C) -> Released {
        if self.cells.len() >= self.capacity {
            cell.dispose();
            return Released::Disposed;
        }
        cell.on_cache();
        self.cells.push(cell);
        Released::Pooled
    }

    /// Creates cells with `make` until the pool holds `n` cells or is full.
    ///
    /// Returns how many cells were added.
    pub fn prefill(&mut self, n: usize, mut make: impl FnMut() -> C) -> usize {
        let target = n.min(self.capacity);
        let mut added = 0;
        while self.cells.len() < target {
            let mut cell = make();
            cell.on_cache();
            self.cells.push(cell);
            added += 1;
        }
        added
    }

    /// Disposes every pooled cell.
    pub fn clear(&mut self) {
        for mut cell in self.cells.drain(..) {
            cell.dispose();
        }
    }
}

impl<T, C> fmt::Debug for CellPool<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellPool")
            .field("len", &self.cells.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
