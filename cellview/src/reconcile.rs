use alloc::rc::Rc;
use alloc::vec::Vec;
use core::mem;

use crate::key::ItemKey;
use crate::{
    BindFailure, Cell, CellFactory, CellPool, ExcludingRange, Host, IndexBiMap, IndexRange,
    ListChange, ReconcileError, Released, UpdateType, ViewportState,
};

/// Detects reconciliation passes started while another one is running.
///
/// Clones share the same flag, so glue code can hold a clone and check
/// [`PassGuard::is_active`] before reacting to a cell callback.
#[derive(Clone, Debug, Default)]
pub struct PassGuard(Rc<core::cell::Cell<bool>>);

impl PassGuard {
    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    fn enter(&self) -> Result<ActivePass<'_>, ReconcileError> {
        if self.0.replace(true) {
            vwarn!("re-entrant reconciliation rejected");
            return Err(ReconcileError::Reentrant);
        }
        Ok(ActivePass(&self.0))
    }
}

struct ActivePass<'a>(&'a core::cell::Cell<bool>);

impl Drop for ActivePass<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Inputs of one pass: the current items, the index segments that must hold cells, and why the
/// pass runs.
#[derive(Clone, Copy, Debug)]
pub struct Plan<'a, T> {
    pub items: &'a [T],
    /// Ascending, disjoint segments. Indexes at or past `items.len()` are ignored.
    pub segments: &'a [IndexRange],
    pub update_type: UpdateType,
    /// Positional metadata of the item change, when known.
    pub change: Option<ListChange>,
    /// Scrollable extent to record in the produced state.
    pub total_extent: u64,
}

impl<'a, T> Plan<'a, T> {
    pub fn new(items: &'a [T], segments: &'a [IndexRange], update_type: UpdateType) -> Self {
        Self {
            items,
            segments,
            update_type,
            change: None,
            total_extent: 0,
        }
    }

    /// Marks the pass as a [`UpdateType::Change`] described by `change`.
    pub fn with_change(mut self, change: Option<ListChange>) -> Self {
        self.update_type = UpdateType::Change;
        self.change = change;
        self
    }

    pub fn with_total_extent(mut self, total_extent: u64) -> Self {
        self.total_extent = total_extent;
        self
    }
}

/// Cell churn of one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Cells kept at their index with an equal item.
    pub reused: usize,
    /// Cells that kept their item but changed index (no rebind).
    pub moved: usize,
    /// Cells bound to another item within the same pass, in their own slot or a new one.
    pub rebound: usize,
    /// Cells taken out of the pool.
    pub pooled_reuse: usize,
    /// Cells produced by the factory.
    pub created: usize,
    /// Cells handed to the pool.
    pub released: usize,
    /// Cells disposed because the pool was full.
    pub disposed: usize,
    pub failures: usize,
}

impl ReconcileReport {
    /// Whether the live cell set itself changed, as opposed to cells being re-indexed or rebound.
    pub fn cells_changed(&self) -> bool {
        self.created + self.pooled_reuse + self.released + self.disposed > 0
    }
}

impl core::ops::AddAssign for ReconcileReport {
    fn add_assign(&mut self, other: Self) {
        self.reused += other.reused;
        self.moved += other.moved;
        self.rebound += other.rebound;
        self.pooled_reuse += other.pooled_reuse;
        self.created += other.created;
        self.released += other.released;
        self.disposed += other.disposed;
        self.failures += other.failures;
    }
}

/// The diff engine turning one [`ViewportState`] into the next with minimal cell churn.
///
/// The engine keeps nothing between passes except its re-entrancy guard; everything else comes
/// from the previous state and the [`Plan`].
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    guard: PassGuard,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guard(&self) -> PassGuard {
        self.guard.clone()
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_active()
    }

    /// Replaces `*slot` with the state required by `plan`.
    ///
    /// Passes, in order:
    /// 1. positional shift of live cells for inserts and removals;
    /// 2. cells whose index is still required and whose item is unchanged stay put;
    /// 3. for item changes, cells follow their item to its new index;
    /// 4. a leftover cell whose slot is still required is rebound there;
    /// 5. remaining required indexes, ascending, get a leftover cell, then a pooled one, then a
    ///    new one from `factory`;
    /// 6. cells still unused go to `pool`, nearest to the new range's center first.
    ///
    /// A factory failure leaves its slot empty and is recorded in the new state; the pass goes
    /// on. A pass requested while another is running fails with [`ReconcileError::Reentrant`]
    /// and leaves `*slot` untouched.
    pub fn reconcile<T, C, F>(
        &self,
        slot: &mut ViewportState<T, C>,
        plan: Plan<'_, T>,
        pool: &mut CellPool<T, C>,
        factory: &mut F,
        host: &Host<'_>,
    ) -> Result<ReconcileReport, ReconcileError>
    where
        T: ItemKey + Clone,
        C: Cell<T>,
        F: CellFactory<T, C> + ?Sized,
    {
        let _pass = self.guard.enter()?;

        let items = plan.items;
        let count = items.len();
        let segments = normalize_segments(plan.segments, count);
        let range = segments
            .iter()
            .fold(IndexRange::EMPTY, |acc, seg| acc.hull(seg));

        let ViewportState {
            cells: mut prev_cells,
            generation,
            ..
        } = mem::take(slot);

        // Each live cell remembers the index it was last told about.
        let mut old: IndexBiMap<T, (usize, C)> = prev_cells
            .drain()
            .map(|(i, item, cell)| (i, item, (i, cell)))
            .collect();
        // Cells that lost their item: `(position, last index, cell)`.
        let mut spare: Vec<(usize, usize, C)> = Vec::new();
        let mut report = ReconcileReport::default();
        let mut failures = Vec::new();

        if let Some(change) = plan.change {
            if let Some(delta) = change.shift().filter(|_| change.count > 0) {
                if delta < 0 {
                    let removed = IndexRange::new(change.from, change.to);
                    let doomed: Vec<usize> = old.indices_in(removed).collect();
                    for i in doomed {
                        if let Some((_, (last, cell))) = old.remove(i) {
                            spare.push((i, last, cell));
                        }
                    }
                    old.shift_from(change.to.saturating_add(1), delta);
                } else {
                    old.shift_from(change.from, delta);
                }
            }
        }

        let mut next: IndexBiMap<T, C> = IndexBiMap::new();

        let in_place: Vec<usize> = old
            .iter()
            .filter(|&(i, item, _)| is_required(&segments, i) && items.get(i) == Some(item))
            .map(|(i, _, _)| i)
            .collect();
        for i in in_place {
            if let Some((item, (last, cell))) = old.remove(i) {
                next.put(i, item, place::<T, C>(cell, last, i, &mut report));
            }
        }

        if plan.update_type == UpdateType::Change && !old.is_empty() {
            for seg in &segments {
                let mut todo = ExcludingRange::new(*seg);
                todo.exclude_all(next.indices_in(*seg));
                for i in todo.iter() {
                    let Some(item) = items.get(i) else { break };
                    if let Some((_, (last, cell))) = old.remove_nearest(item, i) {
                        next.put(i, item.clone(), place::<T, C>(cell, last, i, &mut report));
                    }
                }
            }
        }

        spare.extend(old.drain().map(|(i, _, (last, cell))| (i, last, cell)));

        // A cell whose own slot is still required keeps it and only gets the new content.
        let mut leftover = Vec::with_capacity(spare.len());
        for (pos, last, mut cell) in spare.drain(..) {
            let free = is_required(&segments, pos) && !next.contains_index(pos);
            match items.get(pos).filter(|_| free) {
                Some(item) => {
                    if last != pos {
                        cell.set_index(pos);
                    }
                    cell.bind(item);
                    report.rebound += 1;
                    next.put(pos, item.clone(), cell);
                }
                None => leftover.push((pos, last, cell)),
            }
        }
        spare = leftover;
        // Nearest to the center first; the fill pass takes from the back.
        spare.sort_by_key(|&(pos, _, _)| range.center_distance(pos));

        for seg in &segments {
            let mut todo = ExcludingRange::new(*seg);
            todo.exclude_all(next.indices_in(*seg));
            for i in todo.iter() {
                let Some(item) = items.get(i) else { break };
                let cell = if let Some((_, _, mut cell)) = spare.pop() {
                    cell.set_index(i);
                    cell.bind(item);
                    report.rebound += 1;
                    Some(cell)
                } else if let Some(mut cell) = pool.acquire() {
                    cell.set_index(i);
                    cell.bind(item);
                    report.pooled_reuse += 1;
                    Some(cell)
                } else {
                    match factory.create(item) {
                        Ok(mut cell) => {
                            cell.on_created(host);
                            cell.set_index(i);
                            cell.bind(item);
                            report.created += 1;
                            Some(cell)
                        }
                        Err(error) => {
                            vwarn!(index = i, %error, "cell factory failed, slot left empty");
                            failures.push(BindFailure { index: i, error });
                            None
                        }
                    }
                };
                if let Some(cell) = cell {
                    next.put(i, item.clone(), cell);
                }
            }
        }

        for (_, _, cell) in spare.drain(..) {
            match pool.release(cell) {
                Released::Pooled => report.released += 1,
                Released::Disposed => report.disposed += 1,
            }
        }

        report.failures = failures.len();
        *slot = ViewportState {
            segments,
            range,
            cells: next,
            count,
            total_extent: plan.total_extent,
            generation: generation.wrapping_add(1),
            update_type: plan.update_type,
            cells_changed: report.cells_changed(),
            failures,
        };
        debug_assert!(slot.is_valid(), "reconciliation produced an inconsistent state");

        vdebug!(
            update_type = ?plan.update_type,
            range = %range,
            generation = slot.generation,
            live = slot.len(),
            "viewport reconciled"
        );
        vtrace!(
            reused = report.reused,
            moved = report.moved,
            rebound = report.rebound,
            pooled_reuse = report.pooled_reuse,
            created = report.created,
            released = report.released,
            disposed = report.disposed,
            failures = report.failures,
            "reconcile churn"
        );
        Ok(report)
    }

    /// Disposes every live and pooled cell, leaving `*slot` empty.
    ///
    /// Returns how many cells were disposed.
    pub fn teardown<T, C>(
        &self,
        slot: &mut ViewportState<T, C>,
        pool: &mut CellPool<T, C>,
    ) -> Result<usize, ReconcileError>
    where
        T: ItemKey + Clone,
        C: Cell<T>,
    {
        let _pass = self.guard.enter()?;
        let ViewportState {
            mut cells,
            generation,
            ..
        } = mem::take(slot);
        let mut disposed = pool.len();
        pool.clear();
        for (_, _, mut cell) in cells.drain() {
            cell.dispose();
            disposed += 1;
        }
        slot.generation = generation.wrapping_add(1);
        vdebug!(disposed, "viewport torn down");
        Ok(disposed)
    }
}

fn place<T, C: Cell<T>>(
    mut cell: C,
    last: usize,
    index: usize,
    report: &mut ReconcileReport,
) -> C {
    if last == index {
        report.reused += 1;
    } else {
        cell.set_index(index);
        report.moved += 1;
    }
    cell
}

fn normalize_segments(segments: &[IndexRange], count: usize) -> Vec<IndexRange> {
    let out: Vec<IndexRange> = segments
        .iter()
        .map(|seg| seg.clamp_to(count))
        .filter(|seg| !seg.is_empty())
        .collect();
    assert!(
        out.windows(2).all(|w| w[0].last() < w[1].first()),
        "required segments must be ascending and disjoint: {out:?}"
    );
    out
}

fn is_required(segments: &[IndexRange], index: usize) -> bool {
    let at = segments.partition_point(|seg| seg.last().is_some_and(|end| end < index));
    segments.get(at).is_some_and(|seg| seg.contains(index))
}
